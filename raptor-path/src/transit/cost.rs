//! Generalized cost.
//!
//! Costs are integers in centi-seconds ("raptor cost"): one second of
//! travel at reluctance 1.0 costs 100. Keeping them integral makes path
//! comparison exact.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::StopIndex;

use super::{StreetLeg, TransferConstraint, TripSchedule};

/// The cost of anything when cost calculation is disabled.
pub const ZERO_COST: i32 = 0;

/// Convert a cost in seconds (or a reluctance factor) to raptor cost.
///
/// # Examples
///
/// ```
/// use raptor_path::transit::to_raptor_cost;
///
/// assert_eq!(to_raptor_cost(0.8), 80);
/// assert_eq!(to_raptor_cost(60.0), 6000);
/// assert_eq!(to_raptor_cost(1.005), 101);
/// ```
pub fn to_raptor_cost(value: f64) -> i32 {
    (value * 100.0).round() as i32
}

/// Format a raptor cost in seconds, e.g. `$8154` or `$12.5`.
///
/// # Examples
///
/// ```
/// use raptor_path::transit::format_cost;
///
/// assert_eq!(format_cost(815_400), "$8154");
/// assert_eq!(format_cost(1_250), "$12.5");
/// assert_eq!(format_cost(1_205), "$12.05");
/// assert_eq!(format_cost(0), "$0");
/// ```
pub fn format_cost(cost: i32) -> String {
    let sign = if cost < 0 { "-" } else { "" };
    let abs = cost.unsigned_abs();
    let (whole, cents) = (abs / 100, abs % 100);
    match cents {
        0 => format!("{sign}${whole}"),
        c if c % 10 == 0 => format!("{sign}${whole}.{}", c / 10),
        c => format!("{sign}${whole}.{c:02}"),
    }
}

/// Generalized-cost formula for transit legs and waiting.
pub trait CostCalculator<T: TripSchedule>: Send + Sync {
    /// Cost of boarding `trip` at `board_stop` at `board_time`, including
    /// the wait since arriving at the stop at `prev_arrival_time`.
    ///
    /// `first_boarding` is true when the traveller arrives on foot
    /// directly from the origin. `constraint` is the policy of the
    /// transfer into this trip, [`TransferConstraint::Regular`] if none.
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: i32,
        board_stop: StopIndex,
        board_time: i32,
        trip: &T,
        constraint: TransferConstraint,
    ) -> i32;

    /// Total cost of a transit leg given its boarding cost, riding
    /// `transit_time` seconds and alighting at `alight_stop`.
    fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        reluctance_index: usize,
        alight_stop: StopIndex,
    ) -> i32;

    /// Cost of waiting `wait_seconds`.
    fn wait_cost(&self, wait_seconds: i32) -> i32;

    /// Cost of a street leg used as egress.
    fn cost_of_street_leg(&self, leg: &dyn StreetLeg) -> i32;
}

/// Cost calculation, or its explicit absence.
///
/// With [`CostModel::Zero`] every leg costs [`ZERO_COST`], including street
/// legs whose router-computed cost would otherwise be used verbatim.
pub enum CostModel<T: TripSchedule> {
    /// Cost calculation is disabled.
    Zero,
    /// Costs come from this calculator.
    Calculator(Arc<dyn CostCalculator<T>>),
}

impl<T: TripSchedule> CostModel<T> {
    /// Wrap a calculator implementation.
    pub fn calculator(calculator: impl CostCalculator<T> + 'static) -> Self {
        CostModel::Calculator(Arc::new(calculator))
    }

    /// Returns true if costs are computed.
    pub fn is_enabled(&self) -> bool {
        matches!(self, CostModel::Calculator(_))
    }

    /// The router's precomputed cost for an access or transfer leg.
    pub fn street_leg_cost(&self, leg: &dyn StreetLeg) -> i32 {
        match self {
            CostModel::Zero => ZERO_COST,
            CostModel::Calculator(_) => leg.generalized_cost(),
        }
    }

    /// See [`CostCalculator::cost_of_street_leg`].
    pub fn egress_cost(&self, leg: &dyn StreetLeg) -> i32 {
        match self {
            CostModel::Zero => ZERO_COST,
            CostModel::Calculator(calc) => calc.cost_of_street_leg(leg),
        }
    }

    /// See [`CostCalculator::wait_cost`].
    pub fn wait_cost(&self, wait_seconds: i32) -> i32 {
        match self {
            CostModel::Zero => ZERO_COST,
            CostModel::Calculator(calc) => calc.wait_cost(wait_seconds),
        }
    }

    /// See [`CostCalculator::boarding_cost`].
    pub fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: i32,
        board_stop: StopIndex,
        board_time: i32,
        trip: &T,
        constraint: TransferConstraint,
    ) -> i32 {
        match self {
            CostModel::Zero => ZERO_COST,
            CostModel::Calculator(calc) => calc.boarding_cost(
                first_boarding,
                prev_arrival_time,
                board_stop,
                board_time,
                trip,
                constraint,
            ),
        }
    }

    /// See [`CostCalculator::transit_arrival_cost`].
    pub fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        reluctance_index: usize,
        alight_stop: StopIndex,
    ) -> i32 {
        match self {
            CostModel::Zero => ZERO_COST,
            CostModel::Calculator(calc) => calc.transit_arrival_cost(
                boarding_cost,
                alight_slack,
                transit_time,
                reluctance_index,
                alight_stop,
            ),
        }
    }
}

impl<T: TripSchedule> Clone for CostModel<T> {
    fn clone(&self) -> Self {
        match self {
            CostModel::Zero => CostModel::Zero,
            CostModel::Calculator(calc) => CostModel::Calculator(Arc::clone(calc)),
        }
    }
}

impl<T: TripSchedule> Default for CostModel<T> {
    fn default() -> Self {
        CostModel::Zero
    }
}

impl<T: TripSchedule> fmt::Debug for CostModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostModel::Zero => f.write_str("CostModel::Zero"),
            CostModel::Calculator(_) => f.write_str("CostModel::Calculator"),
        }
    }
}

/// Coefficients for [`DefaultCostCalculator`], in seconds and plain factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Penalty for every boarding (seconds).
    pub board_cost_sec: i32,

    /// Extra penalty for boarding after a transfer (seconds).
    pub transfer_cost_sec: i32,

    /// Reluctance applied to waiting.
    pub wait_reluctance: f64,

    /// Reluctance per transit reluctance index. Trips whose index is out
    /// of range ride at reluctance 1.0.
    pub transit_reluctance: Vec<f64>,

    /// Extra cost for boarding or alighting at each stop (seconds),
    /// indexed by stop index.
    pub stop_board_alight_costs: Option<Vec<i32>>,
}

impl CostConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            board_cost_sec: 600,
            transfer_cost_sec: 0,
            wait_reluctance: 1.0,
            transit_reluctance: vec![1.0],
            stop_board_alight_costs: None,
        }
    }
}

/// Linear cost model: reluctance-weighted time plus board, transfer and
/// stop penalties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCostCalculator {
    board_cost_only: i32,
    board_and_transfer_cost: i32,
    transfer_cost: i32,
    wait_factor: i32,
    transit_factors: Vec<i32>,
    stop_costs: Option<Vec<i32>>,
}

const DEFAULT_TRANSIT_FACTOR: i32 = 100;

impl DefaultCostCalculator {
    /// Create a calculator from its configuration.
    pub fn new(config: &CostConfig) -> Self {
        let board_cost_only = to_raptor_cost(config.board_cost_sec.into());
        let transfer_cost = to_raptor_cost(config.transfer_cost_sec.into());
        Self {
            board_cost_only,
            board_and_transfer_cost: board_cost_only + transfer_cost,
            transfer_cost,
            wait_factor: to_raptor_cost(config.wait_reluctance),
            transit_factors: config
                .transit_reluctance
                .iter()
                .map(|r| to_raptor_cost(*r))
                .collect(),
            stop_costs: config
                .stop_board_alight_costs
                .as_ref()
                .map(|costs| costs.iter().map(|c| to_raptor_cost((*c).into())).collect()),
        }
    }

    fn transit_factor(&self, reluctance_index: usize) -> i32 {
        self.transit_factors
            .get(reluctance_index)
            .copied()
            .unwrap_or(DEFAULT_TRANSIT_FACTOR)
    }

    fn stop_cost(&self, stop: StopIndex) -> i32 {
        self.stop_costs
            .as_ref()
            .and_then(|costs| costs.get(stop.0).copied())
            .unwrap_or(ZERO_COST)
    }

    fn regular_boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: i32,
        board_stop: StopIndex,
        board_time: i32,
    ) -> i32 {
        let board_wait_time = board_time - prev_arrival_time;
        let board_cost = if first_boarding {
            self.board_cost_only
        } else {
            self.board_and_transfer_cost
        };
        self.wait_factor * board_wait_time + board_cost + self.stop_cost(board_stop)
    }
}

impl<T: TripSchedule> CostCalculator<T> for DefaultCostCalculator {
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: i32,
        board_stop: StopIndex,
        board_time: i32,
        trip: &T,
        constraint: TransferConstraint,
    ) -> i32 {
        let board_wait_time = board_time - prev_arrival_time;
        match constraint {
            // The wait is spent on board
            TransferConstraint::StaySeated => {
                self.transit_factor(trip.transit_reluctance_index()) * board_wait_time
            }
            TransferConstraint::Guaranteed => self.wait_factor * board_wait_time,
            // Priority between the remaining policies is decided after
            // reconstruction; they board like a regular transfer.
            TransferConstraint::Regular
            | TransferConstraint::Preferred
            | TransferConstraint::Recommended
            | TransferConstraint::StaffOnly
            | TransferConstraint::Forbidden => self.regular_boarding_cost(
                first_boarding,
                prev_arrival_time,
                board_stop,
                board_time,
            ),
        }
    }

    fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        reluctance_index: usize,
        alight_stop: StopIndex,
    ) -> i32 {
        boarding_cost
            + self.transit_factor(reluctance_index) * transit_time
            + self.wait_factor * alight_slack
            + self.stop_cost(alight_stop)
    }

    fn wait_cost(&self, wait_seconds: i32) -> i32 {
        self.wait_factor * wait_seconds
    }

    fn cost_of_street_leg(&self, leg: &dyn StreetLeg) -> i32 {
        if leg.has_embedded_rides() {
            leg.generalized_cost() + self.transfer_cost
        } else {
            leg.generalized_cost()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::mock::{TestStreetLeg, TestTrip};

    fn config() -> CostConfig {
        CostConfig {
            board_cost_sec: 60,
            transfer_cost_sec: 120,
            wait_reluctance: 0.8,
            transit_reluctance: vec![1.0, 1.5],
            stop_board_alight_costs: Some(vec![0, 0, 30, 0, 60]),
        }
    }

    fn calculator() -> DefaultCostCalculator {
        DefaultCostCalculator::new(&config())
    }

    fn trip() -> TestTrip {
        TestTrip::builder("L1", &[1, 2]).times(&["10:04", "10:35"]).build()
    }

    #[test]
    fn first_boarding_skips_transfer_cost() {
        let calc = calculator();
        // Wait 45s at stop 1 (no stop cost)
        let cost = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            true,
            1000,
            StopIndex(1),
            1045,
            &trip(),
            TransferConstraint::Regular,
        );
        assert_eq!(cost, 80 * 45 + 6000);
    }

    #[test]
    fn later_boarding_adds_transfer_and_stop_cost() {
        let calc = calculator();
        let cost = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            false,
            1000,
            StopIndex(4),
            1100,
            &trip(),
            TransferConstraint::Regular,
        );
        assert_eq!(cost, 80 * 100 + 6000 + 12_000 + 6000);
    }

    #[test]
    fn guaranteed_transfer_costs_only_the_wait() {
        let calc = calculator();
        let cost = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            false,
            1000,
            StopIndex(4),
            1100,
            &trip(),
            TransferConstraint::Guaranteed,
        );
        assert_eq!(cost, 80 * 100);
    }

    #[test]
    fn stay_seated_wait_is_transit_time() {
        let calc = calculator();
        let slow = TestTrip::builder("L2", &[1, 2])
            .times(&["10:04", "10:35"])
            .reluctance_index(1)
            .build();
        let cost = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            false,
            1000,
            StopIndex(4),
            1100,
            &slow,
            TransferConstraint::StaySeated,
        );
        assert_eq!(cost, 150 * 100);
    }

    #[test]
    fn forbidden_boards_like_regular() {
        let calc = calculator();
        let regular = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            false,
            1000,
            StopIndex(2),
            1100,
            &trip(),
            TransferConstraint::Regular,
        );
        let forbidden = CostCalculator::<TestTrip>::boarding_cost(
            &calc,
            false,
            1000,
            StopIndex(2),
            1100,
            &trip(),
            TransferConstraint::Forbidden,
        );
        assert_eq!(regular, forbidden);
    }

    #[test]
    fn transit_arrival_cost() {
        let calc = calculator();
        let cost = CostCalculator::<TestTrip>::transit_arrival_cost(
            &calc,
            10_000,
            15,
            1860,
            0,
            StopIndex(2),
        );
        assert_eq!(cost, 10_000 + 100 * 1860 + 80 * 15 + 3000);

        // Unknown reluctance index rides at 1.0
        let cost = CostCalculator::<TestTrip>::transit_arrival_cost(
            &calc,
            0,
            0,
            100,
            7,
            StopIndex(99),
        );
        assert_eq!(cost, 100 * 100);
    }

    #[test]
    fn street_leg_cost_with_rides_adds_transfer_cost() {
        let calc = calculator();
        let walk = TestStreetLeg::walk_to(StopIndex(1), 180);
        let flex = TestStreetLeg::flex_from(StopIndex(1), 600, 1);

        assert_eq!(
            CostCalculator::<TestTrip>::cost_of_street_leg(&calc, &walk),
            walk.generalized_cost()
        );
        assert_eq!(
            CostCalculator::<TestTrip>::cost_of_street_leg(&calc, &flex),
            flex.generalized_cost() + 12_000
        );
    }

    #[test]
    fn zero_model_costs_nothing() {
        let model: CostModel<TestTrip> = CostModel::Zero;
        let walk = TestStreetLeg::walk_to(StopIndex(1), 180);

        assert!(!model.is_enabled());
        assert_eq!(model.street_leg_cost(&walk), ZERO_COST);
        assert_eq!(model.egress_cost(&walk), ZERO_COST);
        assert_eq!(model.wait_cost(300), ZERO_COST);
        assert_eq!(
            model.boarding_cost(
                true,
                0,
                StopIndex(1),
                100,
                &trip(),
                TransferConstraint::Regular
            ),
            ZERO_COST
        );
        assert_eq!(
            model.transit_arrival_cost(500, 15, 600, 0, StopIndex(2)),
            ZERO_COST
        );
    }

    #[test]
    fn calculator_model_uses_street_cost_verbatim() {
        let model: CostModel<TestTrip> = CostModel::calculator(calculator());
        let walk = TestStreetLeg::walk_to(StopIndex(1), 180);

        assert!(model.is_enabled());
        assert_eq!(model.street_leg_cost(&walk), walk.generalized_cost());
        assert_eq!(model.wait_cost(10), 800);
    }

    #[test]
    fn load_from_json() {
        let config = CostConfig::from_json(
            r#"{ "board_cost_sec": 60, "wait_reluctance": 0.8, "transit_reluctance": [1.0, 1.3] }"#,
        )
        .unwrap();

        assert_eq!(config.board_cost_sec, 60);
        assert_eq!(config.transfer_cost_sec, 0);
        assert_eq!(config.wait_reluctance, 0.8);
        assert_eq!(config.transit_reluctance, vec![1.0, 1.3]);
        assert_eq!(config.stop_board_alight_costs, None);
    }

    #[test]
    fn format_negative_cost() {
        assert_eq!(format_cost(-250), "-$2.5");
    }
}
