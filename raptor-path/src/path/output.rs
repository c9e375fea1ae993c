//! Immutable paths.
//!
//! A [`Path`] is the finished product of a builder: a chain of
//! [`PathLeg`]s from access to egress, each with resolved times and cost,
//! plus totals. Nothing in a path can change after construction, so a
//! path can be shared between threads freely.

use std::fmt;
use std::sync::OnceLock;

use crate::domain::{LegKind, PathError, StopIndex};
use crate::transit::TripSchedule;

use super::display::PathStringBuilder;
use super::leg::{Leg, TransitLeg};

/// One leg of a finished path.
///
/// Two legs are equal when they carry the same leg, stops, times and cost
/// and everything after them is equal too.
#[derive(Debug)]
pub struct PathLeg<T: TripSchedule> {
    leg: Leg<T>,
    from_stop: Option<StopIndex>,
    from_time: i32,
    to_time: i32,
    generalized_cost: i32,
    next: Option<Box<PathLeg<T>>>,
}

impl<T: TripSchedule> PathLeg<T> {
    /// Create a leg owning the rest of the path.
    ///
    /// `from_stop` is `None` only for access legs.
    pub fn new(
        leg: Leg<T>,
        from_stop: Option<StopIndex>,
        from_time: i32,
        to_time: i32,
        generalized_cost: i32,
        next: Option<Box<PathLeg<T>>>,
    ) -> Self {
        Self {
            leg,
            from_stop,
            from_time,
            to_time,
            generalized_cost,
            next,
        }
    }

    pub fn leg(&self) -> &Leg<T> {
        &self.leg
    }

    pub fn kind(&self) -> LegKind {
        self.leg.kind()
    }

    pub fn is_access(&self) -> bool {
        self.leg.is_access()
    }

    pub fn is_transit(&self) -> bool {
        self.leg.is_transit()
    }

    pub fn is_transfer(&self) -> bool {
        self.leg.is_transfer()
    }

    pub fn is_egress(&self) -> bool {
        self.leg.is_egress()
    }

    /// See [`Leg::transit`].
    pub fn transit(&self) -> Result<&TransitLeg<T>, PathError> {
        self.leg.transit()
    }

    /// The stop this leg departs from.
    ///
    /// # Errors
    ///
    /// Access legs depart from the origin, not from a stop.
    pub fn from_stop(&self) -> Result<StopIndex, PathError> {
        self.from_stop
            .ok_or(PathError::UnsupportedOperation("access leg has no from-stop"))
    }

    /// The stop this leg arrives at.
    ///
    /// # Errors
    ///
    /// Egress legs arrive at the destination, not at a stop.
    pub fn to_stop(&self) -> Result<StopIndex, PathError> {
        self.leg.to_stop()
    }

    pub fn from_time(&self) -> i32 {
        self.from_time
    }

    pub fn to_time(&self) -> i32 {
        self.to_time
    }

    /// Returns the time spent on this leg, in seconds.
    pub fn duration(&self) -> i32 {
        self.to_time - self.from_time
    }

    pub fn generalized_cost(&self) -> i32 {
        self.generalized_cost
    }

    /// The following leg.
    ///
    /// # Errors
    ///
    /// The egress leg is the last leg of every path.
    fn detached(&self) -> Self {
        Self {
            leg: self.leg.clone(),
            from_stop: self.from_stop,
            from_time: self.from_time,
            to_time: self.to_time,
            generalized_cost: self.generalized_cost,
            next: None,
        }
    }

    pub fn next(&self) -> Result<&PathLeg<T>, PathError> {
        match &self.next {
            Some(next) => Ok(next),
            None if self.is_egress() => Err(PathError::UnsupportedOperation(
                "egress leg has no next leg",
            )),
            None => Err(PathError::IncompletePath("leg has no next leg")),
        }
    }
}

impl<T: TripSchedule> PartialEq for PathLeg<T> {
    fn eq(&self, other: &Self) -> bool {
        self.leg == other.leg
            && self.from_stop == other.from_stop
            && self.from_time == other.from_time
            && self.to_time == other.to_time
            && self.generalized_cost == other.generalized_cost
            && self.next == other.next
    }
}

/// A complete, time-shifted and costed path from origin to destination.
///
/// # Invariants
///
/// - Starts with an access leg and ends with an egress leg
/// - Legs are ordered as built by a path builder
#[derive(Debug)]
pub struct Path<T: TripSchedule> {
    iteration_departure_time: i32,
    start_time: i32,
    end_time: i32,
    number_of_transfers: usize,
    generalized_cost: i32,
    access: PathLeg<T>,
    egress: OnceLock<PathLeg<T>>,
}

impl<T: TripSchedule> Path<T> {
    /// Wrap a materialized leg chain and compute its totals.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the chain does not start with an access leg or
    /// does not end with an egress leg.
    pub fn new(iteration_departure_time: i32, access: PathLeg<T>) -> Result<Self, PathError> {
        if !access.is_access() {
            return Err(PathError::WrongLegKind {
                expected: LegKind::Access,
                found: access.kind(),
            });
        }

        let mut transits: usize = 0;
        let mut generalized_cost = 0;
        let mut end_time = access.to_time();
        let mut last = access.kind();
        for leg in legs_from(&access) {
            if leg.is_transit() {
                transits += 1;
            }
            generalized_cost += leg.generalized_cost();
            end_time = leg.to_time();
            last = leg.kind();
        }
        if last != LegKind::Egress {
            return Err(PathError::IncompletePath("path must end with an egress leg"));
        }

        Ok(Self {
            iteration_departure_time,
            start_time: access.from_time(),
            end_time,
            number_of_transfers: transits.saturating_sub(1),
            generalized_cost,
            access,
            egress: OnceLock::new(),
        })
    }

    /// The departure time of the search iteration that found this path.
    pub fn iteration_departure_time(&self) -> i32 {
        self.iteration_departure_time
    }

    /// Departure from the origin.
    pub fn start_time(&self) -> i32 {
        self.start_time
    }

    /// Arrival at the destination.
    pub fn end_time(&self) -> i32 {
        self.end_time
    }

    /// Total travel time, in seconds.
    pub fn duration(&self) -> i32 {
        self.end_time - self.start_time
    }

    /// Number of transit legs minus one.
    pub fn number_of_transfers(&self) -> usize {
        self.number_of_transfers
    }

    /// Sum of all leg costs.
    pub fn generalized_cost(&self) -> i32 {
        self.generalized_cost
    }

    pub fn access_leg(&self) -> &PathLeg<T> {
        &self.access
    }

    /// The last leg.
    ///
    /// Found by walking the chain on first use, then kept. The kept leg is
    /// a copy, so its [`next`](PathLeg::next) fails like any egress leg's.
    pub fn egress_leg(&self) -> &PathLeg<T> {
        self.egress.get_or_init(|| {
            self.legs()
                .fold(&self.access, |_, leg| leg)
                .detached()
        })
    }

    /// Legs from access to egress.
    pub fn legs(&self) -> impl Iterator<Item = &PathLeg<T>> + '_ {
        legs_from(&self.access)
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &PathLeg<T>> + '_ {
        self.legs().filter(|leg| leg.is_transit())
    }

    pub fn number_of_legs(&self) -> usize {
        self.legs().count()
    }

    /// Time spent on board, in seconds.
    pub fn transit_duration(&self) -> i32 {
        self.transit_legs().map(PathLeg::duration).sum()
    }

    /// Time spent neither riding nor on a street leg, slack included.
    pub fn wait_time(&self) -> i32 {
        self.duration() - self.legs().map(PathLeg::duration).sum::<i32>()
    }

    /// Stops visited, in travel order: each boarding stop, each transfer
    /// start and the stop where the egress begins.
    ///
    /// Each call walks the path again.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use raptor_path::domain::{StopIndex, StopPosition};
    /// use raptor_path::path::{ForwardPathBuilder, PathBuilder, PathContext};
    /// use raptor_path::transit::mock::{TestStreetLeg, TestTrip};
    /// use raptor_path::transit::{BoardAndAlightTime, SlackConfig};
    ///
    /// let trip = Arc::new(
    ///     TestTrip::builder("L1", &[7, 8, 9])
    ///         .times(&["10:00", "10:10", "10:20"])
    ///         .build(),
    /// );
    /// let times = BoardAndAlightTime::new(trip.as_ref(), StopPosition(0), StopPosition(2)).unwrap();
    ///
    /// let mut builder = ForwardPathBuilder::new(PathContext::new(Arc::new(SlackConfig::default())));
    /// builder.access(Arc::new(TestStreetLeg::walk_to(StopIndex(7), 120))).unwrap();
    /// builder.transit(trip, times, None).unwrap();
    /// builder.egress(Arc::new(TestStreetLeg::walk_from(StopIndex(9), 60))).unwrap();
    /// let path = builder.build(0).unwrap();
    ///
    /// let stops: Vec<_> = path.list_stops().collect();
    /// assert_eq!(stops, vec![StopIndex(7), StopIndex(9)]);
    /// ```
    pub fn list_stops(&self) -> impl Iterator<Item = StopIndex> + '_ {
        self.legs().filter_map(|leg| leg.from_stop().ok())
    }

    /// Like `Display`, with times, durations and costs per leg and the
    /// wait at each stop.
    pub fn to_detailed_string(&self) -> String {
        render(self, true)
    }
}

fn legs_from<T: TripSchedule>(access: &PathLeg<T>) -> impl Iterator<Item = &PathLeg<T>> + '_ {
    std::iter::successors(Some(access), |leg| leg.next.as_deref())
}

fn render<T: TripSchedule>(path: &Path<T>, detailed: bool) -> String {
    let mut builder = PathStringBuilder::new();
    for leg in path.legs() {
        match leg.leg() {
            Leg::Transit(transit) => {
                builder.transit(
                    transit.trip().pattern().debug_info(),
                    leg.from_time(),
                    leg.to_time(),
                );
                if detailed {
                    builder.duration(leg.duration());
                }
            }
            Leg::Access(_) | Leg::Transfer(_) | Leg::Egress(_) => {
                if let Some(street) = leg.leg().street() {
                    builder.street(street);
                }
                if detailed {
                    builder.times(leg.from_time(), leg.to_time());
                }
            }
        }
        if detailed {
            builder.cost(leg.generalized_cost());
        }
        if let (Ok(stop), Some(next)) = (leg.to_stop(), leg.next.as_deref()) {
            builder.stop(stop);
            if detailed {
                builder.duration(next.from_time() - leg.to_time());
            }
        }
    }
    builder.summary(
        path.start_time,
        path.end_time,
        path.number_of_transfers,
        path.generalized_cost,
    );
    builder.build()
}

impl<T: TripSchedule> PartialEq for Path<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iteration_departure_time == other.iteration_departure_time
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.number_of_transfers == other.number_of_transfers
            && self.generalized_cost == other.generalized_cost
            && self.access == other.access
    }
}

impl<T: TripSchedule> fmt::Display for Path<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, false))
    }
}
