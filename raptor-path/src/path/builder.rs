//! Path builders.
//!
//! A builder collects legs into a [`StagingChain`] and turns the chain
//! into a [`Path`]. [`ForwardPathBuilder`] takes legs in travel order,
//! access first. [`ReversePathBuilder`] takes them backwards, egress
//! first, for callers that trace a path from the destination.
//!
//! Both check the leg order as legs are added, so a chain that reaches
//! [`PathBuilder::build`] is always a valid access-to-egress sequence.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{LegKind, PathError, StopIndex, format_time};
use crate::transit::{
    BoardAndAlightTime, ConstrainedTransfer, ConstraintLookup, CostModel, SlackProvider,
    StreetLeg, TripSchedule, format_cost,
};

use super::output::Path;
use super::staging::{LegId, StagingChain, StagingLeg};

/// Collaborators shared by every builder of one search.
pub struct PathContext<T: TripSchedule> {
    slack: Arc<dyn SlackProvider>,
    cost: CostModel<T>,
    constraints: ConstraintLookup<T>,
}

impl<T: TripSchedule> PathContext<T> {
    /// Context with no cost calculation and no constrained transfers.
    pub fn new(slack: Arc<dyn SlackProvider>) -> Self {
        Self {
            slack,
            cost: CostModel::Zero,
            constraints: ConstraintLookup::Disabled,
        }
    }

    pub fn with_cost(mut self, cost: CostModel<T>) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintLookup<T>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn slack(&self) -> &dyn SlackProvider {
        self.slack.as_ref()
    }

    pub fn cost(&self) -> &CostModel<T> {
        &self.cost
    }

    pub fn constraints(&self) -> &ConstraintLookup<T> {
        &self.constraints
    }
}

impl<T: TripSchedule> Clone for PathContext<T> {
    fn clone(&self) -> Self {
        Self {
            slack: Arc::clone(&self.slack),
            cost: self.cost.clone(),
            constraints: self.constraints.clone(),
        }
    }
}

impl<T: TripSchedule> fmt::Debug for PathContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathContext")
            .field("slack", &self.slack)
            .field("cost", &self.cost)
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// Incremental construction of one path.
///
/// Implementors decide at which end new legs are linked and which orders
/// are legal; everything else is shared.
pub trait PathBuilder<T: TripSchedule> {
    fn context(&self) -> &PathContext<T>;

    /// The legs added so far.
    fn chain(&self) -> &StagingChain<T>;

    /// Mutable access for collaborators that adjust legs in place, such as
    /// moving a boarding with [`StagingChain::change_boarding_position`].
    fn chain_mut(&mut self) -> &mut StagingChain<T>;

    /// Link a leg at the growing end of the chain.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg can not be linked there.
    fn add(&mut self, leg: StagingLeg<T>) -> Result<LegId, PathError>;

    /// An independent builder with a deep copy of the chain.
    fn mutate(&self) -> Self
    where
        Self: Sized;

    /// Add the leg from the origin.
    fn access(&mut self, street: Arc<dyn StreetLeg>) -> Result<LegId, PathError> {
        self.add(StagingLeg::access_leg(street)?)
    }

    /// Add a ride, optionally with the constraint on the transfer after it.
    fn transit(
        &mut self,
        trip: Arc<T>,
        times: BoardAndAlightTime,
        constrained_transfer_after: Option<ConstrainedTransfer>,
    ) -> Result<LegId, PathError> {
        self.add(StagingLeg::transit_leg(
            trip,
            times,
            constrained_transfer_after,
        ))
    }

    /// Add a street leg between two stops, arriving at `to_stop`.
    fn transfer(
        &mut self,
        street: Arc<dyn StreetLeg>,
        to_stop: StopIndex,
    ) -> Result<LegId, PathError> {
        self.add(StagingLeg::transfer_leg(street, to_stop))
    }

    /// Add the leg to the destination.
    fn egress(&mut self, street: Arc<dyn StreetLeg>) -> Result<LegId, PathError> {
        self.add(StagingLeg::egress_leg(street))
    }

    fn number_of_legs(&self) -> usize {
        self.chain().len()
    }

    fn head(&self) -> Option<LegId> {
        self.chain().head()
    }

    fn tail(&self) -> Option<LegId> {
        self.chain().tail()
    }

    /// Cost of the chain as it stands, without building a path.
    ///
    /// Street legs not yet placed in time add no wait to the legs around
    /// them; after [`build`](Self::build) this equals the path's cost.
    fn generalized_cost(&self) -> i32 {
        let context = self.context();
        self.chain()
            .total_generalized_cost(context.slack(), context.cost())
    }

    /// Place street legs in time, attach constrained transfers and return
    /// the finished path.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the chain does not run from an access leg to an
    /// egress leg, or a street leg can not be placed in time.
    fn build(&mut self, iteration_departure_time: i32) -> Result<Path<T>, PathError> {
        let context = self.context().clone();
        build_path(&context, self.chain_mut(), iteration_departure_time)
    }
}

fn build_path<T: TripSchedule>(
    context: &PathContext<T>,
    chain: &mut StagingChain<T>,
    iteration_departure_time: i32,
) -> Result<Path<T>, PathError> {
    let head = chain
        .head()
        .ok_or(PathError::IncompletePath("path has no legs"))?;
    if !chain.leg(head).is_access() {
        return Err(PathError::IncompletePath("path must start with an access leg"));
    }
    if !chain.tail().is_some_and(|tail| chain.leg(tail).is_egress()) {
        return Err(PathError::IncompletePath("path must end with an egress leg"));
    }

    time_shift_all_street_legs(chain, context.slack(), iteration_departure_time)?;
    insert_constrained_transfers(chain, context.constraints())?;

    let access = chain.create_path_leg(head, context.slack(), context.cost())?;
    let path = Path::new(iteration_departure_time, access)?;
    debug!(
        legs = path.number_of_legs(),
        start = %format_time(path.start_time()),
        end = %format_time(path.end_time()),
        transfers = path.number_of_transfers(),
        cost = %format_cost(path.generalized_cost()),
        "path reconstructed"
    );
    Ok(path)
}

fn time_shift_all_street_legs<T: TripSchedule>(
    chain: &mut StagingChain<T>,
    slack: &dyn SlackProvider,
    iteration_departure_time: i32,
) -> Result<(), PathError> {
    let ids: Vec<LegId> = chain.ids().collect();
    for id in ids {
        chain.time_shift_this_and_next_leg(id, slack, iteration_departure_time)?;
    }
    Ok(())
}

fn insert_constrained_transfers<T: TripSchedule>(
    chain: &mut StagingChain<T>,
    constraints: &ConstraintLookup<T>,
) -> Result<(), PathError> {
    if !constraints.is_enabled() {
        return Ok(());
    }
    let Some(head) = chain.head() else {
        return Ok(());
    };

    let mut from = chain.next_transit_leg(head);
    while let Some(from_id) = from {
        let Some(to_id) = chain.next_transit_leg(from_id) else {
            break;
        };
        let found = {
            let from_leg = chain.leg(from_id).transit()?;
            let to_leg = chain.leg(to_id).transit()?;
            constraints.find(
                from_leg.trip().as_ref(),
                from_leg.alight_position(),
                to_leg.trip().as_ref(),
                to_leg.board_position(),
            )
        };
        if let Some(tx) = found {
            debug!(constraint = %tx, "constrained transfer attached");
            chain.set_constrained_transfer_after_leg(from_id, Some(tx))?;
        }
        from = Some(to_id);
    }
    Ok(())
}

/// Builds a path in travel order: access, rides and transfers, egress.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use raptor_path::domain::{StopIndex, StopPosition, parse_time};
/// use raptor_path::path::{ForwardPathBuilder, PathBuilder, PathContext};
/// use raptor_path::transit::mock::{TestStreetLeg, TestTrip};
/// use raptor_path::transit::{BoardAndAlightTime, SlackConfig};
///
/// let trip = Arc::new(
///     TestTrip::builder("L1", &[1, 2])
///         .times(&["10:00", "10:20"])
///         .build(),
/// );
/// let times = BoardAndAlightTime::new(trip.as_ref(), StopPosition(0), StopPosition(1)).unwrap();
///
/// let slack = SlackConfig::new(60, 30, 0);
/// let mut builder = ForwardPathBuilder::new(PathContext::new(Arc::new(slack)));
/// builder.access(Arc::new(TestStreetLeg::walk_to(StopIndex(1), 300))).unwrap();
/// builder.transit(trip, times, None).unwrap();
/// builder.egress(Arc::new(TestStreetLeg::walk_from(StopIndex(2), 120))).unwrap();
///
/// let path = builder.build(0).unwrap();
/// assert_eq!(path.start_time(), parse_time("09:54:30").unwrap());
/// assert_eq!(path.end_time(), parse_time("10:22").unwrap());
/// assert_eq!(path.to_string(), "Walk 5m ~ 1 ~ BUS L1 10:00 10:20 ~ 2 ~ Walk 2m [09:54:30 10:22 27m30s Tx0 $0]");
/// ```
#[derive(Debug)]
pub struct ForwardPathBuilder<T: TripSchedule> {
    context: PathContext<T>,
    chain: StagingChain<T>,
}

impl<T: TripSchedule> ForwardPathBuilder<T> {
    pub fn new(context: PathContext<T>) -> Self {
        Self {
            context,
            chain: StagingChain::new(),
        }
    }
}

impl<T: TripSchedule> PathBuilder<T> for ForwardPathBuilder<T> {
    fn context(&self) -> &PathContext<T> {
        &self.context
    }

    fn chain(&self) -> &StagingChain<T> {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut StagingChain<T> {
        &mut self.chain
    }

    fn add(&mut self, leg: StagingLeg<T>) -> Result<LegId, PathError> {
        let kind = leg.kind();
        match self.chain.tail() {
            None if kind != LegKind::Access => {
                return Err(PathError::WrongLegKind {
                    expected: LegKind::Access,
                    found: kind,
                });
            }
            Some(tail) => {
                let prev = self.chain.get(tail).kind();
                let access_has_rides = self
                    .chain
                    .head()
                    .is_some_and(|head| self.chain.get(head).has_rides());
                let allowed = if access_has_rides {
                    prev.may_precede_with_rides(kind)
                } else {
                    prev.may_precede(kind)
                };
                if !allowed {
                    return Err(PathError::IllegalLegOrder { prev, next: kind });
                }
            }
            None => {}
        }
        trace!(leg = %kind, "append");
        Ok(self.chain.push_back(leg))
    }

    fn mutate(&self) -> Self {
        Self {
            context: self.context.clone(),
            chain: self.chain.mutate(),
        }
    }
}

impl<T: TripSchedule> fmt::Display for ForwardPathBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.chain, f)
    }
}

/// Builds a path backwards: egress first, access last.
#[derive(Debug)]
pub struct ReversePathBuilder<T: TripSchedule> {
    context: PathContext<T>,
    chain: StagingChain<T>,
}

impl<T: TripSchedule> ReversePathBuilder<T> {
    pub fn new(context: PathContext<T>) -> Self {
        Self {
            context,
            chain: StagingChain::new(),
        }
    }
}

impl<T: TripSchedule> PathBuilder<T> for ReversePathBuilder<T> {
    fn context(&self) -> &PathContext<T> {
        &self.context
    }

    fn chain(&self) -> &StagingChain<T> {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut StagingChain<T> {
        &mut self.chain
    }

    fn add(&mut self, leg: StagingLeg<T>) -> Result<LegId, PathError> {
        let kind = leg.kind();
        match self.chain.head() {
            None if kind != LegKind::Egress => {
                return Err(PathError::WrongLegKind {
                    expected: LegKind::Egress,
                    found: kind,
                });
            }
            Some(head) => {
                let next = self.chain.get(head).kind();
                if !kind.may_precede_with_rides(next) {
                    return Err(PathError::IllegalLegOrder { prev: kind, next });
                }
                // Street legs straight into the egress need an access with rides
                if kind == LegKind::Access && !leg.has_rides() {
                    let mut prev = kind;
                    for id in self.chain.ids() {
                        let next = self.chain.get(id).kind();
                        if !prev.may_precede(next) {
                            return Err(PathError::IllegalLegOrder { prev, next });
                        }
                        prev = next;
                    }
                }
            }
            None => {}
        }
        trace!(leg = %kind, "prepend");
        Ok(self.chain.push_front(leg))
    }

    fn mutate(&self) -> Self {
        Self {
            context: self.context.clone(),
            chain: self.chain.mutate(),
        }
    }
}

impl<T: TripSchedule> fmt::Display for ReversePathBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.chain, f)
    }
}
