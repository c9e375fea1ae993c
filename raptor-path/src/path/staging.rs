//! The staging chain: mutable legs linked while a path is assembled.
//!
//! Legs live in an arena owned by one builder and refer to each other by
//! [`LegId`]. Each node caches its resolved `(from_time, to_time)`. Transit
//! nodes take their times from the timetable and are never shifted.
//! Street nodes start unset and are placed by
//! [`StagingChain::time_shift_this_and_next_leg`].

use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::domain::{LegKind, PathError, StopIndex, StopPosition, TIME_NOT_SET, format_time};
use crate::transit::{
    BoardAndAlightTime, ConstrainedTransfer, CostModel, SlackProvider, StreetLeg,
    TransferConstraint, TripSchedule, ZERO_COST,
};

use super::display::PathStringBuilder;
use super::leg::{AccessLeg, EgressLeg, Leg, TransferLeg, TransitLeg};
use super::output::PathLeg;

/// Handle to a leg in a [`StagingChain`].
///
/// Only meaningful for the chain that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegId(usize);

/// One leg under construction.
#[derive(Debug)]
pub struct StagingLeg<T: TripSchedule> {
    leg: Leg<T>,
    from_time: i32,
    to_time: i32,
    prev: Option<LegId>,
    next: Option<LegId>,
}

impl<T: TripSchedule> StagingLeg<T> {
    fn new(leg: Leg<T>) -> Self {
        let (from_time, to_time) = match &leg {
            Leg::Transit(transit) => (transit.board_time(), transit.alight_time()),
            _ => (TIME_NOT_SET, TIME_NOT_SET),
        };
        Self {
            leg,
            from_time,
            to_time,
            prev: None,
            next: None,
        }
    }

    /// Access leg ending at the street leg's destination stop.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the street leg does not end at a stop.
    pub fn access_leg(street: Arc<dyn StreetLeg>) -> Result<Self, PathError> {
        Ok(Self::new(Leg::Access(AccessLeg::new(street)?)))
    }

    /// Transit leg with the timetable's board and alight times.
    pub fn transit_leg(
        trip: Arc<T>,
        times: BoardAndAlightTime,
        constrained_transfer_after: Option<ConstrainedTransfer>,
    ) -> Self {
        Self::new(Leg::Transit(TransitLeg::new(
            trip,
            times,
            constrained_transfer_after,
        )))
    }

    /// Transfer leg arriving at `to_stop`.
    pub fn transfer_leg(street: Arc<dyn StreetLeg>, to_stop: StopIndex) -> Self {
        Self::new(Leg::Transfer(TransferLeg::new(street, to_stop)))
    }

    pub fn egress_leg(street: Arc<dyn StreetLeg>) -> Self {
        Self::new(Leg::Egress(EgressLeg::new(street)))
    }

    pub fn leg(&self) -> &Leg<T> {
        &self.leg
    }

    pub fn kind(&self) -> LegKind {
        self.leg.kind()
    }

    /// Departure time, or [`TIME_NOT_SET`] for a street leg not yet shifted.
    pub fn from_time(&self) -> i32 {
        self.from_time
    }

    /// Arrival time, or [`TIME_NOT_SET`] for a street leg not yet shifted.
    pub fn to_time(&self) -> i32 {
        self.to_time
    }

    pub fn duration(&self) -> i32 {
        self.to_time - self.from_time
    }

    pub fn prev(&self) -> Option<LegId> {
        self.prev
    }

    pub fn next(&self) -> Option<LegId> {
        self.next
    }

    /// See [`Leg::has_rides`].
    pub fn has_rides(&self) -> bool {
        self.leg.has_rides()
    }

    /// The constraint on the transfer after this leg; `None` unless this
    /// is a transit leg carrying one.
    pub fn constrained_transfer_after(&self) -> Option<&ConstrainedTransfer> {
        self.leg
            .as_transit()
            .and_then(|transit| transit.constrained_transfer_after())
    }

    fn set_time(&mut self, from_time: i32, to_time: i32) {
        self.from_time = from_time;
        self.to_time = to_time;
    }
}

impl<T: TripSchedule> Clone for StagingLeg<T> {
    fn clone(&self) -> Self {
        Self {
            leg: self.leg.clone(),
            from_time: self.from_time,
            to_time: self.to_time,
            prev: self.prev,
            next: self.next,
        }
    }
}

/// Arena of staging legs forming one doubly linked chain.
#[derive(Debug)]
pub struct StagingChain<T: TripSchedule> {
    legs: Vec<StagingLeg<T>>,
    head: Option<LegId>,
    tail: Option<LegId>,
}

impl<T: TripSchedule> Default for StagingChain<T> {
    fn default() -> Self {
        Self {
            legs: Vec::new(),
            head: None,
            tail: None,
        }
    }
}

impl<T: TripSchedule> StagingChain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of legs in the chain.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn head(&self) -> Option<LegId> {
        self.head
    }

    pub fn tail(&self) -> Option<LegId> {
        self.tail
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another chain with more legs.
    pub fn get(&self, id: LegId) -> &StagingLeg<T> {
        &self.legs[id.0]
    }

    fn get_mut(&mut self, id: LegId) -> &mut StagingLeg<T> {
        &mut self.legs[id.0]
    }

    pub fn leg(&self, id: LegId) -> &Leg<T> {
        &self.get(id).leg
    }

    pub fn prev(&self, id: LegId) -> Option<LegId> {
        self.get(id).prev
    }

    pub fn next(&self, id: LegId) -> Option<LegId> {
        self.get(id).next
    }

    /// Leg ids from head to tail.
    pub fn ids(&self) -> impl Iterator<Item = LegId> + '_ {
        std::iter::successors(self.head, move |id| self.get(*id).next)
    }

    /// Add a leg after the tail.
    ///
    /// No ordering rules are checked; that is the builder's job.
    pub fn push_back(&mut self, leg: StagingLeg<T>) -> LegId {
        let id = self.insert(leg);
        match self.tail {
            Some(tail) => self.link(tail, id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Add a leg before the head.
    pub fn push_front(&mut self, leg: StagingLeg<T>) -> LegId {
        let id = self.insert(leg);
        match self.head {
            Some(head) => self.link(id, head),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        id
    }

    fn insert(&mut self, mut leg: StagingLeg<T>) -> LegId {
        leg.prev = None;
        leg.next = None;
        self.legs.push(leg);
        LegId(self.legs.len() - 1)
    }

    fn link(&mut self, prev: LegId, next: LegId) {
        self.get_mut(prev).next = Some(next);
        self.get_mut(next).prev = Some(prev);
    }

    /// Deep copy of every leg reachable from the head.
    ///
    /// The copy shares the immutable trip and street data but no links,
    /// so either chain can be extended or shifted without affecting the
    /// other.
    pub fn mutate(&self) -> Self {
        let mut copy = Self::new();
        for id in self.ids() {
            copy.push_back(self.get(id).clone());
        }
        copy
    }

    /// The nearest transit leg before `id`, looking past at most one
    /// transfer. A flex access is not a transit leg.
    pub fn prev_transit_leg(&self, id: LegId) -> Option<LegId> {
        let mut it = self.prev(id)?;
        if self.leg(it).is_transfer() {
            it = self.prev(it)?;
        }
        self.leg(it).is_transit().then_some(it)
    }

    /// The first transit leg after `id`.
    pub fn next_transit_leg(&self, id: LegId) -> Option<LegId> {
        std::iter::successors(self.next(id), |it| self.next(*it))
            .find(|it| self.leg(*it).is_transit())
    }

    /// The stop this leg departs from.
    ///
    /// Transit legs board at their own stop. Transfer and egress legs
    /// start where the previous leg ended.
    ///
    /// # Errors
    ///
    /// Access legs start at the origin. Transfer and egress legs need a
    /// previous leg.
    pub fn from_stop(&self, id: LegId) -> Result<StopIndex, PathError> {
        match self.leg(id) {
            Leg::Access(_) => Err(PathError::UnsupportedOperation("access leg has no from-stop")),
            Leg::Transit(transit) => Ok(transit.board_stop()),
            Leg::Transfer(_) | Leg::Egress(_) => {
                let prev = self
                    .prev(id)
                    .ok_or(PathError::IncompletePath("leg has no previous leg"))?;
                self.to_stop(prev)
            }
        }
    }

    /// See [`Leg::to_stop`].
    pub fn to_stop(&self, id: LegId) -> Result<StopIndex, PathError> {
        self.leg(id).to_stop()
    }

    /// When the traveller is ready to leave the stop this leg arrives at:
    /// the arrival plus alight slack after a ride.
    pub fn stop_arrival_time(&self, id: LegId, slack: &dyn SlackProvider) -> i32 {
        let node = self.get(id);
        match &node.leg {
            Leg::Transit(transit) => node.to_time + slack.alight_slack(transit.trip().pattern()),
            _ => node.to_time,
        }
    }

    /// Place street legs in time around the fixed transit legs.
    ///
    /// Shifts this leg if it is an access leg, and the next leg if that is
    /// a transfer or egress leg. Access legs arrive just in time to board
    /// the next ride. Transfers and egress leave as soon as the previous
    /// leg arrives. Calling this on every leg from head to tail places the
    /// whole chain.
    ///
    /// `iteration_departure_time` anchors an access leg with no ride after
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a street leg reports no feasible time, or a
    /// transfer follows anything but an access or transit leg.
    pub fn time_shift_this_and_next_leg(
        &mut self,
        id: LegId,
        slack: &dyn SlackProvider,
        iteration_departure_time: i32,
    ) -> Result<(), PathError> {
        if self.leg(id).is_access() {
            self.time_shift_access(id, slack, iteration_departure_time)?;
        }
        if let Some(next) = self.next(id) {
            match self.leg(next).kind() {
                LegKind::Transfer => self.set_transfer_time_based_on_previous_leg(next, slack)?,
                LegKind::Egress => self.time_shift_egress(next, slack)?,
                LegKind::Access | LegKind::Transit => {}
            }
        }
        Ok(())
    }

    fn time_shift_access(
        &mut self,
        id: LegId,
        slack: &dyn SlackProvider,
        iteration_departure_time: i32,
    ) -> Result<(), PathError> {
        let node = self.get(id);
        let Leg::Access(access) = &node.leg else {
            return Err(PathError::WrongLegKind {
                expected: LegKind::Access,
                found: node.kind(),
            });
        };
        let street = access.street();
        let duration = street.fixed_duration_seconds();

        let to_time = match self.next_transit_leg(id) {
            // Nothing to board: leave as early as the iteration allows
            None => {
                let from_time = street.earliest_departure_no_earlier_than(iteration_departure_time);
                if from_time == TIME_NOT_SET {
                    return Err(PathError::TimeShiftNotPossible {
                        leg: LegKind::Access,
                        time: format_time(iteration_departure_time),
                    });
                }
                from_time + duration
            }
            Some(transit_id) => {
                let transit = self.get(transit_id);
                let pattern = transit.leg.transit()?.trip().pattern();
                let mut deadline = transit.from_time - slack.board_slack(pattern);
                if node.has_rides() {
                    deadline -= slack.transfer_slack();
                }
                if let Some(Leg::Transfer(transfer)) = node.next.map(|next| self.leg(next)) {
                    deadline -= transfer.street().fixed_duration_seconds();
                }

                let to_time = street.latest_arrival_no_later_than(deadline);
                if to_time == TIME_NOT_SET {
                    return Err(PathError::TimeShiftNotPossible {
                        leg: LegKind::Access,
                        time: format_time(deadline),
                    });
                }
                if to_time > deadline {
                    warn!(
                        arrival = %format_time(to_time),
                        deadline = %format_time(deadline),
                        "access arrives too late for the first ride"
                    );
                }
                to_time
            }
        };

        let from_time = to_time - duration;
        trace!(
            leg = %LegKind::Access,
            from = %format_time(from_time),
            to = %format_time(to_time),
            "time-shifted"
        );
        self.get_mut(id).set_time(from_time, to_time);
        Ok(())
    }

    fn set_transfer_time_based_on_previous_leg(
        &mut self,
        id: LegId,
        slack: &dyn SlackProvider,
    ) -> Result<(), PathError> {
        let node = self.get(id);
        let Leg::Transfer(transfer) = &node.leg else {
            return Err(PathError::WrongLegKind {
                expected: LegKind::Transfer,
                found: node.kind(),
            });
        };
        let prev_id = node
            .prev
            .ok_or(PathError::IncompletePath("transfer leg has no previous leg"))?;
        let prev = self.get(prev_id);

        let from_time = match &prev.leg {
            Leg::Transit(transit) => prev.to_time + slack.alight_slack(transit.trip().pattern()),
            Leg::Access(_) => prev.to_time,
            other => {
                return Err(PathError::IllegalLegOrder {
                    prev: other.kind(),
                    next: LegKind::Transfer,
                });
            }
        };
        let to_time = from_time + transfer.street().fixed_duration_seconds();

        if let Some(next) = node.next.map(|next| self.get(next)) {
            if let Leg::Transit(transit) = &next.leg {
                let latest = next.from_time - slack.board_slack(transit.trip().pattern());
                if to_time > latest {
                    warn!(
                        arrival = %format_time(to_time),
                        latest = %format_time(latest),
                        "transfer misses the next ride"
                    );
                }
            }
        }

        trace!(
            leg = %LegKind::Transfer,
            from = %format_time(from_time),
            to = %format_time(to_time),
            "time-shifted"
        );
        self.get_mut(id).set_time(from_time, to_time);
        Ok(())
    }

    fn time_shift_egress(&mut self, id: LegId, slack: &dyn SlackProvider) -> Result<(), PathError> {
        let node = self.get(id);
        let Leg::Egress(egress) = &node.leg else {
            return Err(PathError::WrongLegKind {
                expected: LegKind::Egress,
                found: node.kind(),
            });
        };
        let prev = node
            .prev
            .ok_or(PathError::IncompletePath("egress leg has no previous leg"))?;
        let street = egress.street();

        let mut ready_time = self.stop_arrival_time(prev, slack);
        if street.has_embedded_rides() {
            ready_time += slack.transfer_slack();
        }
        let from_time = street.earliest_departure_no_earlier_than(ready_time);
        if from_time == TIME_NOT_SET {
            return Err(PathError::TimeShiftNotPossible {
                leg: LegKind::Egress,
                time: format_time(ready_time),
            });
        }
        let to_time = from_time + street.fixed_duration_seconds();

        trace!(
            leg = %LegKind::Egress,
            from = %format_time(from_time),
            to = %format_time(to_time),
            "time-shifted"
        );
        self.get_mut(id).set_time(from_time, to_time);
        Ok(())
    }

    /// Board the transit leg at another position of the same trip.
    ///
    /// Only this leg changes; neighbouring street legs keep their times
    /// until the chain is shifted again.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg is not a transit leg or the trip can not be
    /// boarded at `position`.
    pub fn change_boarding_position(
        &mut self,
        id: LegId,
        position: StopPosition,
    ) -> Result<(), PathError> {
        let node = self.get_mut(id);
        let transit = node.leg.transit()?;
        if transit.board_position() == position {
            return Ok(());
        }
        let moved = transit.with_board_position(position)?;
        node.from_time = moved.board_time();
        node.leg = Leg::Transit(moved);
        Ok(())
    }

    /// Record the constraint on the transfer after this transit leg.
    ///
    /// The constraint lives on the leg before the transfer so that an
    /// in-seat transfer, with no transfer leg, can carry one too.
    pub fn set_constrained_transfer_after_leg(
        &mut self,
        id: LegId,
        tx: Option<ConstrainedTransfer>,
    ) -> Result<(), PathError> {
        let node = self.get_mut(id);
        let updated = node.leg.transit()?.with_constrained_transfer_after(tx);
        node.leg = Leg::Transit(updated);
        Ok(())
    }

    /// Idle time, slack included, between alighting this transit leg and
    /// boarding the next ride. A flex egress counts as a ride. Time spent
    /// walking a transfer in between is travel, not waiting, and is left
    /// out.
    ///
    /// `None` if this is not a transit leg or no ride follows.
    pub fn wait_time_before_next_transit_including_slack(&self, id: LegId) -> Option<i32> {
        let node = self.get(id);
        if !node.leg.is_transit() {
            return None;
        }
        let next = self.get(node.next?);
        if next.has_rides() {
            return Some(next.from_time - node.to_time);
        }
        match &next.leg {
            Leg::Transfer(_) => {
                let after = self.get(next.next?);
                after
                    .has_rides()
                    .then(|| (next.from_time - node.to_time) + (after.from_time - next.to_time))
            }
            Leg::Access(_) | Leg::Transit(_) | Leg::Egress(_) => None,
        }
    }

    /// Generalized cost of one leg given its current neighbours.
    ///
    /// Works on partial and unshifted chains: a transit leg with no
    /// previous leg, or one whose previous street leg is not yet placed in
    /// time, is costed as if boarded without waiting. An egress leg not yet
    /// placed in time carries no wait cost.
    pub fn generalized_cost(&self, id: LegId, slack: &dyn SlackProvider, cost: &CostModel<T>) -> i32 {
        if !cost.is_enabled() {
            return ZERO_COST;
        }
        let node = self.get(id);
        match &node.leg {
            Leg::Access(access) => cost.street_leg_cost(access.street()),
            Leg::Transfer(transfer) => cost.street_leg_cost(transfer.street()),
            Leg::Transit(transit) => self.transit_cost(id, transit, slack, cost),
            Leg::Egress(egress) => {
                let egress_cost = cost.egress_cost(egress.street());
                let ready_time = node
                    .prev
                    .map(|prev| self.stop_arrival_time(prev, slack))
                    .filter(|time| *time != TIME_NOT_SET);
                match ready_time {
                    Some(ready_time) if node.from_time != TIME_NOT_SET => {
                        egress_cost + cost.wait_cost(node.from_time - ready_time)
                    }
                    _ => egress_cost,
                }
            }
        }
    }

    fn transit_cost(
        &self,
        id: LegId,
        transit: &TransitLeg<T>,
        slack: &dyn SlackProvider,
        cost: &CostModel<T>,
    ) -> i32 {
        let node = self.get(id);
        let prev_arrival_time = node
            .prev
            .map(|prev| self.stop_arrival_time(prev, slack))
            .filter(|time| *time != TIME_NOT_SET)
            .unwrap_or(node.from_time);
        let constraint = self
            .prev_transit_leg(id)
            .and_then(|prev| self.get(prev).constrained_transfer_after())
            .map_or(TransferConstraint::Regular, |tx| tx.constraint());
        let first_boarding = node.prev.is_some_and(|prev| {
            let prev = self.leg(prev);
            prev.is_access() && !prev.has_rides()
        });

        let trip = transit.trip();
        let boarding_cost = cost.boarding_cost(
            first_boarding,
            prev_arrival_time,
            transit.board_stop(),
            node.from_time,
            trip.as_ref(),
            constraint,
        );
        cost.transit_arrival_cost(
            boarding_cost,
            slack.alight_slack(trip.pattern()),
            node.duration(),
            trip.transit_reluctance_index(),
            transit.alight_stop(),
        )
    }

    /// Sum of [`generalized_cost`](Self::generalized_cost) over the chain.
    pub fn total_generalized_cost(&self, slack: &dyn SlackProvider, cost: &CostModel<T>) -> i32 {
        self.ids()
            .map(|id| self.generalized_cost(id, slack, cost))
            .sum()
    }

    /// Materialize this leg and every leg after it.
    ///
    /// The tail is built first and each leg takes ownership of its
    /// successor.
    pub fn create_path_leg(
        &self,
        id: LegId,
        slack: &dyn SlackProvider,
        cost: &CostModel<T>,
    ) -> Result<PathLeg<T>, PathError> {
        let node = self.get(id);
        let next = match node.next {
            Some(next) => Some(Box::new(self.create_path_leg(next, slack, cost)?)),
            None => None,
        };
        let from_stop = match node.leg {
            Leg::Access(_) => None,
            _ => Some(self.from_stop(id)?),
        };
        Ok(PathLeg::new(
            node.leg.clone(),
            from_stop,
            node.from_time,
            node.to_time,
            self.generalized_cost(id, slack, cost),
            next,
        ))
    }
}

impl<T: TripSchedule> fmt::Display for StagingChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = PathStringBuilder::new();
        for id in self.ids() {
            match self.leg(id) {
                Leg::Access(access) => builder.street(access.street()).stop(access.to_stop()),
                Leg::Transit(transit) => builder
                    .transit(
                        transit.trip().pattern().debug_info(),
                        transit.board_time(),
                        transit.alight_time(),
                    )
                    .stop(transit.alight_stop()),
                Leg::Transfer(transfer) => builder.street(transfer.street()).stop(transfer.to_stop()),
                Leg::Egress(egress) => builder.street(egress.street()),
            };
        }
        f.write_str(&builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_time;
    use crate::transit::mock::{RecordingCostCalculator, TestStreetLeg, TestTrip};
    use crate::transit::{SlackConfig, TransferConstraint};

    fn t(s: &str) -> i32 {
        parse_time(s).unwrap()
    }

    fn slack() -> SlackConfig {
        SlackConfig::new(60, 45, 15)
    }

    fn ride(trip: &Arc<TestTrip>, board: usize, alight: usize) -> StagingLeg<TestTrip> {
        let times =
            BoardAndAlightTime::new(trip.as_ref(), StopPosition(board), StopPosition(alight)).unwrap();
        StagingLeg::transit_leg(Arc::clone(trip), times, None)
    }

    fn trip(route: &str, stops: &[usize], times: &[&str]) -> Arc<TestTrip> {
        Arc::new(TestTrip::builder(route, stops).times(times).build())
    }

    /// Walk 2m to stop 1, ride 1 -> 2, walk 3m to stop 3, ride 3 -> 4, walk 5m.
    fn chain() -> (StagingChain<TestTrip>, Vec<LegId>) {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        let l2 = trip("L2", &[3, 4], &["10:40", "11:00"]);
        let ids = vec![
            chain.push_back(
                StagingLeg::access_leg(Arc::new(TestStreetLeg::walk_to(StopIndex(1), 120))).unwrap(),
            ),
            chain.push_back(ride(&l1, 0, 1)),
            chain.push_back(StagingLeg::transfer_leg(
                Arc::new(TestStreetLeg::walk_between(StopIndex(2), StopIndex(3), 180)),
                StopIndex(3),
            )),
            chain.push_back(ride(&l2, 0, 1)),
            chain.push_back(StagingLeg::egress_leg(Arc::new(TestStreetLeg::walk_from(
                StopIndex(4),
                300,
            )))),
        ];
        (chain, ids)
    }

    fn shift_all(chain: &mut StagingChain<TestTrip>, slack: &SlackConfig) {
        let ids: Vec<_> = chain.ids().collect();
        for id in ids {
            chain.time_shift_this_and_next_leg(id, slack, 0).unwrap();
        }
    }

    #[test]
    fn links_in_both_directions() {
        let (chain, ids) = chain();

        assert_eq!(chain.len(), 5);
        assert_eq!(chain.head(), Some(ids[0]));
        assert_eq!(chain.tail(), Some(ids[4]));
        assert_eq!(chain.ids().collect::<Vec<_>>(), ids);
        assert_eq!(chain.prev(ids[2]), Some(ids[1]));
        assert_eq!(chain.next(ids[2]), Some(ids[3]));
        assert_eq!(chain.prev(ids[0]), None);
        assert_eq!(chain.next(ids[4]), None);
    }

    #[test]
    fn push_front_builds_the_same_order() {
        let (forward, _) = chain();
        let mut reverse = StagingChain::new();
        let legs: Vec<_> = forward.ids().map(|id| forward.get(id).clone()).collect();
        for leg in legs.into_iter().rev() {
            reverse.push_front(leg);
        }

        let kinds = |c: &StagingChain<TestTrip>| c.ids().map(|id| c.get(id).kind()).collect::<Vec<_>>();
        assert_eq!(kinds(&forward), kinds(&reverse));
        assert_eq!(forward.to_string(), reverse.to_string());
    }

    #[test]
    fn street_legs_start_unset_and_transit_uses_timetable() {
        let (chain, ids) = chain();

        assert_eq!(chain.get(ids[0]).from_time(), TIME_NOT_SET);
        assert_eq!(chain.get(ids[1]).from_time(), t("10:00"));
        assert_eq!(chain.get(ids[1]).to_time(), t("10:20"));
        assert_eq!(chain.get(ids[1]).duration(), 20 * 60);
    }

    #[test]
    fn access_arrives_just_in_time_for_boarding() {
        let (mut chain, ids) = chain();
        chain.time_shift_this_and_next_leg(ids[0], &slack(), 0).unwrap();

        assert_eq!(chain.get(ids[0]).to_time(), t("10:00") - 45);
        assert_eq!(chain.get(ids[0]).from_time(), t("10:00") - 45 - 120);
    }

    #[test]
    fn flex_access_adds_transfer_slack() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        let access = chain.push_back(
            StagingLeg::access_leg(Arc::new(TestStreetLeg::flex_to(StopIndex(1), 600, 1))).unwrap(),
        );
        chain.push_back(ride(&l1, 0, 1));

        chain.time_shift_this_and_next_leg(access, &slack(), 0).unwrap();

        assert_eq!(chain.get(access).to_time(), t("10:00") - 45 - 60);
    }

    #[test]
    fn access_then_transfer_subtracts_transfer_duration() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[2, 3], &["10:00", "10:20"]);
        let access = chain.push_back(
            StagingLeg::access_leg(Arc::new(TestStreetLeg::flex_to(StopIndex(1), 600, 1))).unwrap(),
        );
        let transfer = chain.push_back(StagingLeg::transfer_leg(
            Arc::new(TestStreetLeg::walk_between(StopIndex(1), StopIndex(2), 120)),
            StopIndex(2),
        ));
        chain.push_back(ride(&l1, 0, 1));

        chain.time_shift_this_and_next_leg(access, &slack(), 0).unwrap();

        // Flex ~ walk ~ (transfer slack + board slack) ~ ride
        let access_arrival = t("10:00") - 45 - 60 - 120;
        assert_eq!(chain.get(access).to_time(), access_arrival);
        // The transfer leaves straight after the access, no slack
        assert_eq!(chain.get(transfer).from_time(), access_arrival);
        assert_eq!(chain.get(transfer).to_time(), access_arrival + 120);
    }

    #[test]
    fn transfer_and_egress_follow_previous_arrival() {
        let (mut chain, ids) = chain();
        shift_all(&mut chain, &slack());

        assert_eq!(chain.get(ids[2]).from_time(), t("10:20") + 15);
        assert_eq!(chain.get(ids[2]).to_time(), t("10:20") + 15 + 180);
        assert_eq!(chain.get(ids[4]).from_time(), t("11:00") + 15);
        assert_eq!(chain.get(ids[4]).to_time(), t("11:00") + 15 + 300);
    }

    #[test]
    fn flex_egress_adds_transfer_slack() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        let ride_id = chain.push_back(ride(&l1, 0, 1));
        let egress = chain.push_back(StagingLeg::egress_leg(Arc::new(TestStreetLeg::flex_from(
            StopIndex(2),
            600,
            1,
        ))));

        chain.time_shift_this_and_next_leg(ride_id, &slack(), 0).unwrap();

        assert_eq!(chain.get(egress).from_time(), t("10:20") + 15 + 60);
    }

    #[test]
    fn bounded_access_reports_its_own_latest_arrival() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        // Departures only until 09:30, so the access arrives early
        let flex = TestStreetLeg::flex_to(StopIndex(1), 600, 1)
            .with_opening_hours(t("09:00"), t("09:30"));
        let access = chain.push_back(StagingLeg::access_leg(Arc::new(flex)).unwrap());
        chain.push_back(ride(&l1, 0, 1));

        chain.time_shift_this_and_next_leg(access, &slack(), 0).unwrap();

        assert_eq!(chain.get(access).from_time(), t("09:30"));
        assert_eq!(chain.get(access).to_time(), t("09:40"));
    }

    #[test]
    fn unavailable_street_leg_can_not_be_shifted() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        let flex = TestStreetLeg::flex_to(StopIndex(1), 600, 1)
            .with_opening_hours(t("11:00"), t("12:00"));
        let access = chain.push_back(StagingLeg::access_leg(Arc::new(flex)).unwrap());
        chain.push_back(ride(&l1, 0, 1));

        let err = chain
            .time_shift_this_and_next_leg(access, &slack(), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            PathError::TimeShiftNotPossible {
                leg: LegKind::Access,
                ..
            }
        ));
    }

    #[test]
    fn access_without_ride_leaves_at_iteration_departure() {
        let mut chain: StagingChain<TestTrip> = StagingChain::new();
        let access = chain.push_back(
            StagingLeg::access_leg(Arc::new(TestStreetLeg::walk_to(StopIndex(1), 300))).unwrap(),
        );

        chain
            .time_shift_this_and_next_leg(access, &slack(), t("08:00"))
            .unwrap();

        assert_eq!(chain.get(access).from_time(), t("08:00"));
        assert_eq!(chain.get(access).to_time(), t("08:05"));
    }

    #[test]
    fn stops_derive_from_previous_leg() {
        let (chain, ids) = chain();

        assert!(chain.from_stop(ids[0]).is_err());
        assert_eq!(chain.from_stop(ids[1]), Ok(StopIndex(1)));
        assert_eq!(chain.from_stop(ids[2]), Ok(StopIndex(2)));
        assert_eq!(chain.from_stop(ids[4]), Ok(StopIndex(4)));
        assert_eq!(chain.to_stop(ids[2]), Ok(StopIndex(3)));
        assert!(chain.to_stop(ids[4]).is_err());
    }

    #[test]
    fn transit_neighbours() {
        let (chain, ids) = chain();

        assert_eq!(chain.next_transit_leg(ids[0]), Some(ids[1]));
        assert_eq!(chain.next_transit_leg(ids[1]), Some(ids[3]));
        assert_eq!(chain.next_transit_leg(ids[3]), None);
        assert_eq!(chain.prev_transit_leg(ids[3]), Some(ids[1]));
        assert_eq!(chain.prev_transit_leg(ids[1]), None);
    }

    #[test]
    fn wait_time_excludes_transfer_walk() {
        let (mut chain, ids) = chain();
        shift_all(&mut chain, &slack());

        // 20 minutes between rides, 3 of them walking
        assert_eq!(
            chain.wait_time_before_next_transit_including_slack(ids[1]),
            Some(17 * 60)
        );
        assert_eq!(chain.wait_time_before_next_transit_including_slack(ids[3]), None);
        assert_eq!(chain.wait_time_before_next_transit_including_slack(ids[0]), None);
    }

    #[test]
    fn stop_arrival_includes_alight_slack_after_ride() {
        let (mut chain, ids) = chain();
        shift_all(&mut chain, &slack());

        assert_eq!(chain.stop_arrival_time(ids[1], &slack()), t("10:20") + 15);
        assert_eq!(chain.stop_arrival_time(ids[2], &slack()), t("10:20") + 15 + 180);
    }

    #[test]
    fn change_boarding_position() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2, 3], &["10:00", "10:05", "10:20"]);
        let id = chain.push_back(ride(&l1, 0, 2));

        chain.change_boarding_position(id, StopPosition(1)).unwrap();
        assert_eq!(chain.get(id).from_time(), t("10:05"));
        assert_eq!(chain.from_stop(id), Ok(StopIndex(2)));
        assert_eq!(chain.get(id).to_time(), t("10:20"));

        // Same position is a no-op
        chain.change_boarding_position(id, StopPosition(1)).unwrap();
        assert_eq!(chain.get(id).from_time(), t("10:05"));
    }

    #[test]
    fn change_boarding_position_only_on_transit() {
        let (mut chain, ids) = chain();

        assert_eq!(
            chain.change_boarding_position(ids[0], StopPosition(0)),
            Err(PathError::WrongLegKind {
                expected: LegKind::Transit,
                found: LegKind::Access
            })
        );
    }

    #[test]
    fn constraint_only_on_transit() {
        let (mut chain, ids) = chain();
        let tx = ConstrainedTransfer::new(
            TransferConstraint::Guaranteed,
            StopPosition(1),
            StopPosition(0),
        );

        chain.set_constrained_transfer_after_leg(ids[1], Some(tx)).unwrap();
        assert_eq!(chain.get(ids[1]).constrained_transfer_after(), Some(&tx));
        assert!(chain.set_constrained_transfer_after_leg(ids[2], Some(tx)).is_err());
    }

    #[test]
    fn zero_cost_model() {
        let (mut chain, ids) = chain();
        shift_all(&mut chain, &slack());

        let cost = CostModel::Zero;
        for id in ids {
            assert_eq!(chain.generalized_cost(id, &slack(), &cost), 0);
        }
    }

    #[test]
    fn costs_with_transparent_calculator() {
        let (mut chain, ids) = chain();
        shift_all(&mut chain, &slack());
        let recorder = Arc::new(RecordingCostCalculator::new());
        let cost: CostModel<TestTrip> = CostModel::Calculator(recorder.clone());
        let slack = slack();

        // Street legs use the router's cost verbatim
        assert_eq!(chain.generalized_cost(ids[0], &slack, &cost), 120 * 200);
        // Wait 45s board slack, ride 20m, 15s alight slack
        assert_eq!(chain.generalized_cost(ids[1], &slack, &cost), 45 + 1200 + 15);
        // Egress leaves as soon as the ride's alight slack is over
        assert_eq!(chain.generalized_cost(ids[4], &slack, &cost), 300);

        let boardings = recorder.boardings();
        assert_eq!(boardings.len(), 1);
        assert!(boardings[0].first_boarding);
        assert_eq!(boardings[0].constraint, TransferConstraint::Regular);
    }

    #[test]
    fn flex_access_is_not_first_boarding() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        chain.push_back(
            StagingLeg::access_leg(Arc::new(TestStreetLeg::flex_to(StopIndex(1), 600, 1))).unwrap(),
        );
        let ride_id = chain.push_back(ride(&l1, 0, 1));
        let recorder = Arc::new(RecordingCostCalculator::new());
        let cost: CostModel<TestTrip> = CostModel::Calculator(recorder.clone());

        chain.generalized_cost(ride_id, &slack(), &cost);

        assert!(!recorder.boardings()[0].first_boarding);
    }

    #[test]
    fn partial_chain_transit_boards_without_wait() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        let ride_id = chain.push_back(ride(&l1, 0, 1));
        let recorder = Arc::new(RecordingCostCalculator::new());
        let cost: CostModel<TestTrip> = CostModel::Calculator(recorder.clone());

        assert_eq!(chain.generalized_cost(ride_id, &slack(), &cost), 1200 + 15);
        assert!(!recorder.boardings()[0].first_boarding);
    }

    #[test]
    fn unshifted_chain_costs_rides_without_wait() {
        let (chain, ids) = chain();
        let recorder = Arc::new(RecordingCostCalculator::new());
        let cost: CostModel<TestTrip> = CostModel::Calculator(recorder.clone());
        let slack = slack();

        // Street legs are not placed in time yet, so nothing waits
        assert_eq!(chain.generalized_cost(ids[1], &slack, &cost), 1200 + 15);
        assert_eq!(chain.generalized_cost(ids[3], &slack, &cost), 1200 + 15);
        assert_eq!(chain.generalized_cost(ids[4], &slack, &cost), 300);
        assert_eq!(
            chain.total_generalized_cost(&slack, &cost),
            120 * 200 + 1215 + 180 * 200 + 1215 + 300
        );
        for boarding in recorder.boardings() {
            assert_eq!(boarding.prev_arrival_time, boarding.board_time);
        }
    }

    #[test]
    fn wait_before_flex_egress() {
        let mut chain = StagingChain::new();
        let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
        chain.push_back(
            StagingLeg::access_leg(Arc::new(TestStreetLeg::walk_to(StopIndex(1), 120))).unwrap(),
        );
        let ride_id = chain.push_back(ride(&l1, 0, 1));
        chain.push_back(StagingLeg::egress_leg(Arc::new(TestStreetLeg::flex_from(
            StopIndex(2),
            600,
            1,
        ))));
        shift_all(&mut chain, &slack());

        // 15s alight slack, then 60s transfer slack before the flex ride
        assert_eq!(
            chain.wait_time_before_next_transit_including_slack(ride_id),
            Some(75)
        );
    }

    #[test]
    fn wait_before_flex_egress_excludes_transfer_walk() {
        let wait = |egress: TestStreetLeg| {
            let mut chain = StagingChain::new();
            let l1 = trip("L1", &[1, 2], &["10:00", "10:20"]);
            chain.push_back(
                StagingLeg::access_leg(Arc::new(TestStreetLeg::walk_to(StopIndex(1), 120)))
                    .unwrap(),
            );
            let ride_id = chain.push_back(ride(&l1, 0, 1));
            chain.push_back(StagingLeg::transfer_leg(
                Arc::new(TestStreetLeg::walk_between(StopIndex(2), StopIndex(3), 180)),
                StopIndex(3),
            ));
            chain.push_back(StagingLeg::egress_leg(Arc::new(egress)));
            shift_all(&mut chain, &slack());
            chain.wait_time_before_next_transit_including_slack(ride_id)
        };

        // A walking egress is not a ride
        assert_eq!(wait(TestStreetLeg::walk_from(StopIndex(3), 300)), None);
        // 15s alight slack before the walk, 60s transfer slack after it
        assert_eq!(wait(TestStreetLeg::flex_from(StopIndex(3), 600, 1)), Some(15 + 60));
    }

    #[test]
    fn mutate_copies_reachable_legs() {
        let (mut chain, ids) = chain();
        let copy = chain.mutate();
        shift_all(&mut chain, &slack());

        assert_eq!(copy.len(), 5);
        assert_eq!(copy.to_string(), chain.to_string());
        // Times shifted in the original are not shifted in the copy
        let copy_ids: Vec<_> = copy.ids().collect();
        assert_eq!(copy.get(copy_ids[0]).from_time(), TIME_NOT_SET);
        assert_ne!(chain.get(ids[0]).from_time(), TIME_NOT_SET);
        assert_eq!(copy.leg(copy_ids[1]), chain.leg(ids[1]));
    }

    #[test]
    fn display() {
        let (chain, _) = chain();
        assert_eq!(
            chain.to_string(),
            "Walk 2m ~ 1 ~ BUS L1 10:00 10:20 ~ 2 ~ Walk 3m ~ 3 ~ BUS L2 10:40 11:00 ~ 4 ~ Walk 5m"
        );
    }
}
