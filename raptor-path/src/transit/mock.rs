//! In-memory collaborators for tests and examples.
//!
//! These stand in for the RAPTOR search's trip data, the street router
//! and the cost model, so that paths can be reconstructed from a few
//! lines of timetable text.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::{StopIndex, StopPosition, TIME_NOT_SET, parse_time};

use super::{
    ConstrainedTransfer, ConstrainedTransferSearch, CostCalculator, StreetLeg, TransferConstraint,
    TripPattern, TripSchedule,
};

/// Cost per second of a mock walk leg (walk reluctance 2.0).
pub const WALK_COST_PER_SECOND: i32 = 200;

/// A stop pattern with a fixed slack index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPattern {
    stops: Vec<StopIndex>,
    slack_index: usize,
    debug_info: String,
}

impl TripPattern for TestPattern {
    fn stop_index(&self, position: StopPosition) -> Option<StopIndex> {
        self.stops.get(position.0).copied()
    }

    fn slack_index(&self) -> usize {
        self.slack_index
    }

    fn debug_info(&self) -> &str {
        &self.debug_info
    }
}

/// A trip with an explicit timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTrip {
    route: String,
    pattern: TestPattern,
    arrivals: Vec<Option<i32>>,
    departures: Vec<Option<i32>>,
    reluctance_index: usize,
}

impl TestTrip {
    /// Start building a trip on `route` visiting `stops` in order.
    pub fn builder(route: &str, stops: &[usize]) -> TestTripBuilder {
        TestTripBuilder {
            route: route.to_string(),
            mode: "BUS".to_string(),
            stops: stops.iter().copied().map(StopIndex).collect(),
            arrivals: Vec::new(),
            departures: Vec::new(),
            slack_index: 0,
            reluctance_index: 0,
        }
    }

    /// Returns the route name.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the first position at or after `from` where the trip
    /// visits `stop`.
    pub fn position_of(&self, stop: usize, from: StopPosition) -> Option<StopPosition> {
        self.pattern
            .stops
            .iter()
            .enumerate()
            .skip(from.0)
            .find(|(_, s)| s.0 == stop)
            .map(|(i, _)| StopPosition(i))
    }
}

impl TripSchedule for TestTrip {
    fn pattern(&self) -> &dyn TripPattern {
        &self.pattern
    }

    fn board_time(&self, position: StopPosition) -> Option<i32> {
        self.departures.get(position.0).copied().flatten()
    }

    fn alight_time(&self, position: StopPosition) -> Option<i32> {
        self.arrivals.get(position.0).copied().flatten()
    }

    fn transit_reluctance_index(&self) -> usize {
        self.reluctance_index
    }
}

/// Builder for [`TestTrip`].
///
/// Times are `HH:MM` or `HH:MM:SS`. Anything that does not parse, by
/// convention `-`, means the trip does not stop for boarding (departures)
/// or alighting (arrivals) at that position.
#[derive(Debug, Clone)]
pub struct TestTripBuilder {
    route: String,
    mode: String,
    stops: Vec<StopIndex>,
    arrivals: Vec<Option<i32>>,
    departures: Vec<Option<i32>>,
    slack_index: usize,
    reluctance_index: usize,
}

fn parse_times(times: &[&str]) -> Vec<Option<i32>> {
    times.iter().map(|t| parse_time(t).ok()).collect()
}

impl TestTripBuilder {
    /// Use the same time for arrival and departure at every stop.
    pub fn times(mut self, times: &[&str]) -> Self {
        self.arrivals = parse_times(times);
        self.departures = self.arrivals.clone();
        self
    }

    /// Set arrival times.
    pub fn arrivals(mut self, times: &[&str]) -> Self {
        self.arrivals = parse_times(times);
        self
    }

    /// Set departure times.
    pub fn departures(mut self, times: &[&str]) -> Self {
        self.departures = parse_times(times);
        self
    }

    /// Same as [`times`](Self::times) with times already in seconds.
    pub fn times_in_seconds(mut self, times: &[i32]) -> Self {
        self.arrivals = times.iter().map(|t| Some(*t)).collect();
        self.departures = self.arrivals.clone();
        self
    }

    /// Set the pattern's slack index.
    pub fn slack_index(mut self, index: usize) -> Self {
        self.slack_index = index;
        self
    }

    /// Set the trip's transit reluctance index.
    pub fn reluctance_index(mut self, index: usize) -> Self {
        self.reluctance_index = index;
        self
    }

    /// Set the mode shown in debug output (default `BUS`).
    pub fn mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    /// Finish the trip.
    pub fn build(self) -> TestTrip {
        TestTrip {
            pattern: TestPattern {
                stops: self.stops,
                slack_index: self.slack_index,
                debug_info: format!("{} {}", self.mode, self.route),
            },
            route: self.route,
            arrivals: self.arrivals,
            departures: self.departures,
            reluctance_index: self.reluctance_index,
        }
    }
}

/// A street leg with a fixed duration and, optionally, a departure window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStreetLeg {
    origin: Option<StopIndex>,
    destination: Option<StopIndex>,
    duration: i32,
    cost: i32,
    rides: usize,
    opening_hours: Option<(i32, i32)>,
}

impl TestStreetLeg {
    fn new(origin: Option<StopIndex>, destination: Option<StopIndex>, duration: i32) -> Self {
        Self {
            origin,
            destination,
            duration,
            cost: duration * WALK_COST_PER_SECOND,
            rides: 0,
            opening_hours: None,
        }
    }

    /// Walk from the origin to `stop`.
    pub fn walk_to(stop: StopIndex, duration: i32) -> Self {
        Self::new(None, Some(stop), duration)
    }

    /// Walk from `stop` to the destination.
    pub fn walk_from(stop: StopIndex, duration: i32) -> Self {
        Self::new(Some(stop), None, duration)
    }

    /// Walk between two stops.
    pub fn walk_between(from: StopIndex, to: StopIndex, duration: i32) -> Self {
        Self::new(Some(from), Some(to), duration)
    }

    /// Flex ride from the origin to `stop`.
    pub fn flex_to(stop: StopIndex, duration: i32, rides: usize) -> Self {
        Self {
            rides,
            ..Self::walk_to(stop, duration)
        }
    }

    /// Flex ride from `stop` to the destination.
    pub fn flex_from(stop: StopIndex, duration: i32, rides: usize) -> Self {
        Self {
            rides,
            ..Self::walk_from(stop, duration)
        }
    }

    /// Replace the router-computed cost.
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    /// Cost equal to the duration in seconds.
    pub fn with_cost_as_duration(self) -> Self {
        let duration = self.duration;
        self.with_cost(duration)
    }

    /// Only allow departures between `open` and `close`, inclusive.
    pub fn with_opening_hours(mut self, open: i32, close: i32) -> Self {
        self.opening_hours = Some((open, close));
        self
    }
}

impl StreetLeg for TestStreetLeg {
    fn origin_stop(&self) -> Option<StopIndex> {
        self.origin
    }

    fn destination_stop(&self) -> Option<StopIndex> {
        self.destination
    }

    fn fixed_duration_seconds(&self) -> i32 {
        self.duration
    }

    fn generalized_cost(&self) -> i32 {
        self.cost
    }

    fn number_of_rides(&self) -> usize {
        self.rides
    }

    fn latest_arrival_no_later_than(&self, deadline: i32) -> i32 {
        let Some((open, close)) = self.opening_hours else {
            return deadline;
        };
        let departure = deadline - self.duration;
        if departure < open {
            TIME_NOT_SET
        } else {
            departure.min(close) + self.duration
        }
    }

    fn earliest_departure_no_earlier_than(&self, ready_time: i32) -> i32 {
        let Some((open, close)) = self.opening_hours else {
            return ready_time;
        };
        if ready_time > close {
            TIME_NOT_SET
        } else {
            ready_time.max(open)
        }
    }
}

/// Arguments of one [`CostCalculator::boarding_cost`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardingCall {
    /// Whether this was the first boarding of the path.
    pub first_boarding: bool,
    /// Arrival at the boarding stop.
    pub prev_arrival_time: i32,
    /// Where the trip was boarded.
    pub board_stop: StopIndex,
    /// When the trip departed.
    pub board_time: i32,
    /// Policy of the transfer into the trip.
    pub constraint: TransferConstraint,
}

/// A transparent cost model that records every boarding.
///
/// Boarding costs the wait, riding costs the ride time plus alight slack,
/// waiting costs its duration and a street leg costs its duration.
#[derive(Debug, Default)]
pub struct RecordingCostCalculator {
    boardings: Mutex<Vec<BoardingCall>>,
}

impl RecordingCostCalculator {
    /// Create a calculator with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the boardings seen so far, in call order.
    pub fn boardings(&self) -> Vec<BoardingCall> {
        self.boardings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: TripSchedule> CostCalculator<T> for RecordingCostCalculator {
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: i32,
        board_stop: StopIndex,
        board_time: i32,
        _trip: &T,
        constraint: TransferConstraint,
    ) -> i32 {
        self.boardings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BoardingCall {
                first_boarding,
                prev_arrival_time,
                board_stop,
                board_time,
                constraint,
            });
        board_time - prev_arrival_time
    }

    fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        _reluctance_index: usize,
        _alight_stop: StopIndex,
    ) -> i32 {
        boarding_cost + transit_time + alight_slack
    }

    fn wait_cost(&self, wait_seconds: i32) -> i32 {
        wait_seconds
    }

    fn cost_of_street_leg(&self, leg: &dyn StreetLeg) -> i32 {
        leg.fixed_duration_seconds()
    }
}

/// Returns the same constraint for every queried connection, or only for
/// connections between two named routes.
#[derive(Debug)]
pub struct FixedConstraintSearch {
    constraint: TransferConstraint,
    routes: Option<(String, String)>,
    queries: AtomicUsize,
}

impl FixedConstraintSearch {
    /// Apply `constraint` to every connection.
    pub fn new(constraint: TransferConstraint) -> Self {
        Self {
            constraint,
            routes: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Only apply the constraint from `from_route` to `to_route`.
    pub fn between(mut self, from_route: &str, to_route: &str) -> Self {
        self.routes = Some((from_route.to_string(), to_route.to_string()));
        self
    }

    /// Returns how many connections have been queried.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl ConstrainedTransferSearch<TestTrip> for FixedConstraintSearch {
    fn find_constraint(
        &self,
        from_trip: &TestTrip,
        from_position: StopPosition,
        to_trip: &TestTrip,
        to_position: StopPosition,
    ) -> Option<ConstrainedTransfer> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let matches = match &self.routes {
            None => true,
            Some((from_route, to_route)) => {
                from_trip.route() == from_route && to_trip.route() == to_route
            }
        };
        if !matches {
            return None;
        }
        Some(ConstrainedTransfer::new(
            self.constraint,
            from_position,
            to_position,
        ))
    }
}
