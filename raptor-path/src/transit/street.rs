//! Street legs: access, transfer and egress paths found by the street router.

use std::fmt;

use crate::domain::StopIndex;

/// A walking, cycling, driving or flex path connecting a stop to the street
/// network or to another stop.
///
/// The leg has a fixed duration but no fixed clock time; path
/// reconstruction moves it in time to fit the transit legs around it. Some
/// legs (flex, on-demand) are only available in certain windows, so the
/// two time queries return the *achievable* bound, which may differ from
/// the requested one.
pub trait StreetLeg: fmt::Debug + Send + Sync {
    /// The stop this leg starts at, if it starts at a stop.
    ///
    /// `None` for an access leg starting at the origin.
    fn origin_stop(&self) -> Option<StopIndex> {
        None
    }

    /// The stop this leg ends at, if it ends at a stop.
    ///
    /// Required for access legs. `None` for an egress leg ending at the
    /// destination.
    fn destination_stop(&self) -> Option<StopIndex> {
        None
    }

    /// Time needed to traverse the leg, in seconds.
    fn fixed_duration_seconds(&self) -> i32;

    /// Generalized cost precomputed by the street router.
    fn generalized_cost(&self) -> i32;

    /// Number of vehicle rides embedded in the leg (flex trips).
    fn number_of_rides(&self) -> usize {
        0
    }

    /// Returns true if the leg contains at least one ride, and so behaves
    /// like transit when slack is applied.
    fn has_embedded_rides(&self) -> bool {
        self.number_of_rides() > 0
    }

    /// Latest time at or before `deadline` this leg can arrive.
    ///
    /// Freely shiftable legs return `deadline` unchanged. A leg may return
    /// an earlier time if it can not arrive that late, or
    /// [`TIME_NOT_SET`](crate::domain::TIME_NOT_SET) if it can not arrive
    /// at all.
    fn latest_arrival_no_later_than(&self, deadline: i32) -> i32 {
        deadline
    }

    /// Earliest time at or after `ready_time` this leg can depart.
    ///
    /// Freely shiftable legs return `ready_time` unchanged.
    fn earliest_departure_no_earlier_than(&self, ready_time: i32) -> i32 {
        ready_time
    }

    /// Short label used in debug output.
    fn mode_label(&self) -> &str {
        if self.has_embedded_rides() {
            "Flex"
        } else {
            "Walk"
        }
    }
}
