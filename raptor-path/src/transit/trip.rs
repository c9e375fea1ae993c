//! Trip schedules and the board/alight facts taken from them.

use std::fmt;

use crate::domain::{PathError, StopIndex, StopPosition, TIME_NOT_SET, format_time};

/// The stop sequence shared by all trips of a route variant.
pub trait TripPattern: fmt::Debug + Send + Sync {
    /// Global stop index at the given position, or `None` if the position
    /// is outside the pattern.
    fn stop_index(&self, position: StopPosition) -> Option<StopIndex>;

    /// Index used to look up board and alight slack for this pattern.
    fn slack_index(&self) -> usize;

    /// Human-readable route description, e.g. `BUS L11`.
    fn debug_info(&self) -> &str;
}

/// One scheduled (or realtime-updated) vehicle trip.
///
/// Trips are shared between legs as `Arc<T>`; two transit legs are on the
/// same trip when their `Arc`s point to the same schedule.
pub trait TripSchedule: fmt::Debug + Send + Sync {
    /// The pattern this trip runs.
    fn pattern(&self) -> &dyn TripPattern;

    /// Departure time at the given position, if the trip boards there.
    fn board_time(&self, position: StopPosition) -> Option<i32>;

    /// Arrival time at the given position, if the trip alights there.
    fn alight_time(&self, position: StopPosition) -> Option<i32>;

    /// Index into the cost model's transit reluctance factors.
    fn transit_reluctance_index(&self) -> usize;
}

/// Boarding and alighting facts for one ride on one trip.
///
/// # Invariants
///
/// - `alight_position > board_position`
/// - Both positions exist in the trip's pattern
/// - Board and alight times were present in the trip's timetable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardAndAlightTime {
    board_position: StopPosition,
    alight_position: StopPosition,
    board_stop: StopIndex,
    alight_stop: StopIndex,
    board_time: i32,
    alight_time: i32,
}

impl BoardAndAlightTime {
    /// Read board and alight facts from a trip, validating that the
    /// positions describe forward travel and that both times exist.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `alight_position <= board_position`
    /// - Either position is outside the trip's pattern
    /// - The trip has no departure at `board_position` or no arrival at
    ///   `alight_position`
    ///
    /// # Examples
    ///
    /// ```
    /// use raptor_path::domain::{StopIndex, StopPosition, parse_time};
    /// use raptor_path::transit::BoardAndAlightTime;
    /// use raptor_path::transit::mock::TestTrip;
    ///
    /// let trip = TestTrip::builder("L1", &[10, 20, 30])
    ///     .times(&["10:00", "10:10", "10:25"])
    ///     .build();
    ///
    /// let facts = BoardAndAlightTime::new(&trip, StopPosition(0), StopPosition(2)).unwrap();
    /// assert_eq!(facts.board_stop(), StopIndex(10));
    /// assert_eq!(facts.alight_stop(), StopIndex(30));
    /// assert_eq!(facts.board_time(), parse_time("10:00").unwrap());
    /// assert_eq!(facts.duration(), 25 * 60);
    ///
    /// assert!(BoardAndAlightTime::new(&trip, StopPosition(2), StopPosition(1)).is_err());
    /// ```
    pub fn new<T: TripSchedule + ?Sized>(
        trip: &T,
        board_position: StopPosition,
        alight_position: StopPosition,
    ) -> Result<Self, PathError> {
        if alight_position <= board_position {
            return Err(PathError::InvalidStopPositions {
                board: board_position,
                alight: alight_position,
            });
        }

        let pattern = trip.pattern();
        let board_stop = pattern
            .stop_index(board_position)
            .ok_or(PathError::MissingStop("board position outside trip pattern"))?;
        let alight_stop = pattern
            .stop_index(alight_position)
            .ok_or(PathError::MissingStop("alight position outside trip pattern"))?;

        let board_time = trip
            .board_time(board_position)
            .filter(|t| *t != TIME_NOT_SET)
            .ok_or_else(|| PathError::MissingTime(format!("board time at {board_position}")))?;
        let alight_time = trip
            .alight_time(alight_position)
            .filter(|t| *t != TIME_NOT_SET)
            .ok_or_else(|| PathError::MissingTime(format!("alight time at {alight_position}")))?;

        Ok(Self {
            board_position,
            alight_position,
            board_stop,
            alight_stop,
            board_time,
            alight_time,
        })
    }

    /// Returns the boarding position in the trip's pattern.
    pub fn board_position(&self) -> StopPosition {
        self.board_position
    }

    /// Returns the alighting position in the trip's pattern.
    pub fn alight_position(&self) -> StopPosition {
        self.alight_position
    }

    /// Returns the boarding stop.
    pub fn board_stop(&self) -> StopIndex {
        self.board_stop
    }

    /// Returns the alighting stop.
    pub fn alight_stop(&self) -> StopIndex {
        self.alight_stop
    }

    /// Returns the scheduled departure at the boarding stop.
    pub fn board_time(&self) -> i32 {
        self.board_time
    }

    /// Returns the scheduled arrival at the alighting stop.
    pub fn alight_time(&self) -> i32 {
        self.alight_time
    }

    /// Returns the time spent on board, in seconds.
    pub fn duration(&self) -> i32 {
        self.alight_time - self.board_time
    }
}

impl fmt::Display for BoardAndAlightTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {} -> {} {} {}]",
            self.board_stop,
            self.board_position,
            format_time(self.board_time),
            self.alight_stop,
            self.alight_position,
            format_time(self.alight_time)
        )
    }
}
