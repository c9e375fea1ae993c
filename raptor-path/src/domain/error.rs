//! Path construction errors.
//!
//! Every variant is a contract violation by the code driving the builder
//! or by one of its collaborators. Nothing in this crate recovers from
//! them; they are returned to the caller as soon as they are detected.

use super::{LegKind, StopPosition};

/// Errors raised while assembling or materializing a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A leg was constructed without a stop it requires
    #[error("missing required stop: {0}")]
    MissingStop(&'static str),

    /// The trip has no time at the requested board or alight position
    #[error("missing required time data: {0}")]
    MissingTime(String),

    /// Board and alight positions do not describe forward travel
    #[error("invalid stop positions: board {board} must come before alight {alight}")]
    InvalidStopPositions {
        board: StopPosition,
        alight: StopPosition,
    },

    /// An operation only valid on one kind of leg was applied to another
    #[error("expected {expected} leg, found {found} leg")]
    WrongLegKind { expected: LegKind, found: LegKind },

    /// Linking these two legs would break the access/transit/transfer/egress order
    #[error("{next} leg can not follow {prev} leg")]
    IllegalLegOrder { prev: LegKind, next: LegKind },

    /// The chain is not a complete access-to-egress path
    #[error("incomplete path: {0}")]
    IncompletePath(&'static str),

    /// The operation is not defined for this leg
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// A street leg could not report any feasible time for a time-shift
    #[error("unable to time-shift {leg} leg around {time}")]
    TimeShiftNotPossible { leg: LegKind, time: String },
}
