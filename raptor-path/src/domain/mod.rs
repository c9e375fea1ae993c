//! Domain types shared by the path model and its collaborators.
//!
//! Stops and stop positions are distinct newtypes so a pattern ordinal can
//! never be mistaken for a global stop identifier. Times are plain seconds
//! since the start of the service day.

mod error;
mod leg_kind;
mod stop;
pub mod time;

pub use error::PathError;
pub use leg_kind::LegKind;
pub use stop::{StopIndex, StopPosition};
pub use time::{TIME_NOT_SET, TimeError, format_duration, format_time, parse_time};
