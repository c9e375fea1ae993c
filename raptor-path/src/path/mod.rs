//! Path reconstruction.
//!
//! Builders link legs into a staging chain, place street legs in time
//! around the fixed transit legs, attach constrained transfers and then
//! materialize an immutable [`Path`].

mod builder;
mod display;
mod leg;
mod output;
mod staging;


pub use builder::{ForwardPathBuilder, PathBuilder, PathContext, ReversePathBuilder};
pub use display::PathStringBuilder;
pub use leg::{AccessLeg, EgressLeg, Leg, TransferLeg, TransitLeg};
pub use output::{Path, PathLeg};
pub use staging::{LegId, StagingChain, StagingLeg};
