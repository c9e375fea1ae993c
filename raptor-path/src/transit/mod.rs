//! Contracts for the collaborators path reconstruction depends on.
//!
//! The RAPTOR search, the street router, the slack tables and the cost
//! coefficients all live outside this crate. They are consumed through
//! the traits defined here. Cost calculation and constrained-transfer
//! lookup are optional; their absence is an explicit variant of
//! [`CostModel`] and [`ConstraintLookup`] rather than a missing value.

mod constraint;
mod cost;
pub mod mock;
mod slack;
mod street;
mod trip;

pub use constraint::{
    ConstrainedTransfer, ConstrainedTransferSearch, ConstraintLookup, TransferConstraint,
};
pub use cost::{
    CostCalculator, CostConfig, CostModel, DefaultCostCalculator, ZERO_COST, format_cost,
    to_raptor_cost,
};
pub use slack::{SlackConfig, SlackProvider};
pub use street::StreetLeg;
pub use trip::{BoardAndAlightTime, TripPattern, TripSchedule};
