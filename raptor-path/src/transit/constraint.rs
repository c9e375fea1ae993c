//! Constrained transfers: explicit policies for a specific trip-to-trip connection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::StopPosition;

use super::TripSchedule;

/// Policy governing one transfer between two trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferConstraint {
    /// No special agreement; the default transfer rules apply.
    #[default]
    Regular,
    /// The operator prefers this transfer over alternatives.
    Preferred,
    /// The operator recommends this transfer.
    Recommended,
    /// The departing trip waits for the arriving one.
    Guaranteed,
    /// Passengers stay on board; the vehicle continues as the next trip.
    StaySeated,
    /// Only usable by staff.
    StaffOnly,
    /// The transfer is not allowed.
    Forbidden,
}

impl TransferConstraint {
    /// Returns true if no agreement applies to the transfer.
    pub fn is_regular(self) -> bool {
        self == TransferConstraint::Regular
    }

    /// Returns true if passengers may not use the transfer.
    pub fn is_not_allowed(self) -> bool {
        matches!(
            self,
            TransferConstraint::Forbidden | TransferConstraint::StaffOnly
        )
    }

    /// Returns true if the operator guarantees the connection.
    pub fn is_guaranteed(self) -> bool {
        self == TransferConstraint::Guaranteed
    }

    /// Returns true if the transfer happens without leaving the vehicle.
    pub fn is_stay_seated(self) -> bool {
        self == TransferConstraint::StaySeated
    }

    /// Returns true if the connection is held for the passenger, so
    /// transfer slack and minimum transfer times do not apply.
    pub fn is_facilitated(self) -> bool {
        self.is_guaranteed() || self.is_stay_seated()
    }
}

impl fmt::Display for TransferConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferConstraint::Regular => "regular",
            TransferConstraint::Preferred => "preferred",
            TransferConstraint::Recommended => "recommended",
            TransferConstraint::Guaranteed => "guaranteed",
            TransferConstraint::StaySeated => "stay-seated",
            TransferConstraint::StaffOnly => "staff-only",
            TransferConstraint::Forbidden => "forbidden",
        };
        f.write_str(name)
    }
}

/// A constraint found for a concrete connection: alighting one trip at
/// `from_position` and boarding another at `to_position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstrainedTransfer {
    constraint: TransferConstraint,
    from_position: StopPosition,
    to_position: StopPosition,
}

impl ConstrainedTransfer {
    /// Create a constrained transfer.
    pub fn new(
        constraint: TransferConstraint,
        from_position: StopPosition,
        to_position: StopPosition,
    ) -> Self {
        Self {
            constraint,
            from_position,
            to_position,
        }
    }

    /// Returns the policy for this transfer.
    pub fn constraint(&self) -> TransferConstraint {
        self.constraint
    }

    /// Returns the alight position on the arriving trip.
    pub fn from_position(&self) -> StopPosition {
        self.from_position
    }

    /// Returns the board position on the departing trip.
    pub fn to_position(&self) -> StopPosition {
        self.to_position
    }
}

impl fmt::Display for ConstrainedTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.constraint, self.from_position, self.to_position
        )
    }
}

/// Lookup of constrained transfers between two trips.
pub trait ConstrainedTransferSearch<T: TripSchedule>: Send + Sync {
    /// Find the constraint for alighting `from_trip` at `from_position`
    /// and boarding `to_trip` at `to_position`, if one exists.
    fn find_constraint(
        &self,
        from_trip: &T,
        from_position: StopPosition,
        to_trip: &T,
        to_position: StopPosition,
    ) -> Option<ConstrainedTransfer>;
}

/// Constrained-transfer lookup, or its explicit absence.
pub enum ConstraintLookup<T: TripSchedule> {
    /// No lookup configured; every transfer is regular.
    Disabled,
    /// Query this search for each pair of consecutive transit legs.
    Search(Arc<dyn ConstrainedTransferSearch<T>>),
}

impl<T: TripSchedule> ConstraintLookup<T> {
    /// Wrap a search implementation.
    pub fn search(search: impl ConstrainedTransferSearch<T> + 'static) -> Self {
        ConstraintLookup::Search(Arc::new(search))
    }

    /// Returns true if a search is configured.
    pub fn is_enabled(&self) -> bool {
        matches!(self, ConstraintLookup::Search(_))
    }

    /// Find the constraint for a connection; always `None` when disabled.
    pub fn find(
        &self,
        from_trip: &T,
        from_position: StopPosition,
        to_trip: &T,
        to_position: StopPosition,
    ) -> Option<ConstrainedTransfer> {
        match self {
            ConstraintLookup::Disabled => None,
            ConstraintLookup::Search(search) => {
                search.find_constraint(from_trip, from_position, to_trip, to_position)
            }
        }
    }
}

impl<T: TripSchedule> Clone for ConstraintLookup<T> {
    fn clone(&self) -> Self {
        match self {
            ConstraintLookup::Disabled => ConstraintLookup::Disabled,
            ConstraintLookup::Search(search) => ConstraintLookup::Search(Arc::clone(search)),
        }
    }
}

impl<T: TripSchedule> Default for ConstraintLookup<T> {
    fn default() -> Self {
        ConstraintLookup::Disabled
    }
}

impl<T: TripSchedule> fmt::Debug for ConstraintLookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintLookup::Disabled => f.write_str("ConstraintLookup::Disabled"),
            ConstraintLookup::Search(_) => f.write_str("ConstraintLookup::Search"),
        }
    }
}
