//! Leg variants.
//!
//! A `Leg` is the immutable description of one part of a path: access,
//! transit, transfer or egress. Legs carry only the facts needed to
//! reconstruct times and costs. Clock times for street legs are resolved
//! later by the staging chain.

use std::fmt;
use std::sync::Arc;

use crate::domain::{LegKind, PathError, StopIndex, StopPosition};
use crate::transit::{BoardAndAlightTime, ConstrainedTransfer, StreetLeg, TripSchedule};

fn same_street_leg(a: &Arc<dyn StreetLeg>, b: &Arc<dyn StreetLeg>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// From the origin to the first stop.
#[derive(Debug, Clone)]
pub struct AccessLeg {
    street: Arc<dyn StreetLeg>,
    to_stop: StopIndex,
}

impl AccessLeg {
    /// Create an access leg arriving at the street leg's destination stop.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the street leg does not end at a stop.
    pub fn new(street: Arc<dyn StreetLeg>) -> Result<Self, PathError> {
        let to_stop = street
            .destination_stop()
            .ok_or(PathError::MissingStop("access leg must end at a stop"))?;
        Ok(Self { street, to_stop })
    }

    /// Returns the street path.
    pub fn street(&self) -> &dyn StreetLeg {
        self.street.as_ref()
    }

    /// Returns the stop where the access ends.
    pub fn to_stop(&self) -> StopIndex {
        self.to_stop
    }
}

/// One ride on one trip.
#[derive(Debug)]
pub struct TransitLeg<T: TripSchedule> {
    trip: Arc<T>,
    times: BoardAndAlightTime,
    constrained_transfer_after: Option<ConstrainedTransfer>,
}

impl<T: TripSchedule> TransitLeg<T> {
    /// Create a transit leg from validated board and alight facts.
    pub fn new(
        trip: Arc<T>,
        times: BoardAndAlightTime,
        constrained_transfer_after: Option<ConstrainedTransfer>,
    ) -> Self {
        Self {
            trip,
            times,
            constrained_transfer_after,
        }
    }

    /// Returns the trip.
    pub fn trip(&self) -> &Arc<T> {
        &self.trip
    }

    /// Returns the board and alight facts.
    pub fn times(&self) -> &BoardAndAlightTime {
        &self.times
    }

    pub fn board_stop(&self) -> StopIndex {
        self.times.board_stop()
    }

    pub fn alight_stop(&self) -> StopIndex {
        self.times.alight_stop()
    }

    pub fn board_position(&self) -> StopPosition {
        self.times.board_position()
    }

    pub fn alight_position(&self) -> StopPosition {
        self.times.alight_position()
    }

    pub fn board_time(&self) -> i32 {
        self.times.board_time()
    }

    pub fn alight_time(&self) -> i32 {
        self.times.alight_time()
    }

    /// The constraint governing the transfer that follows this leg.
    pub fn constrained_transfer_after(&self) -> Option<&ConstrainedTransfer> {
        self.constrained_transfer_after.as_ref()
    }

    /// Returns a copy boarding at `position` instead, keeping the alight
    /// facts and any constraint.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the trip can not be boarded at `position` or
    /// `position` is not before the alight position.
    pub fn with_board_position(&self, position: StopPosition) -> Result<Self, PathError> {
        let times = BoardAndAlightTime::new(self.trip.as_ref(), position, self.alight_position())?;
        Ok(Self {
            trip: Arc::clone(&self.trip),
            times,
            constrained_transfer_after: self.constrained_transfer_after,
        })
    }

    /// Returns a copy with the constraint after this leg replaced.
    pub fn with_constrained_transfer_after(&self, tx: Option<ConstrainedTransfer>) -> Self {
        Self {
            trip: Arc::clone(&self.trip),
            times: self.times,
            constrained_transfer_after: tx,
        }
    }
}

impl<T: TripSchedule> Clone for TransitLeg<T> {
    fn clone(&self) -> Self {
        self.with_constrained_transfer_after(self.constrained_transfer_after)
    }
}

impl<T: TripSchedule> PartialEq for TransitLeg<T> {
    fn eq(&self, other: &Self) -> bool {
        // Same trip by reference, same ride, same constraint
        Arc::ptr_eq(&self.trip, &other.trip)
            && self.times == other.times
            && self.constrained_transfer_after == other.constrained_transfer_after
    }
}

/// A street path between two stops.
///
/// `to_stop` is the stop reached when travelling towards the destination.
/// It is given explicitly because a street leg found by a reverse search
/// reports the opposite end as its stop.
#[derive(Debug, Clone)]
pub struct TransferLeg {
    street: Arc<dyn StreetLeg>,
    to_stop: StopIndex,
}

impl TransferLeg {
    pub fn new(street: Arc<dyn StreetLeg>, to_stop: StopIndex) -> Self {
        Self { street, to_stop }
    }

    pub fn street(&self) -> &dyn StreetLeg {
        self.street.as_ref()
    }

    pub fn to_stop(&self) -> StopIndex {
        self.to_stop
    }
}

/// From the last stop to the destination.
#[derive(Debug, Clone)]
pub struct EgressLeg {
    street: Arc<dyn StreetLeg>,
}

impl EgressLeg {
    pub fn new(street: Arc<dyn StreetLeg>) -> Self {
        Self { street }
    }

    pub fn street(&self) -> &dyn StreetLeg {
        self.street.as_ref()
    }
}

/// One leg of a path.
#[derive(Debug)]
pub enum Leg<T: TripSchedule> {
    /// Street leg from the origin
    Access(AccessLeg),
    /// Ride on a trip
    Transit(TransitLeg<T>),
    /// Street leg between two stops
    Transfer(TransferLeg),
    /// Street leg to the destination
    Egress(EgressLeg),
}

impl<T: TripSchedule> Leg<T> {
    /// Returns the variant tag.
    pub fn kind(&self) -> LegKind {
        match self {
            Leg::Access(_) => LegKind::Access,
            Leg::Transit(_) => LegKind::Transit,
            Leg::Transfer(_) => LegKind::Transfer,
            Leg::Egress(_) => LegKind::Egress,
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self, Leg::Access(_))
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Leg::Transfer(_))
    }

    pub fn is_egress(&self) -> bool {
        matches!(self, Leg::Egress(_))
    }

    /// Returns the access leg if this is one.
    pub fn as_access(&self) -> Option<&AccessLeg> {
        match self {
            Leg::Access(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the transit leg if this is one.
    pub fn as_transit(&self) -> Option<&TransitLeg<T>> {
        match self {
            Leg::Transit(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the transfer leg if this is one.
    pub fn as_transfer(&self) -> Option<&TransferLeg> {
        match self {
            Leg::Transfer(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the egress leg if this is one.
    pub fn as_egress(&self) -> Option<&EgressLeg> {
        match self {
            Leg::Egress(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the transit leg, or an error naming the actual variant.
    pub fn transit(&self) -> Result<&TransitLeg<T>, PathError> {
        self.as_transit().ok_or(PathError::WrongLegKind {
            expected: LegKind::Transit,
            found: self.kind(),
        })
    }

    /// Returns the street path of an access, transfer or egress leg.
    pub fn street(&self) -> Option<&dyn StreetLeg> {
        match self {
            Leg::Access(leg) => Some(leg.street()),
            Leg::Transit(_) => None,
            Leg::Transfer(leg) => Some(leg.street()),
            Leg::Egress(leg) => Some(leg.street()),
        }
    }

    /// Returns true for transit and for street legs with embedded rides.
    pub fn has_rides(&self) -> bool {
        match self {
            Leg::Transit(_) => true,
            Leg::Transfer(_) => false,
            Leg::Access(leg) => leg.street().has_embedded_rides(),
            Leg::Egress(leg) => leg.street().has_embedded_rides(),
        }
    }

    /// The stop where this leg ends.
    ///
    /// # Errors
    ///
    /// An egress leg ends at the destination, not at a stop.
    pub fn to_stop(&self) -> Result<StopIndex, PathError> {
        match self {
            Leg::Access(leg) => Ok(leg.to_stop()),
            Leg::Transit(leg) => Ok(leg.alight_stop()),
            Leg::Transfer(leg) => Ok(leg.to_stop()),
            Leg::Egress(_) => Err(PathError::UnsupportedOperation("egress leg has no to-stop")),
        }
    }
}

impl<T: TripSchedule> Clone for Leg<T> {
    fn clone(&self) -> Self {
        match self {
            Leg::Access(leg) => Leg::Access(leg.clone()),
            Leg::Transit(leg) => Leg::Transit(leg.clone()),
            Leg::Transfer(leg) => Leg::Transfer(leg.clone()),
            Leg::Egress(leg) => Leg::Egress(leg.clone()),
        }
    }
}

impl<T: TripSchedule> PartialEq for Leg<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Leg::Access(a), Leg::Access(b)) => {
                a.to_stop == b.to_stop && same_street_leg(&a.street, &b.street)
            }
            (Leg::Transit(a), Leg::Transit(b)) => a == b,
            (Leg::Transfer(a), Leg::Transfer(b)) => {
                a.to_stop == b.to_stop && same_street_leg(&a.street, &b.street)
            }
            (Leg::Egress(a), Leg::Egress(b)) => same_street_leg(&a.street, &b.street),
            _ => false,
        }
    }
}

impl<T: TripSchedule> fmt::Display for Leg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Access(leg) => write!(f, "access to {}", leg.to_stop),
            Leg::Transit(leg) => {
                write!(f, "{} {}", leg.trip.pattern().debug_info(), leg.times)
            }
            Leg::Transfer(leg) => write!(f, "transfer to {}", leg.to_stop),
            Leg::Egress(_) => f.write_str("egress"),
        }
    }
}
