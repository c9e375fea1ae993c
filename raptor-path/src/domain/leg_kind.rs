//! The four kinds of leg a path is made of.

use std::fmt;

/// Discriminant of a path leg.
///
/// Used for adjacency checks and error reporting; the legs themselves are
/// modelled as enums carrying their own payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegKind {
    Access,
    Transit,
    Transfer,
    Egress,
}

impl LegKind {
    /// Returns true if a leg of kind `next` may directly follow a leg of
    /// kind `self` in travel order.
    ///
    /// # Examples
    ///
    /// ```
    /// use raptor_path::domain::LegKind;
    ///
    /// assert!(LegKind::Access.may_precede(LegKind::Transit));
    /// assert!(LegKind::Transit.may_precede(LegKind::Transit));
    /// assert!(!LegKind::Transfer.may_precede(LegKind::Egress));
    /// assert!(!LegKind::Egress.may_precede(LegKind::Transit));
    /// ```
    pub fn may_precede(self, next: LegKind) -> bool {
        use LegKind::*;
        matches!(
            (self, next),
            (Access, Transit)
                | (Access, Transfer)
                | (Transit, Transit)
                | (Transit, Transfer)
                | (Transit, Egress)
                | (Transfer, Transit)
        )
    }

    /// Like [`may_precede`](Self::may_precede), for a path whose access leg
    /// carries rides. Such a path may reach the egress on street legs
    /// alone, as in flex, walk, flex.
    ///
    /// # Examples
    ///
    /// ```
    /// use raptor_path::domain::LegKind;
    ///
    /// assert!(LegKind::Transfer.may_precede_with_rides(LegKind::Egress));
    /// assert!(LegKind::Access.may_precede_with_rides(LegKind::Egress));
    /// assert!(!LegKind::Transfer.may_precede_with_rides(LegKind::Transfer));
    /// ```
    pub fn may_precede_with_rides(self, next: LegKind) -> bool {
        use LegKind::*;
        self.may_precede(next) || matches!((self, next), (Access | Transfer, Egress))
    }
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LegKind::Access => "access",
            LegKind::Transit => "transit",
            LegKind::Transfer => "transfer",
            LegKind::Egress => "egress",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LegKind; 4] = [
        LegKind::Access,
        LegKind::Transit,
        LegKind::Transfer,
        LegKind::Egress,
    ];

    #[test]
    fn nothing_follows_egress() {
        for kind in ALL {
            assert!(!LegKind::Egress.may_precede(kind));
        }
    }

    #[test]
    fn nothing_precedes_access() {
        for kind in ALL {
            assert!(!kind.may_precede(LegKind::Access));
        }
    }

    #[test]
    fn transfer_is_followed_by_transit_only() {
        let allowed: Vec<_> = ALL
            .into_iter()
            .filter(|k| LegKind::Transfer.may_precede(*k))
            .collect();
        assert_eq!(allowed, vec![LegKind::Transit]);
    }

    #[test]
    fn egress_follows_transit_only() {
        let allowed: Vec<_> = ALL
            .into_iter()
            .filter(|k| k.may_precede(LegKind::Egress))
            .collect();
        assert_eq!(allowed, vec![LegKind::Transit]);
    }

    #[test]
    fn rides_on_access_open_street_legs_into_egress() {
        let allowed: Vec<_> = ALL
            .into_iter()
            .filter(|k| k.may_precede_with_rides(LegKind::Egress))
            .collect();
        assert_eq!(
            allowed,
            vec![LegKind::Access, LegKind::Transit, LegKind::Transfer]
        );

        for prev in ALL {
            for next in ALL {
                if prev.may_precede(next) {
                    assert!(prev.may_precede_with_rides(next));
                }
            }
        }
    }

    #[test]
    fn display() {
        assert_eq!(LegKind::Access.to_string(), "access");
        assert_eq!(LegKind::Transit.to_string(), "transit");
        assert_eq!(LegKind::Transfer.to_string(), "transfer");
        assert_eq!(LegKind::Egress.to_string(), "egress");
    }
}
