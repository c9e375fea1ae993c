//! Stop identifiers.

use std::fmt;

/// Global identifier of a physical stop.
///
/// # Examples
///
/// ```
/// use raptor_path::domain::StopIndex;
///
/// let stop = StopIndex(42);
/// assert_eq!(stop.0, 42);
/// assert_eq!(stop.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIndex(pub usize);

impl fmt::Display for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordinal position of a stop within one trip's pattern.
///
/// Used instead of `StopIndex` to disambiguate patterns that visit the
/// same stop more than once (loops, out-and-back routes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopPosition(pub usize);

impl StopPosition {
    /// Returns the next position.
    pub fn next(self) -> Self {
        StopPosition(self.0 + 1)
    }

    /// Returns the previous position, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(StopPosition)
    }
}

impl fmt::Display for StopPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
