use std::fmt;

/// A whole number of points. Balances and transaction amounts are never fractional
/// and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points(u64);

impl Points {
    pub const ZERO: Points = Points(0);

    pub const fn new(value: u64) -> Self {
        Points(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Convert a signed request amount. Zero and negative values have no point
    /// representation as a transaction amount.
    pub fn from_requested(value: i64) -> Option<Self> {
        u64::try_from(value).ok().filter(|v| *v > 0).map(Points)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Points)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Points)
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Points(value)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
