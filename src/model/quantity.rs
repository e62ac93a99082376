use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Day-equivalent leave quantity, stored as hundredths of a working day.
///
/// Balances and requested amounts are compared and subtracted from each other,
/// so they are kept in fixed-point centidays rather than floats: the same
/// input always produces the same stored value, and equality checks are exact.
/// The JSON form (seed files, API responses) is a plain day number with two
/// decimal places, e.g. `0.44`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(u32);

impl Quantity {
    pub fn from_centidays(centidays: u32) -> Self {
        Quantity(centidays)
    }

    /// Whole calendar days, e.g. a 3-day request.
    pub fn from_whole_days(days: u32) -> Self {
        Quantity(days * 100)
    }

    /// Whole calendar days from an unbounded count. `None` if the span does
    /// not fit the centiday representation.
    pub fn from_whole_days_checked(days: u64) -> Option<Self> {
        let centidays = days.checked_mul(100)?;
        u32::try_from(centidays).ok().map(Quantity)
    }

    pub fn centidays(&self) -> u32 {
        self.0
    }

    pub fn as_days(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    pub fn saturating_add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_days())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_days())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = f64::deserialize(deserializer)?;
        if !days.is_finite() || days < 0.0 {
            return Err(de::Error::custom("leave quantity must be a non-negative number"));
        }
        // Half-up to two decimals, same rule the conversion engine uses.
        Ok(Quantity((days * 100.0).round() as u32))
    }
}
