//! Exact numeric answers
//!
//! Answers are either whole numbers or have a single decimal place, so they are
//! stored as a count of tenths. Equality is exact, which matters because a
//! choice is judged correct by comparing it with the answer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tenths per whole unit
const SCALE: i64 = 10;

/// A numeric answer or choice, stored as tenths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Value(i64);

impl Value {
    /// A whole number
    pub const fn whole(n: i64) -> Self {
        Self(n * SCALE)
    }

    /// A value expressed in tenths (`25` is `2.5`)
    pub const fn from_tenths(tenths: i64) -> Self {
        Self(tenths)
    }

    pub const fn tenths(self) -> i64 {
        self.0
    }

    /// True when there is no fractional part
    pub const fn is_whole(self) -> bool {
        self.0 % SCALE == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Shift by a whole number of units
    pub const fn offset(self, units: i64) -> Self {
        Self(self.0 + units * SCALE)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 / SCALE)
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            let abs = self.0.abs();
            write!(f, "{}{}.{}", sign, abs / SCALE, abs % SCALE)
        }
    }
}
