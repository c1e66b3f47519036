//! Run-level `serie` code and the fields derived from it

use std::fmt;
use std::str::FromStr;

/// Invoice series selecting a promotion family for a whole run
///
/// Known codes are 4 (Cielo), 5 (Nova) and 6 (Grenn). Any other code is
/// accepted and takes the same branches as 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Serie(pub i64);

impl Serie {
    pub const CIELO: Serie = Serie(4);
    pub const NOVA: Serie = Serie(5);
    pub const GRENN: Serie = Serie(6);

    pub fn code(self) -> i64 {
        self.0
    }

    /// Income sub-account (`ING_SCTA`): 4 → 2, 5 → 3, otherwise 4
    pub fn income_subaccount(self) -> i64 {
        match self.0 {
            4 => 2,
            5 => 3,
            _ => 4,
        }
    }

    /// Promotion code (`ING_PROMOCION`) keyed off the income sub-account
    pub fn promotion_code(self) -> i64 {
        match self.income_subaccount() {
            2 => 86,
            3 => 87,
            _ => 85,
        }
    }

    /// Display name used as the `CON_CONCEPTO` prefix
    pub fn promotion_name(self) -> String {
        promotion_name(self.promotion_code())
    }
}

impl Default for Serie {
    fn default() -> Self {
        Serie::GRENN
    }
}

impl fmt::Display for Serie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Serie {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Serie)
    }
}

/// Promotion display name; unknown codes fall back to their own digits
pub fn promotion_name(code: i64) -> String {
    match code {
        85 => "Grenn".to_string(),
        86 => "Cielo".to_string(),
        87 => "Nova".to_string(),
        other => other.to_string(),
    }
}
