//! Product key parsing
//!
//! Splits a raw product id such as `sub_monthly_2` into a stable family id
//! (`sub_monthly`) and a numeric version (`2`), so that versioned variants of
//! one purchasable item can be grouped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between family segments and the trailing version
pub const VERSION_SEPARATOR: char = '_';

/// Family id and version derived from a raw product id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    /// Identifier shared by every version of the product
    pub family_id: String,
    /// Trailing numeric version, 0 when absent
    pub version: u32,
}

impl ProductKey {
    /// Parse a raw product id. Never fails.
    ///
    /// The last `_`-separated segment is the version when it consists only of
    /// ASCII digits and fits in a `u32`; everything before it is the family
    /// id. Any other input is its own family at version 0.
    pub fn parse(raw: &str) -> Self {
        if let Some((family, last)) = raw.rsplit_once(VERSION_SEPARATOR) {
            if let Some(version) = parse_version(last) {
                return Self {
                    family_id: family.to_string(),
                    version,
                };
            }
        }

        Self {
            family_id: raw.to_string(),
            version: 0,
        }
    }
}

fn parse_version(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.family_id, self.version)
    }
}
