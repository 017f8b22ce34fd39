//! Canonical identifiers
//!
//! Book and user ids arrive as integers, strings, or floats with no
//! fractional part (`1001.0`, a side effect of tabular tooling). They are
//! normalized once at the boundary so the catalog, the ledger and the
//! embedding index all agree on one string form.

use serde::Serialize;
use std::fmt;

/// Canonical string form of an identifier.
///
/// Trims whitespace and strips an all-zero fractional part from
/// integer-looking values: `"1001.0"` becomes `"1001"`, `"1.5"` and
/// `"abc"` are returned unchanged.
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((int_part, frac_part)) = trimmed.split_once('.') {
        let digits = int_part.strip_prefix('-').unwrap_or(int_part);
        let integral = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        let zero_frac = !frac_part.is_empty() && frac_part.bytes().all(|b| b == b'0');
        if integral && zero_frac {
            return int_part.to_string();
        }
    }
    trimmed.to_string()
}

/// Canonical form of a JSON identifier (number or string)
pub(crate) fn canonical_json_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(canonical_id(s)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        (f as i64).to_string()
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// Book identifier in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical_id(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<i64> for BookId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

/// Patron identifier in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical_id(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}
