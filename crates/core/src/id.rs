//! Strongly-typed identifiers used across the domain.
//!
//! Host records are addressed by positive integers, the same way the frontend
//! and the notification payloads refer to them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a host-managed record (sale order, picking, product, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

/// Identifier of a user (actor identity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl From<$t> for serde_json::Value {
            fn from(value: $t) -> Self {
                serde_json::Value::from(value.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if value == 0 {
                    return Err(DomainError::invalid_id(format!("{}: must be positive", $name)));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(RecordId, "RecordId");
impl_int_newtype!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        let id: RecordId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(matches!("0".parse::<UserId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("abc".parse::<RecordId>(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_value(UserId::new(5)).unwrap();
        assert_eq!(json, serde_json::json!(5));
        assert_eq!(serde_json::Value::from(RecordId::new(7)), serde_json::json!(7));
    }
}
