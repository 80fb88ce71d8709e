//! Strongly-typed codes used across the domain.
//!
//! The backend identifies products, clients and sales reps by opaque string
//! codes (ERP keys). They are kept as trimmed, non-empty strings.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Product code (`CODIGO` on the wire). Stable and unique per catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

/// Client code, passed to the product screen as `clienteCodigo`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientCode(String);

/// Sales representative identifier (`ID` in the login response).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesRepId(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse a code, trimming surrounding whitespace.
            ///
            /// Fails on empty input.
            pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_code(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_code_newtype!(ProductCode, "ProductCode");
impl_code_newtype!(ClientCode, "ClientCode");
impl_code_newtype!(SalesRepId, "SalesRepId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let code = ProductCode::parse("  A01 ").unwrap();
        assert_eq!(code.as_str(), "A01");
        assert_eq!(code.to_string(), "A01");
    }

    #[test]
    fn parse_rejects_blank_codes() {
        let err = ClientCode::parse("   ").unwrap_err();
        assert!(matches!(err, DomainError::InvalidCode(_)));
    }

    #[test]
    fn codes_serialize_as_plain_strings() {
        let code: SalesRepId = "239".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"239\"");
    }
}
