//! Validated identifiers for interface members.
//!
//! Every name that participates in composition (interfaces, fields,
//! operations, errors) is an ASCII identifier so that its byte
//! representation, and therefore every hash computed over it, is the same
//! in every implementation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Maximum length of any identifier.
pub const MAX_IDENT_LEN: usize = 64;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static identifier regex"));

static TYPE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)*$")
        .expect("static type reference regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier `{0}` exceeds {MAX_IDENT_LEN} characters")]
    TooLong(String),

    #[error("identifier `{0}` contains invalid characters")]
    InvalidChars(String),
}

fn check(s: &str, re: &Regex, max_len: usize) -> Result<(), IdentError> {
    if s.is_empty() {
        return Err(IdentError::Empty);
    }
    if s.len() > max_len {
        return Err(IdentError::TooLong(s.to_string()));
    }
    if !re.is_match(s) {
        return Err(IdentError::InvalidChars(s.to_string()));
    }
    Ok(())
}

macro_rules! ident_type {
    ($(#[$meta:meta])* $name:ident, $re:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Result<Self, IdentError> {
                let s = s.into();
                check(&s, &$re, $max)?;
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Build from a compile-time constant already known to be valid.
            #[allow(dead_code)]
            pub(crate) fn from_static(s: &'static str) -> Self {
                debug_assert!(check(s, &$re, $max).is_ok(), "invalid static identifier {s}");
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

ident_type!(
    /// Name of an interface, e.g. `FungibleAsset`.
    IfaceName,
    IDENT_RE,
    MAX_IDENT_LEN
);

ident_type!(
    /// Name of a global, owned, public or meta field.
    FieldName,
    IDENT_RE,
    MAX_IDENT_LEN
);

ident_type!(
    /// Name of an operation. The genesis is always named `genesis`.
    OpName,
    IDENT_RE,
    MAX_IDENT_LEN
);

ident_type!(
    /// Name of a declared error condition (also its verdict code).
    ErrorName,
    IDENT_RE,
    MAX_IDENT_LEN
);

ident_type!(
    /// Opaque reference to an external value type, e.g. `RGBContract.Amount`.
    TypeRef,
    TYPE_REF_RE,
    4 * MAX_IDENT_LEN
);

impl OpName {
    /// The reserved name of the genesis operation.
    pub fn genesis() -> Self {
        Self::from_static("genesis")
    }

    pub fn is_genesis(&self) -> bool {
        self.0 == "genesis"
    }
}
