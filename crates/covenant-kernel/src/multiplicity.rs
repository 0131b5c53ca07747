//! The multiplicity lattice.
//!
//! A multiplicity bounds how many occurrences of a field (or of a field
//! reference inside an operation) are admissible. The four points form a
//! lattice ordered by inclusion of the admitted counts:
//!
//! ```text
//!              ZeroOrMany
//!             /          \
//!       ZeroOrOne      OneOrMany
//!             \          /
//!              ExactlyOne
//! ```
//!
//! Each point is the product of two independent capabilities: admitting
//! zero occurrences and admitting more than one. Meet and join are then
//! componentwise AND / OR, which makes both total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Multiplicity {
    #[default]
    ExactlyOne,
    ZeroOrOne,
    OneOrMany,
    ZeroOrMany,
}

impl Multiplicity {
    pub const ALL: [Multiplicity; 4] = [
        Multiplicity::ExactlyOne,
        Multiplicity::ZeroOrOne,
        Multiplicity::OneOrMany,
        Multiplicity::ZeroOrMany,
    ];

    fn from_parts(zero: bool, many: bool) -> Self {
        match (zero, many) {
            (false, false) => Multiplicity::ExactlyOne,
            (true, false) => Multiplicity::ZeroOrOne,
            (false, true) => Multiplicity::OneOrMany,
            (true, true) => Multiplicity::ZeroOrMany,
        }
    }

    /// Whether zero occurrences are admitted.
    pub fn allows_zero(self) -> bool {
        matches!(self, Multiplicity::ZeroOrOne | Multiplicity::ZeroOrMany)
    }

    /// Whether more than one occurrence is admitted.
    pub fn allows_many(self) -> bool {
        matches!(self, Multiplicity::OneOrMany | Multiplicity::ZeroOrMany)
    }

    pub fn min(self) -> usize {
        if self.allows_zero() { 0 } else { 1 }
    }

    /// Upper bound, `None` when unbounded.
    pub fn max(self) -> Option<usize> {
        if self.allows_many() { None } else { Some(1) }
    }

    /// Whether `count` occurrences satisfy this bound.
    pub fn admits(self, count: usize) -> bool {
        count >= self.min() && self.max().is_none_or(|max| count <= max)
    }

    /// Inclusion: every count admitted by `self` is admitted by `other`.
    pub fn is_subset_of(self, other: Multiplicity) -> bool {
        (!self.allows_zero() || other.allows_zero()) && (!self.allows_many() || other.allows_many())
    }

    /// Greatest lower bound (intersection of admitted counts).
    pub fn meet(self, other: Multiplicity) -> Multiplicity {
        Self::from_parts(
            self.allows_zero() && other.allows_zero(),
            self.allows_many() && other.allows_many(),
        )
    }

    /// Least upper bound.
    pub fn join(self, other: Multiplicity) -> Multiplicity {
        Self::from_parts(
            self.allows_zero() || other.allows_zero(),
            self.allows_many() || other.allows_many(),
        )
    }

    /// Narrow an earlier declaration by a later one.
    ///
    /// A later declaration may only restrict what the earlier one admits;
    /// `None` signals a widening or incomparable redeclaration.
    pub fn narrow(earlier: Multiplicity, later: Multiplicity) -> Option<Multiplicity> {
        later
            .is_subset_of(earlier)
            .then(|| earlier.meet(later))
    }

    /// Source-format suffix (`""`, `"(?)"`, `"(+)"`, `"(*)"`).
    pub fn suffix(self) -> &'static str {
        match self {
            Multiplicity::ExactlyOne => "",
            Multiplicity::ZeroOrOne => "(?)",
            Multiplicity::OneOrMany => "(+)",
            Multiplicity::ZeroOrMany => "(*)",
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Multiplicity::ExactlyOne => "exactly one",
            Multiplicity::ZeroOrOne => "zero or one",
            Multiplicity::OneOrMany => "one or many",
            Multiplicity::ZeroOrMany => "zero or many",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown multiplicity suffix `{0}`")]
pub struct UnknownSuffix(pub String);

impl FromStr for Multiplicity {
    type Err = UnknownSuffix;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Multiplicity::ExactlyOne),
            "(?)" => Ok(Multiplicity::ZeroOrOne),
            "(+)" => Ok(Multiplicity::OneOrMany),
            "(*)" => Ok(Multiplicity::ZeroOrMany),
            other => Err(UnknownSuffix(other.to_string())),
        }
    }
}
