//! Concrete state values carried by operation slots.
//!
//! The kernel never interprets a [`Commitment`]; only the injected
//! [`crate::capability::CommitmentAggregator`] does. Fractions are fixed-point
//! so that every implementation sums them identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Opaque confidential-amount commitment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(pub String);

impl Commitment {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-point ownership share of one token, eight decimal places.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fraction(pub u64);

impl Fraction {
    pub const DECIMALS: u32 = 8;
    /// One whole token.
    pub const UNIT: Fraction = Fraction(100_000_000);
    pub const ZERO: Fraction = Fraction(0);

    pub fn is_whole(self) -> bool {
        self == Self::UNIT
    }

    pub fn checked_add(self, other: Fraction) -> Option<Fraction> {
        self.0.checked_add(other.0).map(Fraction)
    }

    /// Parse decimal text such as `0.6` or `1`.
    pub fn from_decimal(s: &str) -> Result<Self, FractionError> {
        let bad = || FractionError(s.to_string());
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        if frac.len() > Self::DECIMALS as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let whole: u64 = int.parse().map_err(|_| bad())?;
        let mut scaled: u64 = 0;
        for (i, digit) in frac.bytes().enumerate() {
            let place = 10u64.pow(Self::DECIMALS - 1 - i as u32);
            scaled += u64::from(digit - b'0') * place;
        }
        whole
            .checked_mul(Self::UNIT.0)
            .and_then(|w| w.checked_add(scaled))
            .map(Fraction)
            .ok_or_else(bad)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::UNIT.0;
        let rest = self.0 % Self::UNIT.0;
        if rest == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{rest:08}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fraction `{0}` (expected decimal with at most 8 places)")]
pub struct FractionError(pub String);

/// Declaration of a non-fungible token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSpec {
    pub index: u32,
    #[serde(default)]
    pub fractionable: bool,
    #[serde(default)]
    pub engravable: bool,
    /// Allowed attachment media types; empty forbids attachments.
    #[serde(default)]
    pub attachment_types: BTreeSet<String>,
}

impl TokenSpec {
    /// The most restrictive spec, assumed for tokens nobody declared.
    pub fn strict(index: u32) -> Self {
        Self {
            index,
            fractionable: false,
            engravable: false,
            attachment_types: BTreeSet::new(),
        }
    }
}

/// Reference to an allocation produced by an earlier operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRef {
    pub op_id: String,
    pub index: u32,
}

impl AllocationRef {
    pub fn new(op_id: impl Into<String>, index: u32) -> Self {
        Self {
            op_id: op_id.into(),
            index,
        }
    }
}

impl fmt::Display for AllocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.op_id, self.index)
    }
}

/// The concrete value of one slot occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateValue {
    /// A right with no payload.
    Void,
    /// A revealed fungible amount.
    Amount { amount: u64 },
    /// A confidential fungible amount.
    Concealed { commitment: Commitment },
    /// A share of one non-fungible token.
    #[serde(rename_all = "camelCase")]
    Fraction { token: u32, fraction: Fraction },
    Token(TokenSpec),
    #[serde(rename_all = "camelCase")]
    Engraving { token: u32, content: String },
    #[serde(rename_all = "camelCase")]
    Attachment {
        token: u32,
        media_type: String,
        digest: String,
    },
    Data { hex: String },
}

/// Coarse value class; all occurrences of one field share a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueClass {
    Void,
    Amount,
    Fraction,
    Token,
    Engraving,
    Attachment,
    Data,
}

impl StateValue {
    pub fn amount(amount: u64) -> Self {
        StateValue::Amount { amount }
    }

    pub fn concealed(commitment: impl Into<String>) -> Self {
        StateValue::Concealed {
            commitment: Commitment::new(commitment),
        }
    }

    pub fn fraction(token: u32, fraction: Fraction) -> Self {
        StateValue::Fraction { token, fraction }
    }

    pub fn class(&self) -> ValueClass {
        match self {
            StateValue::Void => ValueClass::Void,
            StateValue::Amount { .. } | StateValue::Concealed { .. } => ValueClass::Amount,
            StateValue::Fraction { .. } => ValueClass::Fraction,
            StateValue::Token(_) => ValueClass::Token,
            StateValue::Engraving { .. } => ValueClass::Engraving,
            StateValue::Attachment { .. } => ValueClass::Attachment,
            StateValue::Data { .. } => ValueClass::Data,
        }
    }

    pub fn is_concealed(&self) -> bool {
        matches!(self, StateValue::Concealed { .. })
    }

    pub fn revealed_amount(&self) -> Option<u64> {
        match self {
            StateValue::Amount { amount } => Some(*amount),
            _ => None,
        }
    }
}
