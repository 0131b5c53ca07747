//! Verification outcomes and deterministic rejection witnesses.
//!
//! Two validators rejecting the same operation for the same reason MUST
//! report identical witness ids:
//!
//! 1. Build the canonical key `{schema, stage, operation, code, field}`
//! 2. Serialize with JCS (sorted keys, no whitespace)
//! 3. `witnessId = "v1_" || base32hex_lower(SHA256(keyBytes))`

use crate::hash::{base32hex_lower_no_pad, canonical_json_bytes};
use crate::ident::{ErrorName, FieldName, OpName};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::fmt;

/// Witness key schema version.
pub const WITNESS_SCHEMA: u64 = 1;

/// Check stages in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckStage {
    Structural,
    Conservation,
    Supply,
    Allowance,
    Proof,
    Fractional,
}

impl CheckStage {
    pub const ORDER: [CheckStage; 6] = [
        CheckStage::Structural,
        CheckStage::Conservation,
        CheckStage::Supply,
        CheckStage::Allowance,
        CheckStage::Proof,
        CheckStage::Fractional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStage::Structural => "structural",
            CheckStage::Conservation => "conservation",
            CheckStage::Supply => "supply",
            CheckStage::Allowance => "allowance",
            CheckStage::Proof => "proof",
            CheckStage::Fractional => "fractional",
        }
    }
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation instance was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Deterministic witness id.
    pub witness_id: String,
    pub stage: CheckStage,
    pub operation: OpName,
    pub code: ErrorName,
    pub message: String,
    /// The field the failing check was about, if any.
    #[serde(default)]
    pub field: Option<FieldName>,
}

impl Rejection {
    pub fn new(
        stage: CheckStage,
        operation: OpName,
        code: ErrorName,
        message: impl Into<String>,
        field: Option<FieldName>,
    ) -> Self {
        let witness_id = compute_witness_id(stage, &operation, &code, field.as_ref());
        Self {
            witness_id,
            stage,
            operation,
            code,
            message: message.into(),
            field,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected at {} stage: {}", self.operation, self.stage, self.code)?;
        if let Some(field) = &self.field {
            write!(f, " (field `{field}`)")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Compute a rejection witness id.
pub fn compute_witness_id(
    stage: CheckStage,
    operation: &OpName,
    code: &ErrorName,
    field: Option<&FieldName>,
) -> String {
    let key = json!({
        "schema": WITNESS_SCHEMA,
        "stage": stage.as_str(),
        "operation": operation.as_str(),
        "code": code.as_str(),
        "field": field.map_or(Value::Null, |f| Value::String(f.to_string())),
    });
    // A json! object of strings and integers always serializes.
    let bytes = canonical_json_bytes(&key).unwrap_or_default();
    let hash = Sha256::digest(&bytes);
    format!("v1_{}", base32hex_lower_no_pad(&hash))
}

/// Outcome of verifying one operation instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Verdict {
    Valid,
    Invalid(Rejection),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(r) => Some(r),
        }
    }

    /// The rejection code, if invalid.
    pub fn code(&self) -> Option<&str> {
        self.rejection().map(|r| r.code.as_str())
    }
}
