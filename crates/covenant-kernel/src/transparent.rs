//! Transparent capability set.
//!
//! Amounts are revealed, commitments are decimal strings, proofs are looked
//! up in a table and the ledger lives in memory. Used by contracts without
//! confidentiality and by the test vectors.

use crate::capability::{AllocationLedger, CommitmentAggregator, ProofOracle};
use crate::ident::FieldName;
use crate::operation::Operation;
use crate::state::{AllocationRef, Commitment, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commitments are the decimal text of the amount they hide.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevealedAggregator;

impl RevealedAggregator {
    fn total(commitments: &[Commitment]) -> Option<u128> {
        commitments.iter().try_fold(0u128, |acc, c| {
            let amount: u64 = c.as_str().parse().ok()?;
            Some(acc + u128::from(amount))
        })
    }
}

impl CommitmentAggregator for RevealedAggregator {
    fn sum_equals(&self, inputs: &[Commitment], outputs: &[Commitment]) -> bool {
        match (Self::total(inputs), Self::total(outputs)) {
            (Some(i), Some(o)) => i == o,
            _ => false,
        }
    }

    fn commit_revealed(&self, amount: u64) -> Commitment {
        Commitment(amount.to_string())
    }
}

/// Proof identifiers mapped to the amount they attest.
///
/// A proof passes when it attests at least the claimed amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofTable {
    #[serde(default)]
    pub reserve: BTreeMap<String, u64>,
    #[serde(default)]
    pub burn: BTreeMap<String, u64>,
}

impl ProofTable {
    pub fn with_reserve(mut self, proof: impl Into<String>, amount: u64) -> Self {
        self.reserve.insert(proof.into(), amount);
        self
    }

    pub fn with_burn(mut self, proof: impl Into<String>, amount: u64) -> Self {
        self.burn.insert(proof.into(), amount);
        self
    }
}

impl ProofOracle for ProofTable {
    fn check_reserve_proof(&self, proof: &str, amount: u64) -> bool {
        self.reserve.get(proof).is_some_and(|a| *a >= amount)
    }

    fn check_burn_proof(&self, proof: &str, amount: u64) -> bool {
        self.burn.get(proof).is_some_and(|a| *a >= amount)
    }
}

/// In-memory allocation ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLedger {
    /// op id → output index → value
    #[serde(default)]
    pub outputs: BTreeMap<String, BTreeMap<u32, StateValue>>,
    #[serde(default)]
    pub globals: BTreeMap<FieldName, Vec<StateValue>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, allocation: AllocationRef, value: StateValue) {
        self.outputs
            .entry(allocation.op_id)
            .or_default()
            .insert(allocation.index, value);
    }

    pub fn push_global(&mut self, field: FieldName, value: StateValue) {
        self.globals.entry(field).or_default().push(value);
    }

    /// Record a verified operation under `op_id`.
    ///
    /// Assigned values are numbered consecutively across fields in field
    /// name order; returns the references of the new allocations.
    pub fn record(&mut self, op_id: &str, operation: &Operation) -> Vec<AllocationRef> {
        let mut refs = Vec::new();
        let mut index = 0u32;
        for values in operation.assigns.values() {
            for value in values {
                let allocation = AllocationRef::new(op_id, index);
                self.insert(allocation.clone(), value.clone());
                refs.push(allocation);
                index += 1;
            }
        }
        for (field, values) in &operation.globals {
            self.globals
                .entry(field.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
        refs
    }
}

impl AllocationLedger for MemoryLedger {
    fn prior_output(&self, allocation: &AllocationRef) -> Option<StateValue> {
        self.outputs
            .get(&allocation.op_id)
            .and_then(|outs| outs.get(&allocation.index))
            .cloned()
    }

    fn global_state(&self, field: &FieldName) -> Vec<StateValue> {
        self.globals.get(field).cloned().unwrap_or_default()
    }
}
