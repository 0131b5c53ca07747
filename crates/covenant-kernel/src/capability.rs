//! Injected capabilities.
//!
//! The engine never implements commitment arithmetic, proof checking or
//! allocation storage itself. Callers pass implementations of these traits,
//! so the same verification logic runs over transparent test doubles and
//! over a real confidential-amount scheme.

use crate::ident::FieldName;
use crate::state::{AllocationRef, Commitment, StateValue};

/// Checks reserve and burn proofs.
pub trait ProofOracle {
    /// Does `proof` attest locked collateral of at least `amount`?
    fn check_reserve_proof(&self, proof: &str, amount: u64) -> bool;

    /// Does `proof` attest destruction of at least `amount`?
    fn check_burn_proof(&self, proof: &str, amount: u64) -> bool;
}

/// Homomorphic arithmetic over amount commitments.
pub trait CommitmentAggregator {
    /// Whether the committed inputs and outputs sum to the same amount.
    fn sum_equals(&self, inputs: &[Commitment], outputs: &[Commitment]) -> bool;

    /// Commit a publicly known amount with zero blinding, so it can be
    /// compared against confidential allocations.
    fn commit_revealed(&self, amount: u64) -> Commitment;
}

/// Read access to allocations and global state of already-valid operations.
pub trait AllocationLedger {
    fn prior_output(&self, allocation: &AllocationRef) -> Option<StateValue>;

    /// Every global value recorded for `field`, in acceptance order.
    fn global_state(&self, field: &FieldName) -> Vec<StateValue>;
}

/// The capability bundle one verification call runs against.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub proofs: &'a dyn ProofOracle,
    pub commitments: &'a dyn CommitmentAggregator,
    pub ledger: &'a dyn AllocationLedger,
}

impl<'a> Capabilities<'a> {
    pub fn new(
        proofs: &'a dyn ProofOracle,
        commitments: &'a dyn CommitmentAggregator,
        ledger: &'a dyn AllocationLedger,
    ) -> Self {
        Self {
            proofs,
            commitments,
            ledger,
        }
    }
}

impl std::fmt::Debug for Capabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
