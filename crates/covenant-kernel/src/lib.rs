//! # Covenant Kernel
//!
//! Composable, versioned contract interfaces for digital assets, and the
//! engine that decides whether a concrete operation is admissible.
//!
//! Independent validators MUST agree: the same ordered interface set always
//! resolves to the same bytes, and the same operation always receives the
//! same verdict and rejection witness.
//!
//! ## Architecture
//!
//! ```text
//! SchemaCatalog            ← immutable, versioned Interface store
//!     │  select
//! resolve / ResolutionCache ← ordered merge → EffectiveContractInterface
//!     │
//! verify                   ← Operation + Capabilities → Verdict
//!     │
//! ProofOracle / CommitmentAggregator / AllocationLedger  (injected)
//! ```

pub mod cache;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod hash;
pub mod ident;
pub mod model;
pub mod multiplicity;
pub mod operation;
pub mod resolve;
pub mod state;
pub mod transparent;
pub mod verdict;
pub mod vocab;

pub use cache::ResolutionCache;
pub use capability::{AllocationLedger, Capabilities, CommitmentAggregator, ProofOracle};
pub use catalog::{Registration, SchemaCatalog};
pub use config::{CatalogConfig, ConfigError, CovenantConfig, EngineConfig, ResolverConfig};
pub use engine::{verify, verify_with};
pub use error::{CatalogError, CompositionError, EngineDefect};
pub use hash::ContentHash;
pub use ident::{ErrorName, FieldName, IdentError, IfaceName, OpName, TypeRef};
pub use model::{
    FieldDecl, Interface, Modifier, OpKind, OperationSpec, Slot, StateKind, Timestamp, Version,
};
pub use multiplicity::Multiplicity;
pub use operation::Operation;
pub use resolve::{
    CompositionWarning, EffectiveContractInterface, EffectiveOperation, InterfaceRef, resolve,
    resolve_with,
};
pub use state::{AllocationRef, Commitment, Fraction, StateValue, TokenSpec};
pub use verdict::{CheckStage, Rejection, Verdict};
