//! Error types for catalog, composition and engine operations.
//!
//! Contract-level validation failures are not errors: they travel inside
//! [`crate::verdict::Verdict::Invalid`]. The enums here are reserved for
//! authoring mistakes, composition conflicts, and engine defects.

use crate::hash::ContentHash;
use crate::ident::{ErrorName, FieldName, IfaceName, OpName};
use crate::model::Version;
use crate::multiplicity::Multiplicity;

/// Errors raised by [`crate::catalog::SchemaCatalog`]. Each is fatal to one
/// registration or lookup; the catalog itself remains usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The (name, version) pair is already bound to different content.
    #[error(
        "interface {name} {version} is already registered with hash {existing}, refusing {offered}"
    )]
    DuplicateVersion {
        name: IfaceName,
        version: Version,
        existing: ContentHash,
        offered: ContentHash,
    },

    /// The interface violates a single-interface invariant.
    #[error("malformed declaration in {interface}: {reason}")]
    MalformedDeclaration { interface: String, reason: String },

    #[error("interface {name} {version} not found")]
    NotFound { name: String, version: Version },

    #[error("no interface with content hash {0}")]
    HashNotFound(ContentHash),

    #[error("catalog is full (capacity {capacity})")]
    CatalogFull { capacity: usize },
}

impl CatalogError {
    pub(crate) fn malformed(interface: &IfaceName, reason: impl Into<String>) -> Self {
        CatalogError::MalformedDeclaration {
            interface: interface.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that prevent an ordered interface set from producing an
/// [`crate::resolve::EffectiveContractInterface`]. No partial result is
/// ever cached for a failed composition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("cannot compose an empty interface set")]
    EmptyComposition,

    /// A later declaration widened (or crossed) an earlier multiplicity.
    #[error(
        "{interface} redeclares `{field}`{} as {later}, which is not within the earlier {earlier}",
        .operation.as_ref().map(|op| format!(" in operation `{op}`")).unwrap_or_default()
    )]
    MultiplicityConflict {
        field: FieldName,
        operation: Option<OpName>,
        interface: IfaceName,
        earlier: Multiplicity,
        later: Multiplicity,
    },

    /// A same-named field changed its state kind or value type.
    #[error("{interface} redeclares field `{field}` as {later}, earlier declared as {earlier}")]
    TypeConflict {
        field: FieldName,
        interface: IfaceName,
        earlier: String,
        later: String,
    },

    #[error("operation `{operation}` declared abstract by {declared_by} was never implemented")]
    UnresolvedAbstract {
        operation: OpName,
        declared_by: IfaceName,
    },

    #[error("{redeclared_by} redeclares operation `{operation}` finalized by {finalized_by}")]
    FinalOverrideViolation {
        operation: OpName,
        finalized_by: IfaceName,
        redeclared_by: IfaceName,
    },

    #[error("operation `{operation}` required by {required_by} is not provided by the composition")]
    MissingRequiredOperation {
        operation: OpName,
        required_by: IfaceName,
    },

    #[error(
        "{interface} names `{second}` as default assignment of `{operation}`, already `{first}`"
    )]
    AmbiguousDefault {
        operation: OpName,
        interface: IfaceName,
        first: FieldName,
        second: FieldName,
    },

    #[error("composition produced {count} warning(s) and warnings are denied; first: {first}")]
    WarningsDenied { count: usize, first: String },

    /// A member fails its own single-interface checks.
    #[error(transparent)]
    InvalidMember(#[from] CatalogError),
}

/// A defect in the engine itself. Never a contract-level verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineDefect {
    /// The engine tried to reject with a code the operation does not declare.
    #[error(
        "internal inconsistency: operation `{operation}` cannot fail with `{code}`; declared codes: [{}]",
        .declared.iter().map(ErrorName::as_str).collect::<Vec<_>>().join(", ")
    )]
    InternalInconsistency {
        operation: OpName,
        code: ErrorName,
        declared: Vec<ErrorName>,
    },
}
