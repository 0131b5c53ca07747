//! Interface data model.
//!
//! An [`Interface`] is a versioned, immutable declaration of the state a
//! contract carries, the operations that may change it, and the named error
//! conditions a validator enforces. Interfaces are identified by their
//! content hash; any edit produces a new (name, version, hash) triple.

use crate::error::CatalogError;
use crate::hash::ContentHash;
use crate::ident::{ErrorName, FieldName, IfaceName, OpName, TypeRef};
use crate::multiplicity::Multiplicity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Interface version, rendered `v1`, `v2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u16);

impl Version {
    pub const V1: Version = Version(1);
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('v')
            .and_then(|n| n.parse::<u16>().ok())
            .filter(|n| *n > 0)
            .map(Version)
            .ok_or_else(|| format!("invalid version tag `{s}` (expected v1, v2, ...)"))
    }
}

/// UTC instant with second precision, stored as unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(s)?.timestamp()))
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => write!(f, "@{}", self.0),
        }
    }
}

/// Where a field's state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateKind {
    /// Contract-wide state visible to all validators.
    Global,
    /// State held privately by parties; allocations may be concealed.
    Owned,
    /// Capability rights; always revealed.
    Public,
}

impl StateKind {
    pub fn keyword(self) -> &'static str {
        match self {
            StateKind::Global => "global",
            StateKind::Owned => "owned",
            StateKind::Public => "public",
        }
    }

    /// Whether values of this kind may appear in `inputs`/`assigns`.
    pub fn is_assignable(self) -> bool {
        !matches!(self, StateKind::Global)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDecl {
    pub kind: StateKind,
    pub value_type: TypeRef,
    pub multiplicity: Multiplicity,
}

impl FieldDecl {
    pub fn new(kind: StateKind, value_type: TypeRef, multiplicity: Multiplicity) -> Self {
        Self {
            kind,
            value_type,
            multiplicity,
        }
    }

    /// Kind and type, for conflict reporting.
    pub fn signature(&self) -> String {
        format!("{} {}", self.kind, self.value_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpKind {
    Genesis,
    Transition,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Genesis => "genesis",
            OpKind::Transition => "transition",
        })
    }
}

/// Refinement modifiers on an operation declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    /// The operation must exist in any composition containing this declaration.
    Required,
    /// Declared without implementation; a later `Override` or `Default` must supply one.
    Abstract,
    /// Refines an operation declared earlier in the composition order.
    Override,
    /// Supplies a default implementation, creating the operation if absent.
    Default,
    /// No later interface may redeclare the operation.
    Final,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Required,
        Modifier::Abstract,
        Modifier::Override,
        Modifier::Default,
        Modifier::Final,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Required => "required",
            Modifier::Abstract => "abstract",
            Modifier::Override => "override",
            Modifier::Default => "default",
            Modifier::Final => "final",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.keyword() == s)
    }
}

/// One operation declaration inside one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub kind: OpKind,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub globals: BTreeMap<FieldName, Multiplicity>,
    #[serde(default)]
    pub inputs: BTreeMap<FieldName, Multiplicity>,
    #[serde(default)]
    pub assigns: BTreeMap<FieldName, Multiplicity>,
    #[serde(default)]
    pub meta: BTreeSet<FieldName>,
    #[serde(default)]
    pub errors: BTreeSet<ErrorName>,
    /// Owned field receiving unlabeled newly created value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_assignment: Option<FieldName>,
}

impl OperationSpec {
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            modifiers: BTreeSet::new(),
            globals: BTreeMap::new(),
            inputs: BTreeMap::new(),
            assigns: BTreeMap::new(),
            meta: BTreeSet::new(),
            errors: BTreeSet::new(),
            default_assignment: None,
        }
    }

    pub fn genesis() -> Self {
        Self::new(OpKind::Genesis)
    }

    pub fn transition() -> Self {
        Self::new(OpKind::Transition)
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn global(mut self, field: FieldName, multiplicity: Multiplicity) -> Self {
        self.globals.insert(field, multiplicity);
        self
    }

    pub fn input(mut self, field: FieldName, multiplicity: Multiplicity) -> Self {
        self.inputs.insert(field, multiplicity);
        self
    }

    pub fn assign(mut self, field: FieldName, multiplicity: Multiplicity) -> Self {
        self.assigns.insert(field, multiplicity);
        self
    }

    pub fn meta_field(mut self, field: FieldName) -> Self {
        self.meta.insert(field);
        self
    }

    pub fn error(mut self, error: ErrorName) -> Self {
        self.errors.insert(error);
        self
    }

    pub fn default_to(mut self, field: FieldName) -> Self {
        self.default_assignment = Some(field);
        self
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_required(&self) -> bool {
        self.has(Modifier::Required)
    }

    /// Whether this declaration supplies an implementation for a pending
    /// abstract declaration.
    pub fn resolves_abstract(&self) -> bool {
        self.has(Modifier::Override) || self.has(Modifier::Default)
    }

    /// All field references in `globals`, `inputs`, `assigns` order.
    pub fn field_refs(&self) -> impl Iterator<Item = (Slot, &FieldName, Multiplicity)> {
        let globals = self.globals.iter().map(|(f, m)| (Slot::Globals, f, *m));
        let inputs = self.inputs.iter().map(|(f, m)| (Slot::Inputs, f, *m));
        let assigns = self.assigns.iter().map(|(f, m)| (Slot::Assigns, f, *m));
        globals.chain(inputs).chain(assigns)
    }
}

/// The slot lists of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Globals,
    Inputs,
    Assigns,
    Meta,
}

impl Slot {
    pub fn keyword(self) -> &'static str {
        match self {
            Slot::Globals => "globals",
            Slot::Inputs => "inputs",
            Slot::Assigns => "assigns",
            Slot::Meta => "meta",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A versioned, immutable interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: IfaceName,
    pub version: Version,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub fields: BTreeMap<FieldName, FieldDecl>,
    #[serde(default)]
    pub operations: BTreeMap<OpName, OperationSpec>,
    #[serde(default)]
    pub errors: BTreeMap<ErrorName, String>,
    /// Operation an unlabeled transfer request maps to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operation: Option<OpName>,
}

impl Interface {
    pub fn new(name: IfaceName, version: Version, timestamp: Timestamp) -> Self {
        Self {
            name,
            version,
            timestamp,
            fields: BTreeMap::new(),
            operations: BTreeMap::new(),
            errors: BTreeMap::new(),
            default_operation: None,
        }
    }

    pub fn field(mut self, name: FieldName, decl: FieldDecl) -> Self {
        self.fields.insert(name, decl);
        self
    }

    pub fn operation(mut self, name: OpName, spec: OperationSpec) -> Self {
        self.operations.insert(name, spec);
        self
    }

    pub fn error(mut self, name: ErrorName, message: impl Into<String>) -> Self {
        self.errors.insert(name, message.into());
        self
    }

    /// Content identity: SHA-256 of the canonical JSON encoding.
    pub fn content_hash(&self) -> Result<ContentHash, CatalogError> {
        ContentHash::of_canonical(self)
            .map_err(|e| CatalogError::malformed(&self.name, format!("canonical encoding: {e}")))
    }

    pub fn genesis(&self) -> Option<&OperationSpec> {
        self.operations.get("genesis")
    }

    /// Check the invariants that hold for a single interface in isolation.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let name = &self.name;
        for (op_name, spec) in &self.operations {
            match (op_name.is_genesis(), spec.kind) {
                (true, OpKind::Transition) => {
                    return Err(CatalogError::malformed(
                        name,
                        "`genesis` is reserved for the genesis operation",
                    ));
                }
                (false, OpKind::Genesis) => {
                    return Err(CatalogError::malformed(
                        name,
                        format!("genesis operation must be named `genesis`, found `{op_name}`"),
                    ));
                }
                _ => {}
            }

            let contradictions = [
                (Modifier::Abstract, Modifier::Final),
                (Modifier::Abstract, Modifier::Override),
                (Modifier::Abstract, Modifier::Default),
            ];
            for (a, b) in contradictions {
                if spec.has(a) && spec.has(b) {
                    return Err(CatalogError::malformed(
                        name,
                        format!(
                            "operation `{op_name}` cannot be both {} and {}",
                            a.keyword(),
                            b.keyword()
                        ),
                    ));
                }
            }
            if spec.has(Modifier::Default) && spec.default_assignment.is_none() {
                return Err(CatalogError::malformed(
                    name,
                    format!("operation `{op_name}` is marked default but names no default target"),
                ));
            }

            for (slot, field, _) in spec.field_refs() {
                let Some(decl) = self.fields.get(field) else {
                    continue;
                };
                let ok = match slot {
                    Slot::Globals => decl.kind == StateKind::Global,
                    _ => decl.kind.is_assignable(),
                };
                if !ok {
                    return Err(CatalogError::malformed(
                        name,
                        format!(
                            "operation `{op_name}` lists {} field `{field}` under {slot}",
                            decl.kind
                        ),
                    ));
                }
            }
            if let Some(target) = &spec.default_assignment {
                if let Some(decl) = self.fields.get(target) {
                    if !decl.kind.is_assignable() {
                        return Err(CatalogError::malformed(
                            name,
                            format!(
                                "operation `{op_name}` defaults to global field `{target}`"
                            ),
                        ));
                    }
                }
            }
            for meta in &spec.meta {
                if self.fields.contains_key(meta) {
                    return Err(CatalogError::malformed(
                        name,
                        format!("meta entry `{meta}` of `{op_name}` shadows a state field"),
                    ));
                }
            }
        }

        for (err, message) in &self.errors {
            if message.trim().is_empty() {
                return Err(CatalogError::malformed(
                    name,
                    format!("error `{err}` has an empty message"),
                ));
            }
        }
        Ok(())
    }
}
