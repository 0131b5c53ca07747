//! Composition resolver.
//!
//! Merges a caller-ordered interface list (root first, most specific last)
//! into one [`EffectiveContractInterface`] in a single left-to-right pass.
//! The order is data: the resolver never reorders or infers precedence, so
//! two implementations given the same list agree bit-for-bit.
//!
//! Operation modifiers follow refinement rules:
//!
//! - `override` refines an operation declared earlier and resolves a
//!   pending `abstract`; an optional override with nothing to refine is
//!   skipped, a required one fails
//! - `default` supplies an implementation, creating the operation if absent
//! - `abstract` leaves the operation pending until overridden
//! - `final` closes the operation to any later redeclaration

use crate::config::ResolverConfig;
use crate::error::{CatalogError, CompositionError};
use crate::hash::{ContentHash, canonical_json_bytes};
use crate::ident::{ErrorName, FieldName, IfaceName, OpName};
use crate::model::{FieldDecl, Interface, Modifier, OpKind, OperationSpec, Version};
use crate::multiplicity::Multiplicity;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

const COMPOSITION_DOMAIN: &str = "covenant.v1.composition";

/// One member of a composition, as it was when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRef {
    pub name: IfaceName,
    pub version: Version,
    pub hash: ContentHash,
}

impl fmt::Display for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.version, self.hash)
    }
}

/// A fully merged operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveOperation {
    pub name: OpName,
    pub kind: OpKind,
    pub required: bool,
    pub is_final: bool,
    pub globals: BTreeMap<FieldName, Multiplicity>,
    pub inputs: BTreeMap<FieldName, Multiplicity>,
    pub assigns: BTreeMap<FieldName, Multiplicity>,
    pub meta: BTreeSet<FieldName>,
    pub errors: BTreeSet<ErrorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_assignment: Option<FieldName>,
    /// Interfaces that contributed a declaration, in composition order.
    pub declared_by: Vec<IfaceName>,
}

impl EffectiveOperation {
    fn from_spec(name: OpName, spec: &OperationSpec, iface: &IfaceName) -> Self {
        Self {
            name,
            kind: spec.kind,
            required: spec.is_required(),
            is_final: spec.has(Modifier::Final),
            globals: spec.globals.clone(),
            inputs: spec.inputs.clone(),
            assigns: spec.assigns.clone(),
            meta: spec.meta.clone(),
            errors: spec.errors.clone(),
            default_assignment: spec.default_assignment.clone(),
            declared_by: vec![iface.clone()],
        }
    }

    pub fn declares_error(&self, code: &str) -> bool {
        self.errors.contains(code)
    }
}

/// Non-fatal findings of a successful composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "camelCase")]
pub enum CompositionWarning {
    /// Two interfaces declare the same error name with different messages.
    /// The first message is kept.
    #[serde(rename_all = "camelCase")]
    ErrorMessageCollision {
        error: ErrorName,
        interface: IfaceName,
        kept: String,
        ignored: String,
    },
    /// An operation names an error no interface in the set declares.
    #[serde(rename_all = "camelCase")]
    UndeclaredErrorReference { operation: OpName, error: ErrorName },
    /// The chosen default operation is not part of the merged set.
    #[serde(rename_all = "camelCase")]
    DanglingDefaultOperation {
        operation: OpName,
        interface: IfaceName,
    },
}

impl fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionWarning::ErrorMessageCollision {
                error,
                interface,
                kept,
                ignored,
            } => write!(
                f,
                "{interface} redeclares error `{error}` with message {ignored:?}; keeping {kept:?}"
            ),
            CompositionWarning::UndeclaredErrorReference { operation, error } => {
                write!(f, "operation `{operation}` references undeclared error `{error}`")
            }
            CompositionWarning::DanglingDefaultOperation {
                operation,
                interface,
            } => write!(
                f,
                "{interface} names `{operation}` as default operation, which the composition lacks"
            ),
        }
    }
}

/// The deterministic merge of an ordered interface set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveContractInterface {
    /// Composition identity, a hash over the ordered member hashes.
    pub id: ContentHash,
    pub interfaces: Vec<InterfaceRef>,
    pub fields: BTreeMap<FieldName, FieldDecl>,
    pub operations: BTreeMap<OpName, EffectiveOperation>,
    pub errors: BTreeMap<ErrorName, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operation: Option<OpName>,
    #[serde(default)]
    pub warnings: Vec<CompositionWarning>,
}

impl EffectiveContractInterface {
    pub fn operation(&self, name: &str) -> Option<&EffectiveOperation> {
        self.operations.get(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.get(name)
    }

    pub fn error_message(&self, code: &str) -> Option<&str> {
        self.errors.get(code).map(String::as_str)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &OpName> {
        self.operations.keys()
    }

    /// Canonical JSON bytes; equal inputs give equal bytes.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        canonical_json_bytes(self)
    }
}

/// Composition identity of an ordered member list.
pub fn composition_id<'a>(members: impl IntoIterator<Item = &'a InterfaceRef>) -> ContentHash {
    members
        .into_iter()
        .fold(ContentHash::builder(COMPOSITION_DOMAIN), |b, m| {
            b.field("interface", &m.to_string())
        })
        .finish()
}

/// Member references of an interface list, with their content hashes.
pub fn interface_refs<I>(interfaces: &[I]) -> Result<Vec<InterfaceRef>, CatalogError>
where
    I: Borrow<Interface>,
{
    interfaces
        .iter()
        .map(|i| {
            let i: &Interface = i.borrow();
            Ok(InterfaceRef {
                name: i.name.clone(),
                version: i.version,
                hash: i.content_hash()?,
            })
        })
        .collect()
}

/// Resolve with default settings.
pub fn resolve<I>(interfaces: &[I]) -> Result<EffectiveContractInterface, CompositionError>
where
    I: Borrow<Interface>,
{
    resolve_with(interfaces, &ResolverConfig::default())
}

pub fn resolve_with<I>(
    interfaces: &[I],
    config: &ResolverConfig,
) -> Result<EffectiveContractInterface, CompositionError>
where
    I: Borrow<Interface>,
{
    let refs = interface_refs(interfaces)?;
    resolve_refs(interfaces, refs, config)
}

/// Resolve when member references are already known (e.g. from a catalog).
pub(crate) fn resolve_refs<I>(
    interfaces: &[I],
    refs: Vec<InterfaceRef>,
    config: &ResolverConfig,
) -> Result<EffectiveContractInterface, CompositionError>
where
    I: Borrow<Interface>,
{
    if interfaces.is_empty() {
        return Err(CompositionError::EmptyComposition);
    }
    for iface in interfaces {
        iface.borrow().validate()?;
    }
    let id = composition_id(&refs);
    debug!(target: "covenant::resolve", composition = %id.short(), members = refs.len(), "resolving");

    let mut merge = Merge::default();
    for iface in interfaces {
        merge.absorb(iface.borrow())?;
    }
    let leaf = refs
        .last()
        .map(|r| r.name.clone())
        .ok_or(CompositionError::EmptyComposition)?;
    let effective = merge.finish(id, refs, leaf)?;

    if config.deny_warnings {
        if let Some(first) = effective.warnings.first() {
            return Err(CompositionError::WarningsDenied {
                count: effective.warnings.len(),
                first: first.to_string(),
            });
        }
    }
    debug!(
        target: "covenant::resolve",
        composition = %effective.id.short(),
        operations = effective.operations.len(),
        warnings = effective.warnings.len(),
        "resolved"
    );
    Ok(effective)
}

#[derive(Debug)]
struct OpState {
    op: EffectiveOperation,
    /// Interface whose `abstract` declaration is still unimplemented.
    pending_abstract: Option<IfaceName>,
    finalized_by: Option<IfaceName>,
}

#[derive(Debug, Default)]
struct Merge {
    fields: BTreeMap<FieldName, FieldDecl>,
    operations: BTreeMap<OpName, OpState>,
    errors: BTreeMap<ErrorName, String>,
    default_operation: Option<(OpName, IfaceName)>,
    warnings: Vec<CompositionWarning>,
}

impl Merge {
    fn absorb(&mut self, iface: &Interface) -> Result<(), CompositionError> {
        for (name, decl) in &iface.fields {
            self.merge_field(iface, name, decl)?;
        }
        for (name, spec) in &iface.operations {
            self.merge_operation(iface, name, spec)?;
        }
        for (name, message) in &iface.errors {
            self.merge_error(iface, name, message);
        }
        if let Some(op) = &iface.default_operation {
            self.default_operation = Some((op.clone(), iface.name.clone()));
        }
        Ok(())
    }

    fn merge_field(
        &mut self,
        iface: &Interface,
        name: &FieldName,
        decl: &FieldDecl,
    ) -> Result<(), CompositionError> {
        let Some(earlier) = self.fields.get_mut(name) else {
            self.fields.insert(name.clone(), decl.clone());
            return Ok(());
        };
        if earlier.kind != decl.kind || earlier.value_type != decl.value_type {
            return Err(CompositionError::TypeConflict {
                field: name.clone(),
                interface: iface.name.clone(),
                earlier: earlier.signature(),
                later: decl.signature(),
            });
        }
        earlier.multiplicity = Multiplicity::narrow(earlier.multiplicity, decl.multiplicity)
            .ok_or_else(|| CompositionError::MultiplicityConflict {
                field: name.clone(),
                operation: None,
                interface: iface.name.clone(),
                earlier: earlier.multiplicity,
                later: decl.multiplicity,
            })?;
        Ok(())
    }

    fn merge_operation(
        &mut self,
        iface: &Interface,
        name: &OpName,
        spec: &OperationSpec,
    ) -> Result<(), CompositionError> {
        let Some(state) = self.operations.get_mut(name) else {
            if spec.has(Modifier::Override) && !spec.has(Modifier::Default) {
                if spec.is_required() {
                    return Err(CompositionError::MissingRequiredOperation {
                        operation: name.clone(),
                        required_by: iface.name.clone(),
                    });
                }
                debug!(
                    target: "covenant::resolve",
                    interface = %iface.name,
                    operation = %name,
                    "optional override has nothing to refine, skipped"
                );
                return Ok(());
            }
            debug!(target: "covenant::resolve", interface = %iface.name, operation = %name, "declared");
            self.operations.insert(
                name.clone(),
                OpState {
                    op: EffectiveOperation::from_spec(name.clone(), spec, &iface.name),
                    pending_abstract: spec.has(Modifier::Abstract).then(|| iface.name.clone()),
                    finalized_by: spec.has(Modifier::Final).then(|| iface.name.clone()),
                },
            );
            return Ok(());
        };

        if let Some(finalized_by) = &state.finalized_by {
            return Err(CompositionError::FinalOverrideViolation {
                operation: name.clone(),
                finalized_by: finalized_by.clone(),
                redeclared_by: iface.name.clone(),
            });
        }

        let op = &mut state.op;
        for (slot, later) in [
            (&mut op.globals, &spec.globals),
            (&mut op.inputs, &spec.inputs),
            (&mut op.assigns, &spec.assigns),
        ] {
            narrow_refs(slot, later, name, &iface.name)?;
        }
        op.meta.extend(spec.meta.iter().cloned());
        op.errors.extend(spec.errors.iter().cloned());

        match (&op.default_assignment, &spec.default_assignment) {
            (Some(first), Some(second)) if first != second => {
                return Err(CompositionError::AmbiguousDefault {
                    operation: name.clone(),
                    interface: iface.name.clone(),
                    first: first.clone(),
                    second: second.clone(),
                });
            }
            (None, Some(target)) => op.default_assignment = Some(target.clone()),
            _ => {}
        }

        op.required |= spec.is_required();
        op.declared_by.push(iface.name.clone());

        if spec.resolves_abstract() {
            if let Some(declared_by) = state.pending_abstract.take() {
                debug!(
                    target: "covenant::resolve",
                    operation = %name,
                    abstract_in = %declared_by,
                    implemented_in = %iface.name,
                    "abstract operation implemented"
                );
            }
        } else if spec.has(Modifier::Abstract) {
            state.pending_abstract = Some(iface.name.clone());
        }
        if spec.has(Modifier::Final) {
            state.op.is_final = true;
            state.finalized_by = Some(iface.name.clone());
        }
        Ok(())
    }

    fn merge_error(&mut self, iface: &Interface, name: &ErrorName, message: &str) {
        match self.errors.get(name) {
            None => {
                self.errors.insert(name.clone(), message.to_string());
            }
            Some(kept) if kept == message => {}
            Some(kept) => {
                let warning = CompositionWarning::ErrorMessageCollision {
                    error: name.clone(),
                    interface: iface.name.clone(),
                    kept: kept.clone(),
                    ignored: message.to_string(),
                };
                warn!(target: "covenant::resolve", "{warning}");
                self.warnings.push(warning);
            }
        }
    }

    fn finish(
        mut self,
        id: ContentHash,
        interfaces: Vec<InterfaceRef>,
        leaf: IfaceName,
    ) -> Result<EffectiveContractInterface, CompositionError> {
        if let Some((name, state)) = self
            .operations
            .iter()
            .find(|(_, s)| s.pending_abstract.is_some())
        {
            return Err(CompositionError::UnresolvedAbstract {
                operation: name.clone(),
                declared_by: state.pending_abstract.clone().unwrap_or_else(|| leaf.clone()),
            });
        }
        if !self.operations.contains_key("genesis") {
            return Err(CompositionError::MissingRequiredOperation {
                operation: OpName::genesis(),
                required_by: leaf,
            });
        }

        let operations: BTreeMap<OpName, EffectiveOperation> = self
            .operations
            .into_iter()
            .map(|(name, state)| (name, state.op))
            .collect();

        for op in operations.values() {
            for error in &op.errors {
                if !self.errors.contains_key(error) {
                    let warning = CompositionWarning::UndeclaredErrorReference {
                        operation: op.name.clone(),
                        error: error.clone(),
                    };
                    warn!(target: "covenant::resolve", "{warning}");
                    self.warnings.push(warning);
                }
            }
        }

        let default_operation = match self.default_operation {
            Some((op, _)) if operations.contains_key(&op) => Some(op),
            Some((op, interface)) => {
                let warning = CompositionWarning::DanglingDefaultOperation {
                    operation: op,
                    interface,
                };
                warn!(target: "covenant::resolve", "{warning}");
                self.warnings.push(warning);
                None
            }
            None => None,
        };

        Ok(EffectiveContractInterface {
            id,
            interfaces,
            fields: self.fields,
            operations,
            errors: self.errors,
            default_operation,
            warnings: self.warnings,
        })
    }
}

fn narrow_refs(
    earlier: &mut BTreeMap<FieldName, Multiplicity>,
    later: &BTreeMap<FieldName, Multiplicity>,
    operation: &OpName,
    interface: &IfaceName,
) -> Result<(), CompositionError> {
    for (field, m) in later {
        match earlier.get_mut(field) {
            None => {
                earlier.insert(field.clone(), *m);
            }
            Some(current) => {
                *current = Multiplicity::narrow(*current, *m).ok_or_else(|| {
                    CompositionError::MultiplicityConflict {
                        field: field.clone(),
                        operation: Some(operation.clone()),
                        interface: interface.clone(),
                        earlier: *current,
                        later: *m,
                    }
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StateKind, Timestamp};
    use crate::ident::TypeRef;
    use crate::multiplicity::Multiplicity::*;

    fn f(s: &str) -> FieldName {
        FieldName::new(s).unwrap()
    }

    fn op(s: &str) -> OpName {
        OpName::new(s).unwrap()
    }

    fn e(s: &str) -> ErrorName {
        ErrorName::new(s).unwrap()
    }

    fn iface(name: &str) -> Interface {
        Interface::new(IfaceName::new(name).unwrap(), Version::V1, Timestamp::from_unix(0))
    }

    fn amount(kind: StateKind, m: Multiplicity) -> FieldDecl {
        FieldDecl::new(kind, TypeRef::new("RGBContract.Amount").unwrap(), m)
    }

    fn base() -> Interface {
        iface("Base")
            .field(f("assetOwner"), amount(StateKind::Owned, ZeroOrMany))
            .operation(
                OpName::genesis(),
                OperationSpec::genesis()
                    .with(Modifier::Required)
                    .assign(f("assetOwner"), ZeroOrMany),
            )
            .operation(
                op("transfer"),
                OperationSpec::transition()
                    .with(Modifier::Required)
                    .with(Modifier::Final)
                    .input(f("assetOwner"), OneOrMany)
                    .assign(f("assetOwner"), OneOrMany)
                    .default_to(f("assetOwner"))
                    .error(e("nonEqualAmounts")),
            )
            .error(e("nonEqualAmounts"), "amounts differ")
    }

    #[test]
    fn single_interface_resolves() {
        let eff = resolve(&[base()]).unwrap();
        assert_eq!(eff.operations.len(), 2);
        assert!(eff.operation("transfer").unwrap().is_final);
        assert!(eff.warnings.is_empty());
    }

    #[test]
    fn empty_set_is_rejected() {
        let none: [Interface; 0] = [];
        assert_eq!(resolve(&none), Err(CompositionError::EmptyComposition));
    }

    #[test]
    fn members_are_checked_before_merging() {
        let contradictory = iface("Contradictory").operation(
            op("issue"),
            OperationSpec::transition()
                .with(Modifier::Abstract)
                .with(Modifier::Override),
        );
        assert!(matches!(
            resolve(&[base(), contradictory]),
            Err(CompositionError::InvalidMember(CatalogError::MalformedDeclaration {
                ref interface,
                ..
            })) if interface == "Contradictory"
        ));
    }

    #[test]
    fn override_narrows_references() {
        let fixed = iface("Fixed").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .assign(f("assetOwner"), OneOrMany),
        );
        let eff = resolve(&[base(), fixed]).unwrap();
        let genesis = eff.operation("genesis").unwrap();
        assert_eq!(genesis.assigns[&f("assetOwner")], OneOrMany);
        assert_eq!(genesis.declared_by.len(), 2);
    }

    #[test]
    fn widening_reference_conflicts() {
        let narrow = iface("Narrow").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .assign(f("assetOwner"), ExactlyOne),
        );
        let wide = iface("Wide").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .assign(f("assetOwner"), ZeroOrOne),
        );
        assert!(resolve(&[base(), narrow.clone()]).is_ok());
        let err = resolve(&[base(), narrow, wide]).unwrap_err();
        assert!(matches!(
            err,
            CompositionError::MultiplicityConflict { operation: Some(_), .. }
        ));
    }

    #[test]
    fn field_redeclaration_must_keep_type() {
        let other = iface("Other").field(f("assetOwner"), amount(StateKind::Public, ZeroOrMany));
        assert!(matches!(
            resolve(&[base(), other]),
            Err(CompositionError::TypeConflict { .. })
        ));
    }

    #[test]
    fn field_redeclaration_narrows_multiplicity() {
        let other = iface("Other").field(f("assetOwner"), amount(StateKind::Owned, OneOrMany));
        let eff = resolve(&[base(), other.clone()]).unwrap();
        assert_eq!(eff.field("assetOwner").unwrap().multiplicity, OneOrMany);

        let back = iface("Back").field(f("assetOwner"), amount(StateKind::Owned, ZeroOrOne));
        assert!(matches!(
            resolve(&[base(), other, back]),
            Err(CompositionError::MultiplicityConflict { operation: None, .. })
        ));
    }

    #[test]
    fn final_operation_cannot_be_redeclared() {
        let again = iface("Again").operation(
            op("transfer"),
            OperationSpec::transition().with(Modifier::Override),
        );
        assert!(matches!(
            resolve(&[base(), again]),
            Err(CompositionError::FinalOverrideViolation { .. })
        ));
    }

    #[test]
    fn abstract_needs_override() {
        let abs = iface("Abs").operation(
            op("issue"),
            OperationSpec::transition().with(Modifier::Required).with(Modifier::Abstract),
        );
        let imp = iface("Imp").operation(
            op("issue"),
            OperationSpec::transition().with(Modifier::Override),
        );
        let plain = iface("Plain").operation(op("issue"), OperationSpec::transition());

        assert!(matches!(
            resolve(&[base(), abs.clone()]),
            Err(CompositionError::UnresolvedAbstract { .. })
        ));
        assert!(matches!(
            resolve(&[base(), abs.clone(), plain]),
            Err(CompositionError::UnresolvedAbstract { .. })
        ));
        let eff = resolve(&[base(), abs, imp]).unwrap();
        assert!(eff.operation("issue").unwrap().required);
    }

    #[test]
    fn default_creates_missing_operation() {
        let provider = iface("Provider")
            .field(f("holder"), amount(StateKind::Owned, ZeroOrMany))
            .operation(
                op("mint"),
                OperationSpec::transition()
                    .with(Modifier::Default)
                    .assign(f("holder"), ZeroOrMany)
                    .default_to(f("holder")),
            );
        let eff = resolve(&[base(), provider]).unwrap();
        assert_eq!(eff.operation("mint").unwrap().default_assignment, Some(f("holder")));
    }

    #[test]
    fn optional_override_of_absent_operation_is_skipped() {
        let opt = iface("Opt").operation(
            op("issue"),
            OperationSpec::transition().with(Modifier::Override),
        );
        let eff = resolve(&[base(), opt]).unwrap();
        assert!(eff.operation("issue").is_none());

        let req = iface("Req").operation(
            op("issue"),
            OperationSpec::transition()
                .with(Modifier::Override)
                .with(Modifier::Required),
        );
        assert!(matches!(
            resolve(&[base(), req]),
            Err(CompositionError::MissingRequiredOperation { .. })
        ));
    }

    #[test]
    fn conflicting_default_targets_are_ambiguous() {
        let a = iface("A").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .default_to(f("assetOwner")),
        );
        let b = iface("B").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .default_to(f("other")),
        );
        assert!(matches!(
            resolve(&[base(), a, b]),
            Err(CompositionError::AmbiguousDefault { .. })
        ));
    }

    #[test]
    fn missing_genesis_is_reported() {
        let lone = iface("Lone").operation(op("transfer"), OperationSpec::transition());
        assert!(matches!(
            resolve(&[lone]),
            Err(CompositionError::MissingRequiredOperation { .. })
        ));
    }

    #[test]
    fn error_collisions_warn_and_keep_first() {
        let same = iface("Same").error(e("nonEqualAmounts"), "amounts differ");
        let other = iface("Other").error(e("nonEqualAmounts"), "something else");
        let eff = resolve(&[base(), same]).unwrap();
        assert!(eff.warnings.is_empty());

        let eff = resolve(&[base(), other.clone()]).unwrap();
        assert_eq!(eff.error_message("nonEqualAmounts"), Some("amounts differ"));
        assert_eq!(eff.warnings.len(), 1);

        let strict = ResolverConfig {
            deny_warnings: true,
            ..ResolverConfig::default()
        };
        assert!(matches!(
            resolve_with(&[base(), other], &strict),
            Err(CompositionError::WarningsDenied { count: 1, .. })
        ));
    }

    #[test]
    fn undeclared_error_reference_warns() {
        let extra = iface("Extra").operation(
            OpName::genesis(),
            OperationSpec::genesis()
                .with(Modifier::Override)
                .error(e("mystery")),
        );
        let eff = resolve(&[base(), extra]).unwrap();
        assert_eq!(
            eff.warnings,
            vec![CompositionWarning::UndeclaredErrorReference {
                operation: OpName::genesis(),
                error: e("mystery"),
            }]
        );
    }

    #[test]
    fn identity_depends_on_order() {
        let other = iface("Other").error(e("x"), "x");
        let a = resolve(&[base(), other.clone()]).unwrap();
        let b = resolve(&[other, base()]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn resolution_is_byte_identical() {
        let a = resolve(&[base()]).unwrap();
        let b = resolve(&[base()]).unwrap();
        let bytes = a.canonical_bytes().unwrap();
        assert!(bytes.starts_with(b"{"));
        assert_eq!(bytes, b.canonical_bytes().unwrap());
    }
}
