//! Validation engine.
//!
//! Decides whether one operation instance is admissible under an
//! [`EffectiveContractInterface`]. Checks run in a fixed precedence and the
//! first failure decides the [`Verdict`]:
//!
//! 1. structural: declared operation, fields, slots, occurrences, inputs
//! 2. conservation: inputs and outputs of transfer-like operations balance
//! 3. supply: declared supply matches allocations and running totals
//! 4. allowance: issuance stays within the consumed inflation right
//! 5. proof: reserve and burn proofs are attested by the oracle
//! 6. fractional: non-fungible shares, engravings and attachments
//!
//! Each instance walks `Pending → StructurallyChecked → SemanticallyChecked`
//! exactly once, encoded as typestates on [`Verification`]. The engine holds
//! no state between calls.

use crate::capability::Capabilities;
use crate::config::EngineConfig;
use crate::error::EngineDefect;
use crate::ident::{ErrorName, FieldName};
use crate::model::{Slot, StateKind};
use crate::operation::Operation;
use crate::resolve::{EffectiveContractInterface, EffectiveOperation};
use crate::state::{Commitment, Fraction, StateValue, TokenSpec, ValueClass};
use crate::verdict::{CheckStage, Rejection, Verdict};
use crate::vocab::{code, field, structural};
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Why verification stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// A contract-level rejection.
    Rejected(Rejection),
    /// The engine tried to report a code the operation does not declare.
    Defect(EngineDefect),
}

type Step<T> = Result<T, Halt>;

/// Freshly submitted instance.
#[derive(Debug)]
pub struct Pending;

/// Structure verified; inputs resolved through the ledger.
#[derive(Debug)]
pub struct StructurallyChecked<'a> {
    spec: &'a EffectiveOperation,
    inputs: BTreeMap<FieldName, Vec<StateValue>>,
}

/// All checks passed.
#[derive(Debug)]
pub struct SemanticallyChecked;

/// One verification in progress.
#[derive(Debug)]
pub struct Verification<'a, S> {
    iface: &'a EffectiveContractInterface,
    op: &'a Operation,
    caps: Capabilities<'a>,
    config: &'a EngineConfig,
    state: S,
}

/// Verify with default engine settings.
pub fn verify(
    iface: &EffectiveContractInterface,
    op: &Operation,
    caps: Capabilities<'_>,
) -> Result<Verdict, EngineDefect> {
    verify_with(iface, op, caps, &EngineConfig::default())
}

pub fn verify_with(
    iface: &EffectiveContractInterface,
    op: &Operation,
    caps: Capabilities<'_>,
    config: &EngineConfig,
) -> Result<Verdict, EngineDefect> {
    let outcome = Verification::new(iface, op, caps, config)
        .check_structure()
        .and_then(Verification::check_semantics)
        .map(Verification::verdict);

    match outcome {
        Ok(verdict) => {
            debug!(target: "covenant::verify", operation = %op.name, "valid");
            Ok(verdict)
        }
        Err(Halt::Rejected(rejection)) => {
            debug!(
                target: "covenant::verify",
                operation = %op.name,
                stage = %rejection.stage,
                code = %rejection.code,
                witness = %rejection.witness_id,
                "invalid"
            );
            Ok(Verdict::Invalid(rejection))
        }
        Err(Halt::Defect(defect)) => {
            error!(target: "covenant::verify", composition = %iface.id.short(), "{defect}");
            Err(defect)
        }
    }
}

fn name(s: &'static str) -> FieldName {
    FieldName::from_static(s)
}

impl<'a, S> Verification<'a, S> {
    fn advance<T>(self, state: T) -> Verification<'a, T> {
        Verification {
            iface: self.iface,
            op: self.op,
            caps: self.caps,
            config: self.config,
            state,
        }
    }

    /// Reject with an engine-reserved structural code.
    fn structural<T>(
        &self,
        code: &'static str,
        field: Option<&FieldName>,
        message: String,
    ) -> Step<T> {
        Err(Halt::Rejected(Rejection::new(
            CheckStage::Structural,
            self.op.name.clone(),
            ErrorName::from_static(code),
            message,
            field.cloned(),
        )))
    }
}

impl<'a> Verification<'a, Pending> {
    pub fn new(
        iface: &'a EffectiveContractInterface,
        op: &'a Operation,
        caps: Capabilities<'a>,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            iface,
            op,
            caps,
            config,
            state: Pending,
        }
    }

    pub fn check_structure(self) -> Step<Verification<'a, StructurallyChecked<'a>>> {
        let op = self.op;
        let Some(spec) = self.iface.operation(op.name.as_str()) else {
            return self.structural(
                structural::UNKNOWN_OPERATION,
                None,
                format!("operation `{}` is not declared", op.name),
            );
        };
        if spec.kind != op.kind {
            return self.structural(
                structural::KIND_MISMATCH,
                None,
                format!("`{}` is declared as {}, submitted as {}", op.name, spec.kind, op.kind),
            );
        }

        let slots = [
            (Slot::Globals, &spec.globals),
            (Slot::Inputs, &spec.inputs),
            (Slot::Assigns, &spec.assigns),
        ];

        for (slot, refs) in slots {
            for field in refs.keys() {
                let Some(decl) = self.iface.field(field.as_str()) else {
                    return self.structural(
                        structural::UNDECLARED_FIELD,
                        Some(field),
                        format!("`{field}` listed under {slot} is not declared"),
                    );
                };
                let fits = match slot {
                    Slot::Globals => decl.kind == StateKind::Global,
                    _ => decl.kind.is_assignable(),
                };
                if !fits {
                    return self.structural(
                        structural::FIELD_KIND_MISMATCH,
                        Some(field),
                        format!("{} field `{field}` cannot appear under {slot}", decl.kind),
                    );
                }
            }
        }

        for (slot, refs) in slots {
            for present in op.slot_fields(slot) {
                if !refs.contains_key(present) {
                    return self.structural(
                        structural::UNEXPECTED_FIELD,
                        Some(present),
                        format!("`{present}` is not listed under {slot}"),
                    );
                }
            }
        }
        if self.config.strict_meta {
            for present in op.slot_fields(Slot::Meta) {
                if !spec.meta.contains(present) {
                    return self.structural(
                        structural::UNEXPECTED_FIELD,
                        Some(present),
                        format!("meta `{present}` is not listed"),
                    );
                }
            }
        }

        for (slot, refs) in slots {
            for (field, multiplicity) in refs {
                let count = op.occurrences(slot, field.as_str());
                let field_max = self
                    .iface
                    .field(field.as_str())
                    .and_then(|d| d.multiplicity.max());
                if !multiplicity.admits(count)
                    || field_max.is_some_and(|max| count > max)
                    || count > self.config.max_slot_occurrences
                {
                    return self.structural(
                        structural::OCCURRENCES_MISMATCH,
                        Some(field),
                        format!(
                            "{count} occurrence(s) of `{field}` under {slot}, expected {multiplicity}"
                        ),
                    );
                }
            }
        }

        let mut inputs: BTreeMap<FieldName, Vec<StateValue>> = BTreeMap::new();
        for (field, allocations) in &op.inputs {
            let mut values = Vec::with_capacity(allocations.len());
            for allocation in allocations {
                let Some(value) = self.caps.ledger.prior_output(allocation) else {
                    return self.structural(
                        structural::UNKNOWN_ALLOCATION,
                        Some(field),
                        format!("input {allocation} of `{field}` is not a known allocation"),
                    );
                };
                values.push(value);
            }
            inputs.insert(field.clone(), values);
        }

        self.check_value_types(&inputs)?;
        debug!(target: "covenant::verify", operation = %op.name, "structure ok");
        Ok(self.advance(StructurallyChecked { spec, inputs }))
    }

    fn check_value_types(&self, inputs: &BTreeMap<FieldName, Vec<StateValue>>) -> Step<()> {
        let groups = [&self.op.globals, inputs, &self.op.assigns];
        let mut classes: BTreeMap<&FieldName, ValueClass> = BTreeMap::new();

        for values_by_field in groups {
            for (field, values) in values_by_field {
                let kind = self.iface.field(field.as_str()).map(|d| d.kind);
                for value in values {
                    let class = value.class();
                    let expected = expected_class(field.as_str());
                    let seen = *classes.entry(field).or_insert(class);
                    let concealed_in_public =
                        value.is_concealed() && kind.is_some_and(|k| k != StateKind::Owned);
                    let concealed_supply =
                        value.is_concealed() && field::SUPPLY_FIELDS.contains(&field.as_str());
                    if seen != class
                        || expected.is_some_and(|e| e != class)
                        || concealed_in_public
                        || concealed_supply
                    {
                        return self.structural(
                            structural::STATE_TYPE_MISMATCH,
                            Some(field),
                            format!("value of `{field}` has an unexpected type"),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Value class the semantic checks assume for well-known fields.
fn expected_class(field_name: &str) -> Option<ValueClass> {
    match field_name {
        field::ISSUED_SUPPLY
        | field::BURNED_SUPPLY
        | field::REPLACED_SUPPLY
        | field::INFLATION_ALLOWANCE => Some(ValueClass::Amount),
        field::TOKENS => Some(ValueClass::Token),
        field::ENGRAVINGS => Some(ValueClass::Engraving),
        field::ATTACHMENTS => Some(ValueClass::Attachment),
        _ => None,
    }
}

fn revealed_sum(values: &[StateValue]) -> u128 {
    values
        .iter()
        .filter_map(StateValue::revealed_amount)
        .map(u128::from)
        .sum()
}

impl<'a> Verification<'a, StructurallyChecked<'a>> {
    pub fn check_semantics(self) -> Step<Verification<'a, SemanticallyChecked>> {
        self.check_conservation()?;
        self.check_supply()?;
        self.check_allowance()?;
        self.check_proofs()?;
        self.check_fractions()?;
        debug!(target: "covenant::verify", operation = %self.op.name, "semantics ok");
        Ok(self.advance(SemanticallyChecked))
    }

    /// Reject with a code the operation must declare.
    fn fail<T>(&self, stage: CheckStage, code: &'static str, field: FieldName) -> Step<T> {
        let spec = self.state.spec;
        if !spec.declares_error(code) {
            return Err(Halt::Defect(EngineDefect::InternalInconsistency {
                operation: spec.name.clone(),
                code: ErrorName::from_static(code),
                declared: spec.errors.iter().cloned().collect(),
            }));
        }
        let message = self.iface.error_message(code).unwrap_or(code);
        Err(Halt::Rejected(Rejection::new(
            stage,
            spec.name.clone(),
            ErrorName::from_static(code),
            message,
            Some(field),
        )))
    }

    fn lists_global(&self, field_name: &str) -> bool {
        self.state.spec.globals.contains_key(field_name)
    }

    fn lists_input(&self, field_name: &str) -> bool {
        self.state.spec.inputs.contains_key(field_name)
    }

    fn lists_assign(&self, field_name: &str) -> bool {
        self.state.spec.assigns.contains_key(field_name)
    }

    fn declared(&self, field_name: &str) -> &[StateValue] {
        self.op.globals.get(field_name).map(Vec::as_slice).unwrap_or_default()
    }

    fn consumed(&self, field_name: &str) -> &[StateValue] {
        self.state.inputs.get(field_name).map(Vec::as_slice).unwrap_or_default()
    }

    fn assigned(&self, field_name: &str) -> &[StateValue] {
        self.op.assigns.get(field_name).map(Vec::as_slice).unwrap_or_default()
    }

    fn commitments(&self, values: &[StateValue]) -> Vec<Commitment> {
        values
            .iter()
            .filter_map(|v| match v {
                StateValue::Amount { amount } => {
                    Some(self.caps.commitments.commit_revealed(*amount))
                }
                StateValue::Concealed { commitment } => Some(commitment.clone()),
                _ => None,
            })
            .collect()
    }

    fn commit_total(&self, total: u128) -> Option<Commitment> {
        u64::try_from(total)
            .ok()
            .map(|amount| self.caps.commitments.commit_revealed(amount))
    }

    fn ledger_total(&self, field_name: &'static str) -> u128 {
        revealed_sum(&self.caps.ledger.global_state(&name(field_name)))
    }

    fn is_destruction(&self) -> bool {
        self.lists_global(field::BURNED_SUPPLY) || self.lists_global(field::REPLACED_SUPPLY)
    }

    fn check_conservation(&self) -> Step<()> {
        let stage = CheckStage::Conservation;
        let owner = field::ASSET_OWNER;
        let transfer_like = self.lists_input(owner)
            && self.lists_assign(owner)
            && !field::SUPPLY_FIELDS.iter().any(|f| self.lists_global(f));

        if transfer_like {
            let inputs = self.consumed(owner);
            let outputs = self.assigned(owner);
            let fractional = inputs
                .iter()
                .chain(outputs)
                .any(|v| v.class() == ValueClass::Fraction);
            if fractional {
                let assigned = fraction_totals(outputs);
                if exceeds_unit(&assigned) {
                    return self.fail(CheckStage::Fractional, code::FRACTION_OVERFLOW, name(owner));
                }
                if fraction_totals(inputs) != assigned {
                    return self.fail(stage, code::NON_EQUAL_VALUES, name(owner));
                }
            } else if !self
                .caps
                .commitments
                .sum_equals(&self.commitments(inputs), &self.commitments(outputs))
            {
                return self.fail(stage, code::NON_EQUAL_AMOUNTS, name(owner));
            }
        }

        if self.lists_global(field::REPLACED_SUPPLY) {
            let replaced = revealed_sum(self.declared(field::REPLACED_SUPPLY));
            let balanced = self.commit_total(replaced).is_some_and(|r| {
                self.caps
                    .commitments
                    .sum_equals(&[r], &self.commitments(self.assigned(owner)))
            });
            if !balanced {
                return self.fail(stage, code::NON_EQUAL_AMOUNTS, name(owner));
            }
        }

        debug!(target: "covenant::verify", operation = %self.op.name, "conservation ok");
        Ok(())
    }

    fn check_supply(&self) -> Step<()> {
        let stage = CheckStage::Supply;
        let owner = field::ASSET_OWNER;

        if self.lists_global(field::ISSUED_SUPPLY) {
            let issued = revealed_sum(self.declared(field::ISSUED_SUPPLY));
            let outputs = self.commitments(self.assigned(owner));
            let matches = self
                .commit_total(issued)
                .is_some_and(|i| self.caps.commitments.sum_equals(&[i], &outputs));
            if !matches {
                return self.fail(stage, code::SUPPLY_MISMATCH, name(field::ISSUED_SUPPLY));
            }
        }

        if !self.is_destruction() {
            return Ok(());
        }
        let (destroyed_field, destroyed) = if self.lists_global(field::BURNED_SUPPLY) {
            (field::BURNED_SUPPLY, revealed_sum(self.declared(field::BURNED_SUPPLY)))
        } else {
            (field::REPLACED_SUPPLY, revealed_sum(self.declared(field::REPLACED_SUPPLY)))
        };

        if self.lists_input(owner) {
            let inputs = self.commitments(self.consumed(owner));
            let Some(destroyed_commitment) = self.commit_total(destroyed) else {
                return self.fail(stage, code::INSUFFICIENT_COVERAGE, name(destroyed_field));
            };
            let mut spent = vec![destroyed_commitment];
            if destroyed_field == field::BURNED_SUPPLY {
                spent.extend(self.commitments(self.assigned(owner)));
            }
            if !self.caps.commitments.sum_equals(&inputs, &spent) {
                return self.fail(stage, code::INSUFFICIENT_COVERAGE, name(destroyed_field));
            }
        }

        let issued_total = self.ledger_total(field::ISSUED_SUPPLY);
        let destroyed_total = self.ledger_total(field::BURNED_SUPPLY)
            + self.ledger_total(field::REPLACED_SUPPLY)
            + destroyed;
        if destroyed_total > issued_total {
            return self.fail(stage, code::SUPPLY_MISMATCH, name(destroyed_field));
        }

        debug!(target: "covenant::verify", operation = %self.op.name, "supply ok");
        Ok(())
    }

    fn check_allowance(&self) -> Step<()> {
        let allowance = field::INFLATION_ALLOWANCE;
        if !self.lists_input(allowance) {
            return Ok(());
        }
        let consumed = revealed_sum(self.consumed(allowance));
        let minted = revealed_sum(self.declared(field::ISSUED_SUPPLY));
        let remaining = revealed_sum(self.assigned(allowance));
        if minted + remaining > consumed {
            return self.fail(CheckStage::Allowance, code::ISSUE_EXCEEDS_ALLOWANCE, name(allowance));
        }
        debug!(target: "covenant::verify", operation = %self.op.name, "allowance ok");
        Ok(())
    }

    fn check_proofs(&self) -> Step<()> {
        let stage = CheckStage::Proof;
        let spec = self.state.spec;

        if spec.meta.contains(field::RESERVES) {
            let Some(proof) = self.op.meta.get(field::RESERVES) else {
                return self.fail(stage, code::INVALID_PROOF, name(field::RESERVES));
            };
            let issued = revealed_sum(self.declared(field::ISSUED_SUPPLY));
            let attested = u64::try_from(issued)
                .is_ok_and(|amount| self.caps.proofs.check_reserve_proof(proof, amount));
            if !attested {
                return self.fail(stage, code::INSUFFICIENT_RESERVES, name(field::RESERVES));
            }
        }

        if spec.meta.contains(field::BURN_PROOF) {
            let Some(proof) = self.op.meta.get(field::BURN_PROOF) else {
                return self.fail(stage, code::INVALID_PROOF, name(field::BURN_PROOF));
            };
            let destroyed = revealed_sum(self.declared(field::BURNED_SUPPLY))
                + revealed_sum(self.declared(field::REPLACED_SUPPLY));
            let attested = u64::try_from(destroyed)
                .is_ok_and(|amount| self.caps.proofs.check_burn_proof(proof, amount));
            if !attested {
                return self.fail(stage, code::INVALID_PROOF, name(field::BURN_PROOF));
            }
        }
        Ok(())
    }

    fn check_fractions(&self) -> Step<()> {
        let stage = CheckStage::Fractional;
        let touches_tokens = self
            .op
            .globals
            .values()
            .chain(self.op.assigns.values())
            .flatten()
            .any(|v| {
                matches!(
                    v.class(),
                    ValueClass::Fraction | ValueClass::Engraving | ValueClass::Attachment
                )
            });
        if !touches_tokens {
            return Ok(());
        }

        let mut tokens: BTreeMap<u32, TokenSpec> = BTreeMap::new();
        let known = self.caps.ledger.global_state(&name(field::TOKENS));
        for value in known.iter().chain(self.declared(field::TOKENS)) {
            if let StateValue::Token(spec) = value {
                tokens.insert(spec.index, spec.clone());
            }
        }
        let token_spec = |index: u32| tokens.get(&index).cloned().unwrap_or_else(|| TokenSpec::strict(index));

        let owned: Vec<(&FieldName, &[StateValue])> = self
            .op
            .assigns
            .iter()
            .filter(|(_, values)| values.iter().any(|v| v.class() == ValueClass::Fraction))
            .map(|(f, values)| (f, values.as_slice()))
            .collect();

        for &(owner, values) in &owned {
            if exceeds_unit(&fraction_totals(values)) {
                return self.fail(stage, code::FRACTION_OVERFLOW, owner.clone());
            }
        }
        for &(owner, values) in &owned {
            for value in values {
                if let StateValue::Fraction { token, fraction } = value {
                    let partial = *fraction != Fraction::ZERO && !fraction.is_whole();
                    if partial && !token_spec(*token).fractionable {
                        return self.fail(stage, code::NON_FRACTIONAL_TOKEN, owner.clone());
                    }
                }
            }
        }

        for value in self.declared(field::ATTACHMENTS) {
            if let StateValue::Attachment {
                token, media_type, ..
            } = value
            {
                if !token_spec(*token).attachment_types.contains(media_type) {
                    return self.fail(stage, code::INVALID_ATTACHMENT_TYPE, name(field::ATTACHMENTS));
                }
            }
        }
        for value in self.declared(field::ENGRAVINGS) {
            if let StateValue::Engraving { token, .. } = value {
                if !token_spec(*token).engravable {
                    return self.fail(stage, code::NON_ENGRAVABLE_TOKEN, name(field::ENGRAVINGS));
                }
            }
        }

        debug!(target: "covenant::verify", operation = %self.op.name, "fractions ok");
        Ok(())
    }
}

impl Verification<'_, SemanticallyChecked> {
    pub fn verdict(self) -> Verdict {
        Verdict::Valid
    }
}

/// Per-token sums of fraction values.
fn fraction_totals(values: &[StateValue]) -> BTreeMap<u32, u128> {
    let mut totals = BTreeMap::new();
    for value in values {
        if let StateValue::Fraction { token, fraction } = value {
            *totals.entry(*token).or_insert(0u128) += u128::from(fraction.0);
        }
    }
    totals
}

fn exceeds_unit(totals: &BTreeMap<u32, u128>) -> bool {
    totals.values().any(|total| *total > u128::from(Fraction::UNIT.0))
}
