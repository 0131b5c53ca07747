//! Concrete operation instances submitted for verification.

use crate::ident::{FieldName, OpName};
use crate::model::{OpKind, Slot};
use crate::state::{AllocationRef, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One operation instance, as produced by the executor.
///
/// Consumed once by [`crate::engine::verify`]; the engine keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: OpName,
    pub kind: OpKind,
    #[serde(default)]
    pub globals: BTreeMap<FieldName, Vec<StateValue>>,
    #[serde(default)]
    pub inputs: BTreeMap<FieldName, Vec<AllocationRef>>,
    #[serde(default)]
    pub assigns: BTreeMap<FieldName, Vec<StateValue>>,
    #[serde(default)]
    pub meta: BTreeMap<FieldName, String>,
}

impl Operation {
    pub fn new(name: OpName, kind: OpKind) -> Self {
        Self {
            name,
            kind,
            globals: BTreeMap::new(),
            inputs: BTreeMap::new(),
            assigns: BTreeMap::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn genesis() -> Self {
        Self::new(OpName::genesis(), OpKind::Genesis)
    }

    pub fn transition(name: OpName) -> Self {
        Self::new(name, OpKind::Transition)
    }

    pub fn global(mut self, field: FieldName, value: StateValue) -> Self {
        self.globals.entry(field).or_default().push(value);
        self
    }

    pub fn input(mut self, field: FieldName, allocation: AllocationRef) -> Self {
        self.inputs.entry(field).or_default().push(allocation);
        self
    }

    pub fn assign(mut self, field: FieldName, value: StateValue) -> Self {
        self.assigns.entry(field).or_default().push(value);
        self
    }

    pub fn meta(mut self, field: FieldName, payload: impl Into<String>) -> Self {
        self.meta.insert(field, payload.into());
        self
    }

    /// Number of occurrences the instance carries for `field` in `slot`.
    pub fn occurrences(&self, slot: Slot, field: &str) -> usize {
        match slot {
            Slot::Globals => self.globals.get(field).map_or(0, Vec::len),
            Slot::Inputs => self.inputs.get(field).map_or(0, Vec::len),
            Slot::Assigns => self.assigns.get(field).map_or(0, Vec::len),
            Slot::Meta => usize::from(self.meta.contains_key(field)),
        }
    }

    /// Field names present in `slot`, in name order.
    pub fn slot_fields(&self, slot: Slot) -> Vec<&FieldName> {
        match slot {
            Slot::Globals => self.globals.keys().collect(),
            Slot::Inputs => self.inputs.keys().collect(),
            Slot::Assigns => self.assigns.keys().collect(),
            Slot::Meta => self.meta.keys().collect(),
        }
    }
}
