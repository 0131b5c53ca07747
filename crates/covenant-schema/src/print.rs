//! Canonical source rendering.
//!
//! Output is a pure function of the interface value: fields, errors and
//! sub-lists follow map order, genesis precedes transitions, and modifiers
//! follow their declaration order. Parsing the output reproduces an
//! interface with the same content hash.

use covenant_kernel::{FieldName, Interface, Multiplicity, OpKind, OpName, OperationSpec};
use std::collections::BTreeMap;

pub fn print_interface(iface: &Interface) -> String {
    let mut out = format!("interface {} {}\n", iface.name, iface.version);
    out.push_str(&format!("  timestamp {}\n", iface.timestamp));

    for (name, decl) in &iface.fields {
        out.push_str(&format!(
            "  {} {name}{}: {}\n",
            decl.kind.keyword(),
            decl.multiplicity.suffix(),
            decl.value_type
        ));
    }

    let (genesis, transitions): (Vec<_>, Vec<_>) = iface
        .operations
        .iter()
        .partition(|(_, spec)| spec.kind == OpKind::Genesis);
    for (name, spec) in genesis.into_iter().chain(transitions) {
        print_operation(&mut out, name, spec);
    }

    if let Some(op) = &iface.default_operation {
        out.push_str(&format!("  default {op}\n"));
    }
    for (name, message) in &iface.errors {
        out.push_str(&format!("  error {name} {}\n", quote(message)));
    }
    out.push_str("end\n");
    out
}

/// Render several interfaces separated by blank lines.
pub fn print_interfaces<'a>(ifaces: impl IntoIterator<Item = &'a Interface>) -> String {
    ifaces
        .into_iter()
        .map(print_interface)
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_operation(out: &mut String, name: &OpName, spec: &OperationSpec) {
    let header = match spec.kind {
        OpKind::Genesis => "  genesis".to_string(),
        OpKind::Transition => format!("  transition {name}"),
    };
    out.push_str(&header);
    if !spec.modifiers.is_empty() {
        let modifiers: Vec<_> = spec.modifiers.iter().map(|m| m.keyword()).collect();
        out.push_str(": ");
        out.push_str(&modifiers.join(", "));
    }
    out.push('\n');

    refs(out, "globals", &spec.globals);
    refs(out, "inputs", &spec.inputs);
    refs(out, "assigns", &spec.assigns);
    names(out, "meta", spec.meta.iter().map(|f| f.as_str()));
    names(out, "errors", spec.errors.iter().map(|e| e.as_str()));
    names(out, "default", spec.default_assignment.iter().map(|f| f.as_str()));
}

fn refs(out: &mut String, keyword: &str, refs: &BTreeMap<FieldName, Multiplicity>) {
    names(
        out,
        keyword,
        refs.iter().map(|(field, m)| format!("{field}{}", m.suffix())),
    );
}

fn names<S: AsRef<str>>(out: &mut String, keyword: &str, items: impl Iterator<Item = S>) {
    let items: Vec<S> = items.collect();
    if items.is_empty() {
        return;
    }
    let joined: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    out.push_str(&format!("    {keyword}: {}\n", joined.join(", ")));
}

fn quote(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 2);
    out.push('"');
    for c in message.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
