//! Line-oriented parser for interface source text.
//!
//! ```text
//! interface FungibleAsset v1
//!   timestamp 2024-03-25T22:24:04Z
//!   global issuedSupply: RGBContract.Amount
//!   owned assetOwner(*): RGBContract.Amount
//!   genesis: required
//!     globals: issuedSupply
//!     assigns: assetOwner(*)
//!     errors: supplyMismatch
//!   transition transfer: required, final
//!     inputs: assetOwner(+)
//!     assigns: assetOwner(+)
//!     default: assetOwner
//!     errors: nonEqualAmounts
//!   default transfer
//!   error supplyMismatch "supply specified as a global parameter ..."
//! end
//! ```
//!
//! Indentation is cosmetic; each line is classified by its leading keyword.
//! `#` starts a comment outside quoted messages.

use crate::error::ParseError;
use covenant_kernel::{
    ErrorName, FieldDecl, FieldName, IdentError, IfaceName, Interface, Modifier, Multiplicity,
    OpKind, OpName, OperationSpec, StateKind, Timestamp, TypeRef, Version,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

type Result<T> = std::result::Result<T, ParseError>;

/// Parse exactly one interface declaration.
pub fn parse_interface(text: &str) -> Result<Interface> {
    let mut all = parse_interfaces(text)?;
    match all.len() {
        1 => Ok(all.remove(0)),
        0 => Err(ParseError::new(1, "no interface declaration found")),
        n => Err(ParseError::new(
            1,
            format!("expected one interface declaration, found {n}"),
        )),
    }
}

/// Parse every interface declaration in `text`, in source order.
pub fn parse_interfaces(text: &str) -> Result<Vec<Interface>> {
    let mut parsed = Vec::new();
    let mut draft: Option<Draft> = None;

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let ended = match draft {
            None => {
                draft = Some(Draft::open(number, line)?);
                false
            }
            Some(ref mut current) => {
                let name = current.name.to_string();
                current.line(number, line).map_err(|e| e.within(&name))?
            }
        };
        if let Some(done) = draft.take_if(|_| ended) {
            let name = done.name.to_string();
            let iface = done.close().map_err(|e| e.within(&name))?;
            debug!(
                target: "covenant::schema",
                interface = %iface.name,
                version = %iface.version,
                "parsed"
            );
            parsed.push(iface);
        }
    }

    match draft {
        Some(open) => Err(ParseError::new(
            open.header_line,
            format!("interface `{}` is missing `end`", open.name),
        )
        .within(open.name.as_str())),
        None => Ok(parsed),
    }
}

/// Which sub-list of an operation a line fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ListKind {
    Globals,
    Inputs,
    Assigns,
    Meta,
    Errors,
    Default,
}

impl ListKind {
    fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "globals" => ListKind::Globals,
            "inputs" => ListKind::Inputs,
            "assigns" => ListKind::Assigns,
            "meta" => ListKind::Meta,
            "errors" => ListKind::Errors,
            "default" => ListKind::Default,
            _ => return None,
        })
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListKind::Globals => "globals",
            ListKind::Inputs => "inputs",
            ListKind::Assigns => "assigns",
            ListKind::Meta => "meta",
            ListKind::Errors => "errors",
            ListKind::Default => "default",
        })
    }
}

struct OpDraft {
    name: OpName,
    spec: OperationSpec,
    seen: BTreeSet<ListKind>,
}

struct Draft {
    header_line: usize,
    name: IfaceName,
    version: Version,
    timestamp: Option<Timestamp>,
    fields: BTreeMap<FieldName, FieldDecl>,
    operations: BTreeMap<OpName, OperationSpec>,
    errors: BTreeMap<ErrorName, String>,
    default_operation: Option<OpName>,
    current: Option<OpDraft>,
}

impl Draft {
    fn open(number: usize, line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        if words.next() != Some("interface") {
            return Err(ParseError::new(
                number,
                format!("expected `interface <Name> <version>`, found `{line}`"),
            ));
        }
        let (Some(name), Some(version), None) = (words.next(), words.next(), words.next()) else {
            return Err(ParseError::new(
                number,
                "interface header must be `interface <Name> <version>`",
            ));
        };
        let name = IfaceName::new(name).map_err(|e| ident(number, "interface name", e))?;
        let version = version
            .parse::<Version>()
            .map_err(|e| ParseError::new(number, e).within(name.as_str()))?;
        Ok(Self {
            header_line: number,
            name,
            version,
            timestamp: None,
            fields: BTreeMap::new(),
            operations: BTreeMap::new(),
            errors: BTreeMap::new(),
            default_operation: None,
            current: None,
        })
    }

    /// Feed one non-empty line. Returns `true` on `end`.
    fn line(&mut self, number: usize, line: &str) -> Result<bool> {
        let (keyword, colon, rest) = split_keyword(line);

        if let Some(kind) = ListKind::from_keyword(keyword).filter(|_| colon) {
            self.list(number, kind, rest)?;
            return Ok(false);
        }

        self.finish_operation();
        match keyword {
            "end" if rest.is_empty() && !colon => return Ok(true),
            "timestamp" if !colon => self.timestamp(number, rest)?,
            "global" if !colon => self.field(number, StateKind::Global, rest)?,
            "owned" if !colon => self.field(number, StateKind::Owned, rest)?,
            "public" if !colon => self.field(number, StateKind::Public, rest)?,
            "genesis" => {
                if !colon && !rest.is_empty() {
                    return Err(ParseError::new(
                        number,
                        "genesis takes no name; modifiers follow a `:`",
                    ));
                }
                self.begin_operation(number, OpName::genesis(), OpKind::Genesis, rest)?;
            }
            "transition" if !colon => {
                let (name, modifiers) = match rest.split_once(':') {
                    Some((name, modifiers)) => (name.trim(), modifiers),
                    None => (rest, ""),
                };
                let name = OpName::new(name).map_err(|e| ident(number, "operation name", e))?;
                self.begin_operation(number, name, OpKind::Transition, modifiers)?;
            }
            "default" if !colon => {
                if self.default_operation.is_some() {
                    return Err(ParseError::new(number, "default operation declared twice"));
                }
                let op = OpName::new(rest).map_err(|e| ident(number, "default operation", e))?;
                self.default_operation = Some(op);
            }
            "error" if !colon => self.error(number, rest)?,
            _ => {
                return Err(ParseError::new(
                    number,
                    format!("unexpected line `{line}`"),
                ));
            }
        }
        Ok(false)
    }

    fn timestamp(&mut self, number: usize, rest: &str) -> Result<()> {
        if self.timestamp.is_some() {
            return Err(ParseError::new(number, "timestamp declared twice"));
        }
        let ts = match rest.strip_prefix('@') {
            Some(secs) => secs.parse::<i64>().map(Timestamp::from_unix).map_err(|_| {
                ParseError::new(number, format!("invalid unix timestamp `{rest}`"))
            })?,
            None => Timestamp::parse_rfc3339(rest).map_err(|e| {
                ParseError::new(number, format!("invalid timestamp `{rest}`: {e}"))
            })?,
        };
        self.timestamp = Some(ts);
        Ok(())
    }

    fn field(&mut self, number: usize, kind: StateKind, rest: &str) -> Result<()> {
        let Some((lhs, ty)) = rest.split_once(':') else {
            return Err(ParseError::new(
                number,
                format!("{} field must be `<name>: <Type>`", kind.keyword()),
            ));
        };
        let (name, multiplicity) = field_ref(number, lhs.trim())?;
        let value_type = TypeRef::new(ty.trim()).map_err(|e| ident(number, "type reference", e))?;
        if self.fields.contains_key(&name) {
            return Err(ParseError::new(number, format!("field `{name}` declared twice")));
        }
        self.fields
            .insert(name, FieldDecl::new(kind, value_type, multiplicity));
        Ok(())
    }

    fn begin_operation(
        &mut self,
        number: usize,
        name: OpName,
        kind: OpKind,
        modifiers: &str,
    ) -> Result<()> {
        if self.operations.contains_key(&name) {
            return Err(ParseError::new(
                number,
                format!("operation `{name}` declared twice"),
            ));
        }
        let mut spec = OperationSpec::new(kind);
        for word in items(modifiers) {
            let modifier = Modifier::from_keyword(word)
                .ok_or_else(|| ParseError::new(number, format!("unknown modifier `{word}`")))?;
            if !spec.modifiers.insert(modifier) {
                return Err(ParseError::new(
                    number,
                    format!("modifier `{word}` repeated on `{name}`"),
                ));
            }
        }
        if modifiers.trim().is_empty() != spec.modifiers.is_empty() {
            return Err(ParseError::new(number, "empty modifier list"));
        }
        self.current = Some(OpDraft {
            name,
            spec,
            seen: BTreeSet::new(),
        });
        Ok(())
    }

    fn list(&mut self, number: usize, kind: ListKind, rest: &str) -> Result<()> {
        let Some(op) = self.current.as_mut() else {
            return Err(ParseError::new(
                number,
                format!("`{kind}:` outside an operation"),
            ));
        };
        if !op.seen.insert(kind) {
            return Err(ParseError::new(
                number,
                format!("`{kind}:` repeated in `{}`", op.name),
            ));
        }
        let entries: Vec<&str> = items(rest).collect();
        if entries.is_empty() {
            return Err(ParseError::new(number, format!("empty `{kind}:` list")));
        }

        match kind {
            ListKind::Globals | ListKind::Inputs | ListKind::Assigns => {
                let slot = match kind {
                    ListKind::Globals => &mut op.spec.globals,
                    ListKind::Inputs => &mut op.spec.inputs,
                    _ => &mut op.spec.assigns,
                };
                for entry in entries {
                    let (field, multiplicity) = field_ref(number, entry)?;
                    if slot.insert(field.clone(), multiplicity).is_some() {
                        return Err(ParseError::new(
                            number,
                            format!("`{field}` listed twice under {kind}"),
                        ));
                    }
                }
            }
            ListKind::Meta => {
                for entry in entries {
                    let field = FieldName::new(entry)
                        .map_err(|e| ident(number, "meta entry", e))?;
                    op.spec.meta.insert(field);
                }
            }
            ListKind::Errors => {
                for entry in entries {
                    let error =
                        ErrorName::new(entry).map_err(|e| ident(number, "error name", e))?;
                    op.spec.errors.insert(error);
                }
            }
            ListKind::Default => {
                if entries.len() > 1 {
                    return Err(ParseError::new(
                        number,
                        format!(
                            "operation `{}` names {} default targets; at most one is allowed",
                            op.name,
                            entries.len()
                        ),
                    ));
                }
                let field = FieldName::new(entries[0])
                    .map_err(|e| ident(number, "default target", e))?;
                op.spec.default_assignment = Some(field);
            }
        }
        Ok(())
    }

    fn error(&mut self, number: usize, rest: &str) -> Result<()> {
        let (name, message) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| ParseError::new(number, "error must be `<name> \"<message>\"`"))?;
        let name = ErrorName::new(name).map_err(|e| ident(number, "error name", e))?;
        let message = unquote(number, message.trim())?;
        if self.errors.insert(name.clone(), message).is_some() {
            return Err(ParseError::new(number, format!("error `{name}` declared twice")));
        }
        Ok(())
    }

    fn finish_operation(&mut self) {
        if let Some(op) = self.current.take() {
            self.operations.insert(op.name, op.spec);
        }
    }

    fn close(mut self) -> Result<Interface> {
        self.finish_operation();
        let timestamp = self.timestamp.ok_or_else(|| {
            ParseError::new(self.header_line, format!("interface `{}` has no timestamp", self.name))
        })?;
        let mut iface = Interface::new(self.name, self.version, timestamp);
        iface.fields = self.fields;
        iface.operations = self.operations;
        iface.errors = self.errors;
        iface.default_operation = self.default_operation;
        Ok(iface)
    }
}

fn ident(number: usize, what: &str, err: IdentError) -> ParseError {
    ParseError::new(number, format!("invalid {what}: {err}"))
}

/// `name`, `name(?)`, `name(+)` or `name(*)`.
fn field_ref(number: usize, text: &str) -> Result<(FieldName, Multiplicity)> {
    let (name, suffix) = match text.find('(') {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };
    let multiplicity = suffix
        .parse::<Multiplicity>()
        .map_err(|e| ParseError::new(number, e.to_string()))?;
    let name = FieldName::new(name.trim())
        .map_err(|e| ident(number, "field name", e))?;
    Ok((name, multiplicity))
}

/// Leading identifier, whether a `:` follows it, and the trimmed remainder.
fn split_keyword(line: &str) -> (&str, bool, &str) {
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let (keyword, rest) = line.split_at(end);
    match rest.trim_start().strip_prefix(':') {
        Some(after) => (keyword, true, after.trim()),
        None => (keyword, false, rest.trim()),
    }
}

fn items(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (at, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..at],
            _ => {}
        }
    }
    line
}

fn unquote(number: usize, text: &str) -> Result<String> {
    let Some(body) = text.strip_prefix('"') else {
        return Err(ParseError::new(number, "error message must be double-quoted"));
    };
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                Some(other) => {
                    return Err(ParseError::new(
                        number,
                        format!("unknown escape `\\{other}` in message"),
                    ));
                }
                None => break,
            },
            '"' => {
                if !chars.as_str().trim().is_empty() {
                    return Err(ParseError::new(number, "unexpected text after message"));
                }
                return Ok(out);
            }
            c => out.push(c),
        }
    }
    Err(ParseError::new(number, "unterminated message"))
}
