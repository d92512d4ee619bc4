//! Field path resolution
//!
//! Callers identify document fields with symbolic descriptors written against
//! the entity schema (`"Age"`, `"Items.Name"`). A descriptor is resolved once,
//! at clause-construction time, into the engine's dotted wire name: every
//! segment is camelCased (`Items.Name` becomes `items.name`). Fields inside a
//! nested document array additionally carry the resolved ancestor path so the
//! engine can scope evaluation to single array elements.

use crate::error::{ElastiqError, Result};

/// A resolved document field, optionally qualified by the nested array it
/// lives in
///
/// A `FieldPath` without an ancestor is a root-level field. With an ancestor,
/// the wire name always extends the ancestor path (`items.name` under
/// `items`), so a clause built from it can be evaluated relative to one
/// element of that array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    wire: String,
    ancestor: Option<String>,
}

impl FieldPath {
    /// Resolve a root-level field descriptor
    pub fn resolve(descriptor: &str) -> Result<Self> {
        Ok(Self {
            wire: to_wire(descriptor)?,
            ancestor: None,
        })
    }

    /// Resolve a field inside a nested document array
    ///
    /// `ancestor` is the descriptor of the array member itself. The leaf may
    /// be written either relative to the ancestor (`"Name"`) or as a full
    /// chain from the root (`"Items.Name"`); both resolve to the same path.
    pub fn resolve_nested(ancestor: &str, leaf: &str) -> Result<Self> {
        let ancestor_wire = to_wire(ancestor)?;
        let leaf_wire = to_wire(leaf)?;
        let wire = if leaf_wire == ancestor_wire
            || leaf_wire.starts_with(&format!("{}.", ancestor_wire))
        {
            leaf_wire
        } else {
            format!("{}.{}", ancestor_wire, leaf_wire)
        };
        Ok(Self {
            wire,
            ancestor: Some(ancestor_wire),
        })
    }

    /// The engine's dotted wire name for this field
    pub fn wire_name(&self) -> &str {
        &self.wire
    }

    /// The wire path of the nested array this field lives in, if any
    pub fn ancestor(&self) -> Option<&str> {
        self.ancestor.as_deref()
    }

    /// Whether this field is scoped to a nested document array
    pub fn is_nested(&self) -> bool {
        self.ancestor.is_some()
    }
}

/// Resolve a descriptor into a dotted wire name
///
/// Only plain member chains are accepted: dot-separated identifiers made of
/// ASCII letters, digits and underscores, not starting with a digit. Anything
/// else (indexing, calls, operators) is rejected so that a malformed
/// expression fails at the call that introduced it.
fn to_wire(descriptor: &str) -> Result<String> {
    if descriptor.trim().is_empty() {
        return Err(ElastiqError::InvalidExpression(
            "field descriptor is empty".to_string(),
        ));
    }
    let mut segments = Vec::new();
    for segment in descriptor.split('.') {
        if !is_identifier(segment) {
            return Err(ElastiqError::InvalidExpression(format!(
                "'{}' is not a plain member chain (offending segment: '{}')",
                descriptor, segment
            )));
        }
        segments.push(camel(segment));
    }
    Ok(segments.join("."))
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Lowercase the first character, matching the engine's camelCase field names
fn camel(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
