//! Core types for the query system

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::FieldPath;

/// Ordering comparison operator for range clauses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Strictly less than
    Lt,
    /// Less than or equal
    Lte,
}

impl CompareOp {
    /// The engine's range-body key for this operator
    pub fn wire_key(&self) -> &'static str {
        match self {
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }
}

/// Scalar value carried by term and terms clauses
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl TermValue {
    /// Render as a JSON value for the wire body
    pub fn to_json(&self) -> Value {
        match self {
            TermValue::Bool(v) => Value::Bool(*v),
            TermValue::Long(v) => Value::from(*v),
            TermValue::Double(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TermValue::String(v) => Value::String(v.clone()),
        }
    }
}

impl From<bool> for TermValue {
    fn from(v: bool) -> Self {
        TermValue::Bool(v)
    }
}

impl From<i32> for TermValue {
    fn from(v: i32) -> Self {
        TermValue::Long(v as i64)
    }
}

impl From<i64> for TermValue {
    fn from(v: i64) -> Self {
        TermValue::Long(v)
    }
}

impl From<f64> for TermValue {
    fn from(v: f64) -> Self {
        TermValue::Double(v)
    }
}

impl From<&str> for TermValue {
    fn from(v: &str) -> Self {
        TermValue::String(v.to_string())
    }
}

impl From<String> for TermValue {
    fn from(v: String) -> Self {
        TermValue::String(v)
    }
}

/// Rounding granularity for date-range anchors
///
/// An anchored instant is snapped to this unit's boundary before the range
/// comparison, so e.g. a `Gte` on a timestamp rounded to `Day` matches from
/// the start of that day in the supplied time zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRounding {
    Year,
    Month,
    Week,
    #[default]
    Day,
    Hour,
    Minute,
    Second,
}

impl DateRounding {
    /// The engine's date-math unit suffix
    pub fn wire_suffix(&self) -> &'static str {
        match self {
            DateRounding::Year => "y",
            DateRounding::Month => "M",
            DateRounding::Week => "w",
            DateRounding::Day => "d",
            DateRounding::Hour => "h",
            DateRounding::Minute => "m",
            DateRounding::Second => "s",
        }
    }
}

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn wire_name(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A single sort directive (field + direction)
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpec {
    pub field: FieldPath,
    pub order: SortOrder,
}

impl SortSpec {
    /// Render as the engine's single-entry sort array
    pub fn to_json(&self) -> Value {
        serde_json::json!([
            { self.field.wire_name(): { "order": self.order.wire_name() } }
        ])
    }
}
