use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a single cell value read from a tabular source.
///
/// `Null` is an explicit marker for missing data and is never conflated with
/// an empty string: a blank spreadsheet cell or SQL `NULL` maps to `Null`,
/// while a stored empty string stays `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    /// Plain text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Explicit null marker.
    Null,
}

impl FieldValue {
    /// Compares two values as identifiers.
    ///
    /// Integer and floating point representations of the same number are
    /// treated as equal, so a numeric key matches regardless of which source
    /// backend produced it. Everything else is exact value equality.
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Integer(lhs), FieldValue::Real(rhs))
            | (FieldValue::Real(rhs), FieldValue::Integer(lhs)) => *lhs as f64 == *rhs,
            (lhs, rhs) => lhs == rhs,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Real(value) => write!(f, "{value}"),
            FieldValue::Null => f.write_str("NULL"),
        }
    }
}

/// Classification of a single entity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Both keys present and equal.
    Matched,
    /// Both keys present and unequal.
    KeyMismatch,
    /// Found in the primary source but not in the reference source.
    MissingInReference,
    /// Not found in the primary source; the reference source is not queried.
    MissingInPrimary,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStatus::Matched => f.write_str("matched"),
            KeyStatus::KeyMismatch => f.write_str("key mismatch"),
            KeyStatus::MissingInReference => f.write_str("missing in reference source"),
            KeyStatus::MissingInPrimary => f.write_str("missing in primary source"),
        }
    }
}

/// Outcome of comparing one entity's keys across the two sources.
///
/// Results are immutable once produced; the constructors enforce the status
/// invariant so a `Matched` result always carries two equal keys and a
/// `MissingIn*` result never carries a key for the missing side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Name the entity was looked up by.
    pub entity_name: String,
    /// Key found in the primary source, absent if no row matched.
    pub primary_key: Option<FieldValue>,
    /// Key found in the reference source, absent if no row matched.
    pub reference_key: Option<FieldValue>,
    /// Parent key from the reference source row, nullable in the data.
    pub reference_parent_key: Option<FieldValue>,
    /// Match classification.
    pub status: KeyStatus,
}

impl ComparisonResult {
    /// Builds the result for an entity absent from the primary source.
    pub fn missing_in_primary(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            primary_key: None,
            reference_key: None,
            reference_parent_key: None,
            status: KeyStatus::MissingInPrimary,
        }
    }

    /// Builds the result for an entity found in the primary source only.
    pub fn missing_in_reference(entity_name: impl Into<String>, primary_key: FieldValue) -> Self {
        Self {
            entity_name: entity_name.into(),
            primary_key: Some(primary_key),
            reference_key: None,
            reference_parent_key: None,
            status: KeyStatus::MissingInReference,
        }
    }

    /// Builds the result for an entity found in both sources, classifying it
    /// as matched or mismatched. Both raw key values are preserved unmodified.
    pub fn compared(
        entity_name: impl Into<String>,
        primary_key: FieldValue,
        reference_key: FieldValue,
        reference_parent_key: Option<FieldValue>,
    ) -> Self {
        let status = if primary_key.matches(&reference_key) {
            KeyStatus::Matched
        } else {
            KeyStatus::KeyMismatch
        };
        Self {
            entity_name: entity_name.into(),
            primary_key: Some(primary_key),
            reference_key: Some(reference_key),
            reference_parent_key,
            status,
        }
    }
}

/// Per-entity outcome of a check run.
///
/// A failed lookup is kept distinct from every `MissingIn*` status: "no row
/// found" and "the query itself failed" are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// The comparison ran to completion for this entity.
    Compared(ComparisonResult),
    /// A lookup query failed; the entity was not classified.
    QueryFailed { entity_name: String, message: String },
}

impl EntityOutcome {
    /// Name of the entity this outcome belongs to.
    pub fn entity_name(&self) -> &str {
        match self {
            EntityOutcome::Compared(result) => &result.entity_name,
            EntityOutcome::QueryFailed { entity_name, .. } => entity_name,
        }
    }
}

/// One entry of a key-field inventory: a column whose name looks key-related,
/// paired with the value it holds in the sampled row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyField {
    /// Column name as reported by the source.
    pub column: String,
    /// Value in the sampled row.
    pub value: FieldValue,
}
