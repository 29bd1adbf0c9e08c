//! Validated coordinate records and their pass-through attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Inclusive latitude domain in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Inclusive longitude domain in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A single attribute cell carried through ingestion unchanged.
///
/// Numeric cells keep their original text next to the parsed value, so
/// `007` or `0.0` render exactly as they appear in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number { value: f64, raw: String },
    Empty,
}

impl AttributeValue {
    /// Classify a raw cell: blank cells are `Empty`, finite numerics are
    /// `Number`, anything else is kept verbatim as `Text`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return AttributeValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => AttributeValue::Number {
                value,
                raw: raw.to_string(),
            },
            _ => AttributeValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeValue::Empty)
    }

    /// Parsed value of a numeric cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The cell text as it appeared in the source.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeValue::Text(text) => text,
            AttributeValue::Number { raw, .. } => raw,
            AttributeValue::Empty => "",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AttributeValue::Empty => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

/// One validated row: a coordinate pair plus every original column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Name of the source the row was ingested from.
    pub source: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl GeoRecord {
    pub fn new(latitude: f64, longitude: f64, source: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            source: source.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Raw attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Attribute rendered as text, or `default` when absent or blank.
    pub fn attribute_or(&self, name: &str, default: &str) -> String {
        match self.attribute(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// First present, non-blank attribute among `names`, or `default`.
    pub fn first_attribute_or(&self, names: &[String], default: &str) -> String {
        names
            .iter()
            .filter_map(|name| self.attribute(name))
            .find(|value| !value.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse a raw coordinate cell, returning `None` for anything that is not a
/// finite number inside `range`.
pub fn coerce_coordinate(raw: &str, range: (f64, f64)) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= range.0 && value <= range.1 {
        Some(value)
    } else {
        None
    }
}

/// Returns true when both values lie inside the valid coordinate domain.
pub fn in_domain(latitude: f64, longitude: f64) -> bool {
    (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude)
        && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude)
}

/// Optional display fields resolved with explicit defaults.
///
/// Different source files name the kilometre-post column differently, so it
/// is looked up through an ordered alias list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub line_column: String,
    pub kilometer_post_aliases: Vec<String>,
    pub missing: String,
}

impl Default for DisplayFields {
    fn default() -> Self {
        Self {
            line_column: "Line".to_string(),
            kilometer_post_aliases: vec!["Distance".to_string(), "KP".to_string()],
            missing: "N/A".to_string(),
        }
    }
}

impl DisplayFields {
    pub fn line(&self, record: &GeoRecord) -> String {
        record.attribute_or(&self.line_column, &self.missing)
    }

    pub fn kilometer_post(&self, record: &GeoRecord) -> String {
        record.first_attribute_or(&self.kilometer_post_aliases, &self.missing)
    }
}
