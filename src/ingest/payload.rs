//! Raw payload types and field coercion helpers.
//!
//! Every field the extractor emits is kept as an optional
//! `serde_json::Value`: the model may produce a number where text was
//! expected, text where a number was expected, `null`, or nothing at
//! all. Coercion to usable values happens through `numeric_or` and
//! `text_of`, never through serde type enforcement.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors at the ingestion boundary.
///
/// These cover reading and parsing the payload only. Once a
/// `RawExtraction` exists, refinement cannot fail.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read extraction payload from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One candidate line item as reported by the extractor.
///
/// Sequence order is significant: adjacency encodes "next line down"
/// on the source receipt, which the fusion rule relies on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub descripcion: Option<Value>,
    #[serde(default)]
    pub cantidad: Option<Value>,
    #[serde(default)]
    pub valor_unitario: Option<Value>,
}

impl RawLineItem {
    /// Description as text, coerced through [`text_of`].
    pub fn description(&self) -> String {
        text_of(self.descripcion.as_ref())
    }

    /// Quantity, defaulting to 1 when absent or unparseable.
    pub fn quantity(&self) -> f64 {
        non_negative_or(self.cantidad.as_ref(), 1.0)
    }

    /// Unit price, defaulting to 0 when absent or unparseable.
    pub fn unit_price(&self) -> f64 {
        non_negative_or(self.valor_unitario.as_ref(), 0.0)
    }
}

/// One additional charge (tax/tip/discount) as reported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAdditional {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(default)]
    pub descripcion: Option<Value>,
    #[serde(default)]
    pub valor: Option<Value>,
}

/// Receipt-level metadata as reported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReceiptMetadata {
    #[serde(default)]
    pub comercio: Option<Value>,
    #[serde(default)]
    pub total_pagado: Option<Value>,
}

/// The full extraction payload: items, additionals, metadata.
///
/// Every section defaults to empty so a payload that only carries
/// items (or nothing at all) still deserializes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExtraction {
    #[serde(rename = "section_A_items", default)]
    pub section_a_items: Vec<RawLineItem>,
    #[serde(rename = "section_B_additionals", default)]
    pub section_b_additionals: Vec<RawAdditional>,
    #[serde(default)]
    pub metadata: RawReceiptMetadata,
}

impl RawExtraction {
    /// Parse a payload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a payload from a file.
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// Coerce a loose JSON value to a number, if it holds one.
///
/// Numbers pass through, numeric strings are trimmed and parsed, and
/// everything else (missing, null, booleans, objects, arrays, garbage
/// text) is `None`. Non-finite values are also `None`.
pub fn numeric_opt(value: Option<&Value>) -> Option<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Coerce a loose JSON value to a number, falling back to `default`.
pub fn numeric_or(value: Option<&Value>, default: f64) -> f64 {
    numeric_opt(value).unwrap_or(default)
}

/// Like [`numeric_or`] but also rejects negative values.
///
/// Refined quantities and unit prices are never negative, so a
/// negative value from the extractor is treated as unparseable.
pub fn non_negative_or(value: Option<&Value>, default: f64) -> f64 {
    let n = numeric_or(value, default);
    if n >= 0.0 {
        n
    } else {
        default
    }
}

/// Coerce a loose JSON value to text.
///
/// Strings pass through, numbers render to their decimal form (a
/// numeric token that leaked into a text field), everything else
/// becomes the empty string.
pub fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
