//! Data models for refined receipt content.
//!
//! This module contains the output-side data structures: the cleaned
//! line items produced by the refiner, the pass-through additional
//! charges, and the receipt-level metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cleaned, purchasable line item.
///
/// Field names keep the wire names emitted by the upstream extractor
/// so a refined payload is a drop-in replacement for the raw one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description. Non-empty, contains no digits and no `$`.
    pub descripcion: String,
    /// Quantity purchased. Never negative.
    pub cantidad: f64,
    /// Unit price. Never negative.
    pub valor_unitario: f64,
}

impl LineItem {
    /// Line total (quantity x unit price).
    pub fn total(&self) -> f64 {
        self.cantidad * self.valor_unitario
    }
}

/// Kind of an additional (non-item) charge on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdditionalKind {
    Tax,
    Tip,
    Discount,
    /// Anything the extractor labeled outside the known kinds.
    Other,
}

impl fmt::Display for AdditionalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdditionalKind::Tax => write!(f, "Tax"),
            AdditionalKind::Tip => write!(f, "Tip"),
            AdditionalKind::Discount => write!(f, "Discount"),
            AdditionalKind::Other => write!(f, "Other"),
        }
    }
}

impl AdditionalKind {
    /// Lenient parse from the extractor's free-text `type` label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "tax" => AdditionalKind::Tax,
            "tip" => AdditionalKind::Tip,
            "discount" => AdditionalKind::Discount,
            _ => AdditionalKind::Other,
        }
    }
}

/// An additional charge (tax, tip, discount) attached to the receipt.
///
/// Additionals are passed through as-is; only their loosely-typed
/// fields are coerced, they are never merged or filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Additional {
    #[serde(rename = "type")]
    pub kind: AdditionalKind,
    pub descripcion: String,
    pub valor: f64,
}

/// Receipt-level metadata reported by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    /// Merchant name, if legible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comercio: Option<String>,
    /// Total amount paid as printed on the receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pagado: Option<f64>,
}

/// The complete cleaned extraction payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptAnalysis {
    #[serde(rename = "section_A_items")]
    pub section_a_items: Vec<LineItem>,
    #[serde(rename = "section_B_additionals")]
    pub section_b_additionals: Vec<Additional>,
    #[serde(default)]
    pub metadata: ReceiptMetadata,
}

impl ReceiptAnalysis {
    /// Sum of all line-item totals.
    pub fn items_subtotal(&self) -> f64 {
        self.section_a_items.iter().map(LineItem::total).sum()
    }

    /// Number of items still carrying the manual-entry placeholder name.
    pub fn manual_name_count(&self, placeholder: &str) -> usize {
        self.section_a_items
            .iter()
            .filter(|item| item.descripcion == placeholder)
            .count()
    }
}
