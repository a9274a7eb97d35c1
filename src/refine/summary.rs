//! Refinement run statistics.
//!
//! This module aggregates what a refinement pass did to a payload:
//! how many candidates survived, what the cleaned items add up to,
//! and how far that total sits from the printed receipt total.

use crate::models::{AdditionalKind, ReceiptAnalysis};
use crate::refine::RefineStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary of a single refinement run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefineSummary {
    /// Candidate items in the raw payload.
    pub input_items: usize,
    /// Items emitted by the refiner.
    pub output_items: usize,
    /// Successor lines absorbed by a fusion merge.
    pub fused_items: usize,
    /// Candidates dropped as garbage.
    pub dropped_items: usize,
    /// Candidates consumed without their own output row (fused plus
    /// dropped).
    pub removed_items: usize,
    /// Emitted items still carrying the manual-entry placeholder.
    pub manual_name_items: usize,
    /// Sum of quantity x unit price over all emitted items.
    pub items_subtotal: f64,
    /// Additional charges grouped by kind.
    pub additionals_by_kind: HashMap<String, f64>,
    /// Sum of all additional charges.
    pub additionals_total: f64,
    /// Printed total minus (items subtotal + additionals), when the
    /// extractor reported a printed total.
    pub unreconciled: Option<f64>,
}

impl RefineSummary {
    /// Build a summary from a refined payload and the pass counts.
    pub fn from_run(stats: &RefineStats, analysis: &ReceiptAnalysis, placeholder: &str) -> Self {
        let output_items = analysis.section_a_items.len();
        let items_subtotal = analysis.items_subtotal();

        let mut additionals_by_kind: HashMap<String, f64> = HashMap::new();
        let mut additionals_total = 0.0;
        for additional in &analysis.section_b_additionals {
            *additionals_by_kind
                .entry(additional.kind.to_string())
                .or_insert(0.0) += additional.valor;
            additionals_total += additional.valor;
        }

        let unreconciled = analysis
            .metadata
            .total_pagado
            .map(|total| total - items_subtotal - additionals_total);

        Self {
            input_items: stats.input_items,
            output_items,
            fused_items: stats.fused_items,
            dropped_items: stats.dropped_items,
            removed_items: stats.fused_items + stats.dropped_items,
            manual_name_items: analysis.manual_name_count(placeholder),
            items_subtotal,
            additionals_by_kind,
            additionals_total,
            unreconciled,
        }
    }

    /// Generate a plain-text summary for terminal output.
    pub fn summary_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Items: {} in, {} out ({} fused, {} dropped)",
            self.input_items, self.output_items, self.fused_items, self.dropped_items
        ));

        if self.manual_name_items > 0 {
            lines.push(format!(
                "Needs manual naming: {}",
                self.manual_name_items
            ));
        }

        lines.push(format!("Items subtotal: {:.2}", self.items_subtotal));

        if !self.additionals_by_kind.is_empty() {
            let mut kinds: Vec<_> = self.additionals_by_kind.iter().collect();
            kinds.sort_by(|a, b| a.0.cmp(b.0));
            for (kind, value) in kinds {
                lines.push(format!("{}: {:.2}", kind, value));
            }
        }

        if let Some(diff) = self.unreconciled {
            lines.push(format!("Unreconciled vs printed total: {:.2}", diff));
        }

        lines.join("\n")
    }
}
