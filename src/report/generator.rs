//! Markdown and JSON report generation.
//!
//! The JSON report is the cleaned payload itself, a drop-in
//! replacement for the raw extractor output. The Markdown report is a
//! human-readable summary of the receipt and of what the refiner did.

use crate::config::ReportConfig;
use crate::models::ReceiptAnalysis;
use crate::refine::RefineSummary;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Context about the refinement run, shown in the report header.
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// Where the payload came from (file path or "stdin").
    pub source: String,
    /// When the refinement ran.
    pub processed_at: DateTime<Utc>,
}

/// Serialize the cleaned payload as JSON.
pub fn generate_json_report(analysis: &ReceiptAnalysis, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(analysis)?
    } else {
        serde_json::to_string(analysis)?
    };
    Ok(json)
}

/// Generate a complete Markdown report.
///
/// The additional-charges table and the refinement summary can each
/// be switched off through the `[report]` configuration section.
pub fn generate_markdown_report(
    analysis: &ReceiptAnalysis,
    summary: &RefineSummary,
    info: &RunInfo,
    options: &ReportConfig,
) -> String {
    let mut output = String::new();

    output.push_str("# Receipt Refinement Report\n\n");
    output.push_str(&generate_metadata_section(analysis, info));
    output.push_str(&generate_items_section(analysis));
    if options.include_additionals {
        output.push_str(&generate_additionals_section(analysis));
    }
    if options.include_summary {
        output.push_str(&generate_summary_section(summary));
    }
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(analysis: &ReceiptAnalysis, info: &RunInfo) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", info.source));
    section.push_str(&format!(
        "- **Processed:** {}\n",
        info.processed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref merchant) = analysis.metadata.comercio {
        section.push_str(&format!("- **Merchant:** {}\n", merchant));
    }
    if let Some(total) = analysis.metadata.total_pagado {
        section.push_str(&format!("- **Printed Total:** {:.2}\n", total));
    }
    section.push('\n');

    section
}

/// Generate the line-items table.
fn generate_items_section(analysis: &ReceiptAnalysis) -> String {
    let mut section = String::new();

    section.push_str("## Items\n\n");

    if analysis.section_a_items.is_empty() {
        section.push_str("No valid line items survived refinement.\n\n");
        return section;
    }

    section.push_str("| Description | Qty | Unit Price | Total |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for item in &analysis.section_a_items {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} |\n",
            item.descripcion,
            item.cantidad,
            item.valor_unitario,
            item.total()
        ));
    }
    section.push('\n');

    section
}

/// Generate the additionals table (empty string when there are none).
fn generate_additionals_section(analysis: &ReceiptAnalysis) -> String {
    if analysis.section_b_additionals.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Additional Charges\n\n");
    section.push_str("| Kind | Description | Amount |\n");
    section.push_str("|:---|:---|---:|\n");
    for additional in &analysis.section_b_additionals {
        section.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            additional.kind, additional.descripcion, additional.valor
        ));
    }
    section.push('\n');

    section
}

/// Generate the refinement summary section.
fn generate_summary_section(summary: &RefineSummary) -> String {
    let mut section = String::new();

    section.push_str("## Refinement Summary\n\n");
    section.push_str(&format!(
        "- **Candidates:** {} in, {} out, {} removed ({} fused, {} dropped)\n",
        summary.input_items,
        summary.output_items,
        summary.removed_items,
        summary.fused_items,
        summary.dropped_items
    ));
    if summary.manual_name_items > 0 {
        section.push_str(&format!(
            "- **Need manual naming:** {}\n",
            summary.manual_name_items
        ));
    }
    section.push_str(&format!(
        "- **Items Subtotal:** {:.2}\n",
        summary.items_subtotal
    ));
    if summary.additionals_total != 0.0 {
        section.push_str(&format!(
            "- **Additionals Total:** {:.2}\n",
            summary.additionals_total
        ));
    }
    if let Some(diff) = summary.unreconciled {
        section.push_str(&format!("- **Unreconciled:** {:.2}\n", diff));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by reciboclean v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
