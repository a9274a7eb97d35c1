//! Reciboclean - receipt line-item cleanup engine.
//!
//! Takes the noisy candidate items produced by an LLM/vision receipt
//! extractor and turns them into a clean list of purchasable items:
//! leaked price digits are stripped from descriptions, a name-only
//! line followed by a price-only line is fused back into one item,
//! and lines carrying neither a name nor a price are dropped.
//!
//! The engine itself ([`refine::refine`]) is pure and never fails;
//! every malformed input degrades to a default value or a dropped
//! item. File reading, configuration, and report output live in the
//! surrounding modules and are used by the `reciboclean` binary.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod refine;
pub mod report;

pub use ingest::RawExtraction;
pub use models::{LineItem, ReceiptAnalysis};
pub use refine::{
    refine, refine_extraction, refine_extraction_with_stats, RefineStats, RefineSummary,
    PLACEHOLDER_NAME,
};
