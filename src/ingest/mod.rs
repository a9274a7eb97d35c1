//! Lenient ingestion of raw extractor payloads.
//!
//! The upstream vision/LLM extractor is an unreliable collaborator;
//! this module parses its JSON output without trusting field types.

pub mod payload;

pub use payload::{
    non_negative_or, numeric_opt, numeric_or, text_of, IngestError, RawAdditional, RawExtraction,
    RawLineItem, RawReceiptMetadata,
};
