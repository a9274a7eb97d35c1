//! Line-item refinement engine.
//!
//! This module turns the extractor's noisy candidate items into a
//! clean list of purchasable items, and summarizes what happened.

pub mod refiner;
pub mod summary;

pub use refiner::{
    refine, refine_extraction, refine_extraction_with_stats, refine_with_placeholder,
    refine_with_stats, RefineStats, PLACEHOLDER_NAME,
};
pub use summary::RefineSummary;
