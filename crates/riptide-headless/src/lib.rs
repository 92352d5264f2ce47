//! Browser-driven agentic extraction (component F).

pub mod agentic_extractor;

pub use agentic_extractor::{AgenticExtractor, AgenticExtractorOptions, AgenticResult, AttemptRecord};
