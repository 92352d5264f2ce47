//! Core data entities shared across the distillation and watch system.

mod cache;
mod circuit;
mod distillation;
mod extraction;
mod watch;

pub use cache::CacheEntry;
pub use circuit::{CircuitBreakerState, CircuitState};
pub use distillation::{
    DistilledNode, DistillationResult, ExtractedTable, NodeType, SourceSpan, StructuredMetadata,
};
pub use extraction::{
    ConfidenceBreakdown, ExtractionCandidate, ExtractionMethod, ExtractionMetadata,
    ExtractionScore, Subscores,
};
pub use watch::{WatchEvent, WatchStatus, WatchTarget};
