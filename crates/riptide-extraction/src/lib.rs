//! Extraction ensemble, confidence scoring and HTML distillation
//! (components C, D, E).

pub mod confidence;
pub mod distiller;
pub mod ensemble;
pub mod extractors;
pub mod metadata;
pub mod tables;

pub use confidence::ConfidenceScorer;
pub use distiller::{Distiller, MarketplaceAdapter};
pub use ensemble::{EnsembleSelection, ExtractionEnsemble};
pub use metadata::MetadataExtractor;
pub use tables::TableExtractor;
