//! Built-in `Extractor` implementations the Distiller runs as part of
//! its default ensemble.

pub mod dom_heuristic;
pub mod fallback;
pub mod readability;

pub use dom_heuristic::DomHeuristicExtractor;
pub use fallback::FallbackExtractor;
pub use readability::ReadabilityExtractor;
