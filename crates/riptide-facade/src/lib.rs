//! Composition root for the content-extraction and watch service: wires
//! together the extraction ensemble, two-tier cache, circuit breaker,
//! watch manager, agentic extractor and workflow engine (§9 "Singletons").

pub mod services;

pub use services::Services;
