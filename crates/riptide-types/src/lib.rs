//! # RipTide Types
//!
//! Shared data model, error types and port traits for the RipTide
//! distillation and watch system. This crate has no runtime behavior of
//! its own — it exists so that `riptide-extraction`, `riptide-cache`,
//! `riptide-headless`, `riptide-workflow` and `riptide-workers` can depend
//! on a single, dependency-free set of shapes without circular crate
//! references.
//!
//! ## Organization
//!
//! - `model`: the core data entities (`FetchResult`, `ExtractionCandidate`,
//!   `DistillationResult`, `WatchTarget`, `WatchEvent`, ...)
//! - `errors`: crate-wide error helpers
//! - `ports`: trait definitions for the external collaborators the core
//!   consumes (`FetchClient`, `Extractor`, `DiffEngine`, `PolicyEngine`,
//!   `BrowserPage`)

pub mod errors;
pub mod model;
pub mod ports;

pub use errors::{CoreError, CoreResult};
