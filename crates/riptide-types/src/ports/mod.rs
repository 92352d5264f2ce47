//! Trait definitions for the external collaborators the core consumes
//! (§6). Each port is modeled as a single `async_trait`, one per module,
//! mirroring `riptide-types::ports::*` in the teacher crate.

mod browser_page;
mod diff_engine;
mod extractor;
mod fetch_client;
mod policy_engine;

pub use browser_page::{BrowserPage, Locator, WaitUntil};
pub use diff_engine::{ChangeDetection, DiffEngine, HistoryEntry, Snapshot};
pub use extractor::Extractor;
pub use fetch_client::{FetchClient, FetchMode, FetchRequest, FetchResult};
pub use policy_engine::{PolicyEngine, PolicyResult};
