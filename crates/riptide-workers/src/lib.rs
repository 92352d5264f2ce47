//! Cooperative polling, change detection and webhook fan-out for
//! registered watch targets (§4.7, component J).

pub mod error;
pub mod manager;
pub mod persistence;
pub mod webhook;

pub use error::{WatchError, WatchResult};
pub use manager::{AddWatchOptions, WatchManager, TICK_INTERVAL};
pub use persistence::WatchStore;
