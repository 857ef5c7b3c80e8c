//! In-memory cache of the latest extracted region map.
//!
//! The source page is the source of truth. This crate keeps the most recent
//! snapshot that was successfully fetched and extracted from it, so that
//! callers keep getting answers while the page is down or temporarily
//! malformed. Nothing is persisted; a restart begins empty.
//!
//! # States
//! - **Empty**: nothing has ever loaded. A failed refresh is returned to the
//!   caller as an [`ErrorKind`](error::ErrorKind).
//! - **Fresh**: a snapshot is held. A failed refresh is logged and the held
//!   snapshot is served instead. There is no way back to empty.

mod cache;
pub mod error;
mod status;

pub use crate::cache::ResilientCache;
pub use crate::status::{CacheState, CacheStatus, Failure};
pub use civic_extract::models::Snapshot;
