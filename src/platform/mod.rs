//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, no-op natively)
//! - DOM rendering of the scroll lists (web only)

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod storage;
