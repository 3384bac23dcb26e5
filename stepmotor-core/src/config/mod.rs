//! Configuration types
//!
//! Board-agnostic motor configuration, optionally stored as postcard
//! binary data.

pub mod hardware;

pub use hardware::*;
