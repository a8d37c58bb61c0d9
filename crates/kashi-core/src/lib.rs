//! kashi-core — Pure types, request validation and sync-map parsing.
//!
//! No async runtime, no I/O, no subprocesses.

pub mod syncmap;
pub mod types;
pub mod validate;
pub mod wav;
