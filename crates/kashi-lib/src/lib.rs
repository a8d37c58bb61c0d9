//! kashi-lib — Lyrics alignment engine.
//!
//! Audio download, ffmpeg normalization, aeneas invocation, request job
//! lifecycle, startup dependency check and the HTTP API.
//! Depends on kashi-core for wire types and pure parsing.

pub mod align;
pub mod convert;
pub mod deps;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod staging;
pub mod tool;

#[cfg(test)]
mod testutil;

// Re-export kashi-core for convenience
pub use kashi_core;
