// src/capture/mod.rs

//! Output capture layer.
//!
//! - [`filter`] holds the line filter (prefix-anchored exclusion regexes).
//! - [`decode`] turns raw chunks into filtered, trimmed text lines.
//! - [`drain`] owns the non-blocking drain of a child's combined output.

pub mod decode;
pub mod drain;
pub mod filter;

pub use decode::{decode_bytes, decode_line};
pub use drain::{ChunkSender, OutputCapture};
pub use filter::LineFilter;
