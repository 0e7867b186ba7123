//! Inverted index: in-memory data model, binary persistence, and bulk
//! construction.
//!
//! # Module Structure
//!
//! - [`document`]: document metadata and index statistics
//! - [`posting`]: a term's occurrences within one document
//! - [`inverted`]: the index itself (build and read operations)
//! - [`persist`]: the `BOOLIDX` binary file format
//! - [`export`]: human-readable text dump
//! - [`builder`]: bulk construction from document collections and files

pub mod builder;
pub mod document;
pub mod export;
pub mod inverted;
pub mod persist;
pub mod posting;

pub use builder::{BuildStats, IndexBuilder};
pub use document::{Document, IndexStats};
pub use inverted::InvertedIndex;
pub use posting::Posting;
