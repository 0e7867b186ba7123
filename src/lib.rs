//! # Tessera
//!
//! A boolean text retrieval engine: positional inverted index, compact
//! binary persistence, and a boolean query language with phrase and
//! proximity constraints.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Positional postings with phrase and proximity verification
//! - Bit-vector driven boolean evaluation
//! - Compact binary index format with text export
//! - Configurable tokenizer with stop-words and a pluggable stemmer seam
//!
//! ## Quick start
//!
//! ```
//! use tessera::{Document, InvertedIndex, SearchEngine};
//!
//! let mut index = InvertedIndex::new();
//! index.index_document(Document::new("Doc", "https://example.com", "red car fast"));
//! index.optimize();
//!
//! let mut engine = SearchEngine::with_index(index);
//! let result = engine.search("red && car", 10);
//! assert_eq!(result.doc_ids, vec![0]);
//! ```

// Core modules
pub mod analysis;
mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod util;

// Re-exports for the public API
pub use analysis::stem::{IdentityStemmer, Stemmer};
pub use analysis::tokenizer::{TokenStats, TokenWithOffset, Tokenizer, TokenizerConfig};
pub use error::{Result, TesseraError};
pub use index::builder::{BuildStats, IndexBuilder};
pub use index::document::{Document, IndexStats};
pub use index::inverted::InvertedIndex;
pub use index::posting::Posting;
pub use query::ast::QueryAst;
pub use query::parser::QueryParser;
pub use search::engine::{QueryInfo, SearchEngine, SearchResult, SearchStats};
pub use search::evaluator::{DocumentResult, QueryEvaluator};
pub use util::bitvec::BitVector;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
