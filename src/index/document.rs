//! Document metadata and index-level statistics.

use serde::{Deserialize, Serialize};

/// A document held by the index.
///
/// `id` is dense and assigned at add-time; `url` is a unique secondary key.
/// `content` is retained in memory during a build so snippets can be cut
/// from it, but is not persisted to the binary index. `length` is the number
/// of unique terms extracted from the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u32,
    pub title: String,
    pub url: String,
    pub content: String,
    pub length: u32,
}

impl Document {
    /// Create an unindexed document; the id is assigned by the index.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Document {
            id: 0,
            title: title.into(),
            url: url.into(),
            content: content.into(),
            length: 0,
        }
    }
}

/// Snapshot of index-wide statistics, recomputable from the index state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub total_postings: usize,
    pub avg_document_length: f64,
    pub avg_term_frequency: f64,
    pub most_frequent_term: String,
    /// Number of documents the most frequent term appears in.
    pub most_frequent_term_count: usize,
}
