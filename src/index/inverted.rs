//! The in-memory inverted index.
//!
//! Maps each term to an ordered postings list and manages the document
//! table. Documents are identified by dense ids assigned at add-time; urls
//! form a unique secondary key. The index is built single-threaded and lent
//! immutably to readers.

use std::path::Path;

use ahash::AHashMap;
use tracing::debug;

use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, TesseraError};
use crate::index::document::{Document, IndexStats};
use crate::index::posting::Posting;
use crate::index::{export, persist};

/// A positional inverted index over a document collection.
pub struct InvertedIndex {
    /// Term → postings list.
    pub(crate) terms: AHashMap<String, Vec<Posting>>,

    /// Terms in first-creation order; fixes the emission order for
    /// `all_terms` and the binary format within a session.
    pub(crate) term_order: Vec<String>,

    /// Documents indexed by id.
    pub(crate) documents: Vec<Document>,

    /// Url → document id.
    pub(crate) url_index: AHashMap<String, u32>,

    tokenizer: Tokenizer,

    /// Total number of postings across all terms.
    pub(crate) posting_count: usize,

    /// Total surviving token occurrences across all documents.
    pub(crate) token_count: u64,
}

impl std::fmt::Debug for InvertedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvertedIndex")
            .field("documents", &self.documents.len())
            .field("terms", &self.terms.len())
            .field("postings", &self.posting_count)
            .finish()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InvertedIndex {
    /// Create an empty index with a default tokenizer.
    pub fn new() -> Self {
        Self::with_tokenizer(Tokenizer::new())
    }

    /// Create an empty index that analyzes content with `tokenizer`.
    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        InvertedIndex {
            terms: AHashMap::new(),
            term_order: Vec::new(),
            documents: Vec::new(),
            url_index: AHashMap::new(),
            tokenizer,
            posting_count: 0,
            token_count: 0,
        }
    }

    /// The tokenizer used to analyze document content.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Register a document without indexing its content.
    ///
    /// If the url is already present, the existing id is returned and the
    /// document is dropped; otherwise the next dense id is assigned.
    pub fn add_document(&mut self, mut document: Document) -> u32 {
        if let Some(&id) = self.url_index.get(&document.url) {
            return id;
        }

        let doc_id = self.documents.len() as u32;
        document.id = doc_id;
        self.url_index.insert(document.url.clone(), doc_id);
        self.documents.push(document);
        doc_id
    }

    /// Add a document and index its content.
    ///
    /// Tokenizes the content, accumulates the positions of each distinct
    /// term, and appends one posting per term. Re-submitting an existing url
    /// returns its id without re-indexing.
    pub fn index_document(&mut self, document: Document) -> u32 {
        if let Some(&id) = self.url_index.get(&document.url) {
            return id;
        }

        let tokens = self.tokenizer.tokenize_with_offsets(&document.content);
        self.token_count += tokens.len() as u64;

        // Positions per distinct term, in first-occurrence order.
        let mut slots: AHashMap<String, usize> = AHashMap::new();
        let mut term_positions: Vec<(String, Vec<u32>)> = Vec::new();
        for (position, token) in tokens.into_iter().enumerate() {
            match slots.get(token.text.as_str()) {
                Some(&slot) => term_positions[slot].1.push(position as u32),
                None => {
                    slots.insert(token.text.clone(), term_positions.len());
                    term_positions.push((token.text, vec![position as u32]));
                }
            }
        }

        let mut doc = document;
        doc.length = term_positions.len() as u32;
        let doc_id = self.add_document(doc);

        for (term, positions) in term_positions {
            let posting = Posting::with_positions(doc_id, positions);
            match self.terms.get_mut(&term) {
                Some(postings) => postings.push(posting),
                None => {
                    self.term_order.push(term.clone());
                    self.terms.insert(term, vec![posting]);
                }
            }
            self.posting_count += 1;
        }

        doc_id
    }

    /// Reset the index to its empty state.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.term_order.clear();
        self.documents.clear();
        self.url_index.clear();
        self.posting_count = 0;
        self.token_count = 0;
    }

    /// Sort every postings list by ascending doc id. Idempotent.
    pub fn optimize(&mut self) {
        for postings in self.terms.values_mut() {
            postings.sort_unstable_by_key(|p| p.doc_id);
        }
        debug!(
            terms = self.terms.len(),
            postings = self.posting_count,
            "postings lists sorted"
        );
    }

    /// The postings list for `term`, if the term is indexed.
    pub fn find_postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(|p| p.as_slice())
    }

    /// The document with id `doc_id`.
    pub fn get_document(&self, doc_id: u32) -> Result<&Document> {
        self.documents.get(doc_id as usize).ok_or_else(|| {
            TesseraError::not_found(format!("document id {doc_id} out of range"))
        })
    }

    /// The document registered under `url`, if any.
    pub fn get_document_by_url(&self, url: &str) -> Option<&Document> {
        self.url_index
            .get(url)
            .map(|&id| &self.documents[id as usize])
    }

    /// All indexed terms, in a stable within-session order.
    pub fn all_terms(&self) -> &[String] {
        &self.term_order
    }

    /// Total occurrences of `term` across the collection; 0 if absent.
    pub fn term_frequency(&self, term: &str) -> u64 {
        self.terms
            .get(term)
            .map(|postings| postings.iter().map(|p| p.frequency() as u64).sum())
            .unwrap_or(0)
    }

    /// Number of documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Total number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.posting_count
    }

    /// Total surviving token occurrences across all documents.
    pub fn token_count(&self) -> u64 {
        self.token_count
    }

    /// Compute a statistics snapshot from the current state.
    pub fn stats(&self) -> IndexStats {
        let total_documents = self.documents.len();
        let total_doc_length: u64 = self.documents.iter().map(|d| d.length as u64).sum();

        let mut most_frequent_term = String::new();
        let mut most_frequent_term_count = 0;
        for term in &self.term_order {
            let doc_count = self.terms[term].len();
            if doc_count > most_frequent_term_count {
                most_frequent_term_count = doc_count;
                most_frequent_term = term.clone();
            }
        }

        IndexStats {
            total_documents,
            total_terms: self.terms.len(),
            total_postings: self.posting_count,
            avg_document_length: if total_documents > 0 {
                total_doc_length as f64 / total_documents as f64
            } else {
                0.0
            },
            avg_term_frequency: if self.terms.is_empty() {
                0.0
            } else {
                self.posting_count as f64 / self.terms.len() as f64
            },
            most_frequent_term,
            most_frequent_term_count,
        }
    }

    /// Check the structural invariants of the index.
    ///
    /// Verifies dense document ids, url mapping consistency, posting
    /// referential integrity, and position ordering (lists reconstructed
    /// from disk carry placeholder zero positions and are exempt from the
    /// ordering check).
    pub fn validate(&self) -> bool {
        for (i, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != i {
                return false;
            }
            match self.url_index.get(&doc.url) {
                Some(&id) if id == doc.id => {}
                _ => return false,
            }
        }

        if self.url_index.len() != self.documents.len() {
            return false;
        }

        if self.term_order.len() != self.terms.len() {
            return false;
        }

        for term in &self.term_order {
            let Some(postings) = self.terms.get(term) else {
                return false;
            };
            for posting in postings {
                if posting.doc_id as usize >= self.documents.len() {
                    return false;
                }
                let positions = &posting.positions;
                let placeholder = positions.iter().all(|&p| p == 0);
                if !placeholder && !positions.windows(2).all(|w| w[0] < w[1]) {
                    return false;
                }
            }
        }

        true
    }

    /// Persist the index to `path` in the binary `BOOLIDX` format.
    ///
    /// Positions are not persisted; a reloaded index answers boolean
    /// queries but not positional ones.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        persist::save(self, path)?;
        debug!(path = %path.display(), documents = self.documents.len(), "index saved");
        Ok(())
    }

    /// Replace this index's contents with the index stored at `path`.
    ///
    /// The current tokenizer is kept. On failure the in-memory state is
    /// left untouched.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let loaded = persist::load(path)?;
        self.terms = loaded.terms;
        self.term_order = loaded.term_order;
        self.documents = loaded.documents;
        self.url_index = loaded.url_index;
        self.posting_count = loaded.posting_count;
        self.token_count = loaded.token_count;
        debug!(path = %path.display(), documents = self.documents.len(), "index loaded");
        Ok(())
    }

    /// Write a human-readable dump of the index to `path`.
    pub fn export_to_text(&self, path: &Path) -> Result<()> {
        export::export_to_text(self, path)
    }
}
