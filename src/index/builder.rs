//! Bulk index construction.
//!
//! Drives `InvertedIndex` over whole document collections or line-oriented
//! text files and tracks build statistics.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, TesseraError};
use crate::index::document::Document;
use crate::index::inverted::InvertedIndex;

/// Statistics accumulated while building an index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub total_tokens: u64,
    pub unique_tokens: usize,
    #[serde(with = "duration_millis")]
    pub build_time: Duration,
    pub docs_per_sec: f64,
    pub tokens_per_sec: f64,
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }
}

/// Builds an inverted index from a document collection.
#[derive(Debug)]
pub struct IndexBuilder {
    index: InvertedIndex,
    stats: BuildStats,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Create a builder over an empty index with a default tokenizer.
    pub fn new() -> Self {
        Self::with_tokenizer(Tokenizer::new())
    }

    /// Create a builder whose index analyzes content with `tokenizer`.
    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        IndexBuilder {
            index: InvertedIndex::with_tokenizer(tokenizer),
            stats: BuildStats::default(),
        }
    }

    /// Index every document in `documents`. The collection must be
    /// non-empty; duplicated urls are counted as skipped.
    pub fn build_from_documents(&mut self, documents: Vec<Document>) -> Result<()> {
        if documents.is_empty() {
            return Err(TesseraError::invalid_argument(
                "cannot build an index from an empty document collection",
            ));
        }

        let start = Instant::now();
        let tokens_before = self.index.token_count();
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for document in documents {
            let count_before = self.index.document_count();
            self.index.index_document(document);
            if self.index.document_count() > count_before {
                processed += 1;
            } else {
                skipped += 1;
            }
        }

        self.record(
            processed,
            skipped,
            self.index.token_count() - tokens_before,
            start.elapsed(),
        );
        info!(
            documents = processed,
            skipped,
            terms = self.index.term_count(),
            "indexed document batch"
        );
        Ok(())
    }

    /// Build from a text file holding one document per line.
    ///
    /// Line `n` (1-based) becomes a document titled `Document n` with url
    /// `file://<path>#n`; blank lines are skipped.
    pub fn build_from_text_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut documents = Vec::new();
        let mut line_no = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            line_no += 1;
            documents.push(Document::new(
                format!("Document {line_no}"),
                format!("file://{}#{line_no}", path.display()),
                line,
            ));
        }

        if documents.is_empty() {
            return Err(TesseraError::invalid_argument(format!(
                "no documents found in {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), documents = documents.len(), "read document file");
        self.build_from_documents(documents)
    }

    /// Sort all postings lists by doc id.
    pub fn optimize(&mut self) {
        self.index.optimize();
    }

    /// The index being built.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Consume the builder, yielding the built index.
    pub fn into_index(self) -> InvertedIndex {
        self.index
    }

    /// Build statistics so far.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Reset the build statistics.
    pub fn reset_stats(&mut self) {
        self.stats = BuildStats::default();
    }

    /// Write a text report of the build statistics to `path`.
    pub fn export_stats(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "=== Index Build Statistics ===")?;
        writeln!(out)?;
        writeln!(out, "Documents processed: {}", self.stats.documents_processed)?;
        writeln!(out, "Documents skipped: {}", self.stats.documents_skipped)?;
        writeln!(out, "Total tokens: {}", self.stats.total_tokens)?;
        writeln!(out, "Unique tokens: {}", self.stats.unique_tokens)?;
        writeln!(out, "Build time: {} ms", self.stats.build_time.as_millis())?;
        writeln!(out, "Speed: {:.1} docs/sec", self.stats.docs_per_sec)?;
        writeln!(out, "Speed: {:.1} tokens/sec", self.stats.tokens_per_sec)?;

        out.flush()?;
        Ok(())
    }

    fn record(&mut self, processed: usize, skipped: usize, tokens: u64, elapsed: Duration) {
        self.stats.documents_processed += processed;
        self.stats.documents_skipped += skipped;
        self.stats.total_tokens += tokens;
        self.stats.build_time += elapsed;
        self.stats.unique_tokens = self.index.term_count();

        let seconds = self.stats.build_time.as_secs_f64();
        if seconds > 0.0 {
            self.stats.docs_per_sec = self.stats.documents_processed as f64 / seconds;
            self.stats.tokens_per_sec = self.stats.total_tokens as f64 / seconds;
        }
    }
}
