//! High-level search facade.
//!
//! `SearchEngine` owns the index and the query parser, times every query,
//! keeps running statistics, and layers convenience operations (term
//! suggestions, similar-document lookup, snippets) over the evaluator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use ahash::AHashSet;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::index::document::Document;
use crate::index::inverted::InvertedIndex;
use crate::query::ast::QueryAst;
use crate::query::parser::QueryParser;
use crate::search::evaluator::QueryEvaluator;

/// Outcome of one search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The query as submitted.
    pub query: String,
    /// Matching document ids, capped at the requested limit.
    pub doc_ids: Vec<u32>,
    /// Per-result scores (uniformly 1.0; presence-only ranking).
    pub scores: Vec<f64>,
    /// Total matches before the cap.
    pub total_found: usize,
    /// Wall time spent on this query.
    pub time_ms: u64,
    /// False when the query failed to compile.
    pub syntax_valid: bool,
    /// The compile error, when `syntax_valid` is false.
    pub error_message: Option<String>,
}

impl SearchResult {
    fn empty(query: &str) -> Self {
        SearchResult {
            query: query.to_string(),
            doc_ids: Vec::new(),
            scores: Vec::new(),
            total_found: 0,
            time_ms: 0,
            syntax_valid: true,
            error_message: None,
        }
    }
}

/// Running statistics over all queries served by an engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub total_time_ms: u64,
    pub query_times: Vec<u64>,
}

impl SearchStats {
    fn record(&mut self, success: bool, time_ms: u64) {
        self.total_queries += 1;
        if success {
            self.successful_queries += 1;
        } else {
            self.failed_queries += 1;
        }
        self.total_time_ms += time_ms;
        self.query_times.push(time_ms);
    }

    /// Mean query time in milliseconds.
    pub fn average_time_ms(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            self.total_time_ms as f64 / self.total_queries as f64
        }
    }
}

/// Compile-time information about a query, without evaluating it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryInfo {
    pub query: String,
    pub terms: Vec<String>,
    pub complexity: usize,
    pub is_valid: bool,
    pub parse_tree: Option<String>,
    pub error_message: Option<String>,
}

/// Boolean search over an owned inverted index.
#[derive(Debug)]
pub struct SearchEngine {
    index: InvertedIndex,
    parser: QueryParser,
    stats: SearchStats,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Create an engine over an empty index.
    pub fn new() -> Self {
        Self::with_index(InvertedIndex::new())
    }

    /// Create an engine over an existing index.
    pub fn with_index(index: InvertedIndex) -> Self {
        SearchEngine {
            index,
            parser: QueryParser::new(),
            stats: SearchStats::default(),
        }
    }

    /// The underlying index.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Replace the index with one loaded from `path`.
    ///
    /// On failure the current index is left untouched.
    pub fn load_index(&mut self, path: &Path) -> Result<()> {
        self.index.load_from_file(path)
    }

    /// Execute `query`, returning at most `limit` document ids.
    ///
    /// Compile errors do not abort the engine: they are reported through
    /// `syntax_valid` and `error_message` on the result. An empty query is
    /// a successful search with zero results.
    pub fn search(&mut self, query: &str, limit: usize) -> SearchResult {
        let start = Instant::now();
        let mut result = SearchResult::empty(query);

        match self.parser.parse(query) {
            Err(err) => {
                result.syntax_valid = false;
                result.error_message = Some(err.to_string());
            }
            Ok(None) => {}
            Ok(Some(ast)) => {
                let evaluator = QueryEvaluator::new(&self.index);
                let bits = evaluator.evaluate(&ast);
                result.total_found = bits.count_ones();
                for doc_id in bits.ones().take(limit) {
                    result.doc_ids.push(doc_id as u32);
                    result.scores.push(1.0);
                }
            }
        }

        result.time_ms = start.elapsed().as_millis() as u64;
        self.stats.record(result.syntax_valid, result.time_ms);
        debug!(
            query,
            found = result.total_found,
            valid = result.syntax_valid,
            time_ms = result.time_ms,
            "query evaluated"
        );
        result
    }

    /// Run `search` over a batch of queries.
    pub fn batch_search(&mut self, queries: &[String], limit: usize) -> Vec<SearchResult> {
        queries.iter().map(|q| self.search(q, limit)).collect()
    }

    /// True iff `query` compiles to a non-empty AST.
    pub fn validate_query(&self, query: &str) -> bool {
        self.parser.validate(query)
    }

    /// Compile `query` and report its terms, complexity, and canonical
    /// form, without evaluating it.
    pub fn analyze_query(&self, query: &str) -> QueryInfo {
        let mut info = QueryInfo {
            query: query.to_string(),
            terms: Vec::new(),
            complexity: 0,
            is_valid: false,
            parse_tree: None,
            error_message: None,
        };

        match self.parser.parse(query) {
            Ok(Some(ast)) => {
                info.is_valid = true;
                info.terms = ast.extract_terms();
                info.complexity = ast.complexity();
                info.parse_tree = Some(ast.to_string());
            }
            Ok(None) => {
                info.error_message = Some("Failed to parse query".to_string());
            }
            Err(err) => {
                info.error_message = Some(err.to_string());
            }
        }
        info
    }

    /// The document with id `doc_id`, if it exists.
    pub fn get_document(&self, doc_id: u32) -> Option<&Document> {
        self.index.get_document(doc_id).ok()
    }

    /// Statistics over the queries served so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Reset the query statistics.
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    /// Write a text report of the query statistics, followed by index
    /// statistics, to `path`.
    pub fn export_stats(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "=== Boolean Search Statistics ===")?;
        writeln!(out)?;
        writeln!(out, "Total queries: {}", self.stats.total_queries)?;
        writeln!(out, "Successful queries: {}", self.stats.successful_queries)?;
        writeln!(out, "Failed queries: {}", self.stats.failed_queries)?;
        writeln!(out, "Total search time: {} ms", self.stats.total_time_ms)?;
        writeln!(out, "Average query time: {} ms", self.stats.average_time_ms())?;

        if !self.stats.query_times.is_empty() {
            let mut sorted = self.stats.query_times.clone();
            sorted.sort_unstable();
            let min = sorted[0];
            let max = sorted[sorted.len() - 1];
            let median = sorted[sorted.len() / 2];

            writeln!(out)?;
            writeln!(out, "Query times distribution:")?;
            writeln!(out, "  Min time: {min} ms")?;
            writeln!(out, "  Max time: {max} ms")?;
            writeln!(out, "  Median time: {median} ms")?;

            writeln!(out)?;
            writeln!(out, "Time histogram:")?;
            const BINS: u64 = 10;
            let bin_size = (max - min + 1) / BINS + 1;
            for bin in 0..BINS {
                let lo = min + bin * bin_size;
                let hi = lo + bin_size;
                let count = sorted.iter().filter(|&&t| t >= lo && t < hi).count();
                if count > 0 {
                    writeln!(out, "  {lo}-{} ms: {count} queries", hi - 1)?;
                }
            }
        }

        let index_stats = self.index.stats();
        writeln!(out)?;
        writeln!(out, "=== Index Statistics ===")?;
        writeln!(out)?;
        writeln!(out, "Documents: {}", index_stats.total_documents)?;
        writeln!(out, "Terms: {}", index_stats.total_terms)?;
        writeln!(out, "Postings: {}", index_stats.total_postings)?;
        writeln!(
            out,
            "Avg document length: {} terms",
            index_stats.avg_document_length
        )?;

        out.flush()?;
        Ok(())
    }

    /// Indexed terms starting with `prefix`, up to `max_suggestions`, in
    /// the index's stable term order.
    pub fn suggest_terms(&self, prefix: &str, max_suggestions: usize) -> Vec<String> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let prefix = prefix.to_lowercase();

        self.index
            .all_terms()
            .iter()
            .filter(|term| term.starts_with(&prefix))
            .take(max_suggestions)
            .cloned()
            .collect()
    }

    /// Documents sharing at least one content term with `doc_id`, capped
    /// at `max_results`. The source document is excluded.
    pub fn find_similar(&self, doc_id: u32, max_results: usize) -> Vec<u32> {
        let Ok(doc) = self.index.get_document(doc_id) else {
            return Vec::new();
        };

        // An OR query over the document's own distinct terms.
        let mut seen = AHashSet::new();
        let mut ast: Option<QueryAst> = None;
        for token in self.index.tokenizer().tokenize(&doc.content) {
            if !seen.insert(token.clone()) {
                continue;
            }
            let term = QueryAst::Term(token);
            ast = Some(match ast {
                Some(prev) => QueryAst::Or(Box::new(prev), Box::new(term)),
                None => term,
            });
        }
        let Some(ast) = ast else {
            return Vec::new();
        };

        QueryEvaluator::new(&self.index)
            .evaluate(&ast)
            .ones()
            .map(|d| d as u32)
            .filter(|&d| d != doc_id)
            .take(max_results)
            .collect()
    }

    /// A fragment of the document's content around the first query-term
    /// hit, with matched terms bracketed and `...` marking cut edges.
    ///
    /// Falls back to a content prefix when the query yields no terms or
    /// none of them occur, and to the empty string when the document has no
    /// content in memory (an index loaded from disk).
    pub fn snippet(&self, doc_id: u32, query: &str, context_words: usize) -> String {
        let Ok(doc) = self.index.get_document(doc_id) else {
            return String::new();
        };
        if doc.content.is_empty() {
            return String::new();
        }

        let query_terms = match self.parser.parse(query) {
            Ok(Some(ast)) => ast.extract_terms(),
            _ => Vec::new(),
        };

        let tokens = self.index.tokenizer().tokenize_with_offsets(&doc.content);
        if tokens.is_empty() {
            return String::new();
        }

        let hit = tokens
            .iter()
            .position(|t| query_terms.iter().any(|q| *q == t.text));
        let Some(hit) = hit else {
            return content_prefix(&doc.content);
        };

        let start = hit.saturating_sub(context_words);
        let end = (hit + context_words + 1).min(tokens.len());

        let mut snippet = String::new();
        if start > 0 {
            snippet.push_str("...");
        }
        for (i, token) in tokens[start..end].iter().enumerate() {
            if i > 0 {
                snippet.push(' ');
            }
            if query_terms.iter().any(|q| *q == token.text) {
                snippet.push('[');
                snippet.push_str(&token.text);
                snippet.push(']');
            } else {
                snippet.push_str(&token.text);
            }
        }
        if end < tokens.len() {
            snippet.push_str("...");
        }
        snippet
    }
}

fn content_prefix(content: &str) -> String {
    const LIMIT: usize = 200;
    if content.len() <= LIMIT {
        return content.to_string();
    }
    let mut end = LIMIT;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}
