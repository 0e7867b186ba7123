//! Default stop-word list and stop-word file loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// The built-in stop-word list seeded into every tokenizer.
///
/// Callers can remove entries, add their own, or load a replacement list
/// from a file; nothing else in the crate assumes a particular language.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in",
    "into", "is", "it", "no", "not", "of", "on", "or", "such", "that", "the",
    "their", "then", "there", "these", "they", "this", "to", "was", "will",
    "with",
];

/// Read a stop-word file: UTF-8 text, one word per line, blank lines skipped.
///
/// When `case_folding` is on the words are lowercased so they compare against
/// normalized tokens.
pub fn load_stopwords_file(path: &Path, case_folding: bool) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        if case_folding {
            words.push(word.to_lowercase());
        } else {
            words.push(word.to_string());
        }
    }
    Ok(words)
}
