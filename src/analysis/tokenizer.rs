//! Positional tokenizer.
//!
//! Splits raw text into normalized tokens, filtering by length and
//! stop-words. Scanning treats ASCII whitespace and ASCII punctuation as
//! delimiters; any character outside the ASCII range is opaque content, so
//! multi-byte scripts pass through untouched apart from case folding.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::analysis::stem::Stemmer;
use crate::analysis::stopwords::{self, DEFAULT_STOPWORDS};
use crate::error::{Result, TesseraError};

/// Tokenizer options, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Minimum surviving token length in bytes.
    pub min_token_length: usize,

    /// Maximum surviving token length in bytes; longer raw tokens are
    /// flushed at the boundary and a new token begins.
    pub max_token_length: usize,

    /// Drop ASCII digits during normalization.
    pub remove_numbers: bool,

    /// Drop interior ASCII punctuation (apostrophe and hyphen excepted)
    /// during normalization.
    pub remove_punctuation: bool,

    /// Lowercase tokens through the Unicode case-fold mapping.
    pub case_folding: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            min_token_length: 2,
            max_token_length: 50,
            remove_numbers: false,
            remove_punctuation: true,
            case_folding: true,
        }
    }
}

impl TokenizerConfig {
    /// Load a configuration from a `key=value` file.
    ///
    /// Unrecognized keys and lines without `=` are ignored; unparsable
    /// values are an error. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut config = TokenizerConfig::default();

        for line in reader.lines() {
            let line = line?;
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "min_token_length" => config.min_token_length = parse_usize(key, value)?,
                "max_token_length" => config.max_token_length = parse_usize(key, value)?,
                "remove_numbers" => config.remove_numbers = parse_bool(key, value)?,
                "remove_punctuation" => config.remove_punctuation = parse_bool(key, value)?,
                "case_folding" => config.case_folding = parse_bool(key, value)?,
                _ => {}
            }
        }

        Ok(config)
    }

    /// Write this configuration in the `key=value` format read by [`load`].
    ///
    /// [`load`]: TokenizerConfig::load
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "min_token_length={}", self.min_token_length)?;
        writeln!(writer, "max_token_length={}", self.max_token_length)?;
        writeln!(writer, "remove_numbers={}", self.remove_numbers)?;
        writeln!(writer, "remove_punctuation={}", self.remove_punctuation)?;
        writeln!(writer, "case_folding={}", self.case_folding)?;
        writer.flush()?;
        Ok(())
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| TesseraError::invalid_argument(format!("invalid value for {key}: {value}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(TesseraError::invalid_argument(format!(
            "invalid value for {key}: {value}"
        ))),
    }
}

/// A surviving token together with where it came from in the source text.
///
/// `offset` is the starting byte offset of the raw token and `raw_len` the
/// number of bytes it occupied before normalization. The logical position
/// recorded in postings is the index of the token within the returned
/// sequence, not the byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithOffset {
    pub text: String,
    pub offset: usize,
    pub raw_len: usize,
}

/// Aggregate statistics over a batch of tokenized documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenStats {
    pub total_tokens: usize,
    pub unique_tokens: usize,
    pub avg_token_length: f64,
    pub tokens_per_document: f64,
}

/// Splits and normalizes text into a filtered token stream.
pub struct Tokenizer {
    config: TokenizerConfig,
    stopwords: AHashSet<String>,
    stemmer: Option<Box<dyn Stemmer>>,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .field("stemmer", &self.stemmer.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a tokenizer with default options and the built-in stop-word
    /// list.
    pub fn new() -> Self {
        Self::with_config(TokenizerConfig::default())
    }

    /// Create a tokenizer with the given options and the built-in stop-word
    /// list.
    pub fn with_config(config: TokenizerConfig) -> Self {
        Tokenizer {
            config,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            stemmer: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Attach a stemmer applied to each token after normalization and
    /// before filtering.
    pub fn with_stemmer(mut self, stemmer: Box<dyn Stemmer>) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    /// Add a stop-word. The word is compared against normalized tokens, so
    /// it should be supplied in folded form when case folding is on.
    pub fn add_stopword(&mut self, word: impl Into<String>) {
        self.stopwords.insert(word.into());
    }

    /// Remove a stop-word; returns whether it was present.
    pub fn remove_stopword(&mut self, word: &str) -> bool {
        self.stopwords.remove(word)
    }

    /// True if `word` is filtered as a stop-word.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Merge stop-words from a file (one per line) into the current set.
    /// Returns the number of words read.
    pub fn load_stopwords(&mut self, path: &Path) -> Result<usize> {
        let words = stopwords::load_stopwords_file(path, self.config.case_folding)?;
        let count = words.len();
        self.stopwords.extend(words);
        Ok(count)
    }

    /// Tokenize `text`, emitting surviving tokens in source order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenize_with_offsets(text)
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    /// Tokenize `text`, carrying each token's source byte offset and raw
    /// byte length. Never fails; empty input yields an empty sequence.
    pub fn tokenize_with_offsets(&self, text: &str) -> Vec<TokenWithOffset> {
        let mut tokens = Vec::new();
        let mut raw = String::new();
        let mut start = 0usize;

        for (offset, ch) in text.char_indices() {
            if is_delimiter(ch) {
                self.flush(&mut raw, start, &mut tokens);
                continue;
            }

            if raw.is_empty() {
                start = offset;
            } else if raw.len() + ch.len_utf8() > self.config.max_token_length {
                // Flush at the max boundary and start a new raw token.
                self.flush(&mut raw, start, &mut tokens);
                start = offset;
            }
            raw.push(ch);
        }
        self.flush(&mut raw, start, &mut tokens);

        tokens
    }

    /// Compute aggregate statistics over pre-tokenized documents.
    pub fn stats(&self, tokenized_docs: &[Vec<String>]) -> TokenStats {
        if tokenized_docs.is_empty() {
            return TokenStats::default();
        }

        let mut unique = AHashSet::new();
        let mut total_tokens = 0usize;
        let mut total_bytes = 0usize;

        for doc_tokens in tokenized_docs {
            for token in doc_tokens {
                total_tokens += 1;
                total_bytes += token.len();
                unique.insert(token.as_str());
            }
        }

        TokenStats {
            total_tokens,
            unique_tokens: unique.len(),
            avg_token_length: if total_tokens > 0 {
                total_bytes as f64 / total_tokens as f64
            } else {
                0.0
            },
            tokens_per_document: total_tokens as f64 / tokenized_docs.len() as f64,
        }
    }

    fn flush(&self, raw: &mut String, start: usize, out: &mut Vec<TokenWithOffset>) {
        if raw.is_empty() {
            return;
        }
        let raw_len = raw.len();

        let normalized = self.normalize(raw);
        let token = match &self.stemmer {
            Some(stemmer) => stemmer.stem(&normalized).into_owned(),
            None => normalized,
        };

        if self.accepts(&token) {
            out.push(TokenWithOffset {
                text: token,
                offset: start,
                raw_len,
            });
        }
        raw.clear();
    }

    fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim_matches(|c: char| c.is_ascii_punctuation());

        let mut out = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            if self.config.remove_numbers && ch.is_ascii_digit() {
                continue;
            }
            if self.config.remove_punctuation
                && ch.is_ascii_punctuation()
                && ch != '\''
                && ch != '-'
            {
                continue;
            }
            if self.config.case_folding {
                out.extend(ch.to_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    fn accepts(&self, token: &str) -> bool {
        token.len() >= self.config.min_token_length
            && token.len() <= self.config.max_token_length
            && !self.stopwords.contains(token)
    }
}

/// Delimiters are ASCII whitespace and ASCII punctuation; characters outside
/// the ASCII range are always content.
fn is_delimiter(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch.is_ascii_punctuation()
}
