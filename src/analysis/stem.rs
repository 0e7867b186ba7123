//! Pluggable stemming seam for the tokenizer.
//!
//! Stemming algorithms live outside this crate; the tokenizer only knows the
//! single-method [`Stemmer`] contract and applies it to each normalized token
//! before filtering.

use std::borrow::Cow;

/// A token post-processor that reduces a word to its stem.
pub trait Stemmer {
    /// Reduce `token` to its stem. Implementations that leave the token
    /// unchanged should return `Cow::Borrowed` to avoid an allocation.
    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str>;

    /// Human-readable name of this stemmer.
    fn name(&self) -> &'static str {
        "stemmer"
    }
}

/// A stemmer that returns every token unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(token)
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
