//! Bit-vector query evaluation.
//!
//! Walks the AST bottom-up, materializing one document bit-vector per node;
//! every vector has one bit per document in the index. Phrase and proximity
//! nodes start from the first term's document set and clear every candidate
//! that fails positional verification.

use serde::Serialize;

use crate::index::inverted::InvertedIndex;
use crate::query::ast::QueryAst;
use crate::util::bitvec::BitVector;

/// One matching document in a detailed result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    pub doc_id: u32,
    pub score: f64,
    pub matches: usize,
}

/// Evaluates query ASTs against a borrowed index.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    index: &'a InvertedIndex,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        QueryEvaluator { index }
    }

    /// Evaluate `ast` to the set of matching documents.
    pub fn evaluate(&self, ast: &QueryAst) -> BitVector {
        match ast {
            QueryAst::Term(term) => self.eval_term(term),
            QueryAst::Phrase(terms) => self.eval_positional(terms, |doc_id, terms| {
                self.check_phrase(doc_id, terms)
            }),
            QueryAst::Proximity { terms, distance } => {
                self.eval_positional(terms, |doc_id, terms| {
                    self.check_proximity(doc_id, terms, *distance)
                })
            }
            QueryAst::And(left, right) => self.evaluate(left) & self.evaluate(right),
            QueryAst::Or(left, right) => self.evaluate(left) | self.evaluate(right),
            QueryAst::Not(operand) => {
                let mut result = self.evaluate(operand);
                result.negate();
                result
            }
        }
    }

    /// Expand the result set to per-document records, sorted by score
    /// descending with ascending doc id breaking ties.
    pub fn evaluate_detailed(&self, ast: &QueryAst) -> Vec<DocumentResult> {
        let bits = self.evaluate(ast);
        let mut results: Vec<DocumentResult> = bits
            .ones()
            .map(|doc_id| DocumentResult {
                doc_id: doc_id as u32,
                score: 1.0,
                matches: 1,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results
    }

    /// The first `n` detailed results.
    pub fn get_top_results(&self, ast: &QueryAst, n: usize) -> Vec<DocumentResult> {
        let mut results = self.evaluate_detailed(ast);
        results.truncate(n);
        results
    }

    /// Number of matching documents.
    pub fn count_results(&self, ast: &QueryAst) -> usize {
        self.evaluate(ast).count_ones()
    }

    /// True if at least one document matches.
    pub fn evaluate_exists(&self, ast: &QueryAst) -> bool {
        self.evaluate(ast).any()
    }

    /// Random-access check for a single document.
    pub fn document_matches(&self, ast: &QueryAst, doc_id: u32) -> bool {
        if (doc_id as usize) >= self.index.document_count() {
            return false;
        }
        self.evaluate(ast).get(doc_id as usize)
    }

    fn eval_term(&self, term: &str) -> BitVector {
        let mut bits = BitVector::new(self.index.document_count());
        if let Some(postings) = self.index.find_postings(term) {
            for posting in postings {
                if (posting.doc_id as usize) < bits.len() {
                    bits.set(posting.doc_id as usize, true);
                }
            }
        }
        bits
    }

    fn eval_positional<F>(&self, terms: &[String], check: F) -> BitVector
    where
        F: Fn(u32, &[String]) -> bool,
    {
        if terms.is_empty() {
            return BitVector::new(self.index.document_count());
        }

        // Candidates are the documents containing the first term; each is
        // re-verified against the positional postings.
        let mut candidates = self.eval_term(&terms[0]);
        let mut cursor = candidates.find_first();
        while let Some(doc_id) = cursor {
            cursor = candidates.find_next(doc_id);
            if !check(doc_id as u32, terms) {
                candidates.set(doc_id, false);
            }
        }
        candidates
    }

    /// Positions of `term` within `doc_id`, if the term occurs there.
    fn term_positions(&self, term: &str, doc_id: u32) -> Option<&'a [u32]> {
        self.index
            .find_postings(term)?
            .iter()
            .find(|p| p.doc_id == doc_id)
            .map(|p| p.positions.as_slice())
    }

    /// A phrase matches at offset `p` iff term `i` occurs at `p + i` for
    /// every `i`.
    fn check_phrase(&self, doc_id: u32, terms: &[String]) -> bool {
        let Some(first_positions) = self.term_positions(&terms[0], doc_id) else {
            return false;
        };

        let rest: Vec<&[u32]> = match terms[1..]
            .iter()
            .map(|t| self.term_positions(t, doc_id))
            .collect()
        {
            Some(rest) => rest,
            None => return false,
        };

        first_positions.iter().any(|&p| {
            rest.iter().enumerate().all(|(i, positions)| {
                match p.checked_add(i as u32 + 1) {
                    Some(want) => positions.binary_search(&want).is_ok(),
                    None => false,
                }
            })
        })
    }

    /// A proximity group matches iff some position `p` of the first term
    /// has, for every other term, a position `q` with `p <= q <= p + d`.
    fn check_proximity(&self, doc_id: u32, terms: &[String], distance: u32) -> bool {
        let Some(first_positions) = self.term_positions(&terms[0], doc_id) else {
            return false;
        };

        let rest: Vec<&[u32]> = match terms[1..]
            .iter()
            .map(|t| self.term_positions(t, doc_id))
            .collect()
        {
            Some(rest) => rest,
            None => return false,
        };

        first_positions.iter().any(|&p| {
            let limit = p.saturating_add(distance);
            rest.iter().all(|positions| {
                let start = positions.partition_point(|&q| q < p);
                positions.get(start).is_some_and(|&q| q <= limit)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::document::Document;
    use crate::query::parser::QueryParser;

    fn sample_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.index_document(Document::new("Doc 0", "u0", "red car fast"));
        index.index_document(Document::new("Doc 1", "u1", "blue car slow"));
        index.index_document(Document::new("Doc 2", "u2", "red motorbike fast"));
        index
    }

    fn eval(index: &InvertedIndex, query: &str) -> Vec<usize> {
        let ast = QueryParser::new().parse(query).unwrap().unwrap();
        QueryEvaluator::new(index).evaluate(&ast).ones().collect()
    }

    #[test]
    fn test_term() {
        let index = sample_index();
        assert_eq!(eval(&index, "car"), vec![0, 1]);
        assert_eq!(eval(&index, "red"), vec![0, 2]);
        assert_eq!(eval(&index, "plane"), Vec::<usize>::new());
    }

    #[test]
    fn test_and_or_not() {
        let index = sample_index();
        assert_eq!(eval(&index, "red && car"), vec![0]);
        assert_eq!(eval(&index, "red || blue"), vec![0, 1, 2]);
        assert_eq!(eval(&index, "car && !red"), vec![1]);
        assert_eq!(eval(&index, "(red || blue) && fast"), vec![0]);
    }

    #[test]
    fn test_not_of_absent_term_matches_everything() {
        let index = sample_index();
        assert_eq!(eval(&index, "!plane"), vec![0, 1, 2]);
    }

    #[test]
    fn test_phrase() {
        let mut index = InvertedIndex::new();
        index.index_document(Document::new("0", "u0", "moscow aviation institute founded 1930"));
        index.index_document(Document::new("1", "u1", "aviation institute in moscow is called mai"));
        index.index_document(Document::new("2", "u2", "moscow institute aviation technical"));

        assert_eq!(eval(&index, "\"moscow aviation institute\""), vec![0]);
        assert_eq!(eval(&index, "\"aviation institute\""), vec![0, 1]);
        // Positions are counted after filtering, so dropping the stop-words
        // "in"/"is" makes "institute moscow" adjacent in doc 1.
        assert_eq!(eval(&index, "\"institute moscow\""), vec![1]);
        assert_eq!(eval(&index, "\"institute technical\""), Vec::<usize>::new());
    }

    #[test]
    fn test_phrase_of_length_one_equals_term() {
        let index = sample_index();
        assert_eq!(eval(&index, "\"red\""), eval(&index, "red"));
    }

    #[test]
    fn test_proximity() {
        let mut index = InvertedIndex::new();
        index.index_document(Document::new("0", "u0", "moscow aviation institute founded 1930"));
        index.index_document(Document::new("1", "u1", "aviation institute in moscow is called mai"));
        index.index_document(Document::new("2", "u2", "moscow institute aviation technical"));

        // "institute" must appear at most 3 positions after "moscow"; in
        // doc 1 it appears before, so only docs 0 and 2 qualify.
        assert_eq!(eval(&index, "\"moscow institute\" / 3"), vec![0, 2]);
        assert_eq!(eval(&index, "\"moscow institute\" / 1"), vec![2]);
        assert_eq!(eval(&index, "\"moscow founded\" / 1"), Vec::<usize>::new());
        assert_eq!(eval(&index, "\"moscow founded\" / 3"), vec![0]);
    }

    #[test]
    fn test_proximity_distance_zero_means_same_position() {
        let mut index = InvertedIndex::new();
        index.index_document(Document::new("0", "u0", "alpha beta"));
        // Distinct terms never share a position, so distance 0 across two
        // terms can only fail.
        assert_eq!(eval(&index, "\"alpha beta\" / 0"), Vec::<usize>::new());
        assert_eq!(eval(&index, "\"alpha beta\" / 1"), vec![0]);
    }

    #[test]
    fn test_detailed_results_are_ordered() {
        let index = sample_index();
        let ast = QueryParser::new().parse("red || blue").unwrap().unwrap();
        let evaluator = QueryEvaluator::new(&index);

        let results = evaluator.evaluate_detailed(&ast);
        let ids: Vec<u32> = results.iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(results.iter().all(|r| r.score == 1.0 && r.matches == 1));

        let top = evaluator.get_top_results(&ast, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].doc_id, 0);
    }

    #[test]
    fn test_count_exists_and_document_matches() {
        let index = sample_index();
        let parser = QueryParser::new();
        let evaluator = QueryEvaluator::new(&index);

        let ast = parser.parse("red").unwrap().unwrap();
        assert_eq!(evaluator.count_results(&ast), 2);
        assert!(evaluator.evaluate_exists(&ast));
        assert!(evaluator.document_matches(&ast, 0));
        assert!(!evaluator.document_matches(&ast, 1));
        assert!(!evaluator.document_matches(&ast, 99));

        let ast = parser.parse("plane").unwrap().unwrap();
        assert_eq!(evaluator.count_results(&ast), 0);
        assert!(!evaluator.evaluate_exists(&ast));
    }

    #[test]
    fn test_empty_index() {
        let index = InvertedIndex::new();
        assert_eq!(eval(&index, "red"), Vec::<usize>::new());
        assert_eq!(eval(&index, "!red"), Vec::<usize>::new());
    }

    #[test]
    fn test_unoptimized_postings_still_evaluate() {
        // Postings lists are only sorted after optimize(); evaluation must
        // not depend on that.
        let mut index = sample_index();
        index.index_document(Document::new("3", "u3", "red red car"));
        assert_eq!(eval(&index, "red && car"), vec![0, 3]);
        // Doc 3 matches the phrase at its second "red".
        assert_eq!(eval(&index, "\"red car\""), vec![0, 3]);

        index.optimize();
        assert_eq!(eval(&index, "red && car"), vec![0, 3]);
    }
}
