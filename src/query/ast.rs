//! The query AST.
//!
//! One tagged sum type covers every node kind; each non-leaf variant owns
//! its children outright, so dropping the root drops the tree.

use std::fmt;

use ahash::AHashSet;

/// A parsed boolean query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAst {
    /// A single term.
    Term(String),
    /// Consecutive terms, in order.
    Phrase(Vec<String>),
    /// Terms co-occurring within `distance` positions of the first.
    Proximity { terms: Vec<String>, distance: u32 },
    /// Both sides must match.
    And(Box<QueryAst>, Box<QueryAst>),
    /// Either side must match.
    Or(Box<QueryAst>, Box<QueryAst>),
    /// The operand must not match.
    Not(Box<QueryAst>),
}

impl QueryAst {
    /// Unique terms appearing anywhere in the tree (including inside
    /// phrases), in left-to-right first-occurrence order.
    pub fn extract_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        let mut seen = AHashSet::new();
        self.collect_terms(&mut terms, &mut seen);
        terms
    }

    fn collect_terms(&self, out: &mut Vec<String>, seen: &mut AHashSet<String>) {
        match self {
            QueryAst::Term(term) => {
                if seen.insert(term.clone()) {
                    out.push(term.clone());
                }
            }
            QueryAst::Phrase(terms) | QueryAst::Proximity { terms, .. } => {
                for term in terms {
                    if seen.insert(term.clone()) {
                        out.push(term.clone());
                    }
                }
            }
            QueryAst::And(left, right) | QueryAst::Or(left, right) => {
                left.collect_terms(out, seen);
                right.collect_terms(out, seen);
            }
            QueryAst::Not(operand) => operand.collect_terms(out, seen),
        }
    }

    /// Query cost measure: leaves count 1, every operator adds 1 plus the
    /// cost of its operands.
    pub fn complexity(&self) -> usize {
        match self {
            QueryAst::Term(_) | QueryAst::Phrase(_) | QueryAst::Proximity { .. } => 1,
            QueryAst::And(left, right) | QueryAst::Or(left, right) => {
                1 + left.complexity() + right.complexity()
            }
            QueryAst::Not(operand) => 1 + operand.complexity(),
        }
    }
}

impl fmt::Display for QueryAst {
    /// The canonical parenthesized form; equal trees print equally.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryAst::Term(term) => write!(f, "{term}"),
            QueryAst::Phrase(terms) => write!(f, "\"{}\"", terms.join(" ")),
            QueryAst::Proximity { terms, distance } => {
                write!(f, "\"{}\" / {distance}", terms.join(" "))
            }
            QueryAst::And(left, right) => write!(f, "({left} && {right})"),
            QueryAst::Or(left, right) => write!(f, "({left} || {right})"),
            QueryAst::Not(operand) => write!(f, "!{operand}"),
        }
    }
}
