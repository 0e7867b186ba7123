//! Recursive-descent query parser and AST optimizer.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expression := term ( '||' term )*
//! term       := factor ( ( '&&' | <factor start> ) factor )*
//! factor     := '!' factor | primary
//! primary    := '(' expression ')' | phrase | TERM
//! phrase     := '"' words '"' ( '/' DIGITS )?
//! ```
//!
//! Juxtaposed factors conjoin: the AND loop continues exactly when the
//! lookahead is `&&` or a token that can begin a factor, so `red car` parses
//! as `(red && car)` without ambiguity against `||`, `)`, or end of input.

use crate::error::{Result, TesseraError};
use crate::query::ast::QueryAst;
use crate::query::lexer::{self, QueryToken, TokenKind};

/// Compiles query strings into optimized ASTs.
#[derive(Debug, Default)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        QueryParser
    }

    /// Parse `query`.
    ///
    /// Returns `Ok(None)` for a syntactically empty query (whitespace and
    /// comments only) and a parse error with byte position for malformed
    /// input. The returned AST has the algebraic simplifications applied.
    pub fn parse(&self, query: &str) -> Result<Option<QueryAst>> {
        let tokens = lexer::lex(query)?;
        if tokens.len() == 1 {
            return Ok(None);
        }

        let mut pos = 0;
        let ast = self.parse_expression(&tokens, &mut pos)?;

        if tokens[pos].kind != TokenKind::End {
            return Err(TesseraError::parse(
                "Unexpected token",
                tokens[pos].position,
            ));
        }

        Ok(Some(self.optimize(ast)))
    }

    /// True iff `query` compiles to a non-empty AST.
    pub fn validate(&self, query: &str) -> bool {
        matches!(self.parse(query), Ok(Some(_)))
    }

    /// Apply algebraic simplifications recursively:
    /// `A && A → A`, `A || A → A` (by canonical form), and `!!A → A`.
    pub fn optimize(&self, ast: QueryAst) -> QueryAst {
        match ast {
            QueryAst::And(left, right) => {
                let left = self.optimize(*left);
                let right = self.optimize(*right);
                if left.to_string() == right.to_string() {
                    left
                } else {
                    QueryAst::And(Box::new(left), Box::new(right))
                }
            }
            QueryAst::Or(left, right) => {
                let left = self.optimize(*left);
                let right = self.optimize(*right);
                if left.to_string() == right.to_string() {
                    left
                } else {
                    QueryAst::Or(Box::new(left), Box::new(right))
                }
            }
            QueryAst::Not(operand) => match self.optimize(*operand) {
                QueryAst::Not(inner) => *inner,
                other => QueryAst::Not(Box::new(other)),
            },
            leaf => leaf,
        }
    }

    fn parse_expression(&self, tokens: &[QueryToken], pos: &mut usize) -> Result<QueryAst> {
        let mut left = self.parse_term(tokens, pos)?;

        while tokens[*pos].kind == TokenKind::Or {
            *pos += 1;
            let right = self.parse_term(tokens, pos)?;
            left = QueryAst::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_term(&self, tokens: &[QueryToken], pos: &mut usize) -> Result<QueryAst> {
        let mut left = self.parse_factor(tokens, pos)?;

        loop {
            match tokens[*pos].kind {
                TokenKind::And => {
                    *pos += 1;
                }
                kind if starts_factor(kind) => {
                    // Juxtaposition: implicit AND.
                }
                _ => break,
            }
            let right = self.parse_factor(tokens, pos)?;
            left = QueryAst::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_factor(&self, tokens: &[QueryToken], pos: &mut usize) -> Result<QueryAst> {
        if tokens[*pos].kind == TokenKind::Not {
            *pos += 1;
            let operand = self.parse_factor(tokens, pos)?;
            return Ok(QueryAst::Not(Box::new(operand)));
        }
        self.parse_primary(tokens, pos)
    }

    fn parse_primary(&self, tokens: &[QueryToken], pos: &mut usize) -> Result<QueryAst> {
        match tokens[*pos].kind {
            TokenKind::LParen => {
                *pos += 1;
                let expr = self.parse_expression(tokens, pos)?;
                if tokens[*pos].kind != TokenKind::RParen {
                    return Err(TesseraError::parse(
                        "Expected ')'",
                        tokens[*pos].position,
                    ));
                }
                *pos += 1;
                Ok(expr)
            }
            TokenKind::Quote => {
                *pos += 1;
                if tokens[*pos].kind != TokenKind::Term {
                    return Err(TesseraError::parse(
                        "Expected phrase content",
                        tokens[*pos].position,
                    ));
                }
                let content = &tokens[*pos].text;
                let words: Vec<String> = content
                    .split_whitespace()
                    .map(|w| w.to_lowercase())
                    .collect();
                *pos += 1;

                if tokens[*pos].kind != TokenKind::Quote {
                    return Err(TesseraError::parse(
                        "Expected closing quote",
                        tokens[*pos].position,
                    ));
                }
                *pos += 1;

                if tokens[*pos].kind == TokenKind::Proximity {
                    let token = &tokens[*pos];
                    let distance: u32 = token.text.parse().map_err(|_| {
                        TesseraError::parse("Invalid proximity distance", token.position)
                    })?;
                    *pos += 1;
                    return Ok(QueryAst::Proximity {
                        terms: words,
                        distance,
                    });
                }

                Ok(QueryAst::Phrase(words))
            }
            TokenKind::Term => {
                let term = tokens[*pos].text.clone();
                *pos += 1;
                Ok(QueryAst::Term(term))
            }
            _ => Err(TesseraError::parse(
                "Expected term, phrase, or '('",
                tokens[*pos].position,
            )),
        }
    }
}

fn starts_factor(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Term | TokenKind::Quote | TokenKind::LParen | TokenKind::Not
    )
}
