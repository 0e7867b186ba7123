//! Query lexer.
//!
//! Turns query text into a stream of typed tokens ending in
//! [`TokenKind::End`]. Identifiers are lowercased on emission; quoted
//! content is captured verbatim as a single term token bracketed by two
//! quote tokens. All reported positions are byte offsets into the query.

use crate::error::{Result, TesseraError};

/// The kind of a query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A search term (also the verbatim content between quotes).
    Term,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `"`
    Quote,
    /// `/N` after a closing quote; carries the digits as text.
    Proximity,
    /// End of the query.
    End,
}

/// A lexed query token with its byte position in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl QueryToken {
    fn bare(kind: TokenKind, position: usize) -> Self {
        QueryToken {
            kind,
            text: String::new(),
            position,
        }
    }

    fn with_text(kind: TokenKind, text: String, position: usize) -> Self {
        QueryToken {
            kind,
            text,
            position,
        }
    }
}

/// True for characters that can begin an identifier.
fn starts_ident(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || !ch.is_ascii()
}

/// True for characters that can continue an identifier.
fn continues_ident(ch: char) -> bool {
    starts_ident(ch) || ch == '-' || ch == '_' || ch == '\''
}

/// Lex `query` into tokens. The returned stream always ends with an
/// [`TokenKind::End`] token.
pub fn lex(query: &str) -> Result<Vec<QueryToken>> {
    let mut tokens = Vec::new();
    let mut chars = query.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        // Line comment.
        if ch == '#' {
            while let Some(&(_, c)) = chars.peek() {
                chars.next();
                if c == '\n' {
                    break;
                }
            }
            continue;
        }

        match ch {
            '&' | '|' => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some(ch) {
                    chars.next();
                    let kind = if ch == '&' { TokenKind::And } else { TokenKind::Or };
                    tokens.push(QueryToken::bare(kind, pos));
                } else {
                    return Err(TesseraError::parse(
                        format!("Unknown character in query: '{ch}'"),
                        pos,
                    ));
                }
            }
            '!' => {
                chars.next();
                tokens.push(QueryToken::bare(TokenKind::Not, pos));
            }
            '(' => {
                chars.next();
                tokens.push(QueryToken::bare(TokenKind::LParen, pos));
            }
            ')' => {
                chars.next();
                tokens.push(QueryToken::bare(TokenKind::RParen, pos));
            }
            '"' => {
                chars.next();
                tokens.push(QueryToken::bare(TokenKind::Quote, pos));

                // Capture the quoted content verbatim.
                let mut content = String::new();
                let content_start = pos + 1;
                let mut closed_at = None;
                for (p, c) in chars.by_ref() {
                    if c == '"' {
                        closed_at = Some(p);
                        break;
                    }
                    content.push(c);
                }
                let Some(close_pos) = closed_at else {
                    return Err(TesseraError::parse("Unclosed quote", query.len()));
                };
                tokens.push(QueryToken::with_text(
                    TokenKind::Term,
                    content,
                    content_start,
                ));
                tokens.push(QueryToken::bare(TokenKind::Quote, close_pos));

                // An optional proximity suffix may follow the closing quote.
                while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek().map(|&(_, c)| c) == Some('/') {
                    let (slash_pos, _) = chars.next().unwrap();
                    let mut digits = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_ascii_digit() {
                            digits.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if digits.is_empty() {
                        return Err(TesseraError::parse(
                            "Invalid proximity operator",
                            slash_pos,
                        ));
                    }
                    tokens.push(QueryToken::with_text(
                        TokenKind::Proximity,
                        digits,
                        slash_pos,
                    ));
                }
            }
            _ if starts_ident(ch) => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if continues_ident(c) {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(QueryToken::with_text(
                    TokenKind::Term,
                    ident.to_lowercase(),
                    pos,
                ));
            }
            _ => {
                return Err(TesseraError::parse(
                    format!("Unknown character in query: '{ch}'"),
                    pos,
                ));
            }
        }
    }

    tokens.push(QueryToken::bare(TokenKind::End, query.len()));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(query: &str) -> Vec<TokenKind> {
        lex(query).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_query_yields_only_end() {
        assert_eq!(kinds(""), vec![TokenKind::End]);
        assert_eq!(kinds("   \t\n"), vec![TokenKind::End]);
    }

    #[test]
    fn test_operators_and_parens() {
        assert_eq!(
            kinds("(red && blue) || !green"),
            vec![
                TokenKind::LParen,
                TokenKind::Term,
                TokenKind::And,
                TokenKind::Term,
                TokenKind::RParen,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Term,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_terms_are_lowercased() {
        let tokens = lex("Red BLUE").unwrap();
        assert_eq!(tokens[0].text, "red");
        assert_eq!(tokens[1].text, "blue");
    }

    #[test]
    fn test_identifier_characters() {
        let tokens = lex("foo-bar_baz o'neill кот").unwrap();
        assert_eq!(tokens[0].text, "foo-bar_baz");
        assert_eq!(tokens[1].text, "o'neill");
        assert_eq!(tokens[2].text, "кот");
    }

    #[test]
    fn test_quoted_phrase() {
        let tokens = lex("\"red car\"").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Quote,
                TokenKind::Term,
                TokenKind::Quote,
                TokenKind::End
            ]
        );
        assert_eq!(tokens[1].text, "red car");
    }

    #[test]
    fn test_phrase_with_proximity() {
        let tokens = lex("\"red car\" / 5").unwrap();
        assert_eq!(tokens[3].kind, TokenKind::Proximity);
        assert_eq!(tokens[3].text, "5");

        // No space before the slash works too.
        let tokens = lex("\"red car\"/12").unwrap();
        assert_eq!(tokens[3].kind, TokenKind::Proximity);
        assert_eq!(tokens[3].text, "12");
    }

    #[test]
    fn test_unclosed_quote_reports_position() {
        let err = lex("\"red car").unwrap_err();
        match err {
            crate::error::TesseraError::Parse { message, position } => {
                assert_eq!(message, "Unclosed quote");
                assert_eq!(position, 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_proximity_without_digits_is_an_error() {
        assert!(lex("\"red car\" /").is_err());
        assert!(lex("\"red car\" / x").is_err());
    }

    #[test]
    fn test_single_ampersand_is_an_error() {
        assert!(lex("red & blue").is_err());
        assert!(lex("red | blue").is_err());
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("red # the rest is ignored\nblue"),
            vec![TokenKind::Term, TokenKind::Term, TokenKind::End]
        );
        assert_eq!(kinds("# only a comment"), vec![TokenKind::End]);
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let tokens = lex("red && мир").unwrap();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 4);
        assert_eq!(tokens[2].position, 7);
    }
}
