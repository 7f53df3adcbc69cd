//! Lexer
//!
//! Tokenization of the grouping and weighting sections of a mixture identifier.
//!
//! Structure:
//!     The tokenization is done through the logos lexer library, see [tokens]. Sections are
//!     slices of the original identifier, so every span is shifted by the section's byte offset:
//!     spans produced here always point into the full identifier text, which is what error
//!     reporting needs.
//!
//!     There is no transformation pass. Brackets, separators and literals are already the
//!     units the nested-structure parser works with.

pub mod tokens;

pub use tokens::Token;

use crate::moleco::error::{ParseError, ParseResult, Section};
use logos::Logos;
use std::ops::Range;

/// Tokenize a section with location information
///
/// `base_offset` is the byte offset of `source` inside the full identifier.
pub fn tokenize(
    source: &str,
    base_offset: usize,
    section: Section,
) -> ParseResult<Vec<(Token, Range<usize>)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let located = span.start + base_offset..span.end + base_offset;
        match result {
            Ok(token) => tokens.push((token, located)),
            Err(()) => {
                return Err(ParseError::UnexpectedToken {
                    section,
                    offset: located.start,
                    found: lexer.slice().to_string(),
                })
            }
        }
    }

    Ok(tokens)
}
