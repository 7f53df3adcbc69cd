//! Token definitions for the nested mixture sections
//!
//! Grouping (`/n`) and weighting (`/g`) sections share one alphabet: brackets, the `&`
//! separator, and literal payloads. The tokens are defined using the logos derive macro.
use logos::Logos;

/// All possible tokens of a grouping or weighting section
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"\s+")]
pub enum Token {
    #[token("{")]
    Open,

    #[token("}")]
    Close,

    #[token("&")]
    Separator,

    // Component references and weight literals (catch-all for non-structural text)
    #[regex(r"[^{}&\s]+", |lex| lex.slice().to_owned())]
    Literal(String),
}

impl Token {
    /// Check if this token opens or closes a group
    pub fn is_bracket(&self) -> bool {
        matches!(self, Token::Open | Token::Close)
    }

    /// Text of the token as written in the source
    pub fn as_source(&self) -> &str {
        match self {
            Token::Open => "{",
            Token::Close => "}",
            Token::Separator => "&",
            Token::Literal(text) => text,
        }
    }
}
