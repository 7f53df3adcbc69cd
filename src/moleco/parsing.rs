//! Nested-structure parser
//!
//!     The grouping (`/n`) and weighting (`/g`) sections of a mixture identifier share one
//!     grammar and differ only in what a leaf carries: a 1-based component reference, or a
//!     weight literal. Both are parsed here into the same generic [Nested] tree, and only then
//!     are leaf payloads converted.
//!
//! Grammar
//!
//!         sequence := element ('&' element)*
//!         element  := ε | LITERAL | '{' sequence '}' LITERAL?
//!
//!     - An empty element is an explicit empty slot. `1&&2` has three elements, the middle one
//!       empty, and so do `&1&2` and `1&2&`. Empty slots keep the two parallel sections aligned.
//!     - The literal right after a closing bracket is the group's own payload, as in
//!       `{5:7pp1&1:2pp1}7vp0`.
//!     - When the whole section is one bracketed group, those outer brackets are dropped:
//!       `{1&2}` and `1&2` parse to the same tree. A bare top level is a single group.
//!
//! Errors
//!
//!     Bracket balance is checked before parsing, so an unbalanced section reports the bracket
//!     at fault rather than whatever the parser tripped over later. Tokens in a place where
//!     only a separator or a bracket may appear are reported as unexpected.

use crate::moleco::error::{ParseError, ParseResult, Section};
use crate::moleco::lexing::{tokenize, Token};
use crate::moleco::weight::WeightDescriptor;
use std::ops::Range;

/// Generic ordered tree of a grouping or weighting section
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    /// `payload` is `None` for an empty slot
    Leaf {
        payload: Option<T>,
        span: Range<usize>,
    },
    Group {
        children: Vec<Nested<T>>,
        label: Option<T>,
        span: Range<usize>,
    },
}

/// Where a payload sits, so conversions can treat group labels differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    Leaf,
    GroupLabel,
}

impl<T> Nested<T> {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Nested::Leaf { span, .. } | Nested::Group { span, .. } => span,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf { .. })
    }

    pub fn children(&self) -> &[Nested<T>] {
        match self {
            Nested::Leaf { .. } => &[],
            Nested::Group { children, .. } => children,
        }
    }

    /// Short shape description used in mismatch diagnostics
    pub fn shape(&self) -> String {
        match self {
            Nested::Leaf { payload: None, .. } => "empty slot".to_string(),
            Nested::Leaf { .. } => "leaf".to_string(),
            Nested::Group { children, .. } => format!("group of {}", children.len()),
        }
    }

    /// Convert every payload, stopping at the first failure
    pub fn try_map<U, F>(self, f: &mut F) -> ParseResult<Nested<U>>
    where
        F: FnMut(T, &Range<usize>, SlotRole) -> ParseResult<U>,
    {
        match self {
            Nested::Leaf { payload, span } => {
                let payload = match payload {
                    Some(value) => Some(f(value, &span, SlotRole::Leaf)?),
                    None => None,
                };
                Ok(Nested::Leaf { payload, span })
            }
            Nested::Group {
                children,
                label,
                span,
            } => {
                let children = children
                    .into_iter()
                    .map(|child| child.try_map(f))
                    .collect::<ParseResult<Vec<_>>>()?;
                let label = match label {
                    Some(value) => Some(f(value, &span, SlotRole::GroupLabel)?),
                    None => None,
                };
                Ok(Nested::Group {
                    children,
                    label,
                    span,
                })
            }
        }
    }
}

/// Parse a section into a tree of raw literals
///
/// `base_offset` is the byte offset of `source` in the full identifier.
pub fn parse_section(
    source: &str,
    base_offset: usize,
    section: Section,
) -> ParseResult<Nested<String>> {
    let tokens = tokenize(source, base_offset, section)?;
    check_balance(&tokens, section)?;

    let end_offset = base_offset + source.len();
    let body = strip_enclosing_group(&tokens);
    let mut parser = NestedParser {
        tokens: body,
        pos: 0,
        section,
        end_offset,
    };

    let children = parser.parse_sequence()?;
    if let Some((token, span)) = parser.peek() {
        // Balance was checked, so only a stray closing bracket can remain here
        return Err(match token {
            Token::Close => ParseError::UnbalancedGrouping {
                section,
                offset: span.start,
            },
            other => ParseError::UnexpectedToken {
                section,
                offset: span.start,
                found: other.as_source().to_string(),
            },
        });
    }

    log::trace!("parsed {} into {} top-level elements", section, children.len());
    Ok(Nested::Group {
        children,
        label: None,
        span: base_offset..end_offset,
    })
}

/// Parse a grouping section; leaves carry 1-based component references
///
/// `available` is the number of components, used for diagnostics only. Range checks happen
/// when the tree is built.
pub fn parse_grouping(
    source: &str,
    base_offset: usize,
    available: usize,
) -> ParseResult<Nested<usize>> {
    let raw = parse_section(source, base_offset, Section::Grouping)?;
    raw.try_map(
        &mut |text: String, span: &Range<usize>, role: SlotRole| match role {
            SlotRole::GroupLabel => Err(ParseError::UnexpectedToken {
                section: Section::Grouping,
                offset: span.end - text.len(),
                found: text,
            }),
            SlotRole::Leaf => parse_reference(&text, span.start, available),
        },
    )
}

/// Parse a weighting section; leaves and group labels carry weight descriptors
pub fn parse_weighting(source: &str, base_offset: usize) -> ParseResult<Nested<WeightDescriptor>> {
    let raw = parse_section(source, base_offset, Section::Weighting)?;
    raw.try_map(&mut |text: String, span: &Range<usize>, role: SlotRole| {
        let offset = match role {
            SlotRole::Leaf => span.start,
            SlotRole::GroupLabel => span.end - text.len(),
        };
        WeightDescriptor::parse_at(&text, offset)
    })
}

fn parse_reference(text: &str, offset: usize, available: usize) -> ParseResult<usize> {
    let unknown = || ParseError::UnknownComponentReference {
        reference: text.to_string(),
        offset,
        available,
    };
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown());
    }
    match text.parse::<usize>() {
        Ok(reference) if reference >= 1 => Ok(reference),
        _ => Err(unknown()),
    }
}

fn check_balance(tokens: &[(Token, Range<usize>)], section: Section) -> ParseResult<()> {
    let mut open: Vec<usize> = Vec::new();
    for (token, span) in tokens {
        match token {
            Token::Open => open.push(span.start),
            Token::Close => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedGrouping {
                        section,
                        offset: span.start,
                    });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(offset) => Err(ParseError::UnbalancedGrouping { section, offset }),
        None => Ok(()),
    }
}

/// Drop the outer brackets when a single group covers the whole (balanced) section
fn strip_enclosing_group(tokens: &[(Token, Range<usize>)]) -> Vec<(Token, Range<usize>)> {
    if tokens.len() < 2 || tokens[0].0 != Token::Open {
        return tokens.to_vec();
    }

    let mut depth = 0usize;
    for (index, (token, _)) in tokens.iter().enumerate() {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    if index == tokens.len() - 1 {
                        return tokens[1..index].to_vec();
                    }
                    break;
                }
            }
            _ => {}
        }
    }
    tokens.to_vec()
}

struct NestedParser {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    section: Section,
    end_offset: usize,
}

impl NestedParser {
    fn peek(&self) -> Option<&(Token, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(Token, Range<usize>)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    /// Offset where an empty slot starting at the current position sits
    fn here(&self) -> usize {
        self.peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.end_offset)
    }

    fn parse_sequence(&mut self) -> ParseResult<Vec<Nested<String>>> {
        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_element()?);
            match self.peek() {
                Some((Token::Separator, _)) => {
                    self.advance();
                }
                Some((Token::Close, _)) | None => return Ok(elements),
                Some((token, span)) => {
                    return Err(ParseError::UnexpectedToken {
                        section: self.section,
                        offset: span.start,
                        found: token.as_source().to_string(),
                    })
                }
            }
        }
    }

    fn parse_element(&mut self) -> ParseResult<Nested<String>> {
        match self.peek() {
            Some((Token::Literal(text), span)) => {
                let leaf = Nested::Leaf {
                    payload: Some(text.clone()),
                    span: span.clone(),
                };
                self.pos += 1;
                Ok(leaf)
            }
            Some((Token::Open, _)) => self.parse_group(),
            Some((Token::Separator, _)) | Some((Token::Close, _)) | None => {
                let here = self.here();
                Ok(Nested::Leaf {
                    payload: None,
                    span: here..here,
                })
            }
        }
    }

    fn parse_group(&mut self) -> ParseResult<Nested<String>> {
        // Caller peeked the opening bracket
        let open = self.here();
        self.pos += 1;

        let children = self.parse_sequence()?;
        let close = match self.advance() {
            Some((Token::Close, span)) => span,
            _ => {
                return Err(ParseError::UnbalancedGrouping {
                    section: self.section,
                    offset: open,
                })
            }
        };

        let (label, end) = match self.peek() {
            Some((Token::Literal(text), span)) => {
                let labelled = (Some(text.clone()), span.end);
                self.pos += 1;
                labelled
            }
            _ => (None, close.end),
        };

        Ok(Nested::Group {
            children,
            label,
            span: open..end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a raw tree compactly: leaves as text (`_` for empty), groups as `[..]`
    fn show(tree: &Nested<String>) -> String {
        match tree {
            Nested::Leaf { payload, .. } => payload.clone().unwrap_or_else(|| "_".to_string()),
            Nested::Group {
                children, label, ..
            } => {
                let inner: Vec<String> = children.iter().map(show).collect();
                format!("[{}]{}", inner.join(","), label.clone().unwrap_or_default())
            }
        }
    }

    fn parse(source: &str) -> String {
        show(&parse_section(source, 0, Section::Grouping).unwrap())
    }

    #[test]
    fn test_flat_sequence() {
        assert_eq!(parse("1&2"), "[1,2]");
        assert_eq!(parse("{1&2}"), "[1,2]");
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(parse("{{1&3}&2}"), "[[1,3],2]");
        assert_eq!(parse("{6&{1&{3&2&4&5}}}"), "[6,[1,[3,2,4,5]]]");
    }

    #[test]
    fn test_empty_slots() {
        assert_eq!(parse(""), "[_]");
        assert_eq!(parse("1&&2"), "[1,_,2]");
        assert_eq!(parse("&1"), "[_,1]");
        assert_eq!(parse("{1&{2&}}"), "[1,[2,_]]");
        assert_eq!(parse("{}"), "[_]");
        assert_eq!(parse("{1&{}}"), "[1,[_]]");
    }

    #[test]
    fn test_group_labels() {
        assert_eq!(
            parse("{1mr0&{1vp0&{5:7pp1&1:2pp1}7vp0}}"),
            "[1mr0,[1vp0,[5:7pp1,1:2pp1]7vp0]]"
        );
        // A trailing label keeps the outer group from being stripped
        assert_eq!(parse("{1&2}3"), "[[1,2]3]");
    }

    #[test]
    fn test_two_top_level_groups_are_not_stripped() {
        assert_eq!(parse("{1}&{2}"), "[[1],[2]]");
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(
            parse_section("{1&2", 10, Section::Grouping).unwrap_err(),
            ParseError::UnbalancedGrouping {
                section: Section::Grouping,
                offset: 10,
            }
        );
        assert_eq!(
            parse_section("1&2}", 10, Section::Weighting).unwrap_err(),
            ParseError::UnbalancedGrouping {
                section: Section::Weighting,
                offset: 13,
            }
        );
    }

    #[test]
    fn test_unexpected_tokens() {
        let error = parse_section("1{2}", 0, Section::Grouping).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnexpectedToken {
                section: Section::Grouping,
                offset: 1,
                found: "{".to_string(),
            }
        );
        let error = parse_section("{1}{2}", 0, Section::Grouping).unwrap_err();
        assert_eq!(error.kind(), "UnexpectedToken");
    }

    #[test]
    fn test_grouping_references() {
        let tree = parse_grouping("{{1&3}&2}", 0, 3).unwrap();
        let Nested::Group { children, .. } = tree else {
            panic!("root must be a group");
        };
        assert_eq!(
            children[1],
            Nested::Leaf {
                payload: Some(2),
                span: 7..8,
            }
        );
    }

    #[test]
    fn test_grouping_rejects_bad_references() {
        for source in ["1&x", "0&1", "1&-2"] {
            let error = parse_grouping(source, 0, 2).unwrap_err();
            assert_eq!(error.kind(), "UnknownComponentReference", "source {source}");
        }
    }

    #[test]
    fn test_grouping_rejects_group_labels() {
        let error = parse_grouping("{1&2}3&4", 5, 4).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnexpectedToken {
                section: Section::Grouping,
                offset: 10,
                found: "3".to_string(),
            }
        );
    }

    #[test]
    fn test_weighting_payloads() {
        let tree = parse_weighting("{37wf-2&}&10:15pp0", 0).unwrap();
        let Nested::Group { children, .. } = tree else {
            panic!("root must be a group");
        };
        assert_eq!(children.len(), 2);
        match &children[0] {
            Nested::Group { children, .. } => {
                assert!(matches!(
                    children[0],
                    Nested::Leaf {
                        payload: Some(WeightDescriptor::Known(_)),
                        ..
                    }
                ));
                assert!(matches!(children[1], Nested::Leaf { payload: None, .. }));
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_weighting_errors_point_at_literal() {
        let error = parse_weighting("1wf0&{2zz0&3wf0}", 40).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnknownWeightKind {
                tag: "zz".to_string(),
                literal: "2zz0".to_string(),
                offset: 46,
            }
        );

        let error = parse_weighting("{1vp0&2vp0}7.vp0", 0).unwrap_err();
        assert_eq!(error.kind(), "MalformedWeight");
        assert_eq!(error.offset(), Some(11));
    }
}
