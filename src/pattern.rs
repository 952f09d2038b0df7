//! Pattern combinators over token streams.
//!
//! A [`Pattern`] reports how many tokens it consumed from the front of a
//! slice, or `None` when it does not match. Patterns are plain values and
//! never mutate their input.

use crate::parse::{Token, TokenType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The leading tokens have exactly these types, in order.
    Exact(Vec<TokenType>),
    /// One token of any type but this one.
    Not(TokenType),
    /// One token whose type is in the set.
    OneOf(Vec<TokenType>),
    /// The inner pattern, greedily, at least once.
    OneOrMore(Box<Pattern>),
    /// The inner pattern, greedily, any number of times. Always matches.
    ZeroOrMore(Box<Pattern>),
    /// Each pattern in turn, all or nothing.
    Composite(Vec<Pattern>),
    /// A balanced region from `open` to its matching `close`, inclusive.
    Block { open: TokenType, close: TokenType },
}

impl Pattern {
    pub fn exact(types: impl IntoIterator<Item = TokenType>) -> Self {
        Pattern::Exact(types.into_iter().collect())
    }

    pub fn not(kind: TokenType) -> Self {
        Pattern::Not(kind)
    }

    pub fn one_of(types: impl IntoIterator<Item = TokenType>) -> Self {
        Pattern::OneOf(types.into_iter().collect())
    }

    pub fn one_or_more(inner: Pattern) -> Self {
        Pattern::OneOrMore(Box::new(inner))
    }

    pub fn zero_or_more(inner: Pattern) -> Self {
        Pattern::ZeroOrMore(Box::new(inner))
    }

    pub fn composite(parts: impl IntoIterator<Item = Pattern>) -> Self {
        Pattern::Composite(parts.into_iter().collect())
    }

    pub fn block(open: TokenType, close: TokenType) -> Self {
        Pattern::Block { open, close }
    }

    /// Number of tokens matched at the front of `tokens`, or `None`.
    pub fn match_len(&self, tokens: &[Token]) -> Option<usize> {
        match self {
            Pattern::Exact(types) => {
                if tokens.len() < types.len() {
                    return None;
                }
                types
                    .iter()
                    .zip(tokens)
                    .all(|(ty, t)| t.kind == *ty)
                    .then_some(types.len())
            }
            Pattern::Not(kind) => match tokens.first() {
                Some(t) if t.kind != *kind => Some(1),
                _ => None,
            },
            Pattern::OneOf(types) => match tokens.first() {
                Some(t) if types.contains(&t.kind) => Some(1),
                _ => None,
            },
            Pattern::OneOrMore(inner) => match repeat(inner, tokens) {
                (_, 0) => None,
                (consumed, _) => Some(consumed),
            },
            Pattern::ZeroOrMore(inner) => Some(repeat(inner, tokens).0),
            Pattern::Composite(parts) => {
                let mut offset = 0;
                for part in parts {
                    offset += part.match_len(&tokens[offset..])?;
                }
                Some(offset)
            }
            Pattern::Block { open, close } => match_block(*open, *close, tokens),
        }
    }

    pub fn matches(&self, tokens: &[Token]) -> bool {
        self.match_len(tokens).is_some()
    }
}

/// Apply `inner` until it fails, runs out of input, or stops consuming.
/// Returns the tokens consumed and the number of successful applications.
fn repeat(inner: &Pattern, tokens: &[Token]) -> (usize, usize) {
    let mut offset = 0;
    let mut count = 0;
    while offset < tokens.len() {
        match inner.match_len(&tokens[offset..]) {
            Some(0) => {
                count += 1;
                break;
            }
            Some(n) => {
                offset += n;
                count += 1;
            }
            None => break,
        }
    }
    (offset, count)
}

/// Scan for the closer that balances the opening token. When `open` and
/// `close` are the same type nesting is not tracked and the next occurrence
/// ends the block. Input without a balancing closer does not match.
fn match_block(open: TokenType, close: TokenType, tokens: &[Token]) -> Option<usize> {
    if tokens.first()?.kind != open {
        return None;
    }
    let mut depth = 1usize;
    for (i, token) in tokens.iter().enumerate().skip(1) {
        if token.kind == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        } else if token.kind == open && open != close {
            depth += 1;
        }
    }
    None
}
