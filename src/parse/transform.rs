//! Stream-rewriting passes applied after classification.
//!
//! Each pass consumes the full output of the previous one and returns a new
//! stream. After [`PASSES`] has run, no whitespace or newline tokens remain
//! and every statement boundary is an explicit semicolon.

use super::types::{Token, TokenType};
use crate::error::CompileError;

/// A named stream transformation.
#[derive(Debug, Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub run: fn(Vec<Token>) -> Result<Vec<Token>, CompileError>,
}

/// The fixed pass order. Strings coalesce before comments, so a quote inside
/// a comment still opens a string literal.
pub const PASSES: &[Pass] = &[
    Pass {
        name: "coalesce strings",
        run: coalesce_strings,
    },
    Pass {
        name: "coalesce comments",
        run: coalesce_comments,
    },
    Pass {
        name: "coalesce array types",
        run: coalesce_array_types,
    },
    Pass {
        name: "insert terminators",
        run: insert_terminators,
    },
    Pass {
        name: "filter",
        run: filter,
    },
];

/// Merge `tokens` into one token of `kind` positioned at the first of them.
/// `fallback` supplies the position (and empty text) when the span is empty.
fn combine(kind: TokenType, tokens: &[Token], fallback: &Token) -> Token {
    let position = tokens
        .first()
        .map_or_else(|| fallback.position.clone(), |t| t.position.clone());
    let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
    Token::new(kind, text, position)
}

/// Replace each `"`…`"` span with one string literal holding the text
/// between the quotes.
pub fn coalesce_strings(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut open: Option<Token> = None;
    let mut collect = Vec::new();

    for token in tokens {
        match (&open, token.kind) {
            (Some(marker), TokenType::StringLiteralMarker) => {
                out.push(combine(TokenType::StringLiteral, &collect, marker));
                collect.clear();
                open = None;
            }
            (None, TokenType::StringLiteralMarker) => open = Some(token),
            (Some(_), _) => collect.push(token),
            (None, _) => out.push(token),
        }
    }

    if let Some(marker) = open {
        return Err(CompileError::syntax(
            "unterminated string literal",
            Some(marker.position),
        ));
    }
    Ok(out)
}

/// Replace each `#`…end-of-line span with one comment token. The newline
/// that ends the comment stays in the stream.
pub fn coalesce_comments(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut open: Option<Token> = None;
    let mut collect = Vec::new();

    for token in tokens {
        if let Some(marker) = &open {
            if token.kind == TokenType::NewLine {
                out.push(combine(TokenType::Comment, &collect, marker));
                collect.clear();
                open = None;
                out.push(token);
            } else {
                collect.push(token);
            }
            continue;
        }

        if token.kind == TokenType::StartComment {
            open = Some(token);
        } else {
            out.push(token);
        }
    }

    // comment on the last line with no trailing newline
    if let Some(marker) = open {
        out.push(combine(TokenType::Comment, &collect, &marker));
    }
    Ok(out)
}

/// Rewrite the exact sequence `[`, `]`, `string` into one `[]string` token.
pub fn coalesce_array_types(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if let [open, close, ty, ..] = &tokens[i..]
            && open.kind == TokenType::OpenSquare
            && close.kind == TokenType::CloseSquare
            && ty.kind == TokenType::StringType
        {
            out.push(combine(TokenType::StringArrayType, &tokens[i..i + 3], open));
            i += 3;
            continue;
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    Ok(out)
}

/// Tokens after which a line break continues the statement.
fn continues_statement(kind: TokenType) -> bool {
    matches!(
        kind,
        TokenType::OpenBrace
            | TokenType::StringLiteralMarker
            | TokenType::OpenParen
            | TokenType::OpenSquare
            | TokenType::Comma
            | TokenType::Semicolon
    )
}

/// Turn each newline that ends a statement into a semicolon.
///
/// A newline is kept when the closest preceding token that is neither
/// whitespace nor another newline continues the statement, or when nothing
/// precedes it. Blank lines and trailing spaces therefore never produce
/// extra terminators.
pub fn insert_terminators(mut tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut previous: Option<TokenType> = None;

    for token in &mut tokens {
        match token.kind {
            TokenType::Whitespace => {}
            TokenType::NewLine => match previous {
                Some(kind) if !continues_statement(kind) => {
                    token.kind = TokenType::Semicolon;
                    token.text = ";".into();
                    previous = Some(TokenType::Semicolon);
                }
                _ => {}
            },
            kind => previous = Some(kind),
        }
    }
    Ok(tokens)
}

/// Drop every whitespace and newline token.
pub fn filter(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    Ok(tokens
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenType::Whitespace | TokenType::NewLine))
        .collect())
}
