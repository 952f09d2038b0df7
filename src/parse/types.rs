//! Types produced by the tokenizer and lexer and consumed by the grammar layer.

use std::fmt;

use serde::Serialize;

/// Where a fragment of source text starts. Lines and columns are 1-based and
/// columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(file: Option<String>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::new(None, 1, 1)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// An untyped lexical fragment: a run of non-separator characters, or a
/// single separator character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    pub position: SourcePosition,
}

/// Semantic category assigned by the classifier or by a transform pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    ImportKeyword,
    AsKeyword,
    /// `#`, replaced by [`TokenType::Comment`] after coalescing.
    StartComment,
    Comment,
    /// `"`, replaced by [`TokenType::StringLiteral`] after coalescing.
    StringLiteralMarker,
    StringLiteral,
    Colon,
    Comma,
    /// `$`
    ExecMarker,
    Semicolon,
    NewLine,
    Whitespace,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenBrace,
    CloseBrace,
    /// The `string` type name.
    StringType,
    /// `[]string`, produced by coalescing.
    StringArrayType,
    Identifier,
    Unknown,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::ImportKeyword => "ImportKeyword",
            TokenType::AsKeyword => "AsKeyword",
            TokenType::StartComment => "StartComment",
            TokenType::Comment => "Comment",
            TokenType::StringLiteralMarker => "StringLiteralMarker",
            TokenType::StringLiteral => "StringLiteral",
            TokenType::Colon => "Colon",
            TokenType::Comma => "Comma",
            TokenType::ExecMarker => "ExecMarker",
            TokenType::Semicolon => "Semicolon",
            TokenType::NewLine => "NewLine",
            TokenType::Whitespace => "Whitespace",
            TokenType::OpenParen => "OpenParen",
            TokenType::CloseParen => "CloseParen",
            TokenType::OpenSquare => "OpenSquare",
            TokenType::CloseSquare => "CloseSquare",
            TokenType::OpenBrace => "OpenBrace",
            TokenType::CloseBrace => "CloseBrace",
            TokenType::StringType => "StringType",
            TokenType::StringArrayType => "StringArrayType",
            TokenType::Identifier => "Identifier",
            TokenType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned unit of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenType,
    pub text: String,
    pub position: SourcePosition,
}

impl Token {
    pub fn new(kind: TokenType, text: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}
