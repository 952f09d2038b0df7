//! Token classification and the transform pass list.

use regex::Regex;

use super::transform::{self, Pass};
use super::types::{RawToken, Token, TokenType};
use crate::error::CompileError;

/// How a [`Matcher`] recognizes a fragment.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// The fragment equals this text exactly.
    Exact(&'static str),
    /// The whole fragment matches this regular expression.
    Pattern(&'static str),
}

/// A predicate over fragment text paired with the type it assigns.
#[derive(Debug)]
pub struct Matcher {
    exact: Option<&'static str>,
    regex: Option<Regex>,
    kind: TokenType,
}

impl Matcher {
    /// Build a matcher, anchoring regular expressions at both ends.
    pub fn new(rule: &MatchRule, kind: TokenType) -> Result<Self, CompileError> {
        match rule {
            MatchRule::Exact(text) => Ok(Self {
                exact: Some(text),
                regex: None,
                kind,
            }),
            MatchRule::Pattern(pattern) => {
                let anchored = format!("^(?:{pattern})$");
                let regex = Regex::new(&anchored).map_err(|source| {
                    CompileError::LexicalClassification {
                        pattern: (*pattern).to_string(),
                        source,
                    }
                })?;
                Ok(Self {
                    exact: None,
                    regex: Some(regex),
                    kind,
                })
            }
        }
    }

    fn matches(&self, text: &str) -> bool {
        match (&self.exact, &self.regex) {
            (Some(exact), _) => *exact == text,
            (None, Some(regex)) => regex.is_match(text),
            (None, None) => false,
        }
    }
}

/// Matchers in priority order. Keywords and the `string` type name must come
/// before the identifier expression or they would classify as identifiers.
pub const DEFAULT_MATCHERS: &[(MatchRule, TokenType)] = &[
    (MatchRule::Exact("import"), TokenType::ImportKeyword),
    (MatchRule::Exact("as"), TokenType::AsKeyword),
    (MatchRule::Exact("string"), TokenType::StringType),
    (MatchRule::Exact("#"), TokenType::StartComment),
    (MatchRule::Exact(":"), TokenType::Colon),
    (MatchRule::Exact(","), TokenType::Comma),
    (MatchRule::Exact("$"), TokenType::ExecMarker),
    (MatchRule::Exact(";"), TokenType::Semicolon),
    (MatchRule::Exact("\n"), TokenType::NewLine),
    (MatchRule::Exact(" "), TokenType::Whitespace),
    (MatchRule::Exact("\t"), TokenType::Whitespace),
    (MatchRule::Exact("\r"), TokenType::Whitespace),
    (MatchRule::Exact("("), TokenType::OpenParen),
    (MatchRule::Exact(")"), TokenType::CloseParen),
    (MatchRule::Exact("["), TokenType::OpenSquare),
    (MatchRule::Exact("]"), TokenType::CloseSquare),
    (MatchRule::Exact("{"), TokenType::OpenBrace),
    (MatchRule::Exact("}"), TokenType::CloseBrace),
    (MatchRule::Exact("\""), TokenType::StringLiteralMarker),
    (MatchRule::Pattern("[a-zA-Z][a-zA-Z0-9_]*"), TokenType::Identifier),
];

/// Assigns token types to raw fragments by trying matchers in order.
#[derive(Debug)]
pub struct Classifier {
    matchers: Vec<Matcher>,
}

impl Classifier {
    pub fn new(rules: &[(MatchRule, TokenType)]) -> Result<Self, CompileError> {
        let matchers = rules
            .iter()
            .map(|(rule, kind)| Matcher::new(rule, *kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    pub fn standard() -> Result<Self, CompileError> {
        Self::new(DEFAULT_MATCHERS)
    }

    /// Classify one fragment. The first matcher that accepts the text wins;
    /// text no matcher accepts is [`TokenType::Unknown`].
    pub fn classify(&self, raw: RawToken) -> Token {
        let kind = self
            .matchers
            .iter()
            .find(|m| m.matches(&raw.text))
            .map_or(TokenType::Unknown, |m| m.kind);
        Token {
            kind,
            text: raw.text,
            position: raw.position,
        }
    }
}

/// Classifies raw fragments and runs the transform passes over the result.
#[derive(Debug)]
pub struct Lexer {
    classifier: Classifier,
    passes: Vec<Pass>,
}

impl Lexer {
    pub fn new() -> Result<Self, CompileError> {
        Ok(Self::with_classifier(Classifier::standard()?))
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Self {
            classifier,
            passes: transform::PASSES.to_vec(),
        }
    }

    pub fn classify(&self, raw: Vec<RawToken>) -> Vec<Token> {
        raw.into_iter().map(|t| self.classifier.classify(t)).collect()
    }

    /// Classify every fragment, then feed the whole stream through each pass
    /// in order.
    pub fn lex(&self, raw: Vec<RawToken>) -> Result<Vec<Token>, CompileError> {
        let mut tokens = self.classify(raw);
        log::trace!("classified {} fragments", tokens.len());
        for pass in &self.passes {
            tokens = (pass.run)(tokens)?;
            log::trace!("after {}: {} tokens", pass.name, tokens.len());
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn kinds(source: &str) -> Vec<TokenType> {
        let lexer = Lexer::new().unwrap();
        lexer
            .lex(tokenize(source))
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn classify(text: &str) -> TokenType {
        let classifier = Classifier::standard().unwrap();
        let raw = RawToken {
            text: text.into(),
            position: Default::default(),
        };
        classifier.classify(raw).kind
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(classify("import"), TokenType::ImportKeyword);
        assert_eq!(classify("as"), TokenType::AsKeyword);
        assert_eq!(classify("string"), TokenType::StringType);
        assert_eq!(classify("imports"), TokenType::Identifier);
    }

    #[test]
    fn identifier_shapes() {
        assert_eq!(classify("a"), TokenType::Identifier);
        assert_eq!(classify("Test_1"), TokenType::Identifier);
        assert_eq!(classify("2"), TokenType::Unknown);
        assert_eq!(classify("_x"), TokenType::Unknown);
        assert_eq!(classify("-"), TokenType::Unknown);
    }

    #[test]
    fn regex_is_anchored() {
        let classifier =
            Classifier::new(&[(MatchRule::Pattern("ab"), TokenType::Identifier)]).unwrap();
        let raw = RawToken {
            text: "xaby".into(),
            position: Default::default(),
        };
        assert_eq!(classifier.classify(raw).kind, TokenType::Unknown);
    }

    #[test]
    fn bad_pattern_is_a_classification_failure() {
        let err = Classifier::new(&[(MatchRule::Pattern("[a-"), TokenType::Identifier)])
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::LexicalClassification);
    }

    #[test]
    fn lex_example_program() {
        use TokenType::*;
        let source = "import echo as print;\n# main is the entry point\nmain:(args:[]string):{ $print[\"Hello\",\"World\"]; }";
        assert_eq!(
            kinds(source),
            vec![
                ImportKeyword, Identifier, AsKeyword, Identifier, Semicolon,
                Comment, Semicolon,
                Identifier, Colon, OpenParen, Identifier, Colon, StringArrayType, CloseParen,
                Colon, OpenBrace, ExecMarker, Identifier, OpenSquare, StringLiteral, Comma,
                StringLiteral, CloseSquare, Semicolon, CloseBrace,
            ]
        );
    }

    #[test]
    fn identifier_then_newline_terminates() {
        assert_eq!(kinds("a\n"), vec![TokenType::Identifier, TokenType::Semicolon]);
    }
}
