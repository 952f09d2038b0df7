//! Compilation errors shared by every pipeline stage.

use thiserror::Error;

use crate::parse::SourcePosition;

/// Category of a [`CompileError`], one per failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A classifier matcher could not be constructed.
    LexicalClassification,
    /// No grammar rule recognized a required span.
    Syntax,
    /// An invoked command matches no import or alias.
    UnresolvedCommand,
    /// A node could not be rendered to shell source.
    CodeGeneration,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::LexicalClassification => "lexical classification failure",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::UnresolvedCommand => "unresolved command",
            ErrorKind::CodeGeneration => "code generation error",
        }
    }

    /// Process exit status the CLI reports for this kind of failure.
    ///
    /// Status 1 is reserved for I/O failures around the pipeline.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::LexicalClassification => 3,
            ErrorKind::Syntax => 4,
            ErrorKind::UnresolvedCommand => 5,
            ErrorKind::CodeGeneration => 6,
        }
    }
}

/// The single terminal error a compilation stage can return.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid token matcher `{pattern}`: {source}")]
    LexicalClassification {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{}syntax error: {message}", at(.position))]
    Syntax {
        message: String,
        position: Option<SourcePosition>,
    },

    #[error("{}syntax error: nesting deeper than {limit} levels", at(.position))]
    NestingTooDeep {
        limit: usize,
        position: Option<SourcePosition>,
    },

    #[error("{}command `{name}` is not imported", at(.position))]
    UnresolvedCommand {
        name: String,
        position: Option<SourcePosition>,
    },

    #[error("code generation failed: {message}")]
    CodeGeneration {
        message: String,
        #[source]
        source: Option<Box<CompileError>>,
    },
}

fn at(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!("{pos}: "),
        None => String::new(),
    }
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        CompileError::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn codegen(message: impl Into<String>) -> Self {
        CompileError::CodeGeneration {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an inner failure with the context of the node being generated.
    pub fn wrap_codegen(message: impl Into<String>, inner: CompileError) -> Self {
        CompileError::CodeGeneration {
            message: message.into(),
            source: Some(Box::new(inner)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::LexicalClassification { .. } => ErrorKind::LexicalClassification,
            CompileError::Syntax { .. } | CompileError::NestingTooDeep { .. } => ErrorKind::Syntax,
            CompileError::UnresolvedCommand { .. } => ErrorKind::UnresolvedCommand,
            CompileError::CodeGeneration { .. } => ErrorKind::CodeGeneration,
        }
    }

    /// Source position of the offending token, when the stage knows it.
    ///
    /// Code generation errors report the position of their innermost cause.
    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            CompileError::LexicalClassification { .. } => None,
            CompileError::Syntax { position, .. }
            | CompileError::NestingTooDeep { position, .. }
            | CompileError::UnresolvedCommand { position, .. } => position.as_ref(),
            CompileError::CodeGeneration { source, .. } => {
                source.as_deref().and_then(CompileError::position)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> SourcePosition {
        SourcePosition::new(Some("hello.bk".into()), 3, 7)
    }

    #[test]
    fn syntax_message_includes_position() {
        let err = CompileError::syntax("malformed import declaration", Some(pos()));
        assert_eq!(
            err.to_string(),
            "hello.bk:3:7: syntax error: malformed import declaration"
        );
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn unresolved_without_position() {
        let err = CompileError::UnresolvedCommand {
            name: "curl".into(),
            position: None,
        };
        assert_eq!(err.to_string(), "command `curl` is not imported");
        assert_eq!(err.kind().exit_code(), 5);
    }

    #[test]
    fn nesting_is_a_syntax_error() {
        let err = CompileError::NestingTooDeep {
            limit: 4,
            position: None,
        };
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn wrapped_codegen_keeps_inner_cause() {
        let inner = CompileError::syntax("bad", Some(pos()));
        let err = CompileError::wrap_codegen("function `main`", inner);
        assert_eq!(err.kind(), ErrorKind::CodeGeneration);
        assert_eq!(err.position(), Some(&pos()));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("hello.bk:3:7: syntax error: bad")
        );
    }
}
