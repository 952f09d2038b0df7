//! blowk: a compiler from the blowK command DSL to bash.
//!
//! A blowK program imports the external commands it uses, optionally under
//! an alias, and invokes them from a `main` function. The compiler checks
//! that every invoked command was imported and emits a bash script that
//! verifies each imported command exists before running the body of `main`.
//!
//! # Architecture
//!
//! - **[`parse`]**: Character tokenizer, token classifier, and the transform passes that coalesce strings, comments and array types.
//! - **[`pattern`]**: Token pattern combinators used by the grammar.
//! - **[`ast`]**: Syntax tree types, grammar rules, and the greedy AST builder.
//! - **[`resolve`]**: Import collection and command resolution.
//! - **[`codegen`]**: Bash generation and tree-sitter verification of the result.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: Logger setup and the build log.

/// Syntax tree, grammar rules and builder.
pub mod ast;
/// Bash script generation.
pub mod codegen;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error types shared by the pipeline stages.
pub mod error;
/// Logger initialization and build records.
pub mod logging;
/// Tokenizing and lexing.
pub mod parse;
/// Token pattern matching.
pub mod pattern;
/// Import table and command resolution.
pub mod resolve;

use ast::{AstBuilder, Root};
use codegen::CodegenOptions;
use config::Config;
use error::CompileError;
use parse::{Lexer, Token};

/// Runs the pipeline with one configuration. Each stage is exposed so
/// callers can stop early (for token or AST dumps).
pub struct Compiler {
    config: Config,
    lexer: Lexer,
}

impl Compiler {
    pub fn new(config: Config) -> Result<Self, CompileError> {
        Ok(Self {
            config,
            lexer: Lexer::new()?,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tokenize and lex `source`. `file` only labels positions.
    pub fn tokens(&self, source: &str, file: Option<&str>) -> Result<Vec<Token>, CompileError> {
        let raw = parse::tokenize_file(source, file);
        log::debug!("{} raw tokens", raw.len());
        self.lexer.lex(raw)
    }

    /// Build the syntax tree without resolving commands.
    pub fn parse(&self, source: &str, file: Option<&str>) -> Result<Root, CompileError> {
        let tokens = self.tokens(source, file)?;
        AstBuilder::new(self.config.build_options()).build(&tokens)
    }

    /// Parse, resolve and generate the bash script for `source`.
    pub fn compile(&self, source: &str, file: Option<&str>) -> Result<String, CompileError> {
        let mut root = self.parse(source, file)?;
        resolve::check(&mut root)?;
        codegen::generate(&root, CodegenOptions::from(&self.config))
    }
}

/// Compile a program with the default configuration.
///
/// This is the main entry point for tests and simple usage.
/// For CLI usage with user config, build a [`Compiler`] directly.
pub fn compile(source: &str) -> Result<String, CompileError> {
    Compiler::new(Config::default_config())?.compile(source, None)
}
