//! Greedy left-to-right rule application over a token stream.

use super::grammar::Grammar;
use super::{Node, Root};
use crate::error::CompileError;
use crate::parse::{Token, TokenType};

/// Default bound on function-body nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Skip tokens no rule recognizes instead of failing.
    pub lenient: bool,
    /// Deepest body nesting accepted before the build fails.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            lenient: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Applies one [`Grammar`] at one nesting depth.
#[derive(Debug, Clone)]
pub struct AstBuilder {
    grammar: &'static Grammar,
    options: BuildOptions,
    depth: usize,
}

impl AstBuilder {
    /// A builder for a whole program, using the top-level rules.
    pub fn new(options: BuildOptions) -> Self {
        Self {
            grammar: Grammar::top_level(),
            options,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// A builder one level deeper using `grammar`, for the contents of the
    /// block that starts at `opener`.
    pub fn nested(
        &self,
        grammar: &'static Grammar,
        opener: &Token,
    ) -> Result<AstBuilder, CompileError> {
        let depth = self.depth + 1;
        if depth > self.options.max_depth {
            return Err(CompileError::NestingTooDeep {
                limit: self.options.max_depth,
                position: Some(opener.position.clone()),
            });
        }
        Ok(Self {
            grammar,
            options: self.options,
            depth,
        })
    }

    /// Try each rule at `offset`. On a match, returns the built node and the
    /// offset just past the span it consumed.
    pub fn step(
        &self,
        tokens: &[Token],
        offset: usize,
    ) -> Result<Option<(Node, usize)>, CompileError> {
        let rest = tokens.get(offset..).unwrap_or_default();
        for rule in &self.grammar.rules {
            match rule.pattern.match_len(rest) {
                Some(0) | None => continue,
                Some(len) => {
                    log::trace!("rule `{}` matched {len} tokens at {offset}", rule.name);
                    let node = (rule.build)(&rest[..len], self)?;
                    return Ok(Some((node, offset + len)));
                }
            }
        }
        Ok(None)
    }

    /// Build a root whose children are the nodes recognized in `tokens`, in
    /// order.
    pub fn build(&self, tokens: &[Token]) -> Result<Root, CompileError> {
        let mut root = Root::default();
        let mut offset = 0;

        while offset < tokens.len() {
            // empty statement
            if tokens[offset].kind == TokenType::Semicolon {
                offset += 1;
                continue;
            }
            if let Some((node, next)) = self.step(tokens, offset)? {
                root.children.push(node);
                offset = next;
                continue;
            }

            let token = &tokens[offset];
            let reason = self.grammar.diagnose(&tokens[offset..]);
            if !self.options.lenient {
                return Err(CompileError::syntax(reason, Some(token.position.clone())));
            }
            log::warn!("{}: skipping `{}`: {reason}", token.position, token.text);
            offset += 1;
        }

        log::debug!(
            "built {} nodes at depth {} from {} tokens",
            root.children.len(),
            self.depth,
            tokens.len()
        );
        Ok(root)
    }
}
