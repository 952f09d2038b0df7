//! Ordered grammar rules and the node constructors they drive.
//!
//! Rules are tried in declaration order and the first whose pattern matches
//! wins, so order is significant wherever two patterns share a prefix.

use std::sync::LazyLock;

use super::builder::AstBuilder;
use super::{
    CommandExpression, CommandInvocation, Comment, Function, Import, Node, Param, TypeName,
};
use crate::error::CompileError;
use crate::parse::{Token, TokenType};
use crate::pattern::Pattern;

/// Turns the token span a rule matched into exactly one node.
pub type BuildFn = fn(&[Token], &AstBuilder) -> Result<Node, CompileError>;

pub struct Rule {
    pub name: &'static str,
    pub pattern: Pattern,
    pub build: BuildFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Where a rule set applies, used to phrase errors for unmatched tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    TopLevel,
    FunctionBody,
}

#[derive(Debug)]
pub struct Grammar {
    pub scope: Scope,
    pub rules: Vec<Rule>,
}

static TOP_LEVEL: LazyLock<Grammar> = LazyLock::new(|| Grammar {
    scope: Scope::TopLevel,
    rules: vec![import_rule(), comment_rule(), function_rule()],
});

static FUNCTION_BODY: LazyLock<Grammar> = LazyLock::new(|| Grammar {
    scope: Scope::FunctionBody,
    rules: vec![invocation_rule(), comment_rule()],
});

impl Grammar {
    /// Imports, comments, and function declarations.
    pub fn top_level() -> &'static Grammar {
        &TOP_LEVEL
    }

    /// Command invocations and comments. Function declarations are not
    /// recognized inside a body.
    pub fn function_body() -> &'static Grammar {
        &FUNCTION_BODY
    }

    /// Explain why no rule matched at the head of `tokens`.
    pub fn diagnose(&self, tokens: &[Token]) -> String {
        use TokenType::*;
        let Some(head) = tokens.first() else {
            return "unexpected end of input".into();
        };
        let next = tokens.get(1).map(|t| t.kind);
        match (self.scope, head.kind, next) {
            (_, ImportKeyword, _) => "malformed import declaration".into(),
            (Scope::TopLevel, Identifier, Some(Colon)) => {
                format!("malformed declaration of function `{}`", head.text)
            }
            (Scope::TopLevel, ExecMarker, _) => {
                "command invocations are only allowed inside a function body".into()
            }
            (Scope::FunctionBody, Identifier, Some(Colon)) => {
                format!("function `{}` cannot be declared inside another function", head.text)
            }
            (Scope::FunctionBody, ExecMarker, _) => "malformed command invocation".into(),
            _ => format!("unexpected `{}`", head.text),
        }
    }
}

fn terminators() -> Pattern {
    Pattern::zero_or_more(Pattern::exact([TokenType::Semicolon]))
}

fn import_rule() -> Rule {
    use TokenType::*;
    Rule {
        name: "import",
        pattern: Pattern::composite([
            Pattern::exact([ImportKeyword, Identifier]),
            Pattern::zero_or_more(Pattern::exact([AsKeyword, Identifier])),
            Pattern::exact([Semicolon]),
            terminators(),
        ]),
        build: build_import,
    }
}

fn comment_rule() -> Rule {
    Rule {
        name: "comment",
        pattern: Pattern::composite([Pattern::exact([TokenType::Comment]), terminators()]),
        build: build_comment,
    }
}

fn function_rule() -> Rule {
    use TokenType::*;
    Rule {
        name: "function",
        pattern: Pattern::composite([
            Pattern::exact([Identifier, Colon, OpenParen]),
            Pattern::zero_or_more(Pattern::not(CloseParen)),
            Pattern::exact([CloseParen, Colon]),
            Pattern::zero_or_more(Pattern::one_of([StringType, StringArrayType])),
            Pattern::block(OpenBrace, CloseBrace),
            terminators(),
        ]),
        build: build_function,
    }
}

fn invocation_rule() -> Rule {
    use TokenType::*;
    Rule {
        name: "command invocation",
        pattern: Pattern::composite([
            Pattern::exact([ExecMarker, Identifier, OpenSquare]),
            Pattern::zero_or_more(Pattern::not(CloseSquare)),
            Pattern::exact([CloseSquare]),
            terminators(),
        ]),
        build: build_invocation,
    }
}

/// Pattern for one `<name> [:] <type>` parameter.
fn param_pattern() -> Pattern {
    use TokenType::*;
    Pattern::composite([
        Pattern::exact([Identifier]),
        Pattern::zero_or_more(Pattern::exact([Colon])),
        Pattern::one_of([StringType, StringArrayType]),
    ])
}

fn type_name(token: &Token) -> Result<TypeName, CompileError> {
    match token.kind {
        TokenType::StringType => Ok(TypeName::String),
        TokenType::StringArrayType => Ok(TypeName::StringArray),
        _ => Err(CompileError::syntax(
            format!("`{}` is not a type", token.text),
            Some(token.position.clone()),
        )),
    }
}

fn missing(what: &str, tokens: &[Token]) -> CompileError {
    CompileError::syntax(
        format!("expected {what}"),
        tokens.first().map(|t| t.position.clone()),
    )
}

fn build_import(tokens: &[Token], _: &AstBuilder) -> Result<Node, CompileError> {
    let [keyword, name, rest @ ..] = tokens else {
        return Err(missing("import name", tokens));
    };
    let mut aliases = rest
        .windows(2)
        .filter(|pair| pair[0].kind == TokenType::AsKeyword)
        .map(|pair| &pair[1]);
    let alias = aliases.next().map(|t| t.text.clone());
    if let Some(extra) = aliases.next() {
        return Err(CompileError::syntax(
            format!("import `{}` declares more than one alias", name.text),
            Some(extra.position.clone()),
        ));
    }
    Ok(Node::Import(Import {
        name: name.text.clone(),
        alias,
        position: keyword.position.clone(),
    }))
}

fn build_comment(tokens: &[Token], _: &AstBuilder) -> Result<Node, CompileError> {
    let comment = tokens.first().ok_or_else(|| missing("comment", tokens))?;
    Ok(Node::Comment(Comment {
        text: comment.text.clone(),
    }))
}

fn build_function(tokens: &[Token], builder: &AstBuilder) -> Result<Node, CompileError> {
    let name = tokens.first().ok_or_else(|| missing("function name", tokens))?;
    // name : ( params ) : [ret] { body }
    let close = tokens
        .iter()
        .position(|t| t.kind == TokenType::CloseParen)
        .ok_or_else(|| missing("`)`", tokens))?;
    let params = build_params(tokens.get(3..close).ok_or_else(|| missing("`(`", tokens))?)?;

    let open = tokens
        .iter()
        .skip(close)
        .position(|t| t.kind == TokenType::OpenBrace)
        .map(|i| i + close)
        .ok_or_else(|| missing("`{`", &tokens[close..]))?;
    let declared = tokens
        .get(close + 2..open)
        .ok_or_else(|| missing("`:` before the function body", &tokens[close..]))?;
    let return_type = match declared {
        [] => None,
        [ty] => Some(type_name(ty)?),
        [_, extra, ..] => {
            return Err(CompileError::syntax(
                format!("function `{}` declares more than one return type", name.text),
                Some(extra.position.clone()),
            ));
        }
    };

    let len = Pattern::block(TokenType::OpenBrace, TokenType::CloseBrace)
        .match_len(&tokens[open..])
        .ok_or_else(|| {
            CompileError::syntax(
                format!("unclosed body of function `{}`", name.text),
                Some(tokens[open].position.clone()),
            )
        })?;
    let inner = &tokens[open + 1..open + len - 1];
    let body = builder
        .nested(Grammar::function_body(), &tokens[open])?
        .build(inner)?
        .children;

    Ok(Node::Function(Function {
        name: name.text.clone(),
        params,
        return_type,
        body,
        position: name.position.clone(),
    }))
}

/// Parse the tokens between a function's parentheses. Commas and line
/// terminators separate parameters; anything else is an error.
fn build_params(tokens: &[Token]) -> Result<Vec<Param>, CompileError> {
    let pattern = param_pattern();
    let mut params = Vec::new();
    let mut offset = 0;

    while offset < tokens.len() {
        let rest = &tokens[offset..];
        if let Some(len) = pattern.match_len(rest) {
            let span = &rest[..len];
            let ty = span.last().ok_or_else(|| missing("parameter type", rest))?;
            params.push(Param {
                name: span[0].text.clone(),
                ty: type_name(ty)?,
            });
            offset += len;
            continue;
        }
        match rest[0].kind {
            TokenType::Comma | TokenType::Semicolon => offset += 1,
            _ => {
                return Err(CompileError::syntax(
                    format!("malformed parameter near `{}`", rest[0].text),
                    Some(rest[0].position.clone()),
                ));
            }
        }
    }
    Ok(params)
}

fn build_invocation(tokens: &[Token], _: &AstBuilder) -> Result<Node, CompileError> {
    let command = build_expression(tokens.get(1..).unwrap_or_default())?;
    Ok(Node::CommandInvocation(CommandInvocation { command }))
}

/// `name [ arg, arg, ... ]`: every token between the brackets except
/// separators becomes one argument, verbatim.
pub fn build_expression(tokens: &[Token]) -> Result<CommandExpression, CompileError> {
    let [name, open, rest @ ..] = tokens else {
        return Err(missing("command name", tokens));
    };
    if open.kind != TokenType::OpenSquare {
        return Err(missing("`[`", &tokens[1..]));
    }
    let args = rest
        .iter()
        .take_while(|t| t.kind != TokenType::CloseSquare)
        .filter(|t| {
            !matches!(
                t.kind,
                TokenType::Comma | TokenType::Semicolon | TokenType::Comment
            )
        })
        .map(|t| t.text.clone())
        .collect();
    Ok(CommandExpression {
        command_name: name.text.clone(),
        args,
        position: name.position.clone(),
    })
}
