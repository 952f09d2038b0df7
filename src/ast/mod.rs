//! Syntax tree for blowK programs.
//!
//! [`Node`] is a closed set of variants; every operation over the tree
//! (import collection, command resolution, code generation) matches on it
//! exhaustively.

pub mod builder;
pub mod grammar;

pub use builder::{AstBuilder, BuildOptions};
pub use grammar::{Grammar, Rule};

use serde::Serialize;

use crate::parse::SourcePosition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Root(Root),
    Import(Import),
    Function(Function),
    Param(Param),
    CommandInvocation(CommandInvocation),
    CommandExpression(CommandExpression),
    Comment(Comment),
}

impl Node {
    /// Short human-readable label used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Root(_) => "root".into(),
            Node::Import(i) => format!("import `{}`", i.name),
            Node::Function(f) => format!("function `{}`", f.name),
            Node::Param(p) => format!("parameter `{}`", p.name),
            Node::CommandInvocation(c) => format!("invocation of `{}`", c.command.command_name),
            Node::CommandExpression(c) => format!("command `{}`", c.command_name),
            Node::Comment(_) => "comment".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.children.iter().filter_map(|n| match n {
            Node::Function(f) => Some(f),
            _ => None,
        })
    }
}

/// `import <name> [as <alias>];`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip)]
    pub position: SourcePosition,
}

/// Declared parameter and return types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    String,
    StringArray,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::String => "string",
            TypeName::StringArray => "[]string",
        }
    }
}

/// `<name>: (<params>): [<return type>] { <body> }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeName>,
    pub body: Vec<Node>,
    #[serde(skip)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "param_type")]
    pub ty: TypeName,
}

/// `$<command>[<args>];`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInvocation {
    pub command: CommandExpression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandExpression {
    /// Rewritten from an alias to the imported name during resolution.
    pub command_name: String,
    /// Raw token text of each argument, in order.
    pub args: Vec<String>,
    #[serde(skip)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
}
