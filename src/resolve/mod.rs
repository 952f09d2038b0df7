//! Command resolution: every invoked command must be a declared import.
//!
//! Resolution runs in two passes over the tree. The first collects import
//! declarations into an [`ImportTable`]; the second looks up each command
//! expression, rewriting aliases to the imported name.

use crate::ast::{CommandExpression, Import, Node, Root};
use crate::error::CompileError;

/// How a command name was found in the import table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The name is itself an import.
    Name,
    /// The name is an alias of this import.
    Alias(String),
}

/// Declared imports in tree traversal order.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    imports: Vec<Import>,
}

impl ImportTable {
    /// Collect every import in `root`, depth first.
    pub fn collect(root: &Root) -> Self {
        let mut imports = Vec::new();
        for child in &root.children {
            collect_imports(child, &mut imports);
        }
        Self { imports }
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Find `command` by name or alias. Entries are checked in order; within
    /// an entry the name is checked before the alias.
    pub fn lookup(&self, command: &str) -> Option<Resolution> {
        self.imports.iter().find_map(|import| {
            if import.name == command {
                Some(Resolution::Name)
            } else if import.alias.as_deref() == Some(command) {
                Some(Resolution::Alias(import.name.clone()))
            } else {
                None
            }
        })
    }

    fn resolve_expression(&self, expr: &mut CommandExpression) -> Result<(), CompileError> {
        match self.lookup(&expr.command_name) {
            Some(Resolution::Name) => Ok(()),
            Some(Resolution::Alias(name)) => {
                log::debug!("{}: alias `{}` -> `{name}`", expr.position, expr.command_name);
                expr.command_name = name;
                Ok(())
            }
            None => Err(CompileError::UnresolvedCommand {
                name: expr.command_name.clone(),
                position: Some(expr.position.clone()),
            }),
        }
    }

    /// Check every command expression under `node`, rewriting aliases.
    pub fn resolve(&self, node: &mut Node) -> Result<(), CompileError> {
        match node {
            Node::Root(root) => root
                .children
                .iter_mut()
                .try_for_each(|child| self.resolve(child)),
            Node::Function(function) => function
                .body
                .iter_mut()
                .try_for_each(|child| self.resolve(child)),
            Node::CommandInvocation(invocation) => {
                self.resolve_expression(&mut invocation.command)
            }
            Node::CommandExpression(expr) => self.resolve_expression(expr),
            Node::Import(_) | Node::Param(_) | Node::Comment(_) => Ok(()),
        }
    }
}

fn collect_imports(node: &Node, out: &mut Vec<Import>) {
    match node {
        Node::Import(import) => out.push(import.clone()),
        Node::Root(root) => {
            for child in &root.children {
                collect_imports(child, out);
            }
        }
        Node::Function(function) => {
            for child in &function.body {
                collect_imports(child, out);
            }
        }
        Node::Param(_)
        | Node::CommandInvocation(_)
        | Node::CommandExpression(_)
        | Node::Comment(_) => {}
    }
}

/// Run both passes over a program. Returns the import table on success.
pub fn check(root: &mut Root) -> Result<ImportTable, CompileError> {
    let table = ImportTable::collect(root);
    log::debug!("collected {} imports", table.imports.len());
    for child in &mut root.children {
        table.resolve(child)?;
    }
    Ok(table)
}
