//! Rendering a resolved tree to a bash script.
//!
//! A script has four sections, in order:
//!
//! 1. the shebang line
//! 2. the preamble checking for the implicit commands (`which`, `echo`)
//! 3. one guard per distinct imported command
//! 4. shell functions for every function other than `main`, then the body
//!    of `main` at top level
//!
//! Each check exits with its own status, counting up from
//! [`Output::first_exit_code`](crate::config::Output).

pub mod guard;
pub mod verify;

use crate::ast::{CommandExpression, Function, Node, Param, Root, TypeName};
use crate::config::Config;
use crate::error::CompileError;
use crate::resolve::{ImportTable, Resolution};

use guard::ExitCodes;

/// Name of the entry point function.
pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub shebang: String,
    pub indent: String,
    /// Commands checked by the preamble; imports of these get no guard.
    pub implicit: Vec<String>,
    pub first_exit_code: u8,
    /// Parse the finished script with tree-sitter-bash before returning it.
    pub verify: bool,
}

impl From<&Config> for CodegenOptions {
    fn from(config: &Config) -> Self {
        Self {
            shebang: config.output.shebang.clone(),
            indent: config.output.indent.clone(),
            implicit: config.commands.implicit.clone(),
            first_exit_code: config.output.first_exit_code,
            verify: config.settings.verify_output,
        }
    }
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self::from(&Config::default_config())
    }
}

pub struct Generator {
    options: CodegenOptions,
}

impl Generator {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }

    /// Render `root`, which must already have passed resolution.
    pub fn generate(&self, root: &Root) -> Result<String, CompileError> {
        let mut sections = Vec::new();
        if !self.options.shebang.is_empty() {
            sections.push(self.options.shebang.clone());
        }

        let mut codes = ExitCodes::starting_at(self.options.first_exit_code);
        let preamble = guard::preamble(&self.options.implicit, &mut codes, &self.options.indent)?;
        if !preamble.is_empty() {
            sections.push(preamble);
        }
        for name in self.guarded_imports(root) {
            sections.push(guard::import_guard(&name, &mut codes, &self.options.indent)?);
        }

        let imports = ImportTable::collect(root);
        let mut helpers: Vec<&str> = Vec::new();
        let mut entry: Option<&Function> = None;
        for child in &root.children {
            match child {
                Node::Function(f) if f.name == ENTRY_POINT => {
                    if entry.replace(f).is_some() {
                        return Err(CompileError::codegen(format!(
                            "{}: function `{ENTRY_POINT}` is declared more than once",
                            f.position
                        )));
                    }
                }
                Node::Function(f) => {
                    self.check_helper_name(f, &imports, &helpers)?;
                    helpers.push(&f.name);
                    let lines = self
                        .emit_function(f, 0)
                        .map_err(|e| CompileError::wrap_codegen(child.describe(), e))?;
                    sections.push(lines.join("\n"));
                }
                other => {
                    let lines = self
                        .emit(other, 0)
                        .map_err(|e| CompileError::wrap_codegen(other.describe(), e))?;
                    if !lines.is_empty() {
                        sections.push(lines.join("\n"));
                    }
                }
            }
        }

        match entry {
            Some(main) => {
                let mut lines = vec!["# main code".to_string()];
                for node in &main.body {
                    let rendered = self
                        .emit(node, 0)
                        .map_err(|e| CompileError::wrap_codegen(node.describe(), e))?;
                    lines.extend(rendered);
                }
                sections.push(lines.join("\n"));
            }
            None => log::warn!("no `{ENTRY_POINT}` function; the script only runs its checks"),
        }

        let mut script = sections.join("\n\n");
        script.push('\n');

        if self.options.verify {
            verify::check_script(&script)?;
            log::debug!("generated script parsed cleanly");
        }
        Ok(script)
    }

    /// A helper becomes a bash function, so its name must not hide a command
    /// the script invokes or checks for, nor an earlier helper.
    fn check_helper_name(
        &self,
        function: &Function,
        imports: &ImportTable,
        seen: &[&str],
    ) -> Result<(), CompileError> {
        let name = function.name.as_str();
        let clash = if seen.contains(&name) {
            "is declared more than once".to_string()
        } else if self.options.implicit.iter().any(|c| c == name) {
            format!("would shadow the implicit command `{name}`")
        } else {
            match imports.lookup(name) {
                Some(Resolution::Name) => format!("would shadow the imported command `{name}`"),
                Some(Resolution::Alias(target)) => {
                    format!("would shadow the alias `{name}` of `{target}`")
                }
                None => return Ok(()),
            }
        };
        Err(CompileError::codegen(format!(
            "{}: function `{name}` {clash}",
            function.position
        )))
    }

    /// Imported names needing a guard: first occurrence only, implicit
    /// commands excluded.
    fn guarded_imports(&self, root: &Root) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for import in ImportTable::collect(root).imports() {
            if self.options.implicit.contains(&import.name) || names.contains(&import.name) {
                continue;
            }
            names.push(import.name.clone());
        }
        names
    }

    /// Lines for one node at `level` indentation.
    fn emit(&self, node: &Node, level: usize) -> Result<Vec<String>, CompileError> {
        match node {
            // guards are emitted up front
            Node::Import(_) => Ok(Vec::new()),
            Node::Comment(_) => Ok(Vec::new()),
            Node::CommandInvocation(invocation) => {
                Ok(vec![self.indented(level, &render_command(&invocation.command))])
            }
            Node::CommandExpression(expr) => Ok(vec![self.indented(level, &render_command(expr))]),
            Node::Function(function) => self.emit_function(function, level),
            Node::Param(param) => Err(CompileError::codegen(format!(
                "parameter `{}` outside a parameter list",
                param.name
            ))),
            Node::Root(_) => Err(CompileError::codegen("nested root node")),
        }
    }

    fn emit_function(&self, function: &Function, level: usize) -> Result<Vec<String>, CompileError> {
        let mut lines = vec![self.indented(level, &format!("{}() {{", function.name))];
        for (index, param) in function.params.iter().enumerate() {
            lines.push(self.indented(level + 1, &bind_param(param, index + 1)));
        }
        for node in &function.body {
            let rendered = self
                .emit(node, level + 1)
                .map_err(|e| CompileError::wrap_codegen(node.describe(), e))?;
            lines.extend(rendered);
        }
        if lines.len() == 1 {
            // bash rejects an empty function body
            lines.push(self.indented(level + 1, ":"));
        }
        lines.push(self.indented(level, "}"));
        Ok(lines)
    }

    fn indented(&self, level: usize, text: &str) -> String {
        format!("{}{text}", self.options.indent.repeat(level))
    }
}

/// `name "arg1" "arg2"`. Arguments are quoted verbatim.
pub fn render_command(expr: &CommandExpression) -> String {
    let mut line = expr.command_name.clone();
    for arg in &expr.args {
        line.push_str(&format!(" \"{arg}\""));
    }
    line
}

/// `local` binding for the parameter in 1-based `position`. An array
/// parameter takes every remaining argument.
fn bind_param(param: &Param, position: usize) -> String {
    match param.ty {
        TypeName::String => format!("local {}=\"${position}\"", param.name),
        TypeName::StringArray => format!("local {}=(\"${{@:{position}}}\")", param.name),
    }
}

/// Render `root` with `options`.
pub fn generate(root: &Root, options: CodegenOptions) -> Result<String, CompileError> {
    Generator::new(options).generate(root)
}
