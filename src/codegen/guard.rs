//! Existence checks emitted ahead of the program body.

use crate::error::CompileError;

/// Hands out one distinct exit status per check, counting up.
#[derive(Debug, Clone)]
pub struct ExitCodes {
    next: u16,
}

impl ExitCodes {
    pub fn starting_at(first: u8) -> Self {
        Self {
            next: u16::from(first),
        }
    }

    /// The next unused status, or an error once statuses pass 255.
    pub fn allocate(&mut self, command: &str) -> Result<u8, CompileError> {
        let code = u8::try_from(self.next).map_err(|_| {
            CompileError::codegen(format!(
                "no exit status left for the check of `{command}`"
            ))
        })?;
        self.next += 1;
        Ok(code)
    }
}

/// `if` block that exits with `code` when `command` cannot be located.
/// `message`, when given, is echoed before exiting.
fn check(command: &str, code: u8, message: Option<&str>, indent: &str) -> String {
    let mut block = format!("if [[ -z \"$( which {command} )\" ]]; then\n");
    if let Some(message) = message {
        block.push_str(&format!("{indent}echo \"{message}\"\n"));
    }
    block.push_str(&format!("{indent}exit {code}\nfi"));
    block
}

/// Checks for the commands every script relies on.
pub fn preamble(
    implicit: &[String],
    codes: &mut ExitCodes,
    indent: &str,
) -> Result<String, CompileError> {
    let mut blocks = Vec::with_capacity(implicit.len());
    for command in implicit {
        blocks.push(check(command, codes.allocate(command)?, None, indent));
    }
    let header = match implicit {
        [] => return Ok(String::new()),
        [only] => format!("# check for {only} by default"),
        [init @ .., last] => format!("# check for {} and {last} by default", init.join(", ")),
    };
    Ok(format!("{header}\n{}", blocks.join("\n\n")))
}

/// Check for one imported command.
pub fn import_guard(name: &str, codes: &mut ExitCodes, indent: &str) -> Result<String, CompileError> {
    let code = codes.allocate(name)?;
    let message = format!("imported command {name} could not be found");
    Ok(check(name, code, Some(&message), indent))
}
