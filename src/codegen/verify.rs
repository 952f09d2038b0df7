//! Syntax check of generated scripts using tree-sitter-bash.

use tree_sitter::{Node, Parser};

use crate::error::CompileError;

/// Parse `script` as bash and fail if the tree contains errors or missing
/// nodes, reporting the first one found.
pub fn check_script(script: &str) -> Result<(), CompileError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_bash::LANGUAGE.into())
        .map_err(|e| CompileError::codegen(format!("cannot load bash grammar: {e}")))?;
    let tree = parser
        .parse(script, None)
        .ok_or_else(|| CompileError::codegen("bash parser returned no tree"))?;

    let Some(bad) = first_error(tree.root_node()) else {
        return Ok(());
    };
    let start = bad.start_position();
    let line = script.lines().nth(start.row).unwrap_or_default().trim();
    Err(CompileError::codegen(format!(
        "generated script is not valid bash at line {}, column {}: `{line}`",
        start.row + 1,
        start.column + 1
    )))
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    // a node can carry the error flag without an erroring child
    found.or(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_script_passes() {
        let script = "#!/usr/bin/env bash\n\
                      if [[ -z \"$( which echo )\" ]]; then\n\texit 214\nfi\n\n\
                      greet() {\n\tlocal name=\"$1\"\n\tlocal rest=(\"${@:2}\")\n\techo \"hi\"\n}\n\n\
                      echo \"Hello\" \"World\"\n";
        check_script(script).unwrap();
    }

    #[test]
    fn unterminated_if_fails() {
        let err = check_script("if true; then\n\techo \"x\"\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CodeGeneration);
        assert!(err.to_string().contains("not valid bash"), "{err}");
    }

    #[test]
    fn unterminated_string_fails() {
        assert!(check_script("echo \"a\\\"\n").is_err());
    }
}
