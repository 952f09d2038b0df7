use super::types::{RawToken, SourcePosition};

/// Characters that end the current fragment and are emitted as fragments of
/// their own.
pub fn is_separator(c: char) -> bool {
    matches!(
        c,
        // whitespace
        ' ' | '\t' | '\r' | '\n'
        // brackets
        | '(' | ')' | '{' | '}' | '[' | ']'
        // punctuation
        | ':' | ';' | '.' | ',' | '$' | '"' | '#'
        // arithmetic and comparison
        | '+' | '-' | '*' | '/' | '%' | '&' | '|' | '=' | '<' | '>' | '!'
    )
}

/// Split source text into raw fragments with no file name attached.
pub fn tokenize(source: &str) -> Vec<RawToken> {
    tokenize_file(source, None)
}

/// Split source text into raw fragments, tagging each with `file` and its
/// line and column.
///
/// Every character of the input lands in exactly one fragment, so joining the
/// fragment texts reproduces the source.
pub fn tokenize_file(source: &str, file: Option<&str>) -> Vec<RawToken> {
    let file = file.map(str::to_string);
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_start = SourcePosition::new(file.clone(), 1, 1);
    let (mut line, mut column) = (1, 1);

    for c in source.chars() {
        if is_separator(c) {
            if !run.is_empty() {
                tokens.push(RawToken {
                    text: std::mem::take(&mut run),
                    position: run_start.clone(),
                });
            }
            tokens.push(RawToken {
                text: c.to_string(),
                position: SourcePosition::new(file.clone(), line, column),
            });
        } else {
            if run.is_empty() {
                run_start = SourcePosition::new(file.clone(), line, column);
            }
            run.push(c);
        }

        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    if !run.is_empty() {
        tokens.push(RawToken {
            text: run,
            position: run_start,
        });
    }

    tokens
}
