use blowk::Compiler;
use blowk::config::Config;
use blowk::error::{CompileError, ErrorKind};

fn compile(source: &str) -> Result<String, CompileError> {
    blowk::compile(source)
}

fn script_for(source: &str) -> String {
    match compile(source) {
        Ok(script) => script,
        Err(e) => panic!("compile failed for {source:?}: {e}"),
    }
}

fn kind_for(source: &str) -> ErrorKind {
    match compile(source) {
        Ok(script) => panic!("expected failure for {source:?}, got:\n{script}"),
        Err(e) => e.kind(),
    }
}

/// Body lines of the generated script, after the `# main code` marker.
fn main_lines(script: &str) -> Vec<&str> {
    script
        .lines()
        .skip_while(|l| *l != "# main code")
        .skip(1)
        .collect()
}

macro_rules! output_test {
    ($name:ident, $source:expr, contains: [$($needle:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            let script = script_for($source);
            $(
                assert!(script.contains($needle), "missing {:?} in:\n{}", $needle, script);
            )*
        }
    };
}

macro_rules! error_test {
    ($name:ident, $source:expr, $kind:ident) => {
        #[test]
        fn $name() {
            assert_eq!(kind_for($source), ErrorKind::$kind, "source: {:?}", $source);
        }
    };
}

const HELLO: &str = "import echo as print;\n# main is the entry point\nmain:(args:[]string):{ $print[\"Hello\",\"World\"]; }";

// ── Successful builds ──

#[test]
fn hello_world_end_to_end() {
    let script = script_for(HELLO);
    assert!(script.starts_with("#!/usr/bin/env bash\n"));
    assert!(script.contains("if [[ -z \"$( which which )\" ]]; then\n\texit 213\nfi"));
    assert!(script.contains("if [[ -z \"$( which echo )\" ]]; then\n\texit 214\nfi"));
    // echo is implicit: no guard of its own
    assert!(!script.contains("imported command"));
    assert!(!script.contains("exit 215"));
    assert_eq!(main_lines(&script), vec!["echo \"Hello\" \"World\""]);
}

output_test!(
    alias_resolves_to_imported_name,
    "import echo;\nimport grep as g;\nmain:():{ $g[\"-r\",\"needle\"] }",
    contains: [
        "grep \"-r\" \"needle\"",
        "echo \"imported command grep could not be found\"\n\texit 215",
    ]
);

output_test!(
    multiline_program,
    "import ls\n\nmain:(args []string):{\n  # list everything\n  $ls[\"-la\"]\n\n  $ls[]\n}\n",
    contains: ["# main code\nls \"-la\"\nls\n", "which ls"]
);

output_test!(
    empty_string_argument,
    "import echo;\nmain:():{ $echo[\"\"] }",
    contains: ["echo \"\"\n"]
);

output_test!(
    helper_function_is_emitted_before_main,
    "import echo;\ngreet:(who string, rest []string):string{ $echo[\"hi\"] }\nmain:():{ $echo[\"x\"] }",
    contains: [
        "greet() {\n\tlocal who=\"$1\"\n\tlocal rest=(\"${@:2}\")\n\techo \"hi\"\n}\n\n# main code",
    ]
);

output_test!(
    empty_main_body,
    "import echo;\nmain:():{ }",
    contains: ["# main code\n"]
);

#[test]
fn comments_are_dropped_from_output() {
    let script = script_for("import echo;\nmain:():{\n  # say hi\n  $echo[\"hi\"]\n  # done\n}\n");
    assert!(!script.contains("say hi"));
    assert_eq!(main_lines(&script), vec!["echo \"hi\""]);
}

#[test]
fn guards_count_up_per_distinct_import() {
    let script = script_for("import ls;\nimport cat;\nimport ls as list;\nmain:():{ $list[]; $cat[\"f\"] }");
    assert_eq!(script.matches("which ls").count(), 1);
    let ls = script.find("exit 215").unwrap();
    let cat = script.find("exit 216").unwrap();
    assert!(script[..ls].contains("which ls"));
    assert!(script[ls..cat].contains("which cat"));
    assert_eq!(main_lines(&script), vec!["ls", "cat \"f\""]);
}

#[test]
fn program_without_main_only_checks() {
    let script = script_for("import git;");
    assert!(script.contains("which git"));
    assert!(!script.contains("# main code"));
}

#[test]
fn generated_arguments_split_back_verbatim() {
    let script = script_for(
        "import grep;\nmain:():{ $grep[\"-e\", \"two words\", \"--color=never\"] }",
    );
    let line = main_lines(&script)[0];
    let words = shlex::split(line).unwrap();
    assert_eq!(words, vec!["grep", "-e", "two words", "--color=never"]);
}

#[test]
fn imports_after_main_still_resolve() {
    let script = script_for("main:():{ $tar[\"-x\"] }\nimport tar;");
    assert_eq!(main_lines(&script), vec!["tar \"-x\""]);
}

// ── Failures ──

error_test!(
    unimported_command,
    "import echo;\nmain:():{ $curl[\"x\"] }",
    UnresolvedCommand
);
error_test!(
    command_names_are_case_sensitive,
    "import echo;\nmain:():{ $Echo[\"x\"] }",
    UnresolvedCommand
);
error_test!(unclosed_function_body, "main:():{ $echo[\"x\"]", Syntax);
error_test!(import_without_name, "import ;", Syntax);
error_test!(invocation_at_top_level, "import echo;\n$echo[\"x\"]", Syntax);
error_test!(unterminated_string, "import echo;\nmain:():{ $echo[\"x] }", Syntax);
error_test!(nested_function, "main:():{ inner:():{ } }", Syntax);
error_test!(bad_parameter, "main:(args int):{ }", Syntax);
error_test!(
    helper_named_after_import,
    "import grep;\nimport echo;\ngrep:():{ $echo[\"not grep\"] }\nmain:():{ $grep[\"-r\",\"x\"] }",
    CodeGeneration
);
error_test!(
    helper_calling_itself_through_import,
    "import ls;\nls:():{ $ls[] }\nmain:():{ $ls[] }",
    CodeGeneration
);
error_test!(
    helper_named_after_alias,
    "import grep as g;\ng:():{ }\nmain:():{ $g[\"x\"] }",
    CodeGeneration
);
error_test!(
    helper_named_after_implicit_command,
    "echo:(s string):{ }\nmain:():{ }",
    CodeGeneration
);
error_test!(
    helper_declared_twice,
    "import echo;\nf:():{ $echo[\"a\"] }\nf:():{ $echo[\"b\"] }\nmain:():{ }",
    CodeGeneration
);

#[test]
fn shadowing_helper_reports_its_position() {
    let err = compile("import grep;\ngrep:():{ }").unwrap_err();
    assert_eq!(
        err.to_string(),
        "code generation failed: 2:1: function `grep` would shadow the imported command `grep`"
    );
}

output_test!(
    stray_terminators_are_ignored,
    ";\nimport echo;;\nmain:():{ ; $echo[\"x\"] ;; }",
    contains: ["# main code\necho \"x\"\n"]
);
error_test!(
    trailing_backslash_breaks_generated_script,
    "import echo;\nmain:():{ $echo[\"a\\\"] }",
    CodeGeneration
);

#[test]
fn unresolved_command_reports_position() {
    let err = compile("import echo;\nmain:():{ $curl[\"x\"] }").unwrap_err();
    assert_eq!(err.to_string(), "2:12: command `curl` is not imported");
}

#[test]
fn syntax_error_explains_head_token() {
    let err = compile("import echo;\n$echo[\"x\"]").unwrap_err();
    assert!(
        err.to_string().contains("only allowed inside a function body"),
        "{err}"
    );
}

// ── Configuration ──

fn compiler_with(overlay: &str) -> Compiler {
    let mut config = Config::default_config();
    config.apply_overlay_str(overlay).unwrap();
    Compiler::new(config).unwrap()
}

#[test]
fn lenient_mode_skips_junk() {
    let compiler = compiler_with("[settings]\nlenient = true");
    let script = compiler
        .compile("import echo;\n42\nmain:():{ $echo[\"ok\"] }", None)
        .unwrap();
    assert_eq!(main_lines(&script), vec!["echo \"ok\""]);
}

#[test]
fn output_settings_are_applied() {
    let compiler = compiler_with(
        "[output]\nshebang = \"#!/bin/bash\"\nindent = \"    \"\nfirst_exit_code = 100",
    );
    let script = compiler.compile("import ls;\nmain:():{ }", None).unwrap();
    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("    exit 100\n"));
    assert!(script.contains("    exit 102\n"));
}

#[test]
fn removing_implicit_commands_adds_guards() {
    let compiler = compiler_with("[commands]\nremove_implicit = [\"echo\"]");
    let script = compiler.compile(HELLO, None).unwrap();
    assert!(script.contains("# check for which by default"));
    assert!(script.contains("imported command echo could not be found"));
}

#[test]
fn exit_codes_past_255_fail() {
    let compiler = compiler_with("[output]\nfirst_exit_code = 254");
    let err = compiler.compile("import ls;", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CodeGeneration);
}

#[test]
fn file_name_appears_in_positions() {
    let compiler = Compiler::new(Config::default_config()).unwrap();
    let err = compiler.compile("import 7;", Some("bad.bk")).unwrap_err();
    assert_eq!(err.position().and_then(|p| p.file.as_deref()), Some("bad.bk"));
}

// ── Dumps ──

#[test]
fn ast_dump_shape() {
    let compiler = Compiler::new(Config::default_config()).unwrap();
    let root = compiler.parse(HELLO, None).unwrap();
    let json = serde_json::to_value(&root).unwrap();
    let children = json["children"].as_array().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0]["type"], "import");
    assert_eq!(children[0]["alias"], "print");
    assert_eq!(children[1]["type"], "comment");
    assert_eq!(children[2]["type"], "function");
    assert_eq!(children[2]["params"][0]["param_type"], "string_array");
    let invocation = &children[2]["body"][0];
    assert_eq!(invocation["type"], "command_invocation");
    assert_eq!(invocation["command"]["command_name"], "print");
}

#[test]
fn token_dump_has_no_whitespace() {
    let compiler = Compiler::new(Config::default_config()).unwrap();
    let tokens = compiler.tokens("import  echo ;\n", None).unwrap();
    let json = serde_json::to_value(&tokens).unwrap();
    let kinds: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["ImportKeyword", "Identifier", "Semicolon"]);
    assert_eq!(json[1]["text"], "echo");
}
