//! blowk: compiles blowK programs to bash scripts.
//!
//! `blowk build hello.bk` writes `hello.sh` next to the source. The script
//! checks that every imported command exists before running the body of
//! `main`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blowk::Compiler;
use blowk::config::{Config, ConfigError};
use blowk::error::CompileError;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blowk")]
#[command(version, about = "The blowK to bash compiler", long_about = None)]
struct Cli {
    /// Extra config overlay merged after the user config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a blowK source file to a bash script
    Build {
        /// Source file to compile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output script (default: the input path with a .sh extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip tokens no rule recognizes instead of failing
        #[arg(long)]
        lenient: bool,

        /// Do not parse the generated script with tree-sitter-bash
        #[arg(long)]
        no_verify: bool,

        /// Print the token stream as JSON and stop
        #[arg(long)]
        dump_tokens: bool,

        /// Print the syntax tree as JSON and stop
        #[arg(long)]
        dump_ast: bool,
    },

    /// Print the merged configuration as TOML
    DumpConfig,
}

/// Failures the CLI reports, each with its own exit status.
enum Failure {
    Io(String),
    Config(ConfigError),
    Compile(CompileError),
}

impl From<ConfigError> for Failure {
    fn from(e: ConfigError) -> Self {
        Failure::Config(e)
    }
}

impl From<CompileError> for Failure {
    fn from(e: CompileError) -> Self {
        Failure::Compile(e)
    }
}

impl Failure {
    fn report(&self) -> u8 {
        match self {
            Failure::Io(message) => {
                eprintln!("blowk: {message}");
                1
            }
            Failure::Config(e) => {
                eprintln!("blowk: config: {e}");
                1
            }
            Failure::Compile(e) => {
                let mut message = e.to_string();
                let mut cause = std::error::Error::source(e);
                while let Some(inner) = cause {
                    message.push_str(&format!("\n  caused by: {inner}"));
                    cause = std::error::Error::source(inner);
                }
                eprintln!("blowk: {message}");
                // exit codes are small positive values
                u8::try_from(e.kind().exit_code()).unwrap_or(1)
            }
        }
    }
}

fn load_config(extra: Option<&Path>) -> Result<Config, Failure> {
    let mut config = Config::load()?;
    if let Some(path) = extra {
        config.apply_overlay_file(path)?;
    }
    Ok(config)
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("sh")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Failure> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Failure::Io(format!("cannot serialize dump: {e}")))?;
    println!("{text}");
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    dump_tokens: bool,
    dump_ast: bool,
}

fn build(compiler: &Compiler, args: BuildArgs) -> Result<(), Failure> {
    let source = fs::read_to_string(&args.input)
        .map_err(|e| Failure::Io(format!("cannot read {}: {e}", args.input.display())))?;
    let label = args.input.display().to_string();

    if args.dump_tokens || args.dump_ast {
        if args.dump_tokens {
            print_json(&compiler.tokens(&source, Some(&label))?)?;
        }
        if args.dump_ast {
            print_json(&compiler.parse(&source, Some(&label))?)?;
        }
        return Ok(());
    }

    let result = compiler.compile(&source, Some(&label));
    blowk::logging::log_build(&label, &result);
    let script = result?;

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    if output == args.input {
        return Err(Failure::Io(format!(
            "refusing to overwrite the source file {}",
            output.display()
        )));
    }
    fs::write(&output, script)
        .map_err(|e| Failure::Io(format!("cannot write {}: {e}", output.display())))?;
    make_executable(&output)
        .map_err(|e| Failure::Io(format!("cannot set mode on {}: {e}", output.display())))?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), Failure> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::DumpConfig => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Failure::Io(format!("cannot serialize config: {e}")))?;
            print!("{text}");
            Ok(())
        }
        Commands::Build {
            input,
            output,
            lenient,
            no_verify,
            dump_tokens,
            dump_ast,
        } => {
            if lenient {
                config.settings.lenient = true;
            }
            if no_verify {
                config.settings.verify_output = false;
            }
            let log_path = config.log_path()?;
            blowk::logging::init(blowk::logging::level_for(cli.verbose), log_path.as_deref());
            let compiler = Compiler::new(config)?;
            build(
                &compiler,
                BuildArgs {
                    input,
                    output,
                    dump_tokens,
                    dump_ast,
                },
            )
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => ExitCode::from(failure.report()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_defaults_to_sh_extension() {
        assert_eq!(
            default_output(Path::new("demo/hello.bk")),
            PathBuf::from("demo/hello.sh")
        );
        assert_eq!(default_output(Path::new("hello")), PathBuf::from("hello.sh"));
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from(["blowk", "-vv", "build", "x.bk", "-o", "y.sh", "--lenient"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Build {
            output, lenient, no_verify, ..
        } = cli.command
        else {
            panic!("expected build");
        };
        assert_eq!(output, Some(PathBuf::from("y.sh")));
        assert!(lenient);
        assert!(!no_verify);
    }

    #[test]
    fn compile_failures_map_to_kind_status() {
        let failure = Failure::Compile(CompileError::UnresolvedCommand {
            name: "curl".into(),
            position: None,
        });
        assert_eq!(failure.report(), 5);
        assert_eq!(Failure::Io("x".into()).report(), 1);
        let config = Failure::Config(ConfigError::Expand {
            value: "$NOPE".into(),
            message: "not set".into(),
        });
        assert_eq!(config.report(), 1);
    }
}
