use std::fs::{self, OpenOptions};
use std::path::Path;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::error::CompileError;

/// Target of the one-line build records written to the build log.
pub const BUILD_TARGET: &str = "blowk::build";

/// Map `-v` occurrences to a terminal log level.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger: diagnostics to stderr at `level`, build
/// records appended to `build_log` when given.
///
/// Best-effort: a build log that cannot be opened is reported and skipped.
pub fn init(level: LevelFilter, build_log: Option<&Path>) {
    let term_config = ConfigBuilder::new()
        .add_filter_ignore_str(BUILD_TARGET)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        term_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let mut open_failure = None;
    if let Some(path) = build_log {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let file_config = ConfigBuilder::new()
                    .add_filter_allow_str(BUILD_TARGET)
                    .set_time_format_rfc3339()
                    .build();
                loggers.push(WriteLogger::new(LevelFilter::Info, file_config, file));
            }
            Err(e) => open_failure = Some(format!("cannot open build log {}: {e}", path.display())),
        }
    }

    // a logger may already be installed (tests, embedding)
    if CombinedLogger::init(loggers).is_ok()
        && let Some(message) = open_failure
    {
        log::warn!("{message}");
    }
}

/// Record the outcome of one build in the build log.
pub fn log_build(input: &str, result: &Result<String, CompileError>) {
    log::info!(target: BUILD_TARGET, "{}", build_record(input, result));
}

/// Single tab-separated line: input, outcome, detail.
pub fn build_record(input: &str, result: &Result<String, CompileError>) -> String {
    match result {
        Ok(script) => format!("{input}\tok\t{} lines", script.lines().count()),
        Err(e) => format!(
            "{input}\t{}\t{}",
            e.kind().as_str(),
            e.to_string().replace('\n', "; ")
        ),
    }
}
