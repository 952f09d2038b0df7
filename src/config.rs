use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::BuildOptions;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// User overlay location, `~` expanded at load time.
const USER_CONFIG: &str = "~/.config/blowk/config.toml";

/// A user configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot expand log path `{value}`: {message}")]
    Expand { value: String, message: String },
}

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub commands: Commands,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub lenient: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub verify_output: bool,
    /// Build log path; `~` and `$VAR` are expanded. Empty disables the log.
    #[serde(default)]
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lenient: false,
            max_depth: default_max_depth(),
            verify_output: false,
            log_file: String::new(),
        }
    }
}

fn default_max_depth() -> usize {
    crate::ast::builder::DEFAULT_MAX_DEPTH
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Commands {
    /// Commands checked by the preamble of every script.
    #[serde(default)]
    pub implicit: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Output {
    #[serde(default)]
    pub shebang: String,
    #[serde(default = "default_indent")]
    pub indent: String,
    #[serde(default = "default_first_exit_code")]
    pub first_exit_code: u8,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            shebang: String::new(),
            indent: default_indent(),
            first_exit_code: default_first_exit_code(),
        }
    }
}

fn default_indent() -> String {
    "\t".into()
}

fn default_first_exit_code() -> u8 {
    213
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    commands: CommandsOverlay,
    #[serde(default)]
    output: OutputOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    lenient: Option<bool>,
    max_depth: Option<usize>,
    verify_output: Option<bool>,
    log_file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CommandsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    implicit: Vec<String>,
    #[serde(default)]
    remove_implicit: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputOverlay {
    shebang: Option<String>,
    indent: Option<String>,
    first_exit_code: Option<u8>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/blowk/config.toml (if exists)
    pub fn load() -> Result<Self, ConfigError> {
        let path = shellexpand::tilde(USER_CONFIG);
        Self::load_from(Path::new(path.as_ref()))
    }

    /// Defaults merged with the overlay at `path`. A missing file is not an
    /// error; an unreadable or malformed one is.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default_config();
        match std::fs::read_to_string(path) {
            Ok(content) => config.apply_overlay(parse_overlay(path, &content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        Ok(config)
    }

    /// Merge the overlay at `path`, which must exist.
    pub fn apply_overlay_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_overlay(parse_overlay(path, &content)?);
        Ok(())
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.lenient {
            self.settings.lenient = v;
        }
        if let Some(v) = s.max_depth {
            self.settings.max_depth = v;
        }
        if let Some(v) = s.verify_output {
            self.settings.verify_output = v;
        }
        if let Some(v) = s.log_file {
            self.settings.log_file = v;
        }

        // Commands
        let c = overlay.commands;
        merge_list(
            &mut self.commands.implicit,
            c.implicit,
            &c.remove_implicit,
            c.replace,
        );

        // Output
        let o = overlay.output;
        if let Some(v) = o.shebang {
            self.output.shebang = v;
        }
        if let Some(v) = o.indent {
            self.output.indent = v;
        }
        if let Some(v) = o.first_exit_code {
            self.output.first_exit_code = v;
        }
    }

    /// Parse a user overlay from TOML text and merge it.
    pub fn apply_overlay_str(&mut self, toml_str: &str) -> Result<(), toml::de::Error> {
        let overlay: ConfigOverlay = toml::from_str(toml_str)?;
        self.apply_overlay(overlay);
        Ok(())
    }

    /// Options for the AST builder.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            lenient: self.settings.lenient,
            max_depth: self.settings.max_depth,
        }
    }

    /// The build log path with `~` and environment variables expanded, or
    /// `None` when logging to a file is disabled.
    pub fn log_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let raw = &self.settings.log_file;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let path = shellexpand::full(raw).map_err(|e| ConfigError::Expand {
            value: raw.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(PathBuf::from(path.as_ref())))
    }
}

fn parse_overlay(path: &Path, content: &str) -> Result<ConfigOverlay, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
