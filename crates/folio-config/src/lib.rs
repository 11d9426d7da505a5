//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in `[book]` support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `book.title`, `book.source_dir`, `book.output_dir`.

mod expand;

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Deserialize;

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "folio.toml";

const DEFAULT_SOURCE_DIR: &str = "manuscript";
const DEFAULT_OUTPUT_DIR: &str = "build";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override chapter source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override syntax highlighting flag.
    pub highlight: Option<bool>,
    /// Override section numbering flag.
    pub number_sections: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Book configuration (paths are relative strings from TOML).
    book: BookConfigRaw,
    /// Rendering options.
    pub render: RenderConfig,

    /// Resolved book configuration (set after loading).
    #[serde(skip)]
    pub book_resolved: BookConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw book configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BookConfigRaw {
    title: Option<String>,
    source_dir: Option<String>,
    output_dir: Option<String>,
    exclude: Vec<String>,
}

/// Resolved book configuration with absolute paths and compiled patterns.
#[derive(Debug, Default)]
pub struct BookConfig {
    /// Book title.
    pub title: Option<String>,
    /// Directory containing chapter markdown files.
    pub source_dir: PathBuf,
    /// Directory rendered chapters are written to.
    pub output_dir: PathBuf,
    /// Chapters to skip, matched against paths relative to `source_dir`.
    pub exclude: Vec<Pattern>,
}

impl BookConfig {
    /// Whether a chapter path (relative to `source_dir`) is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|pattern| pattern.matches_path(relative))
    }
}

/// Rendering options.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Highlight code listings.
    pub highlight: bool,
    /// Use the first `h1` of a chapter as its title.
    pub extract_title: bool,
    /// Number `h2`/`h3` headers.
    pub number_sections: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            highlight: true,
            extract_title: true,
            number_sections: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`book.title`").
        field: String,
        /// Error message (e.g., "${`BOOK_TITLE`}: environment variable not found").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, so CLI
    /// arguments take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.book_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.book_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(highlight) = settings.highlight {
            self.render.highlight = highlight;
        }
        if let Some(number_sections) = settings.number_sections {
            self.render.number_sections = number_sections;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let start = std::env::current_dir().ok()?;
        Self::discover_from(&start)
    }

    /// Search for config file in `start` and its ancestors.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            book: BookConfigRaw::default(),
            render: RenderConfig::default(),
            book_resolved: BookConfig {
                title: None,
                source_dir: base.join(DEFAULT_SOURCE_DIR),
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
                exclude: Vec::new(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let book = &self.book_resolved;

        if book.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "book.title cannot be empty".to_owned(),
            ));
        }

        if book.source_dir == book.output_dir {
            return Err(ConfigError::Validation(format!(
                "book.output_dir must differ from book.source_dir ({})",
                book.source_dir.display()
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let book = &mut self.book;
        book.title = expand::expand_env_opt(book.title.as_deref(), "book.title")?;
        book.source_dir = expand::expand_env_opt(book.source_dir.as_deref(), "book.source_dir")?;
        book.output_dir = expand::expand_env_opt(book.output_dir.as_deref(), "book.output_dir")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory and compile
    /// exclude patterns.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        let exclude = self
            .book
            .exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    ConfigError::Validation(format!("book.exclude pattern {p:?} is invalid: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.book_resolved = BookConfig {
            title: self.book.title.clone(),
            source_dir: resolve(self.book.source_dir.as_deref(), DEFAULT_SOURCE_DIR),
            output_dir: resolve(self.book.output_dir.as_deref(), DEFAULT_OUTPUT_DIR),
            exclude,
        };

        Ok(())
    }
}
