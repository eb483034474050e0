//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.source_dir`
//! - `preview.endpoint`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_ingest::SniffMode;
use folio_locale::{FallbackPolicy, Locale};
use folio_renderer::RenderOptions;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override highlight theme.
    pub theme: Option<String>,
    /// Override syntax highlighting flag.
    pub highlight: Option<bool>,
    /// Override link preview endpoint.
    pub preview_endpoint: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Largest accepted `render.scroll_margin`, in pixels.
const MAX_SCROLL_MARGIN: u32 = 1000;

/// Largest accepted `preview.timeout_secs`.
const MAX_PREVIEW_TIMEOUT_SECS: u64 = 60;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locale fallback configuration.
    pub locale: LocaleConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Render configuration.
    pub render: RenderConfig,
    /// Paste ingestion configuration.
    pub ingest: IngestConfig,
    /// Link preview configuration.
    pub preview: PreviewConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Locale configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Authoring locale, always the last fallback.
    pub canonical: Locale,
    /// Try the language-general locale before the canonical one.
    pub language_fallback: bool,
    /// Per-locale fallback lists, keyed by locale tag.
    pub fallbacks: BTreeMap<String, Vec<Locale>>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            canonical: default_canonical(),
            language_fallback: true,
            fallbacks: BTreeMap::new(),
        }
    }
}

fn default_canonical() -> Locale {
    Locale::parse("ko").unwrap_or_else(|_| unreachable!("`ko` is a valid locale tag"))
}

impl LocaleConfig {
    /// Build the fallback policy described by this section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a `[locale.fallbacks]` key is not
    /// a valid locale tag.
    pub fn policy(&self) -> Result<FallbackPolicy, ConfigError> {
        let mut policy = FallbackPolicy::new(self.canonical.clone())
            .with_language_fallback(self.language_fallback);
        for (tag, fallbacks) in &self.fallbacks {
            let locale = Locale::parse(tag).map_err(|e| {
                ConfigError::Validation(format!("locale.fallbacks key `{tag}`: {e}"))
            })?;
            policy = policy.with_override(locale, fallbacks.clone());
        }
        Ok(policy)
    }
}

/// Raw content configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root of the `<locale>/<slug>` content tree.
    pub source_dir: PathBuf,
}

/// Render configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// `scroll-margin-top` applied to headings, in pixels.
    pub scroll_margin: u32,
    /// Whether code blocks are syntax highlighted.
    pub highlight: bool,
    /// Highlight theme name.
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            scroll_margin: options.scroll_margin,
            highlight: options.highlight,
            theme: options.theme,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            scroll_margin: self.scroll_margin,
            highlight: self.highlight,
            theme: self.theme.clone(),
        }
    }
}

/// Paste ingestion configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// How pasted text is classified as Markdown.
    pub sniff: SniffMode,
}

/// Link preview configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Preview metadata service. Previews are disabled when unset.
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 5,
        }
    }
}

impl PreviewConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
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
        /// Config field path (e.g., "`preview.endpoint`").
        field: String,
        /// Error message (e.g., "${`PREVIEW_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(theme) = &settings.theme {
            self.render.theme.clone_from(theme);
        }
        if let Some(highlight) = settings.highlight {
            self.render.highlight = highlight;
        }
        if let Some(endpoint) = &settings.preview_endpoint {
            self.preview.endpoint = Some(endpoint.clone());
        }
    }

    /// Fallback policy for the locale resolver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a fallback key is invalid.
    pub fn fallback_policy(&self) -> Result<FallbackPolicy, ConfigError> {
        self.locale.policy()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            locale: LocaleConfig::default(),
            content: ContentConfigRaw::default(),
            render: RenderConfig::default(),
            ingest: IngestConfig::default(),
            preview: PreviewConfig::default(),
            content_resolved: ContentConfig {
                source_dir: base.join("content"),
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
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locale.policy()?;
        self.validate_render()?;
        self.validate_preview()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.theme, "render.theme")?;
        if !folio_renderer::theme_names().contains(&self.render.theme.as_str()) {
            return Err(ConfigError::Validation(format!(
                "render.theme `{}` is not a bundled theme",
                self.render.theme
            )));
        }
        if self.render.scroll_margin > MAX_SCROLL_MARGIN {
            return Err(ConfigError::Validation(format!(
                "render.scroll_margin cannot exceed {MAX_SCROLL_MARGIN}"
            )));
        }
        Ok(())
    }

    fn validate_preview(&self) -> Result<(), ConfigError> {
        if let Some(ref endpoint) = self.preview.endpoint {
            require_non_empty(endpoint, "preview.endpoint")?;
            require_http_url(endpoint, "preview.endpoint")?;
        }

        let timeout = self.preview.timeout_secs;
        if timeout == 0 {
            return Err(ConfigError::Validation(
                "preview.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if timeout > MAX_PREVIEW_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "preview.timeout_secs cannot exceed {MAX_PREVIEW_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.content.source_dir {
            self.content.source_dir = Some(expand::expand_env(dir, "content.source_dir")?);
        }
        if let Some(ref endpoint) = self.preview.endpoint {
            self.preview.endpoint = Some(expand::expand_env(endpoint, "preview.endpoint")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let source_dir = self.content.source_dir.as_deref().unwrap_or("content");
        self.content_resolved = ContentConfig {
            source_dir: config_dir.join(source_dir),
        };
    }
}
