//! Configuration management for vaultpub.
//!
//! Parses `vaultpub.toml` configuration files with serde and provides
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
//! - `confluence.base_url`
//! - `confluence.space_key`
//! - `confluence.username`
//! - `confluence.api_token`
//! - `confluence.personal_token`
//! - `diagrams.kroki_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override vault root directory.
    pub vault_root: Option<PathBuf>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override target Confluence space.
    pub space_key: Option<String>,
    /// Override whether the page URL is written back into the note.
    pub record_url: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "vaultpub.toml";

/// Default vault folder holding embedded images.
const DEFAULT_ATTACHMENTS_FOLDER: &str = "attachments";

/// Default prefix of decorative icon images.
const DEFAULT_ICON_PREFIX: &str = "attachments/icons/";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,
    /// Vault configuration (paths are relative strings from TOML).
    vault: VaultConfigRaw,
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,
    /// Publishing behavior.
    pub publish: PublishConfig,

    /// Resolved vault configuration (set after loading).
    #[serde(skip)]
    pub vault_resolved: VaultConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw vault configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VaultConfigRaw {
    root: Option<String>,
    attachments_folder: Option<String>,
    icon_prefix: Option<String>,
}

/// Resolved vault configuration with absolute paths.
#[derive(Debug, Default)]
pub struct VaultConfig {
    /// Vault root; folder paths of published notes are relative to it.
    pub root: PathBuf,
    /// Folder name (relative to the root) holding embedded images.
    pub attachments_folder: String,
    /// Image references starting with this prefix are decorative icons.
    pub icon_prefix: String,
}

impl VaultConfig {
    /// Absolute attachments directory.
    #[must_use]
    pub fn attachments_dir(&self) -> PathBuf {
        self.root.join(&self.attachments_folder)
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Kroki server URL for diagram rendering.
    pub kroki_url: Option<String>,
}

/// Publishing behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Write the page URL into the note's frontmatter after a successful sync.
    pub record_url: bool,
    /// Frontmatter property receiving the page URL.
    pub url_property: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            record_url: false,
            url_property: "confluence_url".to_owned(),
        }
    }
}

/// Confluence configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL (including `/wiki` for Cloud).
    pub base_url: String,
    /// Space key pages are published into.
    pub space_key: String,
    /// Account name for basic authentication.
    #[serde(default)]
    pub username: Option<String>,
    /// API token paired with `username`.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Personal access token (Server/Data Center), used instead of basic auth.
    #[serde(default)]
    pub personal_token: Option<String>,
    /// Page that folder chains hang below. Space root when unset.
    #[serde(default)]
    pub root_page_id: Option<String>,
}

/// Resolved Confluence credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username and API token.
    Basic {
        /// Account name.
        username: String,
        /// API token.
        api_token: String,
    },
    /// Personal access token sent as a bearer token.
    Bearer(String),
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.space_key, "confluence.space_key")?;
        if let Some(root) = &self.root_page_id {
            require_non_empty(root, "confluence.root_page_id")?;
        }
        self.credentials().map(|_| ())
    }

    /// Credentials to authenticate with.
    ///
    /// A personal token wins over basic auth when both are configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither credential form is complete.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if let Some(token) = self.personal_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::Bearer(token.to_owned()));
        }
        match (self.username.as_deref(), self.api_token.as_deref()) {
            (Some(username), Some(api_token)) => {
                require_non_empty(username, "confluence.username")?;
                require_non_empty(api_token, "confluence.api_token")?;
                Ok(Credentials::Basic {
                    username: username.to_owned(),
                    api_token: api_token.to_owned(),
                })
            }
            _ => Err(ConfigError::Validation(
                "confluence credentials required: set username and api_token, or personal_token"
                    .to_owned(),
            )),
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
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
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
    /// Otherwise, searches for `vaultpub.toml` in current directory and parents.
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
        if let Some(root) = &settings.vault_root {
            self.vault_resolved.root.clone_from(root);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url = Some(kroki_url.clone());
        }
        if let (Some(space_key), Some(confluence)) = (&settings.space_key, &mut self.confluence) {
            confluence.space_key.clone_from(space_key);
        }
        if let Some(record_url) = settings.record_url {
            self.publish.record_url = record_url;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section is present
    /// and all fields are valid. Use this instead of accessing the `confluence`
    /// field directly when the command requires Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with the vault rooted at the given directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: None,
            vault: VaultConfigRaw::default(),
            diagrams: DiagramsConfig::default(),
            publish: PublishConfig::default(),
            vault_resolved: VaultConfig {
                root: base.to_path_buf(),
                attachments_folder: DEFAULT_ATTACHMENTS_FOLDER.to_owned(),
                icon_prefix: DEFAULT_ICON_PREFIX.to_owned(),
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
    /// The `[confluence]` section is checked lazily by
    /// [`Config::require_confluence`], so commands that never publish work
    /// without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(
            &self.vault_resolved.attachments_folder,
            "vault.attachments_folder",
        )?;
        if let Some(kroki_url) = &self.diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }
        require_non_empty(&self.publish.url_property, "publish.url_property")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.diagrams.kroki_url, "diagrams.kroki_url")?;

        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.space_key =
                expand::expand_env(&confluence.space_key, "confluence.space_key")?;
            expand::expand_opt(&mut confluence.username, "confluence.username")?;
            expand::expand_opt(&mut confluence.api_token, "confluence.api_token")?;
            expand::expand_opt(&mut confluence.personal_token, "confluence.personal_token")?;
        }

        Ok(())
    }

    /// Resolve the vault section relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = self
            .vault
            .root
            .as_deref()
            .map_or_else(|| config_dir.to_path_buf(), |r| config_dir.join(r));

        self.vault_resolved = VaultConfig {
            root,
            attachments_folder: self
                .vault
                .attachments_folder
                .clone()
                .unwrap_or_else(|| DEFAULT_ATTACHMENTS_FOLDER.to_owned()),
            icon_prefix: self
                .vault
                .icon_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_ICON_PREFIX.to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/vault"));
        assert!(config.confluence.is_none());
        assert_eq!(config.vault_resolved.root, PathBuf::from("/vault"));
        assert_eq!(
            config.vault_resolved.attachments_dir(),
            PathBuf::from("/vault/attachments")
        );
        assert_eq!(config.vault_resolved.icon_prefix, "attachments/icons/");
        assert!(!config.publish.record_url);
        assert_eq!(config.publish.url_property, "confluence_url");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.is_none());
        assert!(config.diagrams.kroki_url.is_none());
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://example.atlassian.net/wiki"
space_key = "ENG"
username = "me@example.com"
api_token = "token123"
root_page_id = "98765"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://example.atlassian.net/wiki");
        assert_eq!(confluence.space_key, "ENG");
        assert_eq!(confluence.root_page_id.as_deref(), Some("98765"));
        assert_eq!(
            confluence.credentials().unwrap(),
            Credentials::Basic {
                username: "me@example.com".to_owned(),
                api_token: "token123".to_owned(),
            }
        );
    }

    #[test]
    fn test_personal_token_wins() {
        let config = ConfluenceConfig {
            personal_token: Some("pat".to_owned()),
            ..valid_confluence_config()
        };
        assert_eq!(
            config.credentials().unwrap(),
            Credentials::Bearer("pat".to_owned())
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[vault]
root = "notes"
attachments_folder = "_assets"
icon_prefix = "_assets/icons/"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.vault_resolved.root, PathBuf::from("/project/notes"));
        assert_eq!(
            config.vault_resolved.attachments_dir(),
            PathBuf::from("/project/notes/_assets")
        );
        assert_eq!(config.vault_resolved.icon_prefix, "_assets/icons/");
    }

    #[test]
    fn test_resolve_paths_defaults_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.vault_resolved.root, PathBuf::from("/project"));
        assert_eq!(config.vault_resolved.attachments_folder, "attachments");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[diagrams]
kroki_url = "https://kroki.io"

[publish]
record_url = true
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.vault_resolved.root, dir.path());
        assert_eq!(config.diagrams.kroki_url.as_deref(), Some("https://kroki.io"));
        assert!(config.publish.record_url);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/vaultpub.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.confluence = Some(valid_confluence_config());

        let overrides = CliSettings {
            vault_root: Some(PathBuf::from("/other")),
            kroki_url: Some("https://kroki.example.com".to_owned()),
            space_key: Some("DOCS".to_owned()),
            record_url: Some(true),
        };
        config.apply_cli_settings(&overrides);

        assert_eq!(config.vault_resolved.root, PathBuf::from("/other"));
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("https://kroki.example.com")
        );
        assert_eq!(config.confluence.unwrap().space_key, "DOCS");
        assert!(config.publish.record_url);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.vault_resolved.root, PathBuf::from("/vault"));
        assert!(config.diagrams.kroki_url.is_none());
        assert!(!config.publish.record_url);
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("VAULTPUB_TEST_URL", "https://wiki.test.com");
            std::env::set_var("VAULTPUB_TEST_TOKEN", "my-token");
        }

        let toml = r#"
[confluence]
base_url = "${VAULTPUB_TEST_URL}"
space_key = "${VAULTPUB_TEST_SPACE:-ENG}"
username = "me@example.com"
api_token = "${VAULTPUB_TEST_TOKEN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://wiki.test.com");
        assert_eq!(confluence.space_key, "ENG");
        assert_eq!(confluence.api_token.as_deref(), Some("my-token"));

        unsafe {
            std::env::remove_var("VAULTPUB_TEST_URL");
            std::env::remove_var("VAULTPUB_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VAULTPUB_MISSING_VAR");
        }

        let toml = r#"
[confluence]
base_url = "${VAULTPUB_MISSING_VAR}"
space_key = "ENG"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("VAULTPUB_MISSING_VAR"));
        assert!(err.to_string().contains("confluence.base_url"));
    }

    // Validation tests

    fn assert_validation_error(result: Result<(), ConfigError>, expected_substrings: &[&str]) {
        let err = result.expect_err("Expected validation to fail");
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://example.atlassian.net/wiki".to_owned(),
            space_key: "ENG".to_owned(),
            username: Some("me@example.com".to_owned()),
            api_token: Some("token".to_owned()),
            personal_token: None,
            root_page_id: None,
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/vault"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_kroki_url_invalid_scheme() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.diagrams.kroki_url = Some("ftp://kroki.io".to_owned());
        assert_validation_error(config.validate(), &["kroki_url", "http"]);
    }

    #[test]
    fn test_validate_empty_attachments_folder() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.vault_resolved.attachments_folder = String::new();
        assert_validation_error(config.validate(), &["attachments_folder", "empty"]);
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_space() {
        let config = ConfluenceConfig {
            space_key: String::new(),
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["space_key", "empty"]);
    }

    #[test]
    fn test_confluence_config_validate_invalid_url() {
        let config = ConfluenceConfig {
            base_url: "wiki.example.com".to_owned(),
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["base_url", "http"]);
    }

    #[test]
    fn test_confluence_config_validate_missing_credentials() {
        let config = ConfluenceConfig {
            api_token: None,
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["credentials"]);
    }

    #[test]
    fn test_require_confluence_missing_section() {
        let config = Config::default_with_base(Path::new("/vault"));
        let err = config.require_confluence().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_require_confluence_returns_validated() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.confluence = Some(valid_confluence_config());
        assert_eq!(config.require_confluence().unwrap().space_key, "ENG");
    }
}
