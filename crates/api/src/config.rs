//! Connection settings for the Coze platform.

use indexmap::IndexMap;
use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_URL_ENV: &str = "COZE_BASE_URL";
pub const TOKEN_ENV: &str = "COZE_API_TOKEN";
pub const MCP_PORT_ENV: &str = "MCP_PORT";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";
pub const DEFAULT_MCP_PORT: u16 = 8000;

/// Path of the workflow run endpoint, relative to the base URL.
pub const WORKFLOW_RUN_PATH: &str = "/v1/workflow/run";

/// Errors raised while resolving [`CozeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {MCP_PORT_ENV} value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// The `.env` file exists but could not be read or parsed. Entries above
    /// the failing line have already been applied.
    #[error("failed to load environment file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Values supplied on the command line. `None` keeps the resolved value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub mcp_port: Option<u16>,
}

/// Immutable connection settings shared by the whole process.
#[derive(Clone, PartialEq, Eq)]
pub struct CozeConfig {
    base_url: String,
    token: String,
    mcp_port: u16,
}

impl Default for CozeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            mcp_port: DEFAULT_MCP_PORT,
        }
    }
}

impl fmt::Debug for CozeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("CozeConfig")
            .field("base_url", &self.base_url)
            .field("token", &token)
            .field("mcp_port", &self.mcp_port)
            .finish()
    }
}

impl CozeConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, mcp_port: u16) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            mcp_port,
        }
    }

    /// Resolve settings from the process environment.
    ///
    /// Call [`load_env_file`] first if a `.env` file should participate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings from the process environment with command-line overrides on top.
    pub fn from_env_with_overrides(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(|key| env::var(key).ok(), overrides)
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// Missing or blank values fall back to the defaults. A port that is set
    /// but does not parse as `u16` is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, ConfigOverrides::default())
    }

    /// Resolve settings through a lookup, then apply `overrides`.
    ///
    /// An overridden port is never read from the lookup, so a bad `MCP_PORT`
    /// only fails resolution when nothing replaces it.
    pub fn resolve<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let mcp_port = match (overrides.mcp_port, non_blank(MCP_PORT_ENV)) {
            (Some(port), _) => port,
            (None, Some(value)) => value.parse::<u16>().map_err(|source| ConfigError::InvalidPort { value, source })?,
            (None, None) => defaults.mcp_port,
        };

        let resolved = Self {
            base_url: non_blank(BASE_URL_ENV).unwrap_or(defaults.base_url),
            token: non_blank(TOKEN_ENV).unwrap_or(defaults.token),
            mcp_port,
        };
        Ok(resolved.with_overrides(overrides))
    }

    /// Apply command-line overrides on top of the resolved settings.
    pub fn with_overrides(self, overrides: ConfigOverrides) -> Self {
        Self {
            base_url: overrides.base_url.unwrap_or(self.base_url),
            token: overrides.token.unwrap_or(self.token),
            mcp_port: overrides.mcp_port.unwrap_or(self.mcp_port),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn mcp_port(&self) -> u16 {
        self.mcp_port
    }

    /// Fully-qualified workflow run endpoint.
    ///
    /// A base URL without a scheme is treated as plain `http`. The result is
    /// not validated; a malformed base surfaces as a request error later.
    pub fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.contains("://") {
            format!("{base}{WORKFLOW_RUN_PATH}")
        } else {
            format!("http://{base}{WORKFLOW_RUN_PATH}")
        }
    }

    /// Headers sent with every workflow request, in send order.
    pub fn headers(&self) -> IndexMap<&'static str, String> {
        let mut headers = IndexMap::new();
        headers.insert("Authorization", format!("Bearer {}", self.token));
        headers.insert("Content-Type", "application/json".to_string());
        headers
    }
}

/// Load the nearest `.env` file, searching from the working directory upwards.
///
/// Returns `Ok(None)` when there is no such file. Variables that are already
/// set are left untouched.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    let Ok(current_dir) = env::current_dir() else {
        return Ok(None);
    };
    match current_dir.ancestors().map(|dir| dir.join(".env")).find(|path| path.is_file()) {
        Some(path) => load_env_path(&path).map(Some),
        None => Ok(None),
    }
}

/// Load one `.env` file into the process environment.
///
/// dotenvy applies lines in order and stops at the first malformed one, so an
/// error here means the file was only partly applied.
pub fn load_env_path(path: &Path) -> Result<PathBuf, ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn api_url_keeps_existing_scheme() {
        let config = CozeConfig::new("https://api.coze.cn", "token", 8000);
        assert_eq!(config.api_url(), "https://api.coze.cn/v1/workflow/run");
    }

    #[test]
    fn api_url_prepends_http_when_scheme_missing() {
        let config = CozeConfig::new("localhost:8888", "token", 8000);
        assert_eq!(config.api_url(), "http://localhost:8888/v1/workflow/run");
    }

    #[test]
    fn api_url_does_not_double_slashes() {
        let config = CozeConfig::new("http://localhost:8888/", "token", 8000);
        assert_eq!(config.api_url(), "http://localhost:8888/v1/workflow/run");
    }

    #[test]
    fn headers_carry_bearer_token_and_json_content_type() {
        let config = CozeConfig::new(DEFAULT_BASE_URL, "pat_abc", 8000);
        let headers = config.headers();
        let pairs: Vec<(&str, &str)> = headers.iter().map(|(name, value)| (*name, value.as_str())).collect();
        assert_eq!(pairs, vec![("Authorization", "Bearer pat_abc"), ("Content-Type", "application/json")]);
    }

    #[test]
    fn lookup_falls_back_to_defaults_for_missing_and_blank_values() {
        let config = CozeConfig::from_lookup(lookup_from(&[(BASE_URL_ENV, "   ")])).unwrap();
        assert_eq!(config, CozeConfig::default());
        assert_eq!(config.mcp_port(), 8000);
        assert_eq!(config.base_url(), "http://localhost:8888");
    }

    #[test]
    fn lookup_reads_every_setting() {
        let config = CozeConfig::from_lookup(lookup_from(&[
            (BASE_URL_ENV, "https://api.coze.com"),
            (TOKEN_ENV, "pat_xyz"),
            (MCP_PORT_ENV, "9100"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "https://api.coze.com");
        assert_eq!(config.token(), "pat_xyz");
        assert_eq!(config.mcp_port(), 9100);
    }

    #[test]
    fn lookup_rejects_unparsable_port() {
        let error = CozeConfig::from_lookup(lookup_from(&[(MCP_PORT_ENV, "eighty")])).expect_err("port should not parse");
        assert!(matches!(error, ConfigError::InvalidPort { ref value, .. } if value == "eighty"));
        assert!(error.to_string().contains(MCP_PORT_ENV));
    }

    #[test]
    fn overrides_replace_only_provided_values() {
        let config = CozeConfig::new("http://a", "t1", 8000).with_overrides(ConfigOverrides {
            base_url: None,
            token: Some("t2".to_string()),
            mcp_port: Some(9000),
        });
        assert_eq!(config, CozeConfig::new("http://a", "t2", 9000));
    }

    #[test]
    fn port_override_wins_over_unparsable_env_port() {
        let overrides = ConfigOverrides {
            mcp_port: Some(9200),
            ..ConfigOverrides::default()
        };
        let config = CozeConfig::resolve(lookup_from(&[(MCP_PORT_ENV, "eighty"), (TOKEN_ENV, "pat_env")]), overrides).unwrap();
        assert_eq!(config.mcp_port(), 9200);
        assert_eq!(config.token(), "pat_env");
    }

    #[test]
    fn resolve_applies_overrides_after_lookup() {
        let overrides = ConfigOverrides {
            base_url: Some("https://api.coze.cn".to_string()),
            ..ConfigOverrides::default()
        };
        let config = CozeConfig::resolve(lookup_from(&[(BASE_URL_ENV, "http://from-env"), (MCP_PORT_ENV, "9100")]), overrides).unwrap();
        assert_eq!(config, CozeConfig::new("https://api.coze.cn", "", 9100));
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", CozeConfig::new("http://a", "pat_secret", 8000));
        assert!(!rendered.contains("pat_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn from_env_reads_process_environment() {
        temp_env::with_vars(
            [
                (BASE_URL_ENV, Some("coze.internal:9999")),
                (TOKEN_ENV, Some("pat_env")),
                (MCP_PORT_ENV, None::<&str>),
            ],
            || {
                let config = CozeConfig::from_env().unwrap();
                assert_eq!(config.api_url(), "http://coze.internal:9999/v1/workflow/run");
                assert_eq!(config.token(), "pat_env");
                assert_eq!(config.mcp_port(), DEFAULT_MCP_PORT);
            },
        );
    }

    fn write_env_file(name: &str, contents: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("coze-mcp-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn malformed_env_file_is_reported_with_its_path() {
        let path = write_env_file(
            "malformed",
            "COZE_BASE_URL=http://good\nTHIS LINE IS BROKEN\nCOZE_API_TOKEN=pat_from_file\n",
        );
        temp_env::with_vars([(BASE_URL_ENV, None::<&str>), (TOKEN_ENV, None::<&str>)], || {
            let error = load_env_path(&path).expect_err("broken line should surface");
            assert!(matches!(
                error,
                ConfigError::EnvFile { path: ref failed, source: dotenvy::Error::LineParse(..) } if failed == &path
            ));
            assert!(error.to_string().contains(&path.display().to_string()));
            assert_eq!(env::var(BASE_URL_ENV).ok().as_deref(), Some("http://good"));
            assert!(env::var(TOKEN_ENV).is_err());
        });
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn well_formed_env_file_fills_unset_variables() {
        let path = write_env_file("valid", "COZE_BASE_URL=http://from-file\nCOZE_API_TOKEN=pat_from_file\n");
        temp_env::with_vars([(BASE_URL_ENV, Some("http://from-process")), (TOKEN_ENV, None::<&str>)], || {
            assert_eq!(load_env_path(&path).unwrap(), path);
            let config = CozeConfig::from_env().unwrap();
            assert_eq!(config.base_url(), "http://from-process");
            assert_eq!(config.token(), "pat_from_file");
        });
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
