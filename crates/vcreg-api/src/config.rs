//! # Server Configuration
//!
//! [`AppConfig`] is assembled from an optional YAML file (path taken from
//! `VCREG_CONFIG`) and then overridden by environment variables:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `PORT` | `port` (default 8080) |
//! | `VCREG_OWNER` | `owner` (required from file or env) |
//! | `VCREG_START_HEIGHT` | `start_height` (default 0) |
//!
//! ```yaml
//! port: 8080
//! owner: registry-admin
//! start_height: 0
//! tokens:
//!   - token: "s3cret-admin"
//!     principal: registry-admin
//!   - token: "s3cret-alice"
//!     principal: alice
//! ```
//!
//! Bearer tokens never appear in `Debug` output.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use vcreg_core::{BlockHeight, Principal, ValidationError};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors loading server configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`AppConfig`].
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// No owner was given in the file or `VCREG_OWNER`.
    #[error("registry owner is required (set `owner` in the config file or VCREG_OWNER)")]
    MissingOwner,

    /// An owner or token principal failed validation.
    #[error("invalid principal in config: {0}")]
    InvalidPrincipal(#[from] ValidationError),

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// A token entry is empty or shared by two principals.
    #[error("invalid token table: {0}")]
    InvalidToken(String),
}

/// One bearer token and the principal it authenticates as.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub principal: Principal,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("token", &"[REDACTED]")
            .field("principal", &self.principal)
            .finish()
    }
}

/// On-disk shape; every field optional so env can fill the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    owner: Option<Principal>,
    start_height: Option<u64>,
    #[serde(default)]
    tokens: Vec<TokenGrant>,
}

/// Resolved server configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Fixed registry owner.
    pub owner: Principal,
    /// Initial height of the chain clock.
    pub start_height: BlockHeight,
    /// Bearer token table.
    pub tokens: Vec<TokenGrant>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("owner", &self.owner)
            .field("start_height", &self.start_height)
            .field("tokens", &format_args!("[{} REDACTED]", self.tokens.len()))
            .finish()
    }
}

impl AppConfig {
    /// Configuration with defaults and an empty token table.
    pub fn new(owner: Principal) -> Self {
        Self {
            port: DEFAULT_PORT,
            owner,
            start_height: BlockHeight::GENESIS,
            tokens: Vec::new(),
        }
    }

    /// Add a token grant.
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.push(TokenGrant {
            token: token.into(),
            principal,
        });
        self
    }

    /// Load from `VCREG_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("VCREG_CONFIG") {
            Ok(path) => read_file(Path::new(&path))?,
            Err(_) => FileConfig::default(),
        };
        resolve(file, |var| std::env::var(var).ok())
    }

    /// Parse a YAML document, then apply overrides from `env`.
    pub fn from_yaml_str(
        yaml: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = if yaml.trim().is_empty() {
            FileConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        resolve(file, env)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

fn resolve(
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let port = match env("PORT") {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value })?,
        None => file.port.unwrap_or(DEFAULT_PORT),
    };

    let owner = match env("VCREG_OWNER") {
        Some(value) => Principal::new(value)?,
        None => file.owner.ok_or(ConfigError::MissingOwner)?,
    };

    let start_height = match env("VCREG_START_HEIGHT") {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
            var: "VCREG_START_HEIGHT",
            value,
        })?,
        None => file.start_height.unwrap_or(0),
    };

    validate_tokens(&file.tokens)?;

    Ok(AppConfig {
        port,
        owner,
        start_height: BlockHeight(start_height),
        tokens: file.tokens,
    })
}

fn validate_tokens(tokens: &[TokenGrant]) -> Result<(), ConfigError> {
    for (i, grant) in tokens.iter().enumerate() {
        if grant.token.is_empty() {
            return Err(ConfigError::InvalidToken(format!(
                "entry {i} for {} has an empty token",
                grant.principal
            )));
        }
        if tokens[..i].iter().any(|other| other.token == grant.token) {
            return Err(ConfigError::InvalidToken(format!(
                "entry {i} for {} reuses an earlier token",
                grant.principal
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const YAML: &str = r#"
port: 9090
owner: admin
start_height: 7
tokens:
  - token: t-admin
    principal: admin
  - token: t-alice
    principal: alice
"#;

    #[test]
    fn parses_full_file() {
        let cfg = AppConfig::from_yaml_str(YAML, env(&[])).unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.owner.as_str(), "admin");
        assert_eq!(cfg.start_height, BlockHeight(7));
        assert_eq!(cfg.tokens.len(), 2);
        assert_eq!(cfg.tokens[1].principal.as_str(), "alice");
    }

    #[test]
    fn env_overrides_file() {
        let cfg = AppConfig::from_yaml_str(
            YAML,
            env(&[("PORT", "3000"), ("VCREG_OWNER", "root"), ("VCREG_START_HEIGHT", "100")]),
        )
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.owner.as_str(), "root");
        assert_eq!(cfg.start_height, BlockHeight(100));
    }

    #[test]
    fn empty_file_needs_owner_from_env() {
        assert!(matches!(
            AppConfig::from_yaml_str("", env(&[])),
            Err(ConfigError::MissingOwner)
        ));
        let cfg = AppConfig::from_yaml_str("", env(&[("VCREG_OWNER", "admin")])).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.tokens.is_empty());
    }

    #[test]
    fn bad_port_rejected() {
        let err = AppConfig::from_yaml_str(YAML, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn invalid_owner_rejected() {
        let err = AppConfig::from_yaml_str("", env(&[("VCREG_OWNER", "has space")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrincipal(_)));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            AppConfig::from_yaml_str("owner: a\nbogus: 1\n", env(&[])),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn duplicate_or_empty_tokens_rejected() {
        let dup = "owner: a\ntokens:\n  - {token: x, principal: a}\n  - {token: x, principal: b}\n";
        assert!(matches!(
            AppConfig::from_yaml_str(dup, env(&[])),
            Err(ConfigError::InvalidToken(_))
        ));
        let empty = "owner: a\ntokens:\n  - {token: '', principal: a}\n";
        assert!(matches!(
            AppConfig::from_yaml_str(empty, env(&[])),
            Err(ConfigError::InvalidToken(_))
        ));
    }

    #[test]
    fn read_file_reports_path() {
        let err = read_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vcreg.yaml");
        std::fs::write(&path, YAML).unwrap();
        let cfg = resolve(read_file(&path).unwrap(), env(&[])).unwrap();
        assert_eq!(cfg.port, 9090);
    }

    #[test]
    fn debug_redacts_tokens() {
        let cfg = AppConfig::from_yaml_str(YAML, env(&[])).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("t-admin"));
        assert!(!debug.contains("t-alice"));
        assert!(debug.contains("REDACTED"));
        assert!(!format!("{:?}", cfg.tokens[0]).contains("t-admin"));
    }
}
