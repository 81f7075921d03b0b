//! Configuration loading for the portal client.
//!
//! Values come from three layers, highest priority first: CLI flags,
//! environment variables, and `$XDG_CONFIG_HOME/portal-alerts/config.toml`.
//! The config file is a flat list of `key = value` lines.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use url::Url;

use crate::alerts::DEFAULT_SUPERVISION_URL;
use crate::auth::Credentials;
use crate::http::{CONNECT_TIMEOUT_SECS, ClientSettings, DEFAULT_MAX_REDIRECTS, READ_TIMEOUT_SECS};

/// Environment variable holding the login username.
pub const USERNAME_ENV: &str = "PORTAL_ALERTS_USERNAME";
/// Environment variable holding the login password.
pub const PASSWORD_ENV: &str = "PORTAL_ALERTS_PASSWORD";
/// Environment variable holding the supervision base URL.
pub const BASE_URL_ENV: &str = "PORTAL_ALERTS_BASE_URL";

const MAX_REDIRECTS_RANGE: std::ops::RangeInclusive<usize> = 1..=50;
const TIMEOUT_SECS_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// One layer of optional settings (config file or CLI flags).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Login username.
    pub username: Option<String>,
    /// Login password (never logged).
    pub password: Option<String>,
    /// Supervision service origin.
    pub base_url: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Redirect hop limit.
    pub max_redirects: Option<usize>,
}

impl fmt::Debug for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLayer")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

impl ConfigLayer {
    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        if let Some(username) = &self.username
            && username.trim().is_empty()
        {
            bail!("Invalid config value for `username`: must not be empty");
        }
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(max_redirects) = self.max_redirects
            && !MAX_REDIRECTS_RANGE.contains(&max_redirects)
        {
            bail!(
                "Invalid config value for `max_redirects`: {max_redirects}. Expected range: 1..=50"
            );
        }
        Ok(())
    }
}

fn validate_base_url(value: &str) -> Result<()> {
    let parsed = Url::parse(value)
        .with_context(|| format!("Invalid config value for `base_url`: '{value}'"))?;
    if !parsed.has_host() {
        bail!("Invalid config value for `base_url`: '{value}' has no host");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !TIMEOUT_SECS_RANGE.contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct PortalSettings {
    /// Login credentials.
    pub credentials: Credentials,
    /// Supervision service origin.
    pub base_url: String,
    /// Transport settings.
    pub client: ClientSettings,
}

/// Merges CLI flags, environment, and file config into [`PortalSettings`].
///
/// `lookup_env` is consulted for [`USERNAME_ENV`], [`PASSWORD_ENV`] and
/// [`BASE_URL_ENV`]; empty values count as unset.
///
/// # Errors
///
/// Returns an error when no username or password is available from any
/// layer, or when a merged value is invalid.
pub fn resolve_settings(
    cli: &ConfigLayer,
    file: Option<&ConfigLayer>,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Result<PortalSettings> {
    let env_value = |name: &str| lookup_env(name).filter(|value| !value.is_empty());
    let file_value = |pick: fn(&ConfigLayer) -> Option<String>| file.and_then(pick);

    let merged = ConfigLayer {
        username: cli
            .username
            .clone()
            .or_else(|| env_value(USERNAME_ENV))
            .or_else(|| file_value(|layer| layer.username.clone())),
        password: cli
            .password
            .clone()
            .or_else(|| env_value(PASSWORD_ENV))
            .or_else(|| file_value(|layer| layer.password.clone())),
        base_url: cli
            .base_url
            .clone()
            .or_else(|| env_value(BASE_URL_ENV))
            .or_else(|| file_value(|layer| layer.base_url.clone())),
        connect_timeout_secs: cli
            .connect_timeout_secs
            .or_else(|| file.and_then(|layer| layer.connect_timeout_secs)),
        read_timeout_secs: cli
            .read_timeout_secs
            .or_else(|| file.and_then(|layer| layer.read_timeout_secs)),
        max_redirects: cli
            .max_redirects
            .or_else(|| file.and_then(|layer| layer.max_redirects)),
    };
    merged.validate()?;

    let Some(username) = merged.username else {
        bail!("No username configured: pass --username, set {USERNAME_ENV}, or add `username` to the config file");
    };
    let Some(password) = merged.password else {
        bail!("No password configured: pass --password, set {PASSWORD_ENV}, or add `password` to the config file");
    };

    Ok(PortalSettings {
        credentials: Credentials::new(username, password),
        base_url: merged
            .base_url
            .unwrap_or_else(|| DEFAULT_SUPERVISION_URL.to_string()),
        client: ClientSettings {
            connect_timeout_secs: merged.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: merged.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            max_redirects: merged.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS),
        },
    })
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed config when the file exists and is valid.
    pub config: Option<ConfigLayer>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/portal-alerts/config.toml`
/// 2. `$HOME/.config/portal-alerts/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("portal-alerts")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("portal-alerts")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads and parses a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file_config(path: &Path) -> Result<ConfigLayer> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Parses config file contents.
///
/// # Errors
///
/// Returns an error for malformed lines, unknown keys, or invalid values.
pub fn parse_config_str(raw: &str) -> Result<ConfigLayer> {
    let mut cfg = ConfigLayer::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = without_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=').map(|(k, v)| (k.trim(), v.trim())) else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };
        let at = Field { key, line_number };

        match key {
            "username" => cfg.username = Some(at.parse(value, quoted_text)?),
            "password" => cfg.password = Some(at.parse(value, quoted_text)?),
            "base_url" => cfg.base_url = Some(at.parse(value, quoted_text)?),
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(at.parse(value, whole_number)?);
            }
            "read_timeout_secs" => cfg.read_timeout_secs = Some(at.parse(value, whole_number)?),
            "max_redirects" => {
                let hops = usize::try_from(at.parse(value, whole_number)?)
                    .context("max_redirects out of range for usize")?;
                cfg.max_redirects = Some(hops);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Position of a value in the config file, for error context.
struct Field<'a> {
    key: &'a str,
    line_number: usize,
}

impl Field<'_> {
    fn parse<T>(&self, value: &str, parser: fn(&str) -> Result<T>) -> Result<T> {
        parser(value).with_context(|| {
            format!("Invalid `{}` value on line {}", self.key, self.line_number)
        })
    }
}

// `#` inside a quoted value is literal.
fn without_comment(line: &str) -> &str {
    let mut quoted = false;
    let comment_start = line.char_indices().find_map(|(index, ch)| {
        if ch == '"' {
            quoted = !quoted;
        }
        (ch == '#' && !quoted).then_some(index)
    });
    comment_start.map_or(line, |index| &line[..index])
}

fn quoted_text(value: &str) -> Result<String> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .context("Expected double-quoted string")
}

fn whole_number(value: &str) -> Result<u64> {
    if value.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    value
        .parse::<u64>()
        .with_context(|| format!("Expected integer value, got '{value}'"))
}
