//! Engine configuration.
//!
//! ```toml
//! [satisfiability]
//! max_paths = 10000
//! ```
//!
//! Every field is optional. Resolution order, later wins:
//! defaults, then the config file, then the `TOPDAG_MAX_PATHS` environment
//! variable (`unbounded` or `none` clears the cap).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`SatisfiabilityConfig::max_paths`].
pub const MAX_PATHS_ENV: &str = "TOPDAG_MAX_PATHS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagConfig {
    #[serde(default)]
    pub satisfiability: SatisfiabilityConfig,
}

/// Limits for satisfied-path enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfiabilityConfig {
    /// Keep at most this many paths. `None` enumerates every path; `Some(0)`
    /// keeps none. Config files and the environment reject `0`.
    #[serde(default)]
    pub max_paths: Option<usize>,
}

/// Parse a TOML document into a [`DagConfig`].
pub fn parse_config(content: &str) -> Result<DagConfig> {
    let config = toml::from_str::<DagConfig>(content).context("Failed to parse topdag config")?;
    validate(&config)?;
    Ok(config)
}

/// Load a config file, falling back to defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<DagConfig> {
    if !path.exists() {
        return Ok(DagConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// The per-user config file location, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| user_config_in(&dir))
}

fn user_config_in(config_dir: &Path) -> PathBuf {
    config_dir.join("topdag").join("config.toml")
}

/// Load the per-user config file (`<config dir>/topdag/config.toml`).
pub fn load_user_config() -> Result<DagConfig> {
    match user_config_path() {
        Some(path) => load_config(&path),
        None => Ok(DagConfig::default()),
    }
}

/// Resolve the effective config.
///
/// Reads `explicit` if given, otherwise the per-user file, then applies the
/// environment override.
pub fn resolve_config(explicit: Option<&Path>) -> Result<DagConfig> {
    resolve_config_with(explicit, env::var(MAX_PATHS_ENV).ok())
}

fn resolve_config_with(explicit: Option<&Path>, max_paths_env: Option<String>) -> Result<DagConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => load_user_config()?,
    };

    if let Some(max_paths) = resolve_max_paths(max_paths_env)? {
        config.satisfiability.max_paths = max_paths;
    }

    validate(&config)?;
    Ok(config)
}

/// Interpret the raw environment override.
///
/// `Ok(None)` means no override; `Ok(Some(None))` clears the cap.
fn resolve_max_paths(raw: Option<String>) -> Result<Option<Option<usize>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "unbounded" | "none" => Ok(Some(None)),
        value => {
            let parsed = value
                .parse::<usize>()
                .with_context(|| format!("Invalid {MAX_PATHS_ENV} value '{raw}'"))?;
            Ok(Some(Some(parsed)))
        }
    }
}

fn validate(config: &DagConfig) -> Result<()> {
    if config.satisfiability.max_paths == Some(0) {
        bail!("satisfiability.max_paths must be at least 1");
    }
    Ok(())
}
