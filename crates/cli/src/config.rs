// Path: crates/cli/src/config.rs

//! Environment-config loading.
//!
//! The file is JSON, located by `--config`, the `PLINTH_CONFIG_PATH`
//! environment variable, or the default path, in that order. The environment
//! to run is selected by `--env` or `PLINTH_TEST_ENV`; a file declaring
//! exactly one environment needs no selector. Schema validation beyond
//! structural checks is the upstream config tooling's concern — the core
//! trusts resolved values.

use anyhow::{anyhow, Context, Result};
use plinth_types::{EnvironmentConfig, EnvironmentsFile};
use std::path::{Path, PathBuf};

/// Environment variable locating the configuration file.
pub const CONFIG_PATH_ENV: &str = "PLINTH_CONFIG_PATH";

/// Environment variable selecting the environment to run.
pub const TEST_ENV_ENV: &str = "PLINTH_TEST_ENV";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "plinth.config.json";

/// Resolves the configuration file path: CLI flag, then environment
/// variable, then the default.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Resolves the environment selector: CLI flag, then environment variable.
pub fn resolve_env_name(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(TEST_ENV_ENV).ok())
}

/// Loads and parses the environments file.
pub fn load_environments(path: &Path) -> Result<EnvironmentsFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("config file {} is malformed", path.display()))
}

/// Picks the environment to run. With no selector, a file declaring exactly
/// one environment is unambiguous.
pub fn select_environment(
    file: &EnvironmentsFile,
    name: Option<&str>,
) -> Result<EnvironmentConfig> {
    match name {
        Some(name) => file.environment(name).cloned().ok_or_else(|| {
            anyhow!(
                "no environment named '{name}' (available: {})",
                file.environments
                    .iter()
                    .map(|e| e.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }),
        None => match file.environments.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(anyhow!("config file declares no environments")),
            _ => Err(anyhow!(
                "multiple environments declared; select one with --env or {TEST_ENV_ENV}"
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> EnvironmentsFile {
        serde_json::from_value(serde_json::json!({
            "environments": [
                {
                    "name": "dev_local",
                    "foundation": {
                        "type": "dev",
                        "binPath": "/bins/node-template",
                        "name": "alice"
                    },
                    "providers": [
                        { "name": "para", "type": "substrateWs", "endpoints": ["ws://127.0.0.1:9944"] }
                    ]
                },
                {
                    "name": "live",
                    "foundation": {
                        "type": "readOnly",
                        "name": "live",
                        "connections": [
                            { "name": "remote", "type": "subxt", "endpoints": ["from-env"] }
                        ]
                    }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn selects_by_name() {
        let file = sample_file();
        let env = select_environment(&file, Some("live")).unwrap();
        assert_eq!(env.name, "live");
        assert!(select_environment(&file, Some("missing")).is_err());
    }

    #[test]
    fn ambiguous_selection_requires_a_name() {
        let file = sample_file();
        let err = select_environment(&file, None).unwrap_err();
        assert!(err.to_string().contains("multiple environments"));
    }

    #[test]
    fn single_environment_needs_no_selector() {
        let mut file = sample_file();
        file.environments.truncate(1);
        let env = select_environment(&file, None).unwrap();
        assert_eq!(env.name, "dev_local");
    }

    #[test]
    fn load_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plinth.config.json");
        let err = load_environments(&path).unwrap_err();
        assert!(err.to_string().contains("plinth.config.json"));

        std::fs::write(&path, b"{ nope").unwrap();
        let err = load_environments(&path).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
