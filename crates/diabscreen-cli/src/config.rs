use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model directory used when neither the config file nor `--model-dir` names one.
pub const DEFAULT_MODEL_DIR: &str = "models/diabetes";

/// Settings for `diabscreen serve`. Every field has a default so the config
/// file is optional and may be partial.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScreenConfig {
    pub version: String,
    pub model_dir: String,
    pub bind: String,
    pub prediction_timeout_ms: u64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            version: clap::crate_version!().to_string(),
            model_dir: String::from(DEFAULT_MODEL_DIR),
            bind: String::from("127.0.0.1:8501"),
            prediction_timeout_ms: 2000,
        }
    }
}

impl ScreenConfig {
    /// Read a JSON config. Missing or unparsable fields keep their default and
    /// are reported with a warning.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let partial: serde_json::Value = serde_json::from_str(&config_json)
            .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))?;
        let mut config = ScreenConfig::default();

        macro_rules! load_or_default {
            ($field:ident) => {
                if let Some(val) = partial.get(stringify!($field)) {
                    if let Ok(parsed) = serde_json::from_value(val.clone()) {
                        config.$field = parsed;
                    } else {
                        log::warn!(
                            "Config Invalid value for '{}', using default: {:?}",
                            stringify!($field), config.$field
                        );
                    }
                } else {
                    log::warn!(
                        "Config Missing field '{}', using default: {:?}",
                        stringify!($field), config.$field
                    );
                }
            };
        }

        load_or_default!(version);
        load_or_default!(model_dir);
        load_or_default!(bind);
        load_or_default!(prediction_timeout_ms);

        Ok(config)
    }

    /// Config file (if given) with `--model-dir` / `--bind` applied on top.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => ScreenConfig::load(path)?,
            None => ScreenConfig::default(),
        };

        // Apply CLI overrides
        if let Some(model_dir) = matches.get_one::<PathBuf>("model_dir") {
            config.model_dir = model_dir.to_string_lossy().into_owned();
        }
        if let Some(bind) = matches.get_one::<String>("bind") {
            config.bind = bind.clone();
        }

        config.bind_addr()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind))
    }

    pub fn prediction_timeout(&self) -> Duration {
        Duration::from_millis(self.prediction_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn serve_command() -> Command {
        Command::new("serve")
            .arg(Arg::new("model_dir").long("model-dir").value_parser(clap::value_parser!(PathBuf)))
            .arg(Arg::new("bind").long("bind"))
    }

    #[test]
    fn defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.model_dir, DEFAULT_MODEL_DIR);
        assert_eq!(config.bind_addr().unwrap().port(), 8501);
        assert_eq!(config.prediction_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serve.json");
        fs::write(&path, r#"{"model_dir": "artifacts/v2", "prediction_timeout_ms": "soon"}"#).unwrap();

        let config = ScreenConfig::load(&path).unwrap();
        assert_eq!(config.model_dir, "artifacts/v2");
        assert_eq!(config.prediction_timeout_ms, 2000);
        assert_eq!(config.bind, "127.0.0.1:8501");
    }

    #[test]
    fn arguments_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serve.json");
        fs::write(&path, r#"{"model_dir": "from-file", "bind": "0.0.0.0:9000"}"#).unwrap();

        let matches = serve_command()
            .try_get_matches_from(["serve", "--model-dir", "from-cli"])
            .unwrap();
        let config = ScreenConfig::from_arguments(Some(&path), &matches).unwrap();
        assert_eq!(config.model_dir, "from-cli");
        assert_eq!(config.bind, "0.0.0.0:9000");
    }

    #[test]
    fn rejects_bad_bind_address() {
        let matches = serve_command()
            .try_get_matches_from(["serve", "--bind", "localhost"])
            .unwrap();
        assert!(ScreenConfig::from_arguments(None, &matches).is_err());
    }
}
