use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILENAME;
use crate::error::{MigrateError, Result};
use crate::rules::RuleSpec;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[kvmigrate]` section.
    pub kvmigrate: KvMigrateConfig,
    /// The path to the configuration file this was loaded from.
    /// `None` if using defaults.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
/// Options under `[kvmigrate]`. Every key is optional.
pub struct KvMigrateConfig {
    /// File to migrate, relative to the configuration file.
    pub target: Option<PathBuf>,
    /// Receiver whose calls are rewritten.
    pub receiver: Option<String>,
    /// Receiver the calls are routed through instead.
    pub wrapper: Option<String>,
    /// Text required before the receiver.
    pub prefix: Option<String>,
    /// Methods to rewrite, in report order.
    pub methods: Option<Vec<String>>,
}

impl Config {
    /// Loads configuration from the current directory or one of its parents.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// Unreadable or malformed files are skipped; defaults are used if none is found.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }
        if let Ok(absolute) = current.canonicalize() {
            current = absolute;
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                if let Ok(config) = Self::load_file(&candidate) {
                    return config;
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }

    /// Loads one explicit configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Config`] if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MigrateError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = toml::from_str::<Config>(&content).map_err(|e| MigrateError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.config_file_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Rule inputs with every missing key filled from the defaults.
    #[must_use]
    pub fn rule_spec(&self) -> RuleSpec {
        let defaults = RuleSpec::default();
        let section = &self.kvmigrate;
        RuleSpec {
            prefix: section.prefix.clone().unwrap_or(defaults.prefix),
            receiver: section.receiver.clone().unwrap_or(defaults.receiver),
            wrapper: section.wrapper.clone().unwrap_or(defaults.wrapper),
            methods: section.methods.clone().unwrap_or(defaults.methods),
        }
    }

    /// Configured target, resolved against the configuration file's directory.
    #[must_use]
    pub fn target(&self) -> Option<PathBuf> {
        let target = self.kvmigrate.target.as_ref()?;
        let base = self
            .config_file_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|_| target.is_relative());
        Some(match base {
            Some(dir) => dir.join(target),
            None => target.clone(),
        })
    }
}
