//! # Register Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SARI_*`)
//! 2. Config file (`register.toml`, or the path in `SARI_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## Example `register.toml`
//! ```toml
//! store_name = "Aling Nena's Store"
//! backend = "snapshot"
//! fast_moving_limit = 3
//! reset_pin = "2468"
//! ```

use directories::ProjectDirs;
use sari_core::{Money, DEFAULT_FAST_MOVING_LIMIT, FAST_MOVING_LIMIT_RANGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{RegisterError, RegisterResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE: &str = "register.toml";

/// Which commit strategy persists the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SQLite file, one transaction per checkout.
    #[default]
    Sqlite,
    /// One JSON file rewritten on every change.
    Snapshot,
}

impl FromStr for BackendKind {
    type Err = RegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            "snapshot" | "json" | "file" => Ok(BackendKind::Snapshot),
            other => Err(RegisterError::config(format!(
                "unknown backend '{}', expected sqlite or snapshot",
                other
            ))),
        }
    }
}

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Shown in the banner and on reports.
    pub store_name: String,

    pub backend: BackendKind,

    /// Where `sari.db` or `store.json` lives. `None` means the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,

    /// Symbol used when printing amounts.
    pub currency_symbol: String,

    /// Length of the fast-moving list (3 to 5).
    pub fast_moving_limit: usize,

    /// PIN required by `wipe`. Factory reset is refused while unset.
    pub reset_pin: Option<String>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        RegisterConfig {
            store_name: "Sari-Sari Store".to_string(),
            backend: BackendKind::Sqlite,
            data_dir: None,
            currency_symbol: "₱".to_string(),
            fast_moving_limit: DEFAULT_FAST_MOVING_LIMIT,
            reset_pin: None,
        }
    }
}

impl RegisterConfig {
    /// Loads defaults, then the config file, then environment overrides.
    pub fn load() -> RegisterResult<Self> {
        let path = std::env::var_os("SARI_CONFIG")
            .map(PathBuf::from)
            .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)));

        let mut config = match path {
            Some(path) if path.exists() => RegisterConfig::from_file(&path)?,
            _ => RegisterConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            store = %config.store_name,
            backend = ?config.backend,
            fast_moving_limit = config.fast_moving_limit,
            reset_enabled = config.reset_pin.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parses a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> RegisterResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegisterError::config(format!("cannot read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Reading config file");
        RegisterConfig::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> RegisterResult<Self> {
        toml::from_str(text).map_err(|e| RegisterError::config(e.to_string()))
    }

    /// Applies `SARI_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> RegisterResult<()> {
        if let Some(name) = lookup("SARI_STORE_NAME") {
            self.store_name = name;
        }
        if let Some(backend) = lookup("SARI_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("SARI_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(pin) = lookup("SARI_RESET_PIN") {
            self.reset_pin = Some(pin).filter(|p| !p.trim().is_empty());
        }
        if let Some(limit) = lookup("SARI_FAST_MOVING_LIMIT") {
            self.fast_moving_limit = limit
                .trim()
                .parse()
                .map_err(|_| RegisterError::config(format!("SARI_FAST_MOVING_LIMIT '{}' is not a number", limit)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> RegisterResult<()> {
        if !FAST_MOVING_LIMIT_RANGE.contains(&self.fast_moving_limit) {
            return Err(RegisterError::config(format!(
                "fast_moving_limit must be between {} and {}",
                FAST_MOVING_LIMIT_RANGE.start(),
                FAST_MOVING_LIMIT_RANGE.end()
            )));
        }
        Ok(())
    }

    /// The configured data directory, or the platform default.
    pub fn resolve_data_dir(&self) -> RegisterResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| RegisterError::config("could not determine a data directory; set SARI_DATA_DIR")),
        }
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = RegisterConfig::default();
    /// assert_eq!(config.format_money(Money::from_centavos(1234)), "₱12.34");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        let text = amount.to_decimal_string();
        match text.strip_prefix('-') {
            Some(abs) => format!("-{}{}", self.currency_symbol, abs),
            None => format!("{}{}", self.currency_symbol, text),
        }
    }
}

/// Platform directories.
///
/// - **Linux**: `~/.config/sari-pos`, `~/.local/share/sari-pos`
/// - **macOS**: `~/Library/Application Support/ph.sari.sari-pos`
/// - **Windows**: `%APPDATA%\sari\sari-pos`
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ph", "sari", "sari-pos")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_money() {
        let config = RegisterConfig::default();
        assert_eq!(config.format_money(Money::from_centavos(1234)), "₱12.34");
        assert_eq!(config.format_money(Money::from_centavos(5)), "₱0.05");
        assert_eq!(config.format_money(Money::from_centavos(-1234)), "-₱12.34");
    }

    #[test]
    fn test_toml_keeps_defaults_for_missing_keys() {
        let config = RegisterConfig::from_toml(
            r#"
            store_name = "Aling Nena's"
            backend = "snapshot"
            "#,
        )
        .unwrap();
        assert_eq!(config.store_name, "Aling Nena's");
        assert_eq!(config.backend, BackendKind::Snapshot);
        assert_eq!(config.fast_moving_limit, DEFAULT_FAST_MOVING_LIMIT);
        assert!(config.reset_pin.is_none());

        assert!(RegisterConfig::from_toml("backend = \"mongo\"").is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("SARI_BACKEND", "json"),
            ("SARI_DATA_DIR", "/tmp/sari"),
            ("SARI_RESET_PIN", "2468"),
            ("SARI_FAST_MOVING_LIMIT", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = RegisterConfig::from_toml("backend = \"sqlite\"").unwrap();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend, BackendKind::Snapshot);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/sari")));
        assert_eq!(config.reset_pin.as_deref(), Some("2468"));
        assert_eq!(config.fast_moving_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fast_moving_limit_bounds() {
        let mut config = RegisterConfig::default();
        config.fast_moving_limit = 6;
        assert!(config.validate().is_err());
        config.fast_moving_limit = 2;
        assert!(config.validate().is_err());

        let mut config = RegisterConfig::default();
        assert!(config
            .apply_overrides(|key| (key == "SARI_FAST_MOVING_LIMIT").then(|| "many".to_string()))
            .is_err());
    }
}
