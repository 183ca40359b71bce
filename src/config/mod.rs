#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toml_config::ProfileConfig;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};

pub const BASE_URL_ENV: &str = "TAX_FILER_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_STATE_DIR: &str = ".tax-filer";

/// Effective client settings after merging defaults, profile and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub state_dir: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            state_dir: DEFAULT_STATE_DIR.to_string(),
        }
    }
}

impl ClientSettings {
    /// Defaults, with the base URL taken from `TAX_FILER_API_BASE_URL` when set.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self::default().with_overrides(base_url.as_deref(), None, None)
    }

    pub fn with_profile(self, profile: &ProfileConfig) -> Self {
        self.with_overrides(
            profile.api.base_url.as_deref(),
            profile.api.timeout_seconds,
            profile.storage.state_dir.as_deref(),
        )
    }

    pub fn with_overrides(
        mut self,
        base_url: Option<&str>,
        timeout_seconds: Option<u64>,
        state_dir: Option<&str>,
    ) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url.to_string();
        }
        if let Some(timeout_seconds) = timeout_seconds {
            self.timeout_seconds = timeout_seconds;
        }
        if let Some(state_dir) = state_dir {
            self.state_dir = state_dir.to_string();
        }
        self
    }

    /// 合併順序：命令列/環境變數 > TOML profile > 預設值
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(path) = &cli.config {
            let profile = ProfileConfig::from_file(path)?;
            profile.validate()?;
            tracing::debug!("Loaded profile from {}", path.display());
            settings = settings.with_profile(&profile);
        }
        Ok(settings.with_overrides(
            cli.base_url.as_deref(),
            cli.timeout_seconds,
            cli.state_dir.as_deref(),
        ))
    }
}

impl ConfigProvider for ClientSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn state_dir(&self) -> &str {
        &self.state_dir
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validation::validate_path("state_dir", &self.state_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::{ApiSection, StorageSection};

    #[test]
    fn test_defaults_are_valid() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, "http://localhost:8000/api/v1");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overrides_take_precedence_over_profile() {
        let profile = ProfileConfig {
            api: ApiSection {
                base_url: Some("https://profile.example.com/api/v1".to_string()),
                timeout_seconds: Some(10),
            },
            storage: StorageSection {
                state_dir: Some("/var/lib/tax-filer".to_string()),
            },
        };

        let settings = ClientSettings::default()
            .with_profile(&profile)
            .with_overrides(Some("https://flag.example.com"), None, None);

        assert_eq!(settings.base_url, "https://flag.example.com");
        assert_eq!(settings.timeout_seconds, 10);
        assert_eq!(settings.state_dir, "/var/lib/tax-filer");
    }

    #[test]
    fn test_from_env_reads_base_url_and_ignores_blank() {
        std::env::set_var(BASE_URL_ENV, "https://env.example.com/api/v1");
        assert_eq!(ClientSettings::from_env().base_url, "https://env.example.com/api/v1");

        std::env::set_var(BASE_URL_ENV, "   ");
        assert_eq!(ClientSettings::from_env().base_url, DEFAULT_BASE_URL);

        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(ClientSettings::from_env(), ClientSettings::default());
    }

    #[test]
    fn test_invalid_settings_fail_validation() {
        let settings = ClientSettings::default().with_overrides(Some("localhost:8000"), Some(0), None);
        assert!(settings.validate().is_err());
    }
}
