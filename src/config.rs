use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only application configuration: the jurisdiction name directory and
/// HTTP fetch settings. Loaded once and injected where needed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_jurisdictions")]
    pub jurisdictions: BTreeMap<String, String>,
    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jurisdictions: default_jurisdictions(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (code, name) in &self.jurisdictions {
            if code.trim().is_empty() {
                bail!("jurisdiction code must not be empty");
            }
            if name.trim().is_empty() {
                bail!("display name for jurisdiction {code} must not be empty");
            }
        }
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Display name for a jurisdiction code, if the directory knows it.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.jurisdictions
            .get(&code.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_jurisdictions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("us".to_string(), "United States (Federal)".to_string()),
        ("ma".to_string(), "Massachusetts".to_string()),
        ("tx".to_string(), "Texas".to_string()),
    ])
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("prosroster/{}", env!("CARGO_PKG_VERSION"))
}
