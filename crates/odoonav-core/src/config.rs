use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub oracle: OracleConfig,
    pub navigation: NavigationConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub scheme: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8069,
            db: "odoo".to_string(),
            user: "admin".to_string(),
            scheme: "http".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    #[default]
    None,
    Groq,
    OpenAi,
    Ollama,
}

impl OracleProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    pub provider: OracleProvider,
    pub model: String,
    pub endpoint: Option<String>,
    pub api_key_env: String,
    pub temperature: f64,
    pub min_confidence: f64,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::None,
            model: "llama3-8b-8192".to_string(),
            endpoint: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.1,
            min_confidence: 0.3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    pub menu_search_limit: usize,
    pub default_company_id: i64,
    pub default_dashboard_id: i64,
    pub max_input_chars: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            menu_search_limit: 5,
            default_company_id: 1,
            default_dashboard_id: 2,
            max_input_chars: 500,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        if self.server.db.trim().is_empty() {
            return Err(ConfigError::invalid("server.db", "must not be empty"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }
        if !matches!(self.server.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::invalid(
                "server.scheme",
                format!("unsupported scheme {:?}", self.server.scheme),
            ));
        }
        if self.navigation.menu_search_limit == 0 {
            return Err(ConfigError::invalid(
                "navigation.menu_search_limit",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.oracle.min_confidence) {
            return Err(ConfigError::invalid(
                "oracle.min_confidence",
                format!("{} is outside [0, 1]", self.oracle.min_confidence),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorSettings {
    pub base_url: String,
    pub company_id: i64,
    pub menu_search_limit: usize,
    pub default_dashboard_id: i64,
    pub max_input_chars: usize,
    pub min_confidence: f64,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        let navigation = NavigationConfig::default();
        Self {
            base_url: ServerConfig::default().base_url(),
            company_id: navigation.default_company_id,
            menu_search_limit: navigation.menu_search_limit,
            default_dashboard_id: navigation.default_dashboard_id,
            max_input_chars: navigation.max_input_chars,
            min_confidence: OracleConfig::default().min_confidence,
        }
    }
}

impl NavigatorSettings {
    pub fn from_config(
        config: &Config,
        base_url: &str,
        company_id: i64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            company_id,
            menu_search_limit: config.navigation.menu_search_limit,
            default_dashboard_id: config.navigation.default_dashboard_id,
            max_input_chars: config.navigation.max_input_chars,
            min_confidence: config.oracle.min_confidence,
        })
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let bad = |reason: &str| ConfigError::BaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(raw.trim()).map_err(|err| bad(&err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(bad("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(bad("missing host"));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
