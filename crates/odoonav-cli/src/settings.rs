use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use tracing::debug;

use odoonav_core::config::Config;
use odoonav_core::config::OracleProvider;

use crate::cli::GlobalArgs;

pub const PASSWORD_ENV: &str = "ODOO_PASSWORD";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("odoonav").join("config.toml"))
}

pub fn default_journal_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("odoonav").join("journal.jsonl"))
}

/// An explicit path must exist; a missing default file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    debug!(path = %path.display(), "loading configuration");
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

pub fn apply_overrides(config: &mut Config, args: &GlobalArgs) -> Result<()> {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = &args.db {
        config.server.db = db.clone();
    }
    if let Some(user) = &args.user {
        config.server.user = user.clone();
    }
    if let Some(scheme) = &args.scheme {
        config.server.scheme = scheme.to_ascii_lowercase();
    }
    if let Some(raw) = &args.oracle {
        let Some(provider) = OracleProvider::parse(raw) else {
            bail!("unknown oracle provider {raw:?} (expected none, groq, openai or ollama)");
        };
        config.oracle.provider = provider;
    }
    if let Some(model) = &args.model {
        config.oracle.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.oracle.endpoint = Some(endpoint.clone());
    }
    if let Some(path) = &args.journal {
        config.journal.path = Some(path.clone());
    }
    if args.no_journal {
        config.journal.enabled = false;
    }
    config.validate()?;
    Ok(())
}

pub fn journal_path(config: &Config) -> Option<PathBuf> {
    if !config.journal.enabled {
        return None;
    }
    config.journal.path.clone().or_else(default_journal_path)
}

pub fn password(flag: Option<&str>, user: &str) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password.to_string());
    }
    if let Ok(password) = env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password(format!("Odoo password for {user}: "))
        .context("failed to read password")
}

pub fn api_key(flag: Option<&str>, config: &Config) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| env::var(&config.oracle.api_key_env).ok())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn write_config(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, text).expect("write");
        (dir, path)
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let (_dir, path) = write_config(
            "[server]\nhost = \"erp.example.com\"\nscheme = \"https\"\n\n[oracle]\nprovider = \"ollama\"\nmodel = \"phi3\"\n",
        );

        let config = load_config(Some(&path)).expect("config");

        assert_eq!(config.server.host, "erp.example.com");
        assert_eq!(config.server.port, 8069);
        assert_eq!(config.server.base_url(), "https://erp.example.com:8069");
        assert_eq!(config.oracle.provider, OracleProvider::Ollama);
        assert_eq!(config.oracle.model, "phi3");
        assert_eq!(config.navigation.menu_search_limit, 5);
        assert!(config.journal.enabled);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().expect("tmpdir");
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, path) = write_config("[server\nport = 8069\n");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::default();
        let args = GlobalArgs {
            host: Some("odoo.internal".to_string()),
            port: Some(8070),
            db: Some("prod".to_string()),
            scheme: Some("HTTPS".to_string()),
            oracle: Some("Groq".to_string()),
            endpoint: Some("http://proxy/v1".to_string()),
            no_journal: true,
            ..GlobalArgs::default()
        };

        apply_overrides(&mut config, &args).expect("overrides");

        assert_eq!(config.server.base_url(), "https://odoo.internal:8070");
        assert_eq!(config.server.db, "prod");
        assert_eq!(config.oracle.provider, OracleProvider::Groq);
        assert_eq!(config.oracle.endpoint.as_deref(), Some("http://proxy/v1"));
        assert_eq!(journal_path(&config), None);
    }

    #[test]
    fn unknown_oracle_is_rejected() {
        let args = GlobalArgs {
            oracle: Some("gpt".to_string()),
            ..GlobalArgs::default()
        };
        assert!(apply_overrides(&mut Config::default(), &args).is_err());
    }

    #[test]
    fn invalid_result_is_rejected() {
        let args = GlobalArgs {
            scheme: Some("ftp".to_string()),
            ..GlobalArgs::default()
        };
        assert!(apply_overrides(&mut Config::default(), &args).is_err());
    }

    #[test]
    fn explicit_journal_path_wins() {
        let mut config = Config::default();
        let args = GlobalArgs {
            journal: Some(PathBuf::from("/tmp/odoonav.jsonl")),
            ..GlobalArgs::default()
        };

        apply_overrides(&mut config, &args).expect("overrides");

        assert_eq!(journal_path(&config), Some(PathBuf::from("/tmp/odoonav.jsonl")));
    }

    #[test]
    fn password_flag_skips_the_environment_and_prompt() {
        assert_eq!(password(Some("s3cret"), "admin").expect("password"), "s3cret");
    }

    #[test]
    fn api_key_flag_wins() {
        assert_eq!(
            api_key(Some("flag-key"), &Config::default()),
            Some("flag-key".to_string())
        );
    }
}
