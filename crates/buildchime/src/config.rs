use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_NAME: &str = "buildchime.toml";

/// Environment fallback for the login password, so it can stay out of the
/// config file in CI.
const ENV_PASSWORD: &str = "BUILDCHIME_PASSWORD";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub profiles: HashMap<String, Profile>,
}

/// One notification target. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Base URL of the chat server, or a full incoming-webhook URL when no
    /// credentials are configured.
    pub url: String,
    pub channel: Option<String>,
    /// Presence of a username switches on the login call before posting.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Pre-issued REST credentials, used instead of login when no username
    /// is set.
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    pub icon_url: Option<String>,
    pub icon_emoji: Option<String>,
    pub image_url: Option<String>,
    /// Handlebars template overriding the default message text.
    pub template: Option<String>,
}

impl Config {
    /// Load configuration from an explicit path, or search upward from current dir.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let path = match path_override {
            Some(p) => p,
            None => find_upwards(DEFAULT_CONFIG_NAME)
                .context("Failed to locate buildchime.toml in current or parent directories")?,
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Parsing TOML config {}", path.display()))?;

        for profile in cfg.profiles.values_mut() {
            if profile.password.is_none() {
                profile.password = std::env::var(ENV_PASSWORD).ok();
            }
        }
        Ok(cfg)
    }

    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .with_context(|| format!("Profile '{}' not found in config", name))
    }
}

fn find_upwards(file_name: &str) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_config_success() {
        let toml = r##"[profiles.prod]
url = "https://chat.example.com"
channel = "#builds"
icon_emoji = ":rocket:"
"##;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let cfg = Config::load(Some(file.path().to_path_buf())).unwrap();
        let profile = cfg.profile("prod").unwrap();
        assert_eq!(profile.url, "https://chat.example.com");
        assert_eq!(profile.channel.as_deref(), Some("#builds"));
        assert_eq!(profile.icon_emoji.as_deref(), Some(":rocket:"));
        assert!(profile.username.is_none());
    }

    #[test]
    fn missing_profile_errors() {
        let toml = r#"[profiles.dev]
url = "https://chat.example.com"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        let cfg = Config::load(Some(file.path().to_path_buf())).unwrap();
        let result = cfg.profile("does_not_exist");
        assert!(result.is_err());
    }

    #[test]
    fn profile_with_credentials() {
        let toml = r#"[profiles.prod]
url = "https://chat.example.com"
username = "ci-bot"
password = "hunter2"
template = "{{build.status}}"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        let cfg = Config::load(Some(file.path().to_path_buf())).unwrap();
        let profile = cfg.profile("prod").unwrap();
        assert_eq!(profile.username.as_deref(), Some("ci-bot"));
        assert_eq!(profile.password.as_deref(), Some("hunter2"));
        assert_eq!(profile.template.as_deref(), Some("{{build.status}}"));
    }
}
