use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "RopeWikiBot/0.1 (github.com/RopeWiki/bot)";
pub const DEFAULT_MIN_MANUAL_CHANGES: usize = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("http") {
            return Ok(Self::Http);
        }
        if value.eq_ignore_ascii_case("https") {
            return Ok(Self::Https);
        }
        bail!("unsupported scheme: {value} (expected http|https)")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct BotFileConfig {
    #[serde(default)]
    pub bot: BotSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct BotSection {
    pub site: Option<String>,
    pub scheme: Option<String>,
    pub user_agent: Option<String>,
    pub min_manual_changes: Option<usize>,
}

/// Load and parse a BotFileConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_file_config(config_path: &Path) -> Result<BotFileConfig> {
    if !config_path.exists() {
        return Ok(BotFileConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: BotFileConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

/// Command-line values that take precedence over env vars and the config file.
#[derive(Debug, Clone, Default)]
pub struct BotOverrides {
    pub site: Option<String>,
    pub scheme: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fully resolved runtime configuration, minus credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub site: String,
    pub scheme: Scheme,
    pub user_agent: String,
    pub min_manual_changes: usize,
    pub timeout_ms: u64,
}

impl BotConfig {
    /// MediaWiki action API endpoint for the configured site (script path `/`).
    pub fn api_url(&self) -> String {
        format!("{}://{}/api.php", self.scheme.as_str(), self.site)
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolve configuration: flag > env > config file > default.
pub fn resolve_config(overrides: &BotOverrides, file: &BotFileConfig) -> Result<BotConfig> {
    resolve_config_with_lookup(overrides, file, |key| env::var(key).ok())
}

pub fn resolve_config_with_lookup<F>(
    overrides: &BotOverrides,
    file: &BotFileConfig,
    lookup: F,
) -> Result<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let site = first_nonempty(&[
        overrides.site.clone(),
        lookup("RWBOT_SITE"),
        file.bot.site.clone(),
    ]);
    let site = match site {
        Some(site) => site,
        None => bail!("Missing site argument or RWBOT_SITE environment variable"),
    };

    let scheme = match first_nonempty(&[
        overrides.scheme.clone(),
        lookup("RWBOT_SCHEME"),
        file.bot.scheme.clone(),
    ]) {
        Some(value) => Scheme::parse(&value)?,
        None => Scheme::default(),
    };

    let user_agent = first_nonempty(&[lookup("RWBOT_USER_AGENT"), file.bot.user_agent.clone()])
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let min_manual_changes = match first_nonempty(&[lookup("RWBOT_MIN_MANUAL_CHANGES")]) {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid RWBOT_MIN_MANUAL_CHANGES: {value}"))?,
        None => file
            .bot
            .min_manual_changes
            .unwrap_or(DEFAULT_MIN_MANUAL_CHANGES),
    };

    let timeout_ms = match first_nonempty(&[lookup("RWBOT_HTTP_TIMEOUT_MS")]) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid RWBOT_HTTP_TIMEOUT_MS: {value}"))?,
        None => DEFAULT_TIMEOUT_MS,
    };

    Ok(BotConfig {
        site,
        scheme,
        user_agent,
        min_manual_changes,
        timeout_ms,
    })
}

/// Resolve bot credentials: flag > env. Only called once there is at least
/// one proposed modification to commit.
pub fn resolve_credentials(overrides: &BotOverrides) -> Result<Credentials> {
    resolve_credentials_with_lookup(overrides, |key| env::var(key).ok())
}

pub fn resolve_credentials_with_lookup<F>(overrides: &BotOverrides, lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let username = first_nonempty(&[overrides.username.clone(), lookup("RWBOT_USERNAME")]);
    let username = match username {
        Some(username) => username,
        None => bail!("Missing username argument or RWBOT_USERNAME environment variable"),
    };
    let password = first_nonempty(&[overrides.password.clone(), lookup("RWBOT_PASSWORD")]);
    let password = match password {
        Some(password) => password,
        None => bail!("Missing password argument or RWBOT_PASSWORD environment variable"),
    };
    Ok(Credentials { username, password })
}

fn first_nonempty(values: &[Option<String>]) -> Option<String> {
    for value in values.iter().flatten() {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn scheme_parse_accepts_both_schemes() {
        assert_eq!(Scheme::parse("http").expect("parse"), Scheme::Http);
        assert_eq!(Scheme::parse("HTTPS").expect("parse"), Scheme::Https);
        assert!(Scheme::parse("gopher").is_err());
    }

    #[test]
    fn api_url_joins_scheme_and_site() {
        let config = BotConfig {
            site: "ropewiki.com".to_string(),
            scheme: Scheme::Https,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_manual_changes: DEFAULT_MIN_MANUAL_CHANGES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        };
        assert_eq!(config.api_url(), "https://ropewiki.com/api.php");
    }

    #[test]
    fn load_file_config_returns_default_for_missing_file() {
        let config = load_file_config(Path::new("/nonexistent/rwbot.toml")).expect("load config");
        assert!(config.bot.site.is_none());
    }

    #[test]
    fn load_file_config_parses_bot_section() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rwbot.toml");
        fs::write(
            &config_path,
            r#"
[bot]
site = "ropewiki.com"
scheme = "http"
user_agent = "test-bot/1.0"
min_manual_changes = 5
"#,
        )
        .expect("write config");

        let config = load_file_config(&config_path).expect("load config");
        assert_eq!(config.bot.site.as_deref(), Some("ropewiki.com"));
        assert_eq!(config.bot.scheme.as_deref(), Some("http"));
        assert_eq!(config.bot.user_agent.as_deref(), Some("test-bot/1.0"));
        assert_eq!(config.bot.min_manual_changes, Some(5));
    }

    #[test]
    fn load_file_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rwbot.toml");
        fs::write(&config_path, "[bot\nsite = \"oops\"").expect("write config");
        let error = load_file_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn resolve_config_prefers_flags_over_file() {
        let overrides = BotOverrides {
            site: Some("beta.ropewiki.com".to_string()),
            scheme: Some("http".to_string()),
            ..BotOverrides::default()
        };
        let file = BotFileConfig {
            bot: BotSection {
                site: Some("ropewiki.com".to_string()),
                scheme: Some("https".to_string()),
                ..BotSection::default()
            },
        };
        let config = resolve_config_with_lookup(&overrides, &file, no_env).expect("resolve");
        assert_eq!(config.site, "beta.ropewiki.com");
        assert_eq!(config.scheme, Scheme::Http);
    }

    #[test]
    fn resolve_config_prefers_env_over_file() {
        let file = BotFileConfig {
            bot: BotSection {
                site: Some("ropewiki.com".to_string()),
                ..BotSection::default()
            },
        };
        let config = resolve_config_with_lookup(&BotOverrides::default(), &file, |key| {
            (key == "RWBOT_SITE").then(|| "env.ropewiki.com".to_string())
        })
        .expect("resolve");
        assert_eq!(config.site, "env.ropewiki.com");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.min_manual_changes, DEFAULT_MIN_MANUAL_CHANGES);
    }

    #[test]
    fn resolve_config_requires_a_site() {
        let error = resolve_config_with_lookup(
            &BotOverrides::default(),
            &BotFileConfig::default(),
            no_env,
        )
        .expect_err("must fail");
        assert!(error.to_string().contains("RWBOT_SITE"));
    }

    #[test]
    fn resolve_credentials_requires_username_and_password() {
        let error = resolve_credentials_with_lookup(&BotOverrides::default(), no_env)
            .expect_err("must fail");
        assert!(error.to_string().contains("RWBOT_USERNAME"));

        let overrides = BotOverrides {
            username: Some("bot".to_string()),
            ..BotOverrides::default()
        };
        let error =
            resolve_credentials_with_lookup(&overrides, no_env).expect_err("must fail");
        assert!(error.to_string().contains("RWBOT_PASSWORD"));
    }

    #[test]
    fn resolve_credentials_prefers_flags_over_env() {
        let overrides = BotOverrides {
            username: Some("flag-user".to_string()),
            password: Some("flag-pass".to_string()),
            ..BotOverrides::default()
        };
        let credentials = resolve_credentials_with_lookup(&overrides, |key| match key {
            "RWBOT_USERNAME" => Some("env-user".to_string()),
            "RWBOT_PASSWORD" => Some("env-pass".to_string()),
            _ => None,
        })
        .expect("resolve");
        assert_eq!(credentials.username, "flag-user");
        assert_eq!(credentials.password, "flag-pass");
    }

    #[test]
    fn blank_values_fall_through_to_later_sources() {
        let overrides = BotOverrides {
            site: Some("  ".to_string()),
            ..BotOverrides::default()
        };
        let file = BotFileConfig {
            bot: BotSection {
                site: Some("ropewiki.com".to_string()),
                ..BotSection::default()
            },
        };
        let config = resolve_config_with_lookup(&overrides, &file, no_env).expect("resolve");
        assert_eq!(config.site, "ropewiki.com");
    }
}
