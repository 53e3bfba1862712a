//! Configuration for personabot.
//!
//! Everything is read from environment variables, with an optional `.env`
//! file loaded first. Only credentials and the service URL are required; the
//! remaining values default to the bot's historical behavior (one poll per
//! minute, one-minute freshness window, 25 comments per analysis).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::narrative::MissingPhrasePolicy;

/// Main configuration for the bot.
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit: RedditConfig,
    pub watson: WatsonConfig,
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::resolve()
    }

    /// Build the configuration from the current process environment.
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        Ok(Self {
            reddit: RedditConfig::resolve()?,
            watson: WatsonConfig::resolve()?,
            bot: BotConfig::resolve()?,
        })
    }
}

/// Reddit script-app credentials and endpoints.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Bot account name. Also used to reject self-mentions.
    pub username: String,
    pub password: SecretString,
    pub user_agent: String,
    /// Base URL for authenticated API calls (default: https://oauth.reddit.com).
    pub api_url: String,
    /// Base URL for the token endpoint (default: https://www.reddit.com).
    pub auth_url: String,
}

impl RedditConfig {
    fn resolve() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: required_env("REDDIT_CLIENT_ID", "Create a script app at reddit.com/prefs/apps")?,
            client_secret: SecretString::from(required_env(
                "REDDIT_CLIENT_SECRET",
                "Copy the secret of the script app",
            )?),
            username: required_env("REDDIT_USERNAME", "Set the bot account's username")?,
            password: SecretString::from(required_env(
                "REDDIT_PASSWORD",
                "Set the bot account's password",
            )?),
            user_agent: optional_env("REDDIT_USER_AGENT")?
                .unwrap_or_else(|| format!("personabot/{}", env!("CARGO_PKG_VERSION"))),
            api_url: url_env("REDDIT_API_URL", "https://oauth.reddit.com")?,
            auth_url: url_env("REDDIT_AUTH_URL", "https://www.reddit.com")?,
        })
    }
}

/// Watson Personality Insights credentials and endpoints.
#[derive(Debug, Clone)]
pub struct WatsonConfig {
    pub api_key: SecretString,
    /// Instance URL, e.g. `https://api.us-south.personality-insights.watson.cloud.ibm.com/instances/<id>`.
    pub service_url: String,
    /// IAM token service (default: https://iam.cloud.ibm.com).
    pub iam_url: String,
    /// API version date sent with every profile request.
    pub version: String,
}

impl WatsonConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let service_url = required_env(
            "WATSON_SERVICE_URL",
            "Copy the URL from the service credentials page",
        )?;
        validate_url("WATSON_SERVICE_URL", &service_url)?;

        Ok(Self {
            api_key: SecretString::from(required_env(
                "WATSON_API_KEY",
                "Copy the API key from the service credentials page",
            )?),
            service_url,
            iam_url: url_env("WATSON_IAM_URL", "https://iam.cloud.ibm.com")?,
            version: optional_env("WATSON_API_VERSION")?
                .unwrap_or_else(|| "2017-10-13".to_string()),
        })
    }
}

/// Poll loop behavior.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Sleep between two passes.
    pub poll_interval: Duration,
    /// Mentions at least this old are ignored.
    pub freshness_window: Duration,
    /// How many recent comments feed one analysis.
    pub comment_limit: usize,
    /// What to do when a facet has no phrase.
    pub phrase_policy: MissingPhrasePolicy,
    /// Optional TOML file overriding built-in phrases.
    pub phrases_path: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            freshness_window: Duration::from_secs(60),
            comment_limit: 25,
            phrase_policy: MissingPhrasePolicy::default(),
            phrases_path: None,
        }
    }
}

impl BotConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let poll_interval_secs: u64 =
            parse_optional_env("BOT_POLL_INTERVAL_SECS", defaults.poll_interval.as_secs())?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "BOT_POLL_INTERVAL_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let freshness_secs: u64 = parse_optional_env(
            "BOT_FRESHNESS_WINDOW_SECS",
            defaults.freshness_window.as_secs(),
        )?;

        // Reddit listings cap `limit` at 100.
        let comment_limit: usize = parse_optional_env("BOT_COMMENT_LIMIT", defaults.comment_limit)?;
        if !(1..=100).contains(&comment_limit) {
            return Err(ConfigError::InvalidValue {
                key: "BOT_COMMENT_LIMIT".to_string(),
                message: format!("must be between 1 and 100, got {comment_limit}"),
            });
        }

        let phrase_policy = parse_optional_env("BOT_PHRASE_POLICY", defaults.phrase_policy)?;
        let phrases_path = optional_env("BOT_PHRASES_PATH")?.map(PathBuf::from);

        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
            freshness_window: Duration::from_secs(freshness_secs),
            comment_limit,
            phrase_policy,
            phrases_path,
        })
    }
}

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

fn required_env(key: &str, hint: &str) -> Result<String, ConfigError> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingRequired {
        key: key.to_string(),
        hint: hint.to_string(),
    })
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

fn url_env(key: &str, default: &str) -> Result<String, ConfigError> {
    let value = optional_env(key)?.unwrap_or_else(|| default.to_string());
    validate_url(key, &value)?;
    Ok(value)
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must start with http:// or https://".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global, so serialize tests that mutate them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const REQUIRED: &[(&str, &str)] = &[
        ("REDDIT_CLIENT_ID", "client-id"),
        ("REDDIT_CLIENT_SECRET", "client-secret"),
        ("REDDIT_USERNAME", "personabot"),
        ("REDDIT_PASSWORD", "hunter2"),
        ("WATSON_API_KEY", "watson-key"),
        (
            "WATSON_SERVICE_URL",
            "https://api.us-south.personality-insights.watson.cloud.ibm.com/instances/abc",
        ),
    ];

    const OPTIONAL: &[&str] = &[
        "REDDIT_USER_AGENT",
        "REDDIT_API_URL",
        "REDDIT_AUTH_URL",
        "WATSON_IAM_URL",
        "WATSON_API_VERSION",
        "BOT_POLL_INTERVAL_SECS",
        "BOT_FRESHNESS_WINDOW_SECS",
        "BOT_COMMENT_LIMIT",
        "BOT_PHRASE_POLICY",
        "BOT_PHRASES_PATH",
    ];

    // SAFETY: Only called while holding ENV_LOCK.
    fn reset_env() {
        unsafe {
            for (key, value) in REQUIRED {
                std::env::set_var(key, value);
            }
            for key in OPTIONAL {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn optional_env_returns_none_for_empty_string() {
        let _lock = ENV_LOCK.lock();
        unsafe { std::env::set_var("_TEST_PB_EMPTY_42", "") };
        let result = optional_env("_TEST_PB_EMPTY_42").unwrap();
        assert!(result.is_none());
        unsafe { std::env::remove_var("_TEST_PB_EMPTY_42") };
    }

    #[test]
    fn parse_optional_env_returns_error_for_invalid_value() {
        let _lock = ENV_LOCK.lock();
        unsafe { std::env::set_var("_TEST_PB_PARSE_BAD_42", "soon") };
        let result: Result<u64, _> = parse_optional_env("_TEST_PB_PARSE_BAD_42", 0);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        unsafe { std::env::remove_var("_TEST_PB_PARSE_BAD_42") };
    }

    #[test]
    fn defaults_match_historical_behavior() {
        let _lock = ENV_LOCK.lock();
        reset_env();

        let config = Config::resolve().expect("resolve should succeed");
        assert_eq!(config.bot.poll_interval, Duration::from_secs(60));
        assert_eq!(config.bot.freshness_window, Duration::from_secs(60));
        assert_eq!(config.bot.comment_limit, 25);
        assert_eq!(config.bot.phrase_policy, MissingPhrasePolicy::Strict);
        assert!(config.bot.phrases_path.is_none());
        assert_eq!(config.reddit.api_url, "https://oauth.reddit.com");
        assert_eq!(config.reddit.auth_url, "https://www.reddit.com");
        assert!(config.reddit.user_agent.starts_with("personabot/"));
        assert_eq!(config.watson.iam_url, "https://iam.cloud.ibm.com");
        assert_eq!(config.watson.version, "2017-10-13");
    }

    #[test]
    fn missing_credentials_are_reported() {
        let _lock = ENV_LOCK.lock();
        reset_env();
        unsafe { std::env::remove_var("WATSON_API_KEY") };

        let err = Config::resolve().unwrap_err();
        match err {
            ConfigError::MissingRequired { key, .. } => assert_eq!(key, "WATSON_API_KEY"),
            other => panic!("Expected MissingRequired, got: {other:?}"),
        }
    }

    #[test]
    fn env_overrides_bot_settings() {
        let _lock = ENV_LOCK.lock();
        reset_env();
        unsafe {
            std::env::set_var("BOT_POLL_INTERVAL_SECS", "300");
            std::env::set_var("BOT_FRESHNESS_WINDOW_SECS", "600");
            std::env::set_var("BOT_COMMENT_LIMIT", "50");
            std::env::set_var("BOT_PHRASE_POLICY", "lenient");
            std::env::set_var("BOT_PHRASES_PATH", "/etc/personabot/phrases.toml");
        }

        let config = Config::resolve().expect("resolve should succeed");
        assert_eq!(config.bot.poll_interval, Duration::from_secs(300));
        assert_eq!(config.bot.freshness_window, Duration::from_secs(600));
        assert_eq!(config.bot.comment_limit, 50);
        assert_eq!(config.bot.phrase_policy, MissingPhrasePolicy::Lenient);
        assert_eq!(
            config.bot.phrases_path,
            Some(PathBuf::from("/etc/personabot/phrases.toml"))
        );
        reset_env();
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let _lock = ENV_LOCK.lock();
        reset_env();
        unsafe { std::env::set_var("BOT_POLL_INTERVAL_SECS", "0") };

        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BOT_POLL_INTERVAL_SECS"));
        reset_env();
    }

    #[test]
    fn comment_limit_above_listing_cap_is_rejected() {
        let _lock = ENV_LOCK.lock();
        reset_env();
        unsafe { std::env::set_var("BOT_COMMENT_LIMIT", "101") };

        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BOT_COMMENT_LIMIT"));
        reset_env();
    }

    #[test]
    fn non_http_service_url_is_rejected() {
        let _lock = ENV_LOCK.lock();
        reset_env();
        unsafe { std::env::set_var("WATSON_SERVICE_URL", "ftp://example.com") };

        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "WATSON_SERVICE_URL"));
        reset_env();
    }
}
