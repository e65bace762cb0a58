use log::info;
use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_MOVIES_FILE: &str = "movies.json";

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar { name: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "{} environment variable is required", name)
            }
            ConfigError::InvalidVar { name, reason } => {
                write!(f, "{} environment variable is invalid: {}", name, reason)
            }
        }
    }
}

impl Error for ConfigError {}

/// process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// 0 means no administrator is configured
    pub admin_id: i64,
    /// raw channel identifiers in configured order, numeric ids or @handles
    pub required_channels: Vec<String>,
    pub invite_link: Option<Url>,
    pub movies_file: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// builds the config from any variable source; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingVar("BOT_TOKEN"))?;

        let admin_id = match lookup("ADMIN_ID").map(|raw| raw.trim().to_string()) {
            Some(raw) if !raw.is_empty() => {
                raw.parse::<i64>().map_err(|e| ConfigError::InvalidVar {
                    name: "ADMIN_ID",
                    reason: format!("'{}' is not an integer ({})", raw, e),
                })?
            }
            _ => 0,
        };

        let required_channels = Self::parse_channel_list(
            lookup("REQUIRED_CHANNELS").as_deref().unwrap_or_default(),
        );

        let invite_link = match lookup("INVITE_LINK").map(|raw| raw.trim().to_string()) {
            Some(link) if !link.is_empty() => {
                Some(Url::parse(&link).map_err(|e| ConfigError::InvalidVar {
                    name: "INVITE_LINK",
                    reason: format!("'{}' is not a valid URL ({})", link, e),
                })?)
            }
            _ => None,
        };

        let movies_file = lookup("MOVIES_FILE")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_MOVIES_FILE.to_string());

        Ok(Self {
            bot_token,
            admin_id,
            required_channels,
            invite_link,
            movies_file: PathBuf::from(movies_file),
        })
    }

    pub fn parse_channel_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|channel| !channel.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn log_summary(&self) {
        info!(
            "Config: admin_id={}, required_channels={:?}, invite_link={}, movies_file={}",
            self.admin_id,
            self.required_channels,
            self.invite_link.as_ref().map_or("<none>", Url::as_str),
            self.movies_file.display()
        );
    }
}
