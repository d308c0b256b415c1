//! Live-class configuration.
//!
//! Configuration is loaded from environment variables. The transport token is
//! redacted in Debug output.

use crate::actors::messages::JoinRequest;
use crate::participant::Role;

use common::secret::SecretString;
use common::types::{ChannelName, ParticipantId};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default session actor mailbox size.
pub const DEFAULT_MAILBOX_SIZE: usize = 256;

/// Default bound on waiting for the transport's leave acknowledgement.
pub const DEFAULT_LEAVE_TIMEOUT_MS: u64 = 5000;

/// Live-class configuration.
#[derive(Clone)]
pub struct Config {
    /// Media service application id.
    pub app_id: String,

    /// Channel join token.
    /// Protected by `SecretString` to prevent accidental logging.
    pub transport_token: SecretString,

    /// Role of the local party. Explicit; never re-derived from `local_id`.
    pub local_role: Role,

    /// Id requested for the local party.
    pub local_id: ParticipantId,

    /// Channel joined when a request does not name one.
    pub default_channel: Option<ChannelName>,

    /// Session actor mailbox size (default: 256).
    pub mailbox_size: usize,

    /// How long leave waits on the transport before giving up (default: 5s).
    pub leave_timeout: Duration,

    /// Post a "class started" announcement when a teacher starts a
    /// scheduled live session (default: true).
    pub announce_on_start: bool,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("transport_token", &"[REDACTED]")
            .field("local_role", &self.local_role)
            .field("local_id", &self.local_id)
            .field("default_channel", &self.default_channel)
            .field("mailbox_size", &self.mailbox_size)
            .field("leave_timeout", &self.leave_timeout)
            .field("announce_on_start", &self.announce_on_start)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let app_id = vars
            .get("LIVE_CLASS_APP_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("LIVE_CLASS_APP_ID".to_string()))?
            .clone();

        let transport_token = SecretString::from(
            vars.get("LIVE_CLASS_TOKEN")
                .ok_or_else(|| ConfigError::MissingEnvVar("LIVE_CLASS_TOKEN".to_string()))?
                .clone(),
        );

        let local_role = match vars.get("LIVE_CLASS_ROLE").map(|s| s.to_ascii_lowercase()) {
            None => Role::Student,
            Some(role) if role == "student" => Role::Student,
            Some(role) if role == "teacher" => Role::Teacher,
            Some(other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "LIVE_CLASS_ROLE must be 'teacher' or 'student', got '{other}'"
                )))
            }
        };

        // Generate a local id carrying the role prefix when none is configured
        let local_id = vars
            .get("LIVE_CLASS_LOCAL_ID")
            .filter(|v| !v.is_empty())
            .map(|id| ParticipantId::new(id.clone()))
            .unwrap_or_else(|| {
                let uuid_suffix = uuid::Uuid::new_v4().simple().to_string();
                let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
                ParticipantId::new(format!("{}{short_suffix}", local_role.id_prefix()))
            });

        let default_channel = vars
            .get("LIVE_CLASS_CHANNEL")
            .filter(|v| !v.is_empty())
            .map(|c| ChannelName::new(c.clone()));

        let mailbox_size = parse_or(vars, "LIVE_CLASS_MAILBOX_SIZE", DEFAULT_MAILBOX_SIZE)?;
        if mailbox_size == 0 {
            return Err(ConfigError::InvalidValue(
                "LIVE_CLASS_MAILBOX_SIZE must be greater than zero".to_string(),
            ));
        }

        let leave_timeout = Duration::from_millis(parse_or(
            vars,
            "LIVE_CLASS_LEAVE_TIMEOUT_MS",
            DEFAULT_LEAVE_TIMEOUT_MS,
        )?);

        let announce_on_start = parse_or(vars, "LIVE_CLASS_ANNOUNCE_ON_START", true)?;

        Ok(Config {
            app_id,
            transport_token,
            local_role,
            local_id,
            default_channel,
            mailbox_size,
            leave_timeout,
            announce_on_start,
        })
    }
}

impl Config {
    /// Join request for the configured default channel, if any.
    #[must_use]
    pub fn default_join_request(&self) -> Option<JoinRequest> {
        self.default_channel.clone().map(JoinRequest::new)
    }
}

fn parse_or<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{key} has invalid value '{raw}'"))),
    }
}
