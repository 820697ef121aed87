//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default HTTP port for the webhook server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default per-message send timeout.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 15;

/// Default Twilio REST endpoint.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Values the event processor decides with.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Shared code a sender echoes back to get activated. Never empty.
    pub activation_code: String,
    /// Operator address notified about pending activations.
    pub admin_recipient: String,
    /// Group invite URL sent once payment is verified.
    pub group_invite_link: String,
}

/// Credentials and identity for the Twilio messaging API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    /// Our own number, used as the `From` address.
    pub self_number: String,
    pub api_base: String,
}

/// Everything the process needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bridge: BridgeConfig,
    pub twilio: TwilioConfig,
    pub port: u16,
    pub send_timeout: Duration,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Required values must be present and non-blank; optional values fall
    /// back to their defaults when absent but are rejected when malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let bridge = BridgeConfig {
            activation_code: required("ACTIVATION_CODE")?,
            admin_recipient: required("ADMIN_NUMBER")?,
            group_invite_link: required("WHATSAPP_GROUP_LINK")?,
        };

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_SID")?,
            auth_token: SecretString::from(required("TWILIO_TOKEN")?),
            self_number: required("TWILIO_NUMBER")?,
            api_base: lookup("TWILIO_API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        };

        let port = parse_optional(&lookup, "PORT", DEFAULT_PORT)?;
        let send_timeout_secs =
            parse_optional(&lookup, "SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS)?;
        if send_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SEND_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bridge,
            twilio,
            port,
            send_timeout: Duration::from_secs(send_timeout_secs),
        })
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
