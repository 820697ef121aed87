//! Twilio channel — sends WhatsApp messages through the Programmable
//! Messaging REST API.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::channels::outbound::{OutboundSender, normalize_recipient};
use crate::config::TwilioConfig;
use crate::error::ChannelError;

/// Twilio REST API version segment.
const TWILIO_API_VERSION: &str = "2010-04-01";

/// Twilio-backed [`OutboundSender`].
pub struct TwilioSender {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioSender {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{TWILIO_API_VERSION}/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        )
    }

    /// The `From` address, channel-prefixed.
    pub fn from_address(&self) -> String {
        normalize_recipient(&self.config.self_number)
    }
}

#[async_trait]
impl OutboundSender for TwilioSender {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, recipient: &str, body: &str) -> Result<(), ChannelError> {
        let to = normalize_recipient(recipient);
        let from = self.from_address();
        let form = [("To", to.as_str()), ("From", from.as_str()), ("Body", body)];

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "twilio".into(),
                reason: format!("Messages API returned {status}: {err}"),
            });
        }

        tracing::debug!(to = %to, "Twilio message accepted");
        Ok(())
    }
}
