// src/notify/twilio.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{MessageId, Notifier};
use crate::error::NotifierError;

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number (`From`).
    pub from: String,
}

/// SMS via the Twilio Messages REST resource.
#[derive(Clone)]
pub struct TwilioNotifier {
    creds: TwilioCredentials,
    api_base: String,
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioNotifier {
    pub fn new(creds: TwilioCredentials) -> Self {
        Self {
            creds,
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point at a different API host (tests, regional edges).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.creds.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, recipient: &str, body: &str) -> Result<MessageId, NotifierError> {
        let form = [
            ("From", self.creds.from.as_str()),
            ("To", recipient),
            ("Body", body),
        ];
        let rsp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.creds.account_sid, Some(&self.creds.auth_token))
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(NotifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let msg: MessageResource = rsp
            .json()
            .await
            .map_err(|e| NotifierError::Malformed(e.to_string()))?;
        Ok(MessageId(msg.sid))
    }
}
