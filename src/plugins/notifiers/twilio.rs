use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::NotifierConfig;
use crate::models::MessagingCredentials;
use crate::plugins::traits::{NotificationReceipt, Notifier, SmsMessage};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

/// Sends SMS through the Twilio Messages REST endpoint.
pub struct TwilioNotifier {
    client: Client,
    base_url: String,
}

impl TwilioNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(
        &self,
        credentials: &MessagingCredentials,
        message: &SmsMessage,
    ) -> Result<NotificationReceipt> {
        let response = self
            .client
            .post(self.messages_url(&credentials.sid))
            .basic_auth(&credentials.sid, Some(&credentials.token))
            .form(&[
                ("Body", message.body.as_str()),
                ("From", message.from.as_str()),
                ("To", message.to.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification {
                status: status.as_u16(),
                message: body,
            });
        }

        // An unexpected body still means the message was accepted.
        let message_id = response
            .json::<MessageResponse>()
            .await
            .ok()
            .and_then(|r| r.sid);

        tracing::debug!(?message_id, "Twilio accepted message to {}", message.to);
        Ok(NotificationReceipt { message_id })
    }
}
