use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::MessagingCredentials;
use crate::utils::error::Result;

/// A single text message. Phone numbers are E.164.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub body: String,
    pub from: String,
    pub to: String,
}

impl SmsMessage {
    /// Alert sent when a watched item becomes purchasable.
    pub fn in_stock(item_name: &str, item_url: &str, from: &str, to: &str) -> Self {
        Self {
            body: format!("{} IN STOCK: {}", item_name, item_url),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub message_id: Option<String>,
}

/// Delivers text messages through a third-party messaging API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        credentials: &MessagingCredentials,
        message: &SmsMessage,
    ) -> Result<NotificationReceipt>;
}
