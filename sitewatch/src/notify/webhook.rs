//! チャットWebhookによる配信
//!
//! `{"text": "<件名>\n\n<本文>"}` をPOSTする（Slack互換のincoming webhook形式）。

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sitewatch_common::config::NotifyConfig;
use sitewatch_common::types::Alert;
use std::time::Duration;
use tracing::debug;

use super::{DeliveryError, Notifier};
use crate::health::prober::error_chain_message;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Webhook通知
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
    timeout: Duration,
}

impl WebhookNotifier {
    /// 新しい通知先を作成
    pub fn new(url: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.filter(|u| !u.trim().is_empty()),
            timeout,
        })
    }

    /// 設定から作成
    pub fn from_config(config: &NotifyConfig) -> reqwest::Result<Self> {
        Self::new(config.webhook_url.clone(), config.timeout())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let url = self
            .url
            .as_deref()
            .ok_or(DeliveryError::MissingRecipient("webhook"))?;
        let text = format!("{}\n\n{}", alert.subject, alert.body);

        let response = self
            .client
            .post(url)
            .json(&WebhookPayload { text: &text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(self.timeout)
                } else {
                    DeliveryError::Http(error_chain_message(&e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "Alert posted to webhook");
        Ok(())
    }
}
