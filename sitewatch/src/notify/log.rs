//! ログ出力のみの配信（dry-run用）

use async_trait::async_trait;
use sitewatch_common::types::Alert;
use tracing::warn;

use super::{DeliveryError, Notifier};

/// アラートをログに書くだけの通知先
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        warn!(subject = %alert.subject, body = %alert.body, "Alert (not sent)");
        Ok(())
    }
}
