//! 通知
//!
//! アラートを外部の配信チャネル（sink）へ渡すための狭いインターフェース。
//! 配信失敗は値として返し、呼び出し元は他のエンドポイントの処理を続ける。

pub mod log;
pub mod sendmail;
pub mod webhook;

use async_trait::async_trait;
use sitewatch_common::config::{NotifyConfig, NotifyTransport};
use sitewatch_common::types::Alert;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use self::log::LogNotifier;
pub use sendmail::SendmailNotifier;
pub use webhook::WebhookNotifier;

/// 配信エラー
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// 宛先（メールアドレス・Webhook URL）が未設定
    #[error("no recipient configured for {0} notifier")]
    MissingRecipient(&'static str),

    /// 配信プロセスを起動できなかった
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// 実行しようとしたプログラム
        program: String,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// 配信プロセスが異常終了した
    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        /// 実行したプログラム
        program: String,
        /// 終了ステータス
        status: String,
        /// 標準エラー出力
        stderr: String,
    },

    /// タイムアウト
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    /// HTTPリクエスト失敗
    #[error("webhook request failed: {0}")]
    Http(String),

    /// Webhookが成功以外のステータスを返した
    #[error("webhook returned HTTP {0}")]
    Status(u16),

    /// I/Oエラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// アラートの配信先
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 配信先の名前（ログ用）
    fn name(&self) -> &'static str;

    /// アラートを配信する
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError>;
}

/// 設定に応じた通知先を作成
pub fn build_notifier(config: &NotifyConfig) -> reqwest::Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match config.transport {
        NotifyTransport::Sendmail => Arc::new(SendmailNotifier::from_config(config)),
        NotifyTransport::Webhook => Arc::new(WebhookNotifier::from_config(config)?),
        NotifyTransport::Log => Arc::new(LogNotifier),
    };
    Ok(notifier)
}
