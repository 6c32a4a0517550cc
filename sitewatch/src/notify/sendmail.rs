//! sendmail互換バイナリによるメール配信
//!
//! From/To/Subject ヘッダ付きのプレーンテキストメッセージを `sendmail -t -i` の
//! 標準入力へ渡す。

use async_trait::async_trait;
use sitewatch_common::config::NotifyConfig;
use sitewatch_common::types::Alert;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{DeliveryError, Notifier};

/// sendmail通知
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    program: String,
    from: String,
    to: Option<String>,
    timeout: Duration,
}

impl SendmailNotifier {
    /// 新しい通知先を作成
    pub fn new(
        program: impl Into<String>,
        from: impl Into<String>,
        to: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
            to: to.filter(|addr| !addr.trim().is_empty()),
            timeout,
        }
    }

    /// 設定から作成
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(
            config.sendmail_path.clone(),
            config.from.clone(),
            config.to.clone(),
            config.timeout(),
        )
    }

    async fn send(&self, to: &str, message: String) -> Result<(), DeliveryError> {
        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DeliveryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // 入力を読まずに終了した場合も終了ステータスとstderrを優先して返す
        let written = match child.stdin.take() {
            Some(mut stdin) => match stdin.write_all(message.as_bytes()).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            },
            None => Ok(()),
        };

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(DeliveryError::ExitStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        debug!(program = %self.program, to = %to, "Alert handed to sendmail");
        Ok(())
    }
}

/// ヘッダ値から改行を取り除く
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// メールメッセージを組み立てる
pub fn render_message(from: &str, to: &str, alert: &Alert) -> String {
    format!(
        "From: {}\nTo: {}\nSubject: {}\nContent-Type: text/plain; charset=UTF-8\n\n{}",
        header_value(from),
        header_value(to),
        header_value(&alert.subject),
        alert.body
    )
}

#[async_trait]
impl Notifier for SendmailNotifier {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let to = self
            .to
            .as_deref()
            .ok_or(DeliveryError::MissingRecipient("sendmail"))?;
        let message = render_message(&self.from, to, alert);

        timeout(self.timeout, self.send(to, message))
            .await
            .map_err(|_| DeliveryError::Timeout(self.timeout))?
    }
}
