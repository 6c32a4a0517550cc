//! 設定管理
//!
//! ProbeConfig, AdvisoryConfig, NotifyConfig等の設定構造体

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CommonError;

/// プローブ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// 接続タイムアウト（秒）(デフォルト: 5)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// リクエスト全体のタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// 同時にチェックするエンドポイント数 (デフォルト: 1 = 逐次)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    1
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_probe_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

impl ProbeConfig {
    /// 接続タイムアウト
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// リクエスト全体のタイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.timeout_secs == 0 {
            return Err(CommonError::Config(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(CommonError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// アドバイザリ（テキスト生成API）設定
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryConfig {
    /// 有効化フラグ (デフォルト: false)
    #[serde(default)]
    pub enabled: bool,

    /// APIキー
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Chat Completions APIのURL
    #[serde(default = "default_advisory_url")]
    pub api_url: String,

    /// モデル名 (デフォルト: "gpt-4o-mini")
    #[serde(default = "default_advisory_model")]
    pub model: String,

    /// 最大生成トークン数 (デフォルト: 200)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// temperature (デフォルト: 0.3)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// リクエストタイムアウト（秒）(デフォルト: 15)
    #[serde(default = "default_advisory_timeout")]
    pub timeout_secs: u64,
}

fn default_advisory_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_advisory_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.3
}

fn default_advisory_timeout() -> u64 {
    15
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            api_url: default_advisory_url(),
            model: default_advisory_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_advisory_timeout(),
        }
    }
}

impl AdvisoryConfig {
    /// 有効化されており、かつAPIキーが設定されているか
    pub fn is_active(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }

    /// リクエストタイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// APIキーをログに出さない
impl std::fmt::Debug for AdvisoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 通知トランスポート
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyTransport {
    /// sendmail互換バイナリへ渡す
    #[default]
    Sendmail,
    /// チャットWebhookへPOST
    Webhook,
    /// ログ出力のみ
    Log,
}

impl NotifyTransport {
    /// NotifyTransportを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sendmail => "sendmail",
            Self::Webhook => "webhook",
            Self::Log => "log",
        }
    }
}

impl std::str::FromStr for NotifyTransport {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sendmail" | "email" | "smtp" => Ok(Self::Sendmail),
            "webhook" | "slack" => Ok(Self::Webhook),
            "log" => Ok(Self::Log),
            other => Err(CommonError::Config(format!(
                "unknown notify transport: {other}"
            ))),
        }
    }
}

/// 通知設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotifyConfig {
    /// トランスポート (デフォルト: sendmail)
    #[serde(default)]
    pub transport: NotifyTransport,

    /// 送信元アドレス (デフォルト: "sitewatch@localhost")
    #[serde(default = "default_from")]
    pub from: String,

    /// 宛先アドレス
    #[serde(default)]
    pub to: Option<String>,

    /// sendmailバイナリのパス (デフォルト: "/usr/sbin/sendmail")
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,

    /// Webhook URL
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// 配信タイムアウト（秒）(デフォルト: 30)
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_from() -> String {
    "sitewatch@localhost".to_string()
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

fn default_notify_timeout() -> u64 {
    30
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            transport: NotifyTransport::default(),
            from: default_from(),
            to: None,
            sendmail_path: default_sendmail_path(),
            webhook_url: None,
            timeout_secs: default_notify_timeout(),
        }
    }
}

impl NotifyConfig {
    /// 配信タイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 実行全体の設定
///
/// 起動時に1度だけ構築し、オーケストレーターへ明示的に渡す。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// プローブ設定
    #[serde(default)]
    pub probe: ProbeConfig,
    /// アドバイザリ設定
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    /// 通知設定
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Settings {
    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        self.probe.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_config_defaults() {
        let config = ProbeConfig::default();

        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.concurrency, 1);
        assert!(config.connect_timeout() < config.timeout());
    }

    #[test]
    fn test_advisory_config_defaults() {
        let config = AdvisoryConfig::default();

        assert!(!config.enabled);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 200);
        assert_eq!(config.timeout_secs, 15);
        assert!(!config.is_active());
    }

    #[test]
    fn test_advisory_config_requires_key_to_be_active() {
        let mut config = AdvisoryConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(!config.is_active());

        config.api_key = Some("   ".to_string());
        assert!(!config.is_active());

        config.api_key = Some("sk-test".to_string());
        assert!(config.is_active());

        config.enabled = false;
        assert!(!config.is_active());
    }

    #[test]
    fn test_advisory_config_debug_masks_key() {
        let config = AdvisoryConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_notify_config_deserialization() {
        let json = r#"{"transport":"webhook","webhook_url":"https://hooks.example.com/x"}"#;
        let config: NotifyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.transport, NotifyTransport::Webhook);
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );
        // デフォルト値が適用される
        assert_eq!(config.from, "sitewatch@localhost");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_notify_transport_from_str() {
        assert_eq!(
            "Sendmail".parse::<NotifyTransport>().unwrap(),
            NotifyTransport::Sendmail
        );
        assert_eq!(
            "slack".parse::<NotifyTransport>().unwrap(),
            NotifyTransport::Webhook
        );
        assert_eq!("log".parse::<NotifyTransport>().unwrap(), NotifyTransport::Log);
        assert!("pager".parse::<NotifyTransport>().is_err());
    }

    #[test]
    fn test_settings_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.probe.concurrency = 0;
        assert!(settings.validate().is_err());

        settings.probe.concurrency = 4;
        settings.probe.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }
}
