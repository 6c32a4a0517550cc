//! 共通型定義
//!
//! Endpoint, ProbeResult, Classification, Alert, RunSummary等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::CommonError;

/// 監視対象エンドポイント
///
/// URL文字列そのものが識別子。1回の実行中は不変。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// 前後の空白を除去してエンドポイントを作成
    pub fn new(url: impl Into<String>) -> Result<Self, CommonError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(CommonError::Validation(
                "endpoint URL must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// URL文字列を返す
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート層の失敗種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// URLとして解釈できない
    InvalidUrl,
    /// 名前解決失敗
    Dns,
    /// 接続拒否・到達不能
    Connect,
    /// TLSハンドシェイク・証明書エラー
    Tls,
    /// 接続またはリクエスト全体のタイムアウト
    Timeout,
    /// その他のリクエストエラー
    Request,
}

impl TransportErrorKind {
    /// TransportErrorKindを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Dns => "dns",
            Self::Connect => "connect",
            Self::Tls => "tls",
            Self::Timeout => "timeout",
            Self::Request => "request",
        }
    }
}

impl std::str::FromStr for TransportErrorKind {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid_url" => Ok(Self::InvalidUrl),
            "dns" => Ok(Self::Dns),
            "connect" => Ok(Self::Connect),
            "tls" => Ok(Self::Tls),
            "timeout" => Ok(Self::Timeout),
            "request" => Ok(Self::Request),
            other => Err(CommonError::Validation(format!(
                "unknown transport error kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// トランスポート層の失敗（識別コード + メッセージ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    /// 失敗種別
    pub kind: TransportErrorKind,
    /// 人間向けのエラーメッセージ
    pub message: String,
}

/// プローブの結果ステータス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// HTTPレスポンスを受信した（ステータスコード）
    Http(u16),
    /// HTTPレスポンスを受信できなかった
    Transport(TransportFailure),
}

/// 1回のプローブ結果
///
/// 分類後は破棄される。レスポンスボディは保持しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 対象エンドポイント
    pub endpoint: Endpoint,
    /// ステータス
    pub status: ProbeStatus,
    /// 所要時間
    pub elapsed: Duration,
    /// プローブ完了時刻
    pub checked_at: DateTime<Utc>,
}

/// 失敗の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// HTTPステータス >= 400
    #[serde(rename = "HTTP")]
    Http,
    /// トランスポート層の失敗
    Connection,
}

impl FailureKind {
    /// FailureKindを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Connection => "Connection",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// プローブ結果の分類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    /// 正常（1xx〜3xx）
    Healthy {
        /// HTTPステータス
        status: u16,
    },
    /// HTTPエラー（4xx/5xx）
    HttpFailure {
        /// HTTPステータス
        status: u16,
        /// 対象エンドポイント
        endpoint: Endpoint,
    },
    /// 接続エラー
    ConnectionFailure {
        /// 失敗種別コード
        reason_code: TransportErrorKind,
        /// エラーメッセージ
        reason_text: String,
        /// 対象エンドポイント
        endpoint: Endpoint,
    },
}

impl Classification {
    /// 正常かどうか
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// HTTPステータス（接続エラー時はNone）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Healthy { status } | Self::HttpFailure { status, .. } => Some(*status),
            Self::ConnectionFailure { .. } => None,
        }
    }

    /// 失敗種別（正常時はNone）
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Healthy { .. } => None,
            Self::HttpFailure { .. } => Some(FailureKind::Http),
            Self::ConnectionFailure { .. } => Some(FailureKind::Connection),
        }
    }
}

/// アドバイザリ要求
///
/// 失敗した分類に対してのみ作成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    /// 対象エンドポイント
    pub endpoint: Endpoint,
    /// 失敗種別
    pub failure_kind: FailureKind,
    /// HTTPステータスまたはトランスポート失敗コード
    pub code_or_status: String,
}

impl AdvisoryRequest {
    /// 分類からアドバイザリ要求を作成（Healthyの場合はNone）
    pub fn from_classification(classification: &Classification) -> Option<Self> {
        match classification {
            Classification::Healthy { .. } => None,
            Classification::HttpFailure { status, endpoint } => Some(Self {
                endpoint: endpoint.clone(),
                failure_kind: FailureKind::Http,
                code_or_status: status.to_string(),
            }),
            Classification::ConnectionFailure {
                reason_code,
                endpoint,
                ..
            } => Some(Self {
                endpoint: endpoint.clone(),
                failure_kind: FailureKind::Connection,
                code_or_status: reason_code.as_str().to_string(),
            }),
        }
    }
}

/// アドバイザリ結果
///
/// アドバイザリクライアントの外へエラーを伝播させないための値。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum AdvisoryResult {
    /// 診断・対処案テキスト
    Suggestion(String),
    /// 取得できなかった理由
    Unavailable(String),
}

impl AdvisoryResult {
    /// 診断テキストを返す（Unavailableの場合はNone）
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Suggestion(text) => Some(text),
            Self::Unavailable(_) => None,
        }
    }
}

/// 通知用アラート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// 件名
    pub subject: String,
    /// 本文
    pub body: String,
    /// アドバイザリ結果
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryResult>,
}

/// 1回の実行サマリー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// プローブしたエンドポイント数
    pub checked: usize,
    /// 正常数
    pub healthy: usize,
    /// 失敗数
    pub failed: usize,
    /// 配信に成功したアラート数
    pub alerts_sent: usize,
    /// 配信に失敗したアラート数
    pub delivery_failures: usize,
    /// 診断テキストを取得できたアラート数
    pub advisories: usize,
    /// キャンセルによりプローブしなかったエンドポイント数
    pub skipped: usize,
    /// 実行開始時刻
    pub started_at: DateTime<Utc>,
    /// 実行終了時刻
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// 実行開始時のサマリーを作成
    pub fn start() -> Self {
        Self {
            checked: 0,
            healthy: 0,
            failed: 0,
            alerts_sent: 0,
            delivery_failures: 0,
            advisories: 0,
            skipped: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 正常なエンドポイントを記録
    pub fn record_healthy(&mut self) {
        self.checked += 1;
        self.healthy += 1;
    }

    /// 失敗したエンドポイントを記録
    pub fn record_failure(&mut self, advised: bool, delivered: bool) {
        self.checked += 1;
        self.failed += 1;
        if advised {
            self.advisories += 1;
        }
        if delivered {
            self.alerts_sent += 1;
        } else {
            self.delivery_failures += 1;
        }
    }

    /// キャンセルでスキップしたエンドポイントを記録
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// 終了時刻を確定する
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// 全エンドポイントが正常か
    pub fn all_healthy(&self) -> bool {
        self.failed == 0
    }

    /// 整形済みJSONに変換
    pub fn to_json_pretty(&self) -> Result<String, CommonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
