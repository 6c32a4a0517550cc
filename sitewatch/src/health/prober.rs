//! エンドポイントプローバー
//!
//! エンドポイントへ1回だけリクエストを送り、ステータスコードまたは
//! トランスポート失敗を返す。レスポンスボディは読まない。
//!
//! リダイレクトは追従しない（3xxはそのまま返す）。

use chrono::Utc;
use reqwest::{redirect, Client, Url};
use sitewatch_common::config::ProbeConfig;
use sitewatch_common::types::{
    Endpoint, ProbeResult, ProbeStatus, TransportErrorKind, TransportFailure,
};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// エンドポイントプローバー
///
/// 接続タイムアウトと全体タイムアウトの両方を持つHTTPクライアントを1つ保持する。
#[derive(Clone, Debug)]
pub struct EndpointProber {
    client: Client,
    connect_timeout: Duration,
    timeout: Duration,
}

impl EndpointProber {
    /// 新しいプローバーを作成
    ///
    /// 接続タイムアウトが全体タイムアウト以上の場合は全体の半分に切り詰める。
    pub fn new(connect_timeout: Duration, timeout: Duration) -> reqwest::Result<Self> {
        let connect_timeout = if connect_timeout >= timeout {
            let clamped = timeout / 2;
            warn!(
                connect_timeout_ms = connect_timeout.as_millis() as u64,
                timeout_ms = timeout.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "Connect timeout must be shorter than total timeout, clamping"
            );
            clamped
        } else {
            connect_timeout
        };

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            connect_timeout,
            timeout,
        })
    }

    /// 設定からプローバーを作成
    pub fn from_config(config: &ProbeConfig) -> reqwest::Result<Self> {
        Self::new(config.connect_timeout(), config.timeout())
    }

    /// 実際に使われる接続タイムアウト
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// 全体タイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// エンドポイントを1回プローブする
    pub async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let start = Instant::now();
        let status = self.request_status(endpoint).await;
        let elapsed = start.elapsed();

        debug!(
            endpoint = %endpoint,
            elapsed_ms = elapsed.as_millis() as u64,
            status = ?status,
            "Probe finished"
        );

        ProbeResult {
            endpoint: endpoint.clone(),
            status,
            elapsed,
            checked_at: Utc::now(),
        }
    }

    async fn request_status(&self, endpoint: &Endpoint) -> ProbeStatus {
        let url = match Url::parse(endpoint.as_str()) {
            Ok(url) => url,
            Err(e) => {
                return ProbeStatus::Transport(TransportFailure {
                    kind: TransportErrorKind::InvalidUrl,
                    message: format!("invalid URL: {e}"),
                })
            }
        };

        match self.client.get(url).send().await {
            // ボディは読まずに破棄する
            Ok(response) => ProbeStatus::Http(response.status().as_u16()),
            Err(e) => ProbeStatus::Transport(TransportFailure {
                kind: transport_error_kind(&e),
                message: error_chain_message(&e),
            }),
        }
    }
}

/// reqwestのエラーをトランスポート失敗種別に変換
pub(crate) fn transport_error_kind(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        return TransportErrorKind::Timeout;
    }
    if err.is_builder() {
        return TransportErrorKind::InvalidUrl;
    }

    // 先頭メッセージにはURLが含まれるため、sourceチェーンだけを見る
    let chain = err
        .source()
        .map(error_chain_message)
        .unwrap_or_default()
        .to_ascii_lowercase();
    if chain.contains("dns error")
        || chain.contains("failed to lookup address")
        || chain.contains("name or service not known")
        || chain.contains("no such host")
    {
        return TransportErrorKind::Dns;
    }
    if chain.contains("certificate")
        || chain.contains("tls")
        || chain.contains("ssl")
        || chain.contains("handshake")
    {
        return TransportErrorKind::Tls;
    }
    if chain.contains("timed out") {
        return TransportErrorKind::Timeout;
    }
    if err.is_connect() {
        return TransportErrorKind::Connect;
    }
    TransportErrorKind::Request
}

/// エラーとそのsourceチェーンを1行のメッセージにまとめる
pub(crate) fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
