//! アドバイザリクライアント
//!
//! 失敗したエンドポイントについて、外部テキスト生成APIから
//! 短い診断と対処案を取得する。
//!
//! どの失敗も呼び出し元へは伝播させず、`AdvisoryResult::Unavailable` に縮退する。
//! リトライはしない。1リクエストのタイムアウトを超えて実行を遅らせない。

pub mod prompt;

use async_trait::async_trait;
use reqwest::Client;
use sitewatch_common::config::AdvisoryConfig;
use sitewatch_common::protocol::ChatCompletionResponse;
use sitewatch_common::types::{AdvisoryRequest, AdvisoryResult};
use thiserror::Error;
use tracing::{debug, warn};

use crate::health::prober::error_chain_message;

/// アドバイザリ無効時の理由
pub const DISABLED_REASON: &str = "disabled";

/// 診断テキストの取得元
#[async_trait]
pub trait Advisor: Send + Sync {
    /// 失敗に対する診断を取得（失敗しても例外を返さない）
    async fn advise(&self, request: &AdvisoryRequest) -> AdvisoryResult;
}

/// アドバイザリ取得時の内部エラー
#[derive(Debug, Error)]
enum AdvisoryError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("advisory API returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no suggestion text")]
    Empty,
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(error_chain_message(&err))
        }
    }
}

/// OpenAI互換Chat Completions APIを使うアドバイザリクライアント
#[derive(Clone, Debug)]
pub struct AdvisoryClient {
    client: Client,
    config: AdvisoryConfig,
}

impl AdvisoryClient {
    /// 新しいクライアントを作成
    pub fn new(config: AdvisoryConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    async fn request_suggestion(
        &self,
        api_key: &str,
        request: &AdvisoryRequest,
    ) -> Result<String, AdvisoryError> {
        let payload = prompt::build_payload(&self.config, request);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or(AdvisoryError::Empty)
    }
}

#[async_trait]
impl Advisor for AdvisoryClient {
    async fn advise(&self, request: &AdvisoryRequest) -> AdvisoryResult {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if self.config.is_active() => key,
            _ => return AdvisoryResult::Unavailable(DISABLED_REASON.to_string()),
        };

        match self.request_suggestion(api_key, request).await {
            Ok(text) => {
                debug!(
                    endpoint = %request.endpoint,
                    chars = text.len(),
                    "Advisory suggestion received"
                );
                AdvisoryResult::Suggestion(text)
            }
            Err(e) => {
                warn!(
                    endpoint = %request.endpoint,
                    error = %e,
                    "Advisory unavailable, alert will be sent without suggestion"
                );
                AdvisoryResult::Unavailable(e.to_string())
            }
        }
    }
}
