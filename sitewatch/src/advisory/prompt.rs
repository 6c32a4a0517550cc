//! アドバイザリ用プロンプト生成

use sitewatch_common::config::AdvisoryConfig;
use sitewatch_common::protocol::{ChatCompletionRequest, ChatMessage};
use sitewatch_common::types::{AdvisoryRequest, FailureKind};

/// 失敗種別に応じたプロンプト文を作成
pub fn build_prompt(request: &AdvisoryRequest) -> String {
    match request.failure_kind {
        FailureKind::Http => format!(
            "The website {} returned HTTP status code {}. \
             In one sentence, explain what this status code means for the site. \
             Then give 2-3 short bulleted steps to fix or investigate the problem.",
            request.endpoint, request.code_or_status
        ),
        FailureKind::Connection => format!(
            "The website {} could not be reached (connection error code: {}). \
             Possible causes include DNS resolution problems, firewall rules, or network path issues. \
             In one sentence, explain the most likely cause. \
             Then give 2-3 short bulleted steps to troubleshoot it.",
            request.endpoint, request.code_or_status
        ),
    }
}

/// Chat Completionsリクエストを作成
///
/// プロンプト中の引用符や制御文字はJSONシリアライズ時にエスケープされる。
pub fn build_payload(config: &AdvisoryConfig, request: &AdvisoryRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage::user(build_prompt(request))],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}
