//! 通信プロトコル定義
//!
//! アドバイザリ用のOpenAI互換Chat Completions リクエスト/レスポンス型を定義します。

use serde::{Deserialize, Serialize};

/// チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// ロール ("user", "assistant", "system")
    pub role: String,
    /// メッセージ内容
    pub content: String,
}

impl ChatMessage {
    /// userロールのメッセージを作成
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat Completionsリクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// モデル名
    pub model: String,
    /// メッセージ配列
    pub messages: Vec<ChatMessage>,
    /// 最大トークン数
    pub max_tokens: u32,
    /// temperature
    pub temperature: f32,
}

/// Chat Completionsレスポンス
///
/// 診断テキストは `choices[0].message.content` にある。
/// 欠落やnullを許容するため全てOptional/defaultで受ける。
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatCompletionResponse {
    /// 候補一覧
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// レスポンス候補
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatChoice {
    /// 生成メッセージ
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

/// 生成メッセージ
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatChoiceMessage {
    /// 生成テキスト
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// 先頭候補の空でないテキストを取り出す
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
