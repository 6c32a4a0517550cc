//! 統合テスト共通ユーティリティ

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use sitewatch::notify::{DeliveryError, Notifier};
use sitewatch_common::config::AdvisoryConfig;
use sitewatch_common::types::{Alert, Endpoint};
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// アドバイザリAPIモックのパス
pub const ADVISORY_PATH: &str = "/v1/chat/completions";

/// 受け取ったアラートを記録する通知先
///
/// `fail_when_subject_contains` に一致したアラートは配信失敗として扱う。
#[derive(Default)]
pub struct RecordingNotifier {
    attempts: Mutex<Vec<Alert>>,
    delivered: Mutex<Vec<Alert>>,
    fail_when_subject_contains: Option<String>,
}

impl RecordingNotifier {
    /// 件名に `needle` を含むアラートの配信を失敗させる
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            fail_when_subject_contains: Some(needle.into()),
            ..Self::default()
        }
    }

    /// 配信を試みたアラート
    pub fn attempts(&self) -> Vec<Alert> {
        self.attempts.lock().unwrap().clone()
    }

    /// 配信に成功したアラート
    pub fn delivered(&self) -> Vec<Alert> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.attempts.lock().unwrap().push(alert.clone());
        if let Some(needle) = &self.fail_when_subject_contains {
            if alert.subject.contains(needle.as_str()) {
                return Err(DeliveryError::Status(502));
            }
        }
        self.delivered.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// アドバイザリAPIのモックを起動し、`expected_calls` 回の呼び出しを期待する
pub async fn advisory_server(suggestion: &str, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ADVISORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": suggestion}}]
        })))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

/// モックサーバーを向いた有効なアドバイザリ設定
pub fn advisory_config(server: &MockServer) -> AdvisoryConfig {
    AdvisoryConfig {
        enabled: true,
        api_key: Some("sk-test".to_string()),
        api_url: format!("{}{}", server.uri(), ADVISORY_PATH),
        timeout_secs: 5,
        ..AdvisoryConfig::default()
    }
}

/// 監視対象サイトのモック
///
/// - `/ok` 200
/// - `/down` 503
/// - `/slow` 200（`delay` 後）
pub async fn site_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// モックサーバー上のエンドポイント
pub fn endpoint(server: &MockServer, route: &str) -> Endpoint {
    Endpoint::new(format!("{}{}", server.uri(), route)).unwrap()
}
