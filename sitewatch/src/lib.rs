//! sitewatch
//!
//! HTTP(S)エンドポイントの死活監視。失敗したエンドポイントについて
//! テキスト生成APIから診断を取得し、アラートとして通知する。

#![warn(missing_docs)]

/// 診断アドバイザリ（外部テキスト生成API）
pub mod advisory;

/// アラート本文の組み立て
pub mod alert;

/// CLIインターフェース
pub mod cli;

/// 設定管理（エンドポイント一覧・secretsファイル・環境変数ヘルパー）
pub mod config;

/// ヘルスチェック（プローブと分類）
pub mod health;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 通知（配信先の抽象と実装）
pub mod notify;

/// 実行オーケストレーター
pub mod orchestrator;

/// 実行キャンセル
pub mod shutdown;

pub use orchestrator::{EndpointOutcome, RunOrchestrator};
