//! sitewatch 共通ライブラリ
//!
//! プローブ結果・分類・アラート等のデータモデルと設定構造体を提供する

#![warn(missing_docs)]

/// 設定構造体
pub mod config;

/// エラー型
pub mod error;

/// アドバイザリAPIの通信プロトコル
pub mod protocol;

/// コアデータ型
pub mod types;

pub use error::CommonError;
