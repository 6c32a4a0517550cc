//! ヘルスチェック
//!
//! エンドポイントのプローブと結果の分類

pub mod classifier;
pub mod prober;

pub use classifier::classify;
pub use prober::EndpointProber;
