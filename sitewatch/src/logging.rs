//! ロギング初期化
//!
//! 出力先は常に標準エラー。標準出力はサマリー表示用に空けておく。
//! レベルは `SITEWATCH_LOG_LEVEL`（未設定なら `RUST_LOG`、既定 `info`）、
//! `SITEWATCH_LOG_FORMAT=json` でJSON行出力に切り替える。

use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::config::get_env_with_fallback;

/// ログ出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人間向けテキスト
    #[default]
    Text,
    /// JSON行
    Json,
}

impl LogFormat {
    /// 文字列から判定（`json` 以外はテキスト）
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    fn from_env() -> Self {
        std::env::var("SITEWATCH_LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// フィルタ式からEnvFilterを作成（不正な指定は無視して `info` に戻す）
pub fn build_filter(directives: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    match directives {
        Some(value) if !value.trim().is_empty() => builder.parse_lossy(value),
        _ => builder.parse_lossy(""),
    }
}

/// 環境変数からフィルタを作成（`SITEWATCH_LOG_LEVEL` 優先、`RUST_LOG` にフォールバック）
pub fn filter_from_env() -> EnvFilter {
    let directives = get_env_with_fallback("SITEWATCH_LOG_LEVEL", "RUST_LOG");
    build_filter(directives.as_deref())
}

/// グローバルsubscriberを初期化
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = filter_from_env();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    }
}
