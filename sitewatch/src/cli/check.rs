//! check サブコマンド
//!
//! 1つのURLをプローブして分類結果を表示する。アラートは送信しない。

use clap::Args;
use sitewatch_common::config::ProbeConfig;
use sitewatch_common::types::{Classification, Endpoint, ProbeResult};

use crate::health::{classify, EndpointProber};

/// check サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// URL to probe
    pub url: String,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 5, env = "SITEWATCH_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout: u64,

    /// Overall probe timeout in seconds
    #[arg(long, default_value_t = 10, env = "SITEWATCH_TIMEOUT_SECS")]
    pub timeout: u64,

    /// Print the classification as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Execute the check command
pub async fn execute(args: &CheckArgs) -> Result<Classification, anyhow::Error> {
    let endpoint = Endpoint::new(args.url.as_str())?;
    let config = ProbeConfig {
        connect_timeout_secs: args.connect_timeout,
        timeout_secs: args.timeout,
        ..ProbeConfig::default()
    };
    config.validate()?;

    let prober = EndpointProber::from_config(&config)?;
    let result = prober.probe(&endpoint).await;
    let classification = classify(&result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else {
        println!("{}", describe(&result, &classification));
    }
    Ok(classification)
}

/// 分類結果を1行で表す
pub fn describe(result: &ProbeResult, classification: &Classification) -> String {
    let elapsed_ms = result.elapsed.as_millis();
    match classification {
        Classification::Healthy { status } => {
            format!("UP          {} (HTTP {}, {} ms)", result.endpoint, status, elapsed_ms)
        }
        Classification::HttpFailure { status, endpoint } => {
            format!("DOWN        {} (HTTP {}, {} ms)", endpoint, status, elapsed_ms)
        }
        Classification::ConnectionFailure {
            reason_code,
            reason_text,
            endpoint,
        } => format!(
            "UNREACHABLE {} ({}: {}, {} ms)",
            endpoint, reason_code, reason_text, elapsed_ms
        ),
    }
}
