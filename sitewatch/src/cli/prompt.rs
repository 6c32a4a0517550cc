//! prompt サブコマンド
//!
//! 指定した失敗に対して送信されるプロンプトとJSONペイロードを表示する。
//! ネットワークには接続しない。

use chrono::Utc;
use clap::Args;
use sitewatch_common::types::{
    AdvisoryRequest, Endpoint, ProbeResult, ProbeStatus, TransportErrorKind, TransportFailure,
};
use std::path::PathBuf;
use std::time::Duration;

use crate::advisory::prompt::build_payload;
use crate::config::{load_secrets, settings_from_source};
use crate::health::classify;

/// prompt サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Endpoint URL that failed
    pub url: String,

    /// HTTP status code returned by the endpoint
    #[arg(long, conflicts_with = "transport", required_unless_present = "transport")]
    pub status: Option<u16>,

    /// Transport failure kind (invalid_url, dns, connect, tls, timeout, request)
    #[arg(long)]
    pub transport: Option<TransportErrorKind>,

    /// Secrets file used for the model parameters
    #[arg(short, long, env = "SITEWATCH_SECRETS")]
    pub secrets: Option<PathBuf>,
}

impl PromptArgs {
    /// 引数から擬似的なプローブ結果を作る
    fn probe_result(&self, endpoint: Endpoint) -> ProbeResult {
        let status = match (self.status, self.transport) {
            (Some(code), _) => ProbeStatus::Http(code),
            (None, Some(kind)) => ProbeStatus::Transport(TransportFailure {
                kind,
                message: kind.as_str().to_string(),
            }),
            (None, None) => ProbeStatus::Transport(TransportFailure {
                kind: TransportErrorKind::Request,
                message: "unspecified".to_string(),
            }),
        };
        ProbeResult {
            endpoint,
            status,
            elapsed: Duration::ZERO,
            checked_at: Utc::now(),
        }
    }

    /// アドバイザリ要求を作る（正常扱いのステータスならNone）
    pub fn advisory_request(&self) -> Result<Option<AdvisoryRequest>, anyhow::Error> {
        let endpoint = Endpoint::new(self.url.as_str())?;
        let classification = classify(&self.probe_result(endpoint));
        Ok(AdvisoryRequest::from_classification(&classification))
    }
}

/// Execute the prompt command
pub fn execute(args: &PromptArgs) -> Result<(), anyhow::Error> {
    let Some(request) = args.advisory_request()? else {
        println!(
            "HTTP {} is classified as healthy; no advisory would be requested",
            args.status.unwrap_or_default()
        );
        return Ok(());
    };

    let settings = settings_from_source(&load_secrets(args.secrets.as_deref())?)?;
    let payload = build_payload(&settings.advisory, &request);

    if let Some(message) = payload.messages.first() {
        println!("{}\n", message.content);
    }
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
