//! run サブコマンド
//!
//! エンドポイント一覧を1回走査し、失敗したエンドポイントについてアラートを送信する。

use clap::Args;
use sitewatch_common::config::Settings;
use sitewatch_common::types::RunSummary;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{
    load_endpoints, load_secrets, settings_from_source, ConfigError, DEFAULT_ENDPOINTS_PATH,
};
use crate::notify::{build_notifier, LogNotifier, Notifier};
use crate::orchestrator::RunOrchestrator;
use crate::shutdown::CancelController;

/// run サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Endpoint list file (one URL per line)
    #[arg(short, long, default_value = DEFAULT_ENDPOINTS_PATH, env = "SITEWATCH_ENDPOINTS")]
    pub endpoints: PathBuf,

    /// Secrets file (KEY=VALUE); must exist when given
    #[arg(short, long, env = "SITEWATCH_SECRETS")]
    pub secrets: Option<PathBuf>,

    /// Number of endpoints checked in parallel
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Log alerts instead of delivering them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// 設定ファイルとCLI引数から実行設定を組み立てる
pub fn resolve_settings(args: &RunArgs) -> Result<Settings, ConfigError> {
    let source = load_secrets(args.secrets.as_deref())?;
    let mut settings = settings_from_source(&source)?;
    if let Some(concurrency) = args.concurrency {
        settings.probe.concurrency = concurrency;
    }
    settings.validate()?;
    Ok(settings)
}

/// Execute the run command
///
/// 設定エラーのみ `Err` を返す。エンドポイントの失敗はサマリーに数えるだけ。
pub async fn execute(args: &RunArgs) -> Result<RunSummary, anyhow::Error> {
    let endpoints = load_endpoints(&args.endpoints)?;
    let settings = resolve_settings(args)?;

    let notifier: Arc<dyn Notifier> = if args.dry_run {
        info!(
            transport = settings.notify.transport.as_str(),
            "Dry run, alerts will only be logged"
        );
        Arc::new(LogNotifier)
    } else {
        info!(
            transport = settings.notify.transport.as_str(),
            "Alerts will be delivered"
        );
        build_notifier(&settings.notify)?
    };
    if !settings.advisory.enabled {
        info!("Advisory diagnosis disabled");
    } else if !settings.advisory.is_active() {
        warn!("Advisory diagnosis enabled but no API key is configured");
    }

    let cancel = CancelController::default();
    cancel.cancel_on_ctrl_c();

    let orchestrator = RunOrchestrator::from_settings(&settings, notifier)?.with_cancel(cancel);
    let summary = orchestrator.run(&endpoints).await;

    if args.json {
        println!("{}", summary.to_json_pretty()?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(summary)
}

/// 人間向けサマリー
pub fn render_summary(summary: &RunSummary) -> String {
    let result = if !summary.all_healthy() {
        "failures detected"
    } else if summary.skipped > 0 {
        "incomplete"
    } else {
        "all endpoints healthy"
    };
    let mut out = format!("Result:             {}\n", result);
    out.push_str(&format!(
        "Checked:            {}\nHealthy:            {}\nFailed:             {}\nAlerts sent:        {}\nDelivery failures:  {}\nWith diagnosis:     {}\n",
        summary.checked,
        summary.healthy,
        summary.failed,
        summary.alerts_sent,
        summary.delivery_failures,
        summary.advisories,
    ));
    if summary.skipped > 0 {
        out.push_str(&format!("Skipped:            {}\n", summary.skipped));
    }
    out
}
