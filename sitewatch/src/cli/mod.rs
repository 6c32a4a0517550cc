//! CLI module for sitewatch
//!
//! Provides the command-line interface for one-shot uptime runs and
//! single-endpoint diagnostics.

pub mod check;
pub mod prompt;
pub mod run;

use clap::{Parser, Subcommand};

/// sitewatch - HTTP(S) uptime prober with advisory diagnosis
#[derive(Parser, Debug)]
#[command(name = "sitewatch")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    SITEWATCH_ENDPOINTS             Endpoint list path (default: endpoints.txt)
    SITEWATCH_SECRETS               Secrets file path (default: secrets.env, optional)
    SITEWATCH_LOG_LEVEL             Log level (default: info)
    SITEWATCH_LOG_FORMAT            Log format: text or json (default: text)
    SITEWATCH_CONCURRENCY           Endpoints checked in parallel (default: 1)
    SITEWATCH_CONNECT_TIMEOUT_SECS  Connect timeout in seconds (default: 5)
    SITEWATCH_TIMEOUT_SECS          Overall probe timeout in seconds (default: 10)
    SITEWATCH_ADVISORY_ENABLED      Request a diagnosis for failures (default: false)
    SITEWATCH_ADVISORY_API_KEY      Advisory API key (fallback: OPENAI_API_KEY)
    SITEWATCH_ADVISORY_URL          Chat completions URL
    SITEWATCH_ADVISORY_MODEL        Model name (default: gpt-4o-mini)
    SITEWATCH_NOTIFY_TRANSPORT      sendmail, webhook or log (default: sendmail)
    SITEWATCH_ALERT_FROM            Sender address (default: sitewatch@localhost)
    SITEWATCH_ALERT_TO              Recipient address (required for sendmail)
    SITEWATCH_SENDMAIL_PATH         sendmail binary (default: /usr/sbin/sendmail)
    SITEWATCH_WEBHOOK_URL           Webhook URL (required for webhook)

Settings other than the log options may also be placed in the secrets file.
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options used when no subcommand is given
    #[command(flatten)]
    pub run: run::RunArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every endpoint once and alert on failures
    Run(run::RunArgs),
    /// Probe and classify a single URL without alerting
    Check(check::CheckArgs),
    /// Print the advisory prompt and payload for a failure without sending it
    Prompt(prompt::PromptArgs),
}
