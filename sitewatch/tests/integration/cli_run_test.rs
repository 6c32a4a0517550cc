//! run サブコマンド統合テスト
//!
//! エンドポイント一覧とsecretsファイルを一時ファイルで用意し、
//! 設定読み込みから実行サマリーまでを通しで確認する。

use crate::support::{advisory_server, site_server, ADVISORY_PATH};
use serial_test::serial;
use sitewatch::cli::run::{execute, RunArgs};
use sitewatch::config::ConfigError;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn run_args(endpoints: PathBuf, secrets: Option<PathBuf>) -> RunArgs {
    RunArgs {
        endpoints,
        secrets,
        concurrency: None,
        dry_run: false,
        json: true,
    }
}

#[tokio::test]
#[serial]
async fn test_run_from_files_with_log_transport() {
    let site = site_server(Duration::ZERO).await;
    let advisory = advisory_server("Check the origin server logs.", 1).await;

    let endpoints = write_file(&[
        "# monitored sites".to_string(),
        format!("{}/ok", site.uri()),
        String::new(),
        format!("{}/down", site.uri()),
    ]);
    let secrets = write_file(&[
        "SITEWATCH_ADVISORY_ENABLED=true".to_string(),
        "SITEWATCH_ADVISORY_API_KEY=sk-test".to_string(),
        format!("SITEWATCH_ADVISORY_URL={}{}", advisory.uri(), ADVISORY_PATH),
        "SITEWATCH_NOTIFY_TRANSPORT=log".to_string(),
        "SITEWATCH_TIMEOUT_SECS=2".to_string(),
        "SITEWATCH_CONNECT_TIMEOUT_SECS=1".to_string(),
    ]);

    let summary = execute(&run_args(
        endpoints.path().to_path_buf(),
        Some(secrets.path().to_path_buf()),
    ))
    .await
    .unwrap();

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.healthy, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.advisories, 1);
}

#[tokio::test]
#[serial]
async fn test_missing_recipient_is_counted_as_delivery_failure() {
    let site = site_server(Duration::ZERO).await;
    let endpoints = write_file(&[format!("{}/down", site.uri())]);
    let secrets = write_file(&[
        "SITEWATCH_NOTIFY_TRANSPORT=sendmail".to_string(),
        "SITEWATCH_SENDMAIL_PATH=/nonexistent/sendmail".to_string(),
    ]);

    let summary = execute(&run_args(
        endpoints.path().to_path_buf(),
        Some(secrets.path().to_path_buf()),
    ))
    .await
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.alerts_sent, 0);
    assert_eq!(summary.delivery_failures, 1);
}

#[tokio::test]
#[serial]
async fn test_dry_run_never_delivers() {
    let site = site_server(Duration::ZERO).await;
    let endpoints = write_file(&[format!("{}/down", site.uri())]);
    let secrets = write_file(&[
        "SITEWATCH_NOTIFY_TRANSPORT=sendmail".to_string(),
        "SITEWATCH_ALERT_TO=ops@example.com".to_string(),
        "SITEWATCH_SENDMAIL_PATH=/nonexistent/sendmail".to_string(),
    ]);

    let mut args = run_args(
        endpoints.path().to_path_buf(),
        Some(secrets.path().to_path_buf()),
    );
    args.dry_run = true;
    let summary = execute(&args).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.delivery_failures, 0);
}

#[tokio::test]
#[serial]
async fn test_missing_explicit_secrets_aborts_before_probing() {
    let site = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let endpoints = write_file(&[site.uri()]);
    let dir = tempfile::tempdir().unwrap();

    let err = execute(&run_args(
        endpoints.path().to_path_buf(),
        Some(dir.path().join("secrets.env")),
    ))
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::SecretsMissing(_))
    ));
}
