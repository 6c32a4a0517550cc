//! 実行パイプライン統合テスト
//!
//! プローブ → 分類 → アドバイザリ → アラート → 配信 の一連の流れを
//! モックサーバーと記録用通知先で検証する。

use crate::support::{
    advisory_config, advisory_server, endpoint, site_server, RecordingNotifier,
};
use sitewatch::advisory::AdvisoryClient;
use sitewatch::alert::SUGGESTION_HEADER;
use sitewatch::health::EndpointProber;
use sitewatch::RunOrchestrator;
use sitewatch_common::config::AdvisoryConfig;
use std::sync::Arc;
use std::time::Duration;

fn prober() -> EndpointProber {
    EndpointProber::new(Duration::from_millis(250), Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_mixed_endpoints_alert_only_failures() {
    let site = site_server(Duration::from_secs(3)).await;
    let advisory = advisory_server("Restart the upstream service.", 2).await;
    let notifier = Arc::new(RecordingNotifier::default());

    let orchestrator = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(advisory_config(&advisory)).unwrap()),
        notifier.clone(),
    );
    let endpoints = vec![
        endpoint(&site, "/ok"),
        endpoint(&site, "/down"),
        endpoint(&site, "/slow"),
    ];
    let summary = orchestrator.run(&endpoints).await;

    assert_eq!(summary.checked, 3);
    assert_eq!(summary.healthy, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.alerts_sent, 2);
    assert_eq!(summary.advisories, 2);
    assert!(summary.finished_at.is_some());

    let alerts = notifier.delivered();
    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].subject.contains("/down"));
    assert!(alerts[0].subject.contains("HTTP 503"));
    assert!(alerts[1].subject.contains("/slow"));
    assert!(alerts[1].subject.contains("timeout"));
    for alert in &alerts {
        assert!(alert.body.contains(SUGGESTION_HEADER));
        assert!(alert.body.contains("Restart the upstream service."));
    }
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_run() {
    let site = site_server(Duration::from_secs(3)).await;
    let advisory = advisory_server("Check the load balancer.", 2).await;
    let notifier = Arc::new(RecordingNotifier::failing_on("/down"));

    let orchestrator = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(advisory_config(&advisory)).unwrap()),
        notifier.clone(),
    );
    let endpoints = vec![
        endpoint(&site, "/ok"),
        endpoint(&site, "/down"),
        endpoint(&site, "/slow"),
    ];
    let summary = orchestrator.run(&endpoints).await;

    assert_eq!(summary.checked, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.delivery_failures, 1);

    assert_eq!(notifier.attempts().len(), 2);
    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].subject.contains("/slow"));
}

#[tokio::test]
async fn test_advisory_failure_still_delivers_alert() {
    let site = site_server(Duration::from_secs(3)).await;
    let advisory = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .expect(1)
        .mount(&advisory)
        .await;
    let notifier = Arc::new(RecordingNotifier::default());

    let orchestrator = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(advisory_config(&advisory)).unwrap()),
        notifier.clone(),
    );
    let summary = orchestrator.run(&[endpoint(&site, "/down")]).await;

    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.advisories, 0);
    let alerts = notifier.delivered();
    assert!(!alerts[0].body.contains(SUGGESTION_HEADER));
}

#[tokio::test]
async fn test_healthy_runs_are_idempotent() {
    let site = site_server(Duration::ZERO).await;
    let advisory = advisory_server("unused", 0).await;
    let notifier = Arc::new(RecordingNotifier::default());

    let orchestrator = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(advisory_config(&advisory)).unwrap()),
        notifier.clone(),
    );
    let endpoints = vec![endpoint(&site, "/ok"), endpoint(&site, "/slow")];

    for _ in 0..2 {
        let summary = orchestrator.run(&endpoints).await;
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.healthy, 2);
        assert_eq!(summary.failed, 0);
        assert!(summary.all_healthy());
    }
    assert!(notifier.attempts().is_empty());
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential_counts() {
    let site = site_server(Duration::from_secs(3)).await;
    let endpoints = vec![
        endpoint(&site, "/ok"),
        endpoint(&site, "/down"),
        endpoint(&site, "/slow"),
        endpoint(&site, "/ok"),
        endpoint(&site, "/down"),
    ];

    let sequential_notifier = Arc::new(RecordingNotifier::default());
    let sequential = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(AdvisoryConfig::default()).unwrap()),
        sequential_notifier.clone(),
    )
    .run(&endpoints)
    .await;

    let concurrent_notifier = Arc::new(RecordingNotifier::default());
    let concurrent = RunOrchestrator::new(
        prober(),
        Arc::new(AdvisoryClient::new(AdvisoryConfig::default()).unwrap()),
        concurrent_notifier.clone(),
    )
    .with_concurrency(4)
    .run(&endpoints)
    .await;

    assert_eq!(sequential.checked, concurrent.checked);
    assert_eq!(sequential.healthy, concurrent.healthy);
    assert_eq!(sequential.failed, concurrent.failed);
    assert_eq!(sequential.alerts_sent, concurrent.alerts_sent);
    assert_eq!(concurrent.failed, 3);
    assert_eq!(concurrent_notifier.delivered().len(), 3);
}
