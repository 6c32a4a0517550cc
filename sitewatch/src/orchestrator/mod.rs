//! 実行オーケストレーター
//!
//! エンドポイント一覧を1回走査し、各エンドポイントについて
//! プローブ → 分類 → （失敗時）アドバイザリ → アラート作成 → 配信 を行う。
//!
//! 1エンドポイントの処理（パイプライン全体）を1タスクとし、`concurrency` 個まで並行実行する。
//! `concurrency = 1` の場合は一覧の順に逐次実行する。
//! 各タスクは `EndpointOutcome` を返し、サマリーはオーケストレーターだけが集計する。

use futures::stream::{self, StreamExt};
use sitewatch_common::config::Settings;
use sitewatch_common::types::{
    AdvisoryRequest, AdvisoryResult, Classification, Endpoint, RunSummary,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::advisory::{Advisor, AdvisoryClient};
use crate::alert::compose;
use crate::health::{classify, EndpointProber};
use crate::notify::Notifier;
use crate::shutdown::CancelController;

/// 1エンドポイント分の処理結果
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointOutcome {
    /// 正常
    Healthy {
        /// 対象エンドポイント
        endpoint: Endpoint,
        /// HTTPステータス
        status: u16,
    },
    /// 失敗（アラート送信を試みた）
    Failed {
        /// 分類結果
        classification: Classification,
        /// 診断テキストを取得できたか
        advised: bool,
        /// 配信結果（失敗時はエラーメッセージ）
        delivery: Result<(), String>,
    },
}

/// 実行オーケストレーター
#[derive(Clone)]
pub struct RunOrchestrator {
    prober: EndpointProber,
    advisor: Arc<dyn Advisor>,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
    cancel: CancelController,
}

impl RunOrchestrator {
    /// 新しいオーケストレーターを作成（逐次実行）
    pub fn new(
        prober: EndpointProber,
        advisor: Arc<dyn Advisor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            prober,
            advisor,
            notifier,
            concurrency: 1,
            cancel: CancelController::default(),
        }
    }

    /// 設定から作成
    pub fn from_settings(
        settings: &Settings,
        notifier: Arc<dyn Notifier>,
    ) -> reqwest::Result<Self> {
        let prober = EndpointProber::from_config(&settings.probe)?;
        let advisor = Arc::new(AdvisoryClient::new(settings.advisory.clone())?);
        Ok(Self::new(prober, advisor, notifier).with_concurrency(settings.probe.concurrency))
    }

    /// 同時実行数を設定（0は1として扱う）
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// キャンセル信号を設定
    pub fn with_cancel(mut self, cancel: CancelController) -> Self {
        self.cancel = cancel;
        self
    }

    /// 同時実行数
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// エンドポイント一覧を1回走査してサマリーを返す
    ///
    /// 個々のエンドポイントの失敗で走査を中断することはない。
    /// キャンセル後は新しいプローブを開始せず、未着手分を `skipped` に数える。
    pub async fn run(&self, endpoints: &[Endpoint]) -> RunSummary {
        let mut summary = RunSummary::start();

        info!(
            endpoints = endpoints.len(),
            concurrency = self.concurrency,
            notifier = self.notifier.name(),
            "Run started"
        );

        let outcomes: Vec<EndpointOutcome> = stream::iter(endpoints)
            .take_until(self.cancel.cancelled())
            .map(|endpoint| self.check_endpoint(endpoint))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for outcome in &outcomes {
            match outcome {
                EndpointOutcome::Healthy { .. } => summary.record_healthy(),
                EndpointOutcome::Failed {
                    advised, delivery, ..
                } => summary.record_failure(*advised, delivery.is_ok()),
            }
        }
        for _ in outcomes.len()..endpoints.len() {
            summary.record_skipped();
        }

        let summary = summary.finish();
        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "Run cancelled before all endpoints were checked");
        }
        info!(
            checked = summary.checked,
            healthy = summary.healthy,
            failed = summary.failed,
            alerts_sent = summary.alerts_sent,
            delivery_failures = summary.delivery_failures,
            skipped = summary.skipped,
            "Run finished"
        );
        summary
    }

    /// 1エンドポイント分のパイプラインを実行
    pub async fn check_endpoint(&self, endpoint: &Endpoint) -> EndpointOutcome {
        let result = self.prober.probe(endpoint).await;
        let elapsed_ms = result.elapsed.as_millis() as u64;
        let classification = classify(&result);

        let Some(request) = AdvisoryRequest::from_classification(&classification) else {
            let status = classification.http_status().unwrap_or_default();
            info!(endpoint = %endpoint, status, elapsed_ms, "Endpoint healthy");
            return EndpointOutcome::Healthy {
                endpoint: endpoint.clone(),
                status,
            };
        };

        warn!(
            endpoint = %endpoint,
            kind = %request.failure_kind,
            code = %request.code_or_status,
            elapsed_ms,
            "Endpoint check failed"
        );

        let advisory = self.advisor.advise(&request).await;
        let advised = advisory.suggestion().is_some();

        let delivery = match compose(endpoint, &classification, &advisory) {
            Some(alert) => match self.notifier.deliver(&alert).await {
                Ok(()) => {
                    info!(
                        endpoint = %endpoint,
                        notifier = self.notifier.name(),
                        advised,
                        "Alert delivered"
                    );
                    Ok(())
                }
                Err(e) => {
                    error!(
                        endpoint = %endpoint,
                        notifier = self.notifier.name(),
                        error = %e,
                        "Alert delivery failed"
                    );
                    Err(e.to_string())
                }
            },
            None => Ok(()),
        };

        EndpointOutcome::Failed {
            classification,
            advised,
            delivery,
        }
    }
}
