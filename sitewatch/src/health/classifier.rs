//! プローブ結果の分類
//!
//! トランスポート失敗 → ConnectionFailure、ステータス >= 400 → HttpFailure、
//! それ以外（1xx〜3xx）→ Healthy。リダイレクトは区別しない。

use sitewatch_common::types::{Classification, ProbeResult, ProbeStatus};

/// この値以上のステータスコードを失敗とみなす
pub const HTTP_FAILURE_THRESHOLD: u16 = 400;

/// プローブ結果を分類する
pub fn classify(result: &ProbeResult) -> Classification {
    match &result.status {
        ProbeStatus::Transport(failure) => Classification::ConnectionFailure {
            reason_code: failure.kind,
            reason_text: failure.message.clone(),
            endpoint: result.endpoint.clone(),
        },
        ProbeStatus::Http(status) if *status >= HTTP_FAILURE_THRESHOLD => {
            Classification::HttpFailure {
                status: *status,
                endpoint: result.endpoint.clone(),
            }
        }
        ProbeStatus::Http(status) => Classification::Healthy { status: *status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sitewatch_common::types::{Endpoint, TransportErrorKind, TransportFailure};
    use std::time::Duration;

    fn probe_result(status: ProbeStatus) -> ProbeResult {
        ProbeResult {
            endpoint: Endpoint::new("https://example.com").unwrap(),
            status,
            elapsed: Duration::from_millis(12),
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_statuses_below_400_are_healthy() {
        for status in 100..=399u16 {
            let classification = classify(&probe_result(ProbeStatus::Http(status)));
            assert_eq!(classification, Classification::Healthy { status });
        }
    }

    #[test]
    fn test_statuses_from_400_are_http_failures() {
        for status in 400..=599u16 {
            match classify(&probe_result(ProbeStatus::Http(status))) {
                Classification::HttpFailure {
                    status: got,
                    endpoint,
                } => {
                    assert_eq!(got, status);
                    assert_eq!(endpoint.as_str(), "https://example.com");
                }
                other => panic!("status {status} classified as {:?}", other),
            }
        }
    }

    #[test]
    fn test_transport_failures_are_connection_failures() {
        for kind in [
            TransportErrorKind::Connect,
            TransportErrorKind::Dns,
            TransportErrorKind::Timeout,
            TransportErrorKind::Tls,
        ] {
            let result = probe_result(ProbeStatus::Transport(TransportFailure {
                kind,
                message: format!("{kind} failed"),
            }));
            match classify(&result) {
                Classification::ConnectionFailure {
                    reason_code,
                    reason_text,
                    ..
                } => {
                    assert_eq!(reason_code, kind);
                    assert_eq!(reason_text, format!("{kind} failed"));
                }
                other => panic!("expected ConnectionFailure, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_redirect_is_healthy() {
        let classification = classify(&probe_result(ProbeStatus::Http(302)));
        assert!(classification.is_healthy());
    }
}
