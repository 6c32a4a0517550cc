//! アラート作成
//!
//! エンドポイント・分類・アドバイザリ結果から通知用のアラートを組み立てる純粋関数。

use sitewatch_common::types::{AdvisoryResult, Alert, Classification, Endpoint};
use std::fmt::Write as _;

/// 診断セクションの見出し
pub const SUGGESTION_HEADER: &str = "--- Assistant suggestion ---";

const FOOTER: &str = "-- \nSent by sitewatch";

/// アラートを作成する
///
/// Healthyの場合はNoneを返す。アドバイザリが `Unavailable` の場合は
/// 診断セクションを丸ごと省略する。
pub fn compose(
    endpoint: &Endpoint,
    classification: &Classification,
    advisory: &AdvisoryResult,
) -> Option<Alert> {
    let (subject, details) = match classification {
        Classification::Healthy { .. } => return None,
        Classification::HttpFailure { status, .. } => (
            format!("[sitewatch] {} is DOWN (HTTP {})", endpoint, status),
            format!("Failure kind: HTTP\nStatus code:  {}\n", status),
        ),
        Classification::ConnectionFailure {
            reason_code,
            reason_text,
            ..
        } => (
            format!("[sitewatch] {} is UNREACHABLE ({})", endpoint, reason_code),
            format!(
                "Failure kind: Connection\nError code:   {}\nError:        {}\n",
                reason_code, reason_text
            ),
        ),
    };

    let mut body = String::new();
    let _ = writeln!(body, "Endpoint:     {}", endpoint);
    body.push_str(&details);

    if let AdvisoryResult::Suggestion(text) = advisory {
        let _ = write!(body, "\n{}\n{}\n", SUGGESTION_HEADER, text.trim_end());
    }

    body.push('\n');
    body.push_str(FOOTER);
    body.push('\n');

    Some(Alert {
        subject,
        body,
        advisory: Some(advisory.clone()),
    })
}
