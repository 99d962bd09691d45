//! Deterministic demo data for the in-memory backend.
//!
//! Rows are derived from their index with a small integer hash, so the
//! same `count` and `now` always yield the same data set.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::json;

use super::StoreRow;
use crate::domain::FailureStatus;

/// Organisations present in demo data, also offered by the filter sidebar.
pub const DEMO_ORG_IDS: [&str; 5] = ["org-001", "org-002", "org-003", "org-004", "org-005"];

const REGIONS: [&str; 3] = ["us-east-1", "eu-west-1", "ap-south-1"];

const MINUTES_PER_30_DAYS: u64 = 30 * 24 * 60;
const MINUTES_PER_7_DAYS: u64 = 7 * 24 * 60;

/// SplitMix64 finalizer; spreads consecutive indices over the full range.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn pick<T: Clone>(items: &[T], roll: u64) -> Option<T> {
    let len = u64::try_from(items.len()).ok()?;
    let idx = usize::try_from(roll.checked_rem(len)?).ok()?;
    items.get(idx).cloned()
}

fn minutes(n: u64) -> Duration {
    Duration::minutes(i64::try_from(n).unwrap_or(i64::MAX))
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds one demo row for `index`.
#[must_use]
pub fn demo_row(index: usize, now: DateTime<Utc>) -> StoreRow {
    let seed = mix(u64::try_from(index).unwrap_or(u64::MAX));
    let roll = |salt: u64| mix(seed ^ salt);

    let created = now - minutes(roll(1) % MINUTES_PER_30_DAYS);
    let end = (roll(2) % 10 >= 3).then(|| created + minutes(roll(3) % MINUTES_PER_7_DAYS));

    let org_id = pick(&DEMO_ORG_IDS, roll(4)).unwrap_or("org-001");
    let status = pick(&FailureStatus::KNOWN, roll(5)).unwrap_or(FailureStatus::Pending);
    let region = pick(&REGIONS, roll(6)).unwrap_or("us-east-1");
    let token = format!("{:09x}", roll(7) & 0xF_FFFF_FFFF);

    let mut payload = match roll(8) % 3 {
        0 => json!({
            "errorCode": "CONN_TIMEOUT",
            "message": "Connection timeout while establishing stream",
            "deviceId": format!("device-{token}"),
            "attempts": 3,
            "lastError": "Socket timeout after 30 seconds",
        }),
        1 => json!({
            "errorCode": "AUTH_FAILED",
            "message": "Authentication failed for stream connection",
            "userId": format!("user-{token}"),
            "authMethod": "oauth2",
            "reason": "Invalid token",
        }),
        _ => json!({
            "errorCode": "RATE_LIMIT",
            "message": "Rate limit exceeded for organization",
            "requestsPerMinute": 1500,
            "limit": 1000,
            "resetTime": iso(now),
        }),
    };
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("timestamp".to_string(), json!(iso(created)));
        obj.insert(
            "correlationId".to_string(),
            json!(format!("corr-{}-{index}", now.timestamp_millis())),
        );
        obj.insert(
            "metadata".to_string(),
            json!({ "version": "1.0", "source": "iot-gateway", "region": region }),
        );
    }

    StoreRow {
        id: format!("failure-{index:06}"),
        org_id: org_id.to_string(),
        failure_status: status.to_string(),
        created_date: iso(created),
        end_date: end.map(iso),
        failure_payload: Some(payload),
    }
}

/// Builds `count` demo rows, `failure-000000` onwards.
#[must_use]
pub fn demo_rows(count: usize, now: DateTime<Utc>) -> Vec<StoreRow> {
    (0..count).map(|i| demo_row(i, now)).collect()
}
