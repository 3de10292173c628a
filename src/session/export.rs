//! Export view of a session's messages
//!
//! Messages carry no individual send time, so export synthesizes one per
//! message by spreading the session's observed duration evenly across the
//! message sequence. The result is non-decreasing but approximate.

use super::Message;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Serializable, timestamped message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMessage {
    pub role: String,
    pub content: String,
    /// RFC 3339 when serialized
    pub timestamp: DateTime<Utc>,
}

/// Build export records for `messages`.
///
/// - never started: every message gets `now`
/// - exactly one message: `start`
/// - otherwise: linear interpolation from `start` to `end` (or `now` while
///   the session is still open) by `index / (count - 1)`
pub(crate) fn export_messages(
    messages: &[Message],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<ExportedMessage> {
    let count = messages.len();
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| ExportedMessage {
            role: message.role().to_string(),
            content: message.content().to_string(),
            timestamp: synthetic_timestamp(index, count, start, end, now),
        })
        .collect()
}

fn synthetic_timestamp(
    index: usize,
    count: usize,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let Some(start) = start else {
        return now;
    };
    if count <= 1 {
        return start;
    }

    let end = end.unwrap_or(now);
    let elapsed = end - start;
    // Interpolate in nanoseconds; fall back to microseconds for spans too
    // long to express in i64 nanoseconds.
    let (total, unit): (i128, fn(i64) -> Duration) = match elapsed.num_nanoseconds() {
        Some(ns) => (i128::from(ns), Duration::nanoseconds),
        None => (
            i128::from(elapsed.num_microseconds().unwrap_or(i64::MAX)),
            Duration::microseconds,
        ),
    };
    #[allow(clippy::cast_possible_wrap)] // message counts are far below i128::MAX
    let offset = total * index as i128 / (count - 1) as i128;
    let offset = i64::try_from(offset).unwrap_or(if offset < 0 { i64::MIN } else { i64::MAX });
    start + unit(offset)
}
