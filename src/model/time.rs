//! All article timestamps are normalized to Indian Standard Time (+05:30).

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Kolkata;

const IST_OFFSET_SECS: i32 = 5 * 3600 + 1800;

/// The fixed +05:30 offset articles are stored with.
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap()
}

/// Current wall-clock time in IST.
pub fn now_ist() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&Kolkata).fixed_offset()
}

/// Convert any timezone-aware timestamp to IST.
pub fn to_ist<Tz: TimeZone>(dt: DateTime<Tz>) -> DateTime<FixedOffset> {
    dt.with_timezone(&ist_offset())
}

/// Naive timestamps are assumed to already be IST wall-clock time.
pub fn naive_as_ist(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    ist_offset()
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| Utc::now().with_timezone(&ist_offset()))
}

/// Best-effort parse of the date strings upstream sources emit.
///
/// Tries RFC 3339, RFC 2822 (RSS pubDate), then a couple of bare formats
/// which are assumed IST. Returns None when nothing matches.
pub fn parse_source_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(to_ist(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(to_ist(dt));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive_as_ist(naive));
        }
    }
    None
}
