use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_STAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, never earlier than the previous stamp handed out by this process.
///
/// Wall-clock adjustments backwards are absorbed by repeating the last stamp.
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let previous = LAST_STAMP_MICROS.fetch_max(wall, Ordering::AcqRel);
    let stamp = previous.max(wall);
    DateTime::from_timestamp_micros(stamp).unwrap_or_else(Utc::now)
}
