//! Time utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix epoch time in whole seconds
pub fn epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Format a second count as a `mm:ss` countdown clock
///
/// Minutes are not wrapped at an hour; a 90-minute focus phase reads
/// `90:00`.
///
/// # Examples
///
/// ```
/// use pomod_common::time::format_clock;
///
/// assert_eq!(format_clock(1500), "25:00");
/// assert_eq!(format_clock(65), "01:05");
/// assert_eq!(format_clock(0), "00:00");
/// ```
pub fn format_clock(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
