use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// File name for a recording started at `at`.
///
/// `recording_<ISO-8601 with ':' and '.' replaced by '-'>.<extension>`
pub fn recording_file_name(at: DateTime<Utc>, extension: &str) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("recording_{stamp}.{extension}")
}

/// Human-readable name for a recording started at `at`.
pub fn recording_display_name(at: DateTime<Utc>) -> String {
    format!("Recording {}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Issues millisecond-timestamp ids, bumping past collisions.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub(crate) fn next(&self, at: DateTime<Utc>) -> String {
        let wanted = at.timestamp_millis();
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let issued = wanted.max(current + 1);
            match self
                .last
                .compare_exchange(current, issued, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return issued.to_string(),
                Err(actual) => current = actual,
            }
        }
    }
}
