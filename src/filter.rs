use chrono::{DateTime, Timelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const INVALID_TIME_MARKER: &str = "Invalid Time, unable to parse date: ";

static RFC3339_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2}))")
        .expect("RFC 3339 pattern is valid")
});

enum ScanState {
    Scanning,
    Found(usize),
}

/// Drop every log line written before `start`.
///
/// Controller logs mix JSON and plain text, so lines are scanned for the first
/// RFC 3339 timestamp anywhere in the line. The first line whose timestamp is
/// at or after `start` is the cut point: it and everything after it are kept.
/// Lines that look like a timestamp but do not parse are reported with a
/// marker line ahead of the kept tail. Without a cut point the result is empty.
pub fn filter_logs(logs: &str, start: DateTime<Utc>) -> String {
    let lines: Vec<&str> = logs.split('\n').collect();
    let mut invalid = Vec::new();
    let mut state = ScanState::Scanning;

    for (pos, line) in lines.iter().enumerate() {
        let Some(stamp) = RFC3339_PATTERN.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        // chrono accepts second 60 as a leap second, treat it as out of range
        let parsed = DateTime::parse_from_rfc3339(stamp.as_str())
            .ok()
            .filter(|ts| ts.nanosecond() < 1_000_000_000);
        match parsed {
            Some(ts) if ts.with_timezone(&Utc) >= start => {
                state = ScanState::Found(pos);
                break;
            }
            Some(_) => {}
            None => invalid.push(format!("{}{}", INVALID_TIME_MARKER, line)),
        }
    }

    match state {
        ScanState::Scanning => String::new(),
        ScanState::Found(pos) => invalid
            .iter()
            .map(String::as_str)
            .chain(lines[pos..].iter().copied())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
