use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::records::FileRecord;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Text,
    Archive,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> FileKind {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else if mime_type.starts_with("video/") {
            FileKind::Video
        } else if mime_type.starts_with("audio/") {
            FileKind::Audio
        } else if mime_type.starts_with("text/") {
            FileKind::Text
        } else if mime_type.contains("zip")
            || mime_type.contains("compressed")
            || mime_type.contains("archive")
        {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }
}

/// Human readable size with binary multiples, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Distance between `then` and `now` in words, with an "ago"/"in" suffix.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let future = delta.num_seconds() < 0;
    let delta = if future { -delta } else { delta };

    let words = if delta.num_seconds() < 60 {
        "less than a minute".to_string()
    } else if delta.num_minutes() < 45 {
        plural(delta.num_minutes(), "minute")
    } else if delta.num_hours() < 24 {
        format!("about {}", plural(delta.num_hours().max(1), "hour"))
    } else if delta.num_days() < 30 {
        plural(delta.num_days(), "day")
    } else if delta.num_days() < 365 {
        plural(delta.num_days() / 30, "month")
    } else {
        plural(delta.num_days() / 365, "year")
    };

    if future {
        format!("in {}", words)
    } else {
        format!("{} ago", words)
    }
}

/// A file as the explorer grid shows it.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    #[serde(flatten)]
    pub record: FileRecord,
    pub kind: FileKind,
    pub size_label: String,
    pub age: String,
    pub previewable: bool,
}

pub fn summarize(record: &FileRecord, now: DateTime<Utc>) -> FileSummary {
    let kind = FileKind::from_mime(&record.mime_type);
    FileSummary {
        kind,
        size_label: format_file_size(record.size),
        age: format_age(record.last_modified, now),
        previewable: kind == FileKind::Image && record.url.is_some(),
        record: record.clone(),
    }
}
