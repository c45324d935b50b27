//! Display helpers for file metadata: sizes, dates, and type classification.

use chrono::{Local, TimeZone};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Broad category of a file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Pdf,
    Text,
    Audio,
    Other,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("text") {
            Self::Text
        } else if mime.contains("audio") {
            Self::Audio
        } else {
            Self::Other
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Image => "🖼",
            Self::Video => "🎥",
            Self::Pdf => "📄",
            Self::Text => "📝",
            Self::Audio => "🎵",
            Self::Other => "📁",
        }
    }

    /// Images and videos get a zoomable preview in the viewer.
    pub fn is_previewable(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Formats a byte count using 1024-based units with at most two decimals,
/// e.g. `1536` becomes `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    format!("{} {}", trim_decimals(value), SIZE_UNITS[exponent])
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Formats a modification timestamp in local time, e.g. `"Jan 5, 2024, 03:04 PM"`.
pub fn format_date(epoch_millis: i64) -> String {
    format_date_in(epoch_millis, &Local)
}

pub fn format_date_in<Tz: TimeZone>(epoch_millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(epoch_millis).single() {
        Some(datetime) => datetime.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "Unknown".to_string(),
    }
}
