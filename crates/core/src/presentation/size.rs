//! Human-readable sizes and file-type hints.

/// Placeholder shown when a size is missing or zero.
pub const UNKNOWN_SIZE: &str = "(unknown size)";

const DECIMAL_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const BINARY_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

const VIDEO_EXTENSIONS: [&str; 4] = [".mkv", ".mp4", ".avi", ".mov"];
const AUDIO_EXTENSIONS: [&str; 4] = [".mp3", ".flac", ".wav", ".m4a"];

/// Format a byte count with decimal (powers of 1000) units, as indexers report sizes.
///
/// `1_500_000_000` becomes `"1.50 GB"`, `512` becomes `"512 Bytes"`.
pub fn natural_size(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return UNKNOWN_SIZE.to_string();
    };

    if bytes == 1 {
        return "1 Byte".to_string();
    }
    if bytes < 1000 {
        return format!("{} Bytes", bytes);
    }

    let value = bytes as f64;
    let mut unit = 1000f64;
    for suffix in DECIMAL_UNITS {
        if value < unit * 1000.0 {
            return format!("{:.2} {}", value / unit, suffix);
        }
        unit *= 1000.0;
    }
    format!("{:.2} {}", value / (unit / 1000.0), DECIMAL_UNITS[DECIMAL_UNITS.len() - 1])
}

/// Format a byte count with binary (powers of 1024) units, as torrent files are listed.
///
/// Gigabytes and terabytes keep two decimals, smaller units are truncated to
/// whole numbers. Missing and zero sizes render as [`UNKNOWN_SIZE`].
pub fn binary_size(bytes: Option<u64>) -> String {
    let bytes = match bytes {
        Some(b) if b > 0 => b,
        _ => return UNKNOWN_SIZE.to_string(),
    };

    let mut size = bytes as f64;
    let mut unit = BINARY_UNITS[0];
    for (i, candidate) in BINARY_UNITS.iter().enumerate() {
        unit = *candidate;
        if size < 1024.0 || i == BINARY_UNITS.len() - 1 {
            break;
        }
        size /= 1024.0;
    }

    match unit {
        "GB" | "TB" => format!("{:.2} {}", size, unit),
        _ => format!("{} {}", size as u64, unit),
    }
}

pub fn is_video(file_title: &str) -> bool {
    let lower = file_title.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

pub fn is_audio(file_title: &str) -> bool {
    let lower = file_title.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

/// Icon prefixed to a file row in a torrent listing.
pub fn file_icon(file_title: &str) -> &'static str {
    if is_video(file_title) {
        "🎬"
    } else if is_audio(file_title) {
        "🎧"
    } else {
        "▶"
    }
}
