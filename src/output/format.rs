//! Human-readable byte sizes.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;

/// Format a byte count as `B`, `KB` or `MB`. Missing sizes count as zero.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: Option<u64>) -> String {
    let bytes = bytes.unwrap_or(0);

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
