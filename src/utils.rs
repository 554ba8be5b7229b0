use std::time::Duration;
use url::Url;

/// Parses and checks that a URL is fetchable over HTTP(S).
pub fn validate_url(url: &str) -> Result<Url, url::ParseError> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(url::ParseError::InvalidPort),
    }
}

/// Timestamped name for a downloadable workbook, e.g.
/// `menu_export_2026-08-23T14-02-55.xlsx`.
pub fn export_filename() -> String {
    format!(
        "menu_export_{}.xlsx",
        chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S")
    )
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds > 0 {
        format!("{}.{}s", seconds, millis / 100)
    } else {
        format!("{millis}ms")
    }
}
