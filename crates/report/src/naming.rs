// Report file naming

use chrono::NaiveDateTime;

/// `recon_report_<source>_<target>_<YYYY-MM-DD>_<HH_MM_SS>`
pub fn report_stem(source: &str, target: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "recon_report_{}_{}_{}",
        sanitize(source),
        sanitize(target),
        timestamp.format("%Y-%m-%d_%H_%M_%S")
    )
}

/// Anything outside `[A-Za-z0-9_-]` becomes `_`. Empty names become `unnamed`.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
