//! HTML formatting helpers for bot notices.
//!
//! Notices use HTML parse mode; generated coaching text is sent as plain text.

use crate::training_log::SessionRecord;

/// Escape special HTML characters in user-provided text.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Confirmation shown after a session is appended.
pub fn format_logged(record: &SessionRecord) -> String {
    format!(
        "Logged: <b>{}</b> \u{2013} {}",
        escape_html(&record.kind),
        escape_html(&record.details)
    )
}

/// Usage line for `/log`.
pub fn log_usage() -> String {
    "Usage: /log &lt;type&gt; | &lt;details&gt; | [avg_hr] | [avg_split] | [meters] | [rpe] | [notes]"
        .to_owned()
}

/// Usage line for `/ask`.
pub fn ask_usage() -> String {
    "Usage: /ask &lt;question&gt;".to_owned()
}
