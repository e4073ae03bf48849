use crmkit_core::{CsvRow, ErrorMetadata, Notice, NoticeLevel, Notifier, PipelineError};
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
///
/// `CRMKIT_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CRMKIT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false).without_time())
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .init();
    }
}

/// Prints notices to stderr, one line each.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", format_notice(&notice));
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{}] {}: {}", tag, notice.title, notice.message)
}

/// "hint: <action>" line for errors that suggest one.
pub fn format_hint(err: &PipelineError) -> Option<String> {
    err.suggested_action().map(|action| format!("hint: {}", action))
}

fn pad(cell: &str, width: usize) -> String {
    format!("{:<width$}", cell, width = width)
}

/// Render rows as a fixed-width table over `headers`.
pub fn render_table(headers: &[String], rows: &[CsvRow], column_width: usize) -> String {
    let mut out = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .map(|h| pad(&truncate_string(h, column_width), column_width))
        .collect();
    out.push_str(header_line.join(" ").trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(headers.len() * (column_width + 1)));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                let value = row.get(h).map(String::as_str).unwrap_or("");
                pad(&truncate_string(value, column_width), column_width)
            })
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}
