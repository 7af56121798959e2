use chrono::{DateTime, Utc};
use std::backtrace::Backtrace;
use std::error::Error;

pub const FUNCTION_NAME: &str = "Sine Function";

/// Extraction pipeline run messages are capped at this many characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;
const TRUNCATED_KEEP_CHARS: usize = 995;
const ELLIPSIS: &str = "...";

/// Cap a status message to [`MAX_MESSAGE_CHARS`], counting characters, not bytes.
pub fn truncate_message(msg: &str) -> String {
    if msg.chars().count() <= MAX_MESSAGE_CHARS {
        return msg.to_string();
    }
    let mut out: String = msg.chars().take(TRUNCATED_KEEP_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

pub fn format_start(start: &DateTime<Utc>) -> String {
    start.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}

pub fn success_message(num_points: usize, start: &DateTime<Utc>, ts_external_id: &str) -> String {
    format!(
        "Function: {}: complete -  Number of data points : {} created from : {} for time series: {}",
        FUNCTION_NAME,
        num_points,
        format_start(start),
        ts_external_id
    )
}

/// Full failure text: the error, its source chain and a backtrace of the reporting site.
pub fn failure_message(err: &(dyn Error + 'static)) -> String {
    let mut chain = String::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!("caused by: {}\n", cause));
        source = cause.source();
    }

    format!(
        "Function: {}: failed - message: {:?} - {}{}",
        FUNCTION_NAME,
        err,
        chain,
        Backtrace::force_capture()
    )
}
