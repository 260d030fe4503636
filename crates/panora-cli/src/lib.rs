use std::path::PathBuf;

use panora_core::{AppError, BookmarkFilter, ErrorMetadata};
use panora_services::sanitize_filename;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI.
///
/// `RUST_LOG` overrides the default `panora=info` filter. Logs go to stderr
/// so stdout stays machine-readable.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panora=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{}", out);
    Ok(())
}

pub fn parse_bookmark_filter(value: &str) -> Result<BookmarkFilter, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

/// Where `download` writes when no `--output` is given: the recorded name
/// reduced to a single segment in the working directory.
pub fn default_download_path(name: &str) -> PathBuf {
    PathBuf::from(sanitize_filename(name))
}

/// Client-facing error body; sensitive details stay in the logs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error: String,
    pub code: &'static str,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.client_message(),
            code: err.error_code(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
        }
    }
}

/// Exit status for a failed command: 2 for caller mistakes, 1 otherwise.
pub fn exit_code(err: &AppError) -> i32 {
    match err.http_status_code() {
        400..=499 => 2,
        _ => 1,
    }
}
