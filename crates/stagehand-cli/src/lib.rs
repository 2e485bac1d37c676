use serde::Serialize;
use stagehand_core::{AppError, ErrorMetadata};
use std::path::Path;

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays JSON;
/// `json` switches the log lines themselves to JSON (production).
pub fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Name an uploaded file is staged under: the last path component.
pub fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// Client-facing shape of a failed command
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
}

impl ErrorBody {
    pub fn from_app_error(err: &AppError) -> Self {
        Self {
            error: err.error_code(),
            message: err.client_message(),
            status: err.http_status_code(),
            suggested_action: err.suggested_action(),
        }
    }
}
