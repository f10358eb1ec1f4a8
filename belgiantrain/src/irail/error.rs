//! iRail client error types.

/// Errors from the iRail HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum IrailError {
    /// Network failure, timeout or unreadable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Non-success status other than 404 and 429.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by iRail API")]
    RateLimited,

    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}
