use thiserror::Error;

/// Message fragments the search service uses when it rejects a filter or
/// order-by expression. Only these trigger the unfiltered retry.
pub const FILTER_SYNTAX_ERRORS: [&str; 4] = [
    "Unsupported field",
    "Invalid filter syntax",
    "Unsupported rhs value",
    "Parsing filter failed",
];

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Generation failed: {0}")]
    GenerationError(String),

    #[error("Search request rejected: {message}")]
    InvalidArgument { message: String },

    #[error("Search failed with status {status}: {message}")]
    SearchError { status: u16, message: String },

    #[error("Upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed upstream response: {0}")]
    InvalidResponse(String),

    #[error("Credentials unavailable: {0}")]
    CredentialsError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Client {0} has been shut down")]
    ShutDown(&'static str),
}

impl AppError {
    /// True when the search service rejected the request because of the
    /// filter or order-by expression, so it is worth retrying without them.
    pub fn is_filter_syntax_error(&self) -> bool {
        match self {
            AppError::InvalidArgument { message } => FILTER_SYNTAX_ERRORS
                .iter()
                .any(|phrase| message.contains(phrase)),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
