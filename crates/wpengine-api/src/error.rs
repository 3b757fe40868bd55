use thiserror::Error;
use usersync_core::DirectoryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized (401) for {path}")]
    Unauthorized { path: String },

    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ApiError> for DirectoryError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized { .. } => DirectoryError::Unauthorized,
            ApiError::Status { status, body, .. } => DirectoryError::Status {
                status,
                message: body,
            },
            ApiError::Decode { .. } => DirectoryError::Decode(e.to_string()),
            ApiError::Http(_) => DirectoryError::Transport(e.to_string()),
        }
    }
}
