use axum::http::StatusCode;

/// Failure of a request against the hero API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Http failure during request to {url}: {message}")]
    Transport { url: String, message: String },

    /// The backend answered with a non-success status.
    #[error("Http failure response for {url}: {status}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("Http failure during parsing for {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode request body for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
