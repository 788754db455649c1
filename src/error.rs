//! Error types for the college basketball data collector

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to parse numeric id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("{var} is not set; add it to .env.local or the environment")]
    MissingEnv { var: String },

    #[error("REST {method} {url} failed ({status}): {detail}")]
    Rest {
        method: String,
        url: String,
        status: u16,
        detail: String,
    },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        SyncError::Storage {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_names_the_variable() {
        let err = SyncError::MissingEnv {
            var: "CBB_SYNC_REST_URL".to_string(),
        };
        assert!(err.to_string().contains("CBB_SYNC_REST_URL"));
    }

    #[test]
    fn rest_error_carries_status_and_detail() {
        let err = SyncError::Rest {
            method: "POST".to_string(),
            url: "https://example.test/rest/v1/games".to_string(),
            status: 409,
            detail: "duplicate key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("409"));
        assert!(text.contains("duplicate key"));
    }
}
