use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ListingError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("cannot read image source {}: {source}", .path.display())]
    ImageSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image path does not end with .jpg")]
    NotJpeg(String),

    #[error("invalid image filename: {0}")]
    InvalidImageName(String),

    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("missing form field: {0}")]
    MissingField(&'static str),

    #[error("malformed form: {0}")]
    MalformedForm(String),

    #[error("default image not found at {}", .0.display())]
    MissingDefaultImage(PathBuf),
}

impl IntoResponse for ListingError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ListingError::NotJpeg(_)
            | ListingError::InvalidImageName(_)
            | ListingError::InvalidItemId(_)
            | ListingError::MissingField(_)
            | ListingError::MalformedForm(_)
            | ListingError::ImageSource { .. } => StatusCode::BAD_REQUEST,
            ListingError::DatabaseError(_)
            | ListingError::IoError(_)
            | ListingError::MissingDefaultImage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

/// `{"message": ...}` body shared by confirmations and failures.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
