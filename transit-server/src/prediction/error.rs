//! Prediction error types.

/// Errors from a prediction backend.
///
/// None of these reach the caller of a search: a failed prediction is
/// replaced with a neutral annotation.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// HTTP request failed (network error, connect timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("prediction service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not a valid prediction
    #[error("invalid prediction response: {0}")]
    Decode(String),

    /// No answer within the per-itinerary bound
    #[error("prediction timed out")]
    Timeout,
}
