use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use logchain_anchor::AnchorError;
use logchain_ledger::LedgerError;
use logchain_store::StoreError;
use logchain_types::TypeError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<AnchorError> for ServerError {
    fn from(err: AnchorError) -> Self {
        match err {
            AnchorError::Validation(msg) => Self::Validation(msg),
            AnchorError::NotFound(id) => Self::NotFound(format!("batch {id}")),
            AnchorError::Ledger(err) => Self::Ledger(err),
            AnchorError::Store(err) => Self::Store(err),
        }
    }
}

impl From<TypeError> for ServerError {
    fn from(err: TypeError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_)
            | Self::Store(StoreError::NotFound(_))
            | Self::Ledger(LedgerError::EntryNotFound { .. })
            | Self::Ledger(LedgerError::TxNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Ledger(LedgerError::SequenceConflict { .. })
            | Self::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
            Self::Ledger(LedgerError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Ledger(LedgerError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) | Self::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            Self::Store(StoreError::DuplicateId(_)) => "DUPLICATE_BATCH",
            Self::Store(StoreError::Unavailable(_)) => "STORE_UNAVAILABLE",
            Self::Ledger(LedgerError::Unavailable(_)) => "LEDGER_UNAVAILABLE",
            Self::Ledger(LedgerError::Timeout { .. }) => "LEDGER_TIMEOUT",
            Self::Ledger(LedgerError::SequenceConflict { .. }) => "SEQUENCE_CONFLICT",
            Self::Ledger(LedgerError::EntryNotFound { .. } | LedgerError::TxNotFound(_)) => "NOT_FOUND",
            Self::Ledger(_) => "LEDGER_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the client may retry the same request later.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub recoverable: bool,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
            recoverable: self.is_recoverable(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use logchain_types::{BatchId, TxRef};
    use std::time::Duration;

    async fn body(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_is_bad_request() {
        let (status, json) = body(ServerError::Validation("merkle_root".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["recoverable"], false);
    }

    #[tokio::test]
    async fn ledger_timeout_is_gateway_timeout_and_recoverable() {
        let err = ServerError::Ledger(LedgerError::Timeout {
            tx: TxRef::from_raw([1; 32]),
            waited: Duration::from_secs(600),
        });
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["code"], "LEDGER_TIMEOUT");
        assert_eq!(json["recoverable"], true);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServerError::Ledger(LedgerError::Unavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServerError::Ledger(LedgerError::SequenceConflict { expected: 2, submitted: 1 }).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::from(AnchorError::NotFound(BatchId::new())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Ledger(LedgerError::Rejected("bad sig".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
