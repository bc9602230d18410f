//! # Application Error
//!
//! Maps domain errors to structured HTTP responses with proper
//! status codes and error bodies.
//!
//! Not-found maps to 404, validation failures to 422, lifecycle and
//! scheduling conflicts to 409, missing or bad credentials to 401.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use atrium_booking::{BookingError, SpaceError};
use atrium_catalog::{CatalogError, RequestError};
use atrium_compliance::{AuditError, ConsentError, RetentionError};
use atrium_contracts::engine::EngineError;
use atrium_contracts::{ContractError, ProposalError, RuleError};
use atrium_core::{CoreError, MoneyError};
use atrium_pricing::PricingError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication required.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// State conflict: lifecycle violation or schedule collision.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

// ─── Domain Error Mapping ────────────────────────────────────────────

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(_) => AppError::NotFound(err.to_string()),
            RequestError::InvalidTransition { .. } | RequestError::TerminalState { .. } => {
                AppError::Conflict(err.to_string())
            }
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<ContractError> for AppError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::NotFound(_) => AppError::NotFound(err.to_string()),
            ContractError::InvalidTransition { .. } | ContractError::TerminalState { .. } => {
                AppError::Conflict(err.to_string())
            }
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<RuleError> for AppError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<ProposalError> for AppError {
    fn from(err: ProposalError) -> Self {
        match err {
            ProposalError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProposalError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rule(inner) => inner.into(),
            EngineError::Contract(inner) => inner.into(),
            EngineError::Proposal(inner) => inner.into(),
            EngineError::ContractMismatch { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_) => AppError::NotFound(err.to_string()),
            BookingError::Conflict(_)
            | BookingError::InvalidTransition { .. }
            | BookingError::TerminalState { .. } => AppError::Conflict(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<SpaceError> for AppError {
    fn from(err: SpaceError) -> Self {
        match err {
            SpaceError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<ConsentError> for AppError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::NotFound(_) => AppError::NotFound(err.to_string()),
            ConsentError::AlreadyWithdrawn(_) => AppError::Conflict(err.to_string()),
            ConsentError::UnknownPurpose(_) => AppError::Validation(err.to_string()),
        }
    }
}

impl From<RetentionError> for AppError {
    fn from(err: RetentionError) -> Self {
        match err {
            RetentionError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        // A broken chain is an integrity incident, not a bad request.
        AppError::Internal(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(_) | CoreError::Money(_) => AppError::Validation(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        AppError::Validation(err.to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::BookingId;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("service".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_booking_conflict_maps_to_409() {
        let err: AppError = BookingError::Conflict(BookingId::new()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_lifecycle_violation_maps_to_409() {
        let err: AppError = ContractError::InvalidTransition {
            from: "DRAFT".into(),
            to: "EXPIRED".into(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let err: AppError = RuleError::EmptyName.into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
