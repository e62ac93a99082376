use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::model::leave_request::LeaveStatus;
use crate::model::quantity::Quantity;

/// Error taxonomy of the leave core. Each variant maps to its own `error`
/// code in the response body so callers can render distinct messages instead
/// of one generic failure.
#[derive(Debug, Clone, Display, PartialEq)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "employee must have at least {} months of tenure", min_months)]
    TenureNotMet { min_months: u32 },

    #[display(
        fmt = "insufficient balance: requested {} day(s), only {} available",
        requested,
        available
    )]
    InsufficientBalance {
        requested: Quantity,
        available: Quantity,
    },

    #[display(fmt = "cannot {} a request in status '{}'", action, from)]
    InvalidStateTransition {
        from: LeaveStatus,
        action: &'static str,
    },

    #[display(fmt = "{}", _0)]
    NotAuthorized(&'static str),

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
}

impl LeaveError {
    pub fn code(&self) -> &'static str {
        match self {
            LeaveError::Validation(_) => "VALIDATION_ERROR",
            LeaveError::TenureNotMet { .. } => "TENURE_NOT_MET",
            LeaveError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LeaveError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            LeaveError::NotAuthorized(_) => "NOT_AUTHORIZED",
            LeaveError::NotFound(_) => "NOT_FOUND",
        }
    }
}

impl actix_web::error::ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::TenureNotMet { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeaveError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            LeaveError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            LeaveError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });

        // Balance failures carry the numbers the UI puts in the message.
        if let LeaveError::InsufficientBalance {
            requested,
            available,
        } = self
        {
            body["requested"] = json!(requested.as_days());
            body["available"] = json!(available.as_days());
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ResponseError;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            LeaveError::Validation("x".into()),
            LeaveError::TenureNotMet { min_months: 3 },
            LeaveError::InsufficientBalance {
                requested: Quantity::from_whole_days(2),
                available: Quantity::from_whole_days(1),
            },
            LeaveError::InvalidStateTransition {
                from: LeaveStatus::Rejected,
                action: "cancel",
            },
            LeaveError::NotAuthorized("nope"),
            LeaveError::NotFound("leave request"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn insufficient_balance_status_and_message() {
        let err = LeaveError::InsufficientBalance {
            requested: Quantity::from_whole_days(2),
            available: Quantity::from_whole_days(1),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "insufficient balance: requested 2.00 day(s), only 1.00 available"
        );
    }
}
