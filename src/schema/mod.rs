use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::ApiError;

pub mod admin;
pub mod contact;
pub mod course;
pub mod instructor;

/// Response envelope shared by every endpoint. The `status` field mirrors
/// the HTTP status code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: String,
    pub status: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> actix_web::HttpResponse {
        actix_web::HttpResponse::Ok().json(ApiResponse {
            data: Some(data),
            error: None,
            message: message.into(),
            status: 200,
        })
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> actix_web::HttpResponse {
        actix_web::HttpResponse::Ok().json(ApiResponse::<()> {
            data: None,
            error: None,
            message: message.into(),
            status: 200,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

/// Caller identity attached to the request by the auth guard.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub username: String,
}

/// Runs the payload's declared rules and surfaces the first failing field
/// as a client error, e.g. `hy.phases: at least one phase is required`.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::Validation(first_error(&errors)))
}

fn first_error(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_errors("", errors, &mut messages);
    messages
        .into_iter()
        .next()
        .unwrap_or_else(|| "Invalid payload.".to_string())
}

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    // HashMap iteration order is arbitrary; sort so the reported field is stable.
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by_key(|entry| entry.0);

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(error) = field_errors.first() {
                    let message = error.message.as_deref().unwrap_or(&error.code);
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "is required"))]
        name: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(nested)]
        inner: Inner,
        #[validate(length(min = 3, message = "must be at least 3 characters long"))]
        username: String,
    }

    #[test]
    fn valid_payload_passes() {
        let payload = Outer {
            inner: Inner { name: "ok".into() },
            username: "emma".into(),
        };
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn first_error_names_the_field() {
        let payload = Outer {
            inner: Inner { name: "ok".into() },
            username: "ab".into(),
        };
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.to_string(), "username: must be at least 3 characters long");
    }

    #[test]
    fn nested_errors_carry_the_path() {
        let payload = Outer {
            inner: Inner { name: String::new() },
            username: "emma".into(),
        };
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.to_string(), "inner.name: is required");
    }
}
