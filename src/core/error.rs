//! Gestione errori - Errore unico dell'applicazione e conversioni
//!
//! `AppError` porta con sé lo status HTTP, la ragione sintetica e un messaggio
//! (singolo oppure lista, per gli errori di validazione). Implementa
//! `IntoResponse` per REST e si converte in `async_graphql::Error` per GraphQL.

use async_graphql::ErrorExtensions;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::fmt;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Messaggio dell'errore: stringa singola o lista (validazione)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    List(Vec<String>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<ErrorMessage>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: &'static str,
    message: Option<ErrorMessage>,
}

impl AppError {
    pub fn new(status: StatusCode, error: &'static str) -> Self {
        Self {
            status,
            error,
            message: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.message = Some(ErrorMessage::Single(details.into()));
        self
    }

    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.message = Some(ErrorMessage::List(messages));
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> Option<&ErrorMessage> {
        self.message.as_ref()
    }

    // Common error constructors
    pub fn not_found(error: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn bad_request(error: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    pub fn forbidden(error: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, error)
    }

    pub fn unprocessable_entity(error: &'static str) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error)
    }

    pub fn precondition_failed(error: &'static str) -> Self {
        Self::new(StatusCode::PRECONDITION_FAILED, error)
    }

    pub fn precondition_required(error: &'static str) -> Self {
        Self::new(StatusCode::PRECONDITION_REQUIRED, error)
    }

    pub fn payload_too_large(error: &'static str) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, error)
    }

    pub fn internal_server_error(error: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn service_unavailable(error: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, error)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(ErrorMessage::Single(details)) => f.write_str(details),
            Some(ErrorMessage::List(messages)) => f.write_str(&messages.join(", ")),
            None => f.write_str(self.error),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::unprocessable_entity("Duplicate entry").with_details(db_err.message().to_string())
            }

            sqlx::Error::Database(_) => Self::bad_request("Database error"),

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            _ => {
                error!("Unexpected database error: {:?}", err);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        Self::internal_server_error("Internal server error").with_details(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        Self::unprocessable_entity("Validation error").with_messages(validation_messages(&err))
    }
}

/// Appiattisce gli errori di validazione (anche annidati) in voci `"<campo> <messaggio>"`,
/// con i campi annidati nella forma `modell.modell` o `abbildungen[0].beschriftung`.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();
    messages
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let text = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{} {}", path, text));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            status_code: self.status.as_u16(),
            error: self.error,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

// async-graphql ha già `From<T: Display>` per `Error`: il codice si aggiunge con `extend()`
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "FORBIDDEN",
            status if status.is_client_error() => "BAD_USER_INPUT",
            _ => "INTERNAL_SERVER_ERROR",
        };
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Inner {
        #[validate(length(max = 3, message = "zu lang"))]
        name: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(range(min = 0, message = "muss >= 0 sein"))]
        ps: i32,
        #[validate(nested)]
        inner: Inner,
    }

    #[test]
    fn test_validation_messages_nested_paths() {
        let value = Outer {
            ps: -1,
            inner: Inner {
                name: "viel zu lang".to_string(),
            },
        };
        let errors = value.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert_eq!(
            messages,
            vec!["inner.name zu lang".to_string(), "ps muss >= 0 sein".to_string()]
        );
    }

    #[test]
    fn test_validation_message_falls_back_to_code() {
        let mut errors = ValidationErrors::new();
        errors.add("datum", ValidationError::new("datum_invalid"));
        assert_eq!(validation_messages(&errors), vec!["datum datum_invalid".to_string()]);
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::not_found("Not found")
            .with_details("Es gibt kein Auto mit der ID 999.")
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["error"], "Not found");
        assert_eq!(body["message"], "Es gibt kein Auto mit der ID 999.");
    }

    #[tokio::test]
    async fn test_validation_error_response_is_list() {
        let err = AppError::from({
            let mut errors = ValidationErrors::new();
            errors.add("ps", ValidationError::new("range"));
            errors
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_array());
        assert_eq!(body["message"][0], "ps range");
    }

    #[test]
    fn test_graphql_error_codes() {
        let gql: async_graphql::Error = AppError::not_found("Not found").with_details("x").extend();
        assert_eq!(gql.message, "x");
        let code = gql.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("BAD_USER_INPUT")));

        let gql: async_graphql::Error = AppError::forbidden("Insufficient role").extend();
        let code = gql.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("FORBIDDEN")));

        let gql: async_graphql::Error = AppError::internal_server_error("boom").extend();
        let code = gql.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("INTERNAL_SERVER_ERROR")));
    }
}
