use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMessage {
    pub field_name: String,
    pub message: String,
}

impl FieldMessage {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    DatabaseError(sqlx::Error),
    MigrationError(sqlx::migrate::MigrateError),
    ConfigError(String),
    InternalError(String),
    NotFound(String),
    BadRequest(String),
    IntegrityViolation(String),
    Unauthorized(String),
    Forbidden(String),
    Validation(Vec<FieldMessage>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_)
            | AppError::MigrationError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::IntegrityViolation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn not_found() -> Self {
        AppError::NotFound("Recurso não encontrado".to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Erro de banco de dados: {}", e),
            AppError::MigrationError(e) => write!(f, "Erro de migração: {}", e),
            AppError::ConfigError(msg) => write!(f, "Erro de configuração: {}", msg),
            AppError::InternalError(msg) => write!(f, "Erro interno: {}", msg),
            AppError::NotFound(msg) => write!(f, "Não encontrado: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Requisição inválida: {}", msg),
            AppError::IntegrityViolation(msg) => write!(f, "Integridade: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Não autorizado: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Acesso negado: {}", msg),
            AppError::Validation(errors) => write!(f, "Dados inválidos: {} campo(s)", errors.len()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::MigrationError(err)
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<FieldMessage> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();
                field_errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldMessage::new(field.clone(), message)
                })
            })
            .collect();

        messages.sort_by(|a, b| {
            a.field_name
                .cmp(&b.field_name)
                .then_with(|| a.message.cmp(&b.message))
        });

        AppError::Validation(messages)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_message, errors) = match self {
            AppError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Erro de banco de dados".to_string(), None)
            }
            AppError::MigrationError(ref e) => {
                tracing::error!("Migration error: {:?}", e);
                ("Erro de banco de dados".to_string(), None)
            }
            AppError::ConfigError(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                ("Erro de configuração do servidor".to_string(), None)
            }
            AppError::InternalError(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Erro interno do servidor".to_string(), None)
            }
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::IntegrityViolation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => (msg, None),
            AppError::Validation(errors) => ("Dados inválidos".to_string(), Some(errors)),
        };

        let mut body = json!({
            "timestamp": Utc::now(),
            "status": status.as_u16(),
            "error": error_message,
        });

        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}
