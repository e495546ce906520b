// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Erros do serviço de persistência (o "banco hospedado").
// O motor de classificação nunca vê estes erros.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Lançamento {0} não encontrado")]
    NotFound(Uuid),

    #[error("Violação de restrição: {0}")]
    Constraint(String),

    #[error("Serviço de dados indisponível: {0}")]
    Unavailable(String),
}

// Classes SQLSTATE causadas pelo dado enviado, não pelo serviço:
// 22 = dado inválido (ex.: 22003, valor fora do NUMERIC), 23 = integridade
fn is_rejected_data(sqlstate: &str) -> bool {
    sqlstate.starts_with("22") || sqlstate.starts_with("23")
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let rejected = db_err.code().is_some_and(|code| is_rejected_data(&code));
            if db_err.is_unique_violation() || rejected {
                return StoreError::Constraint(db_err.message().to_string());
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

// Nosso tipo de erro da camada HTTP, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                format!("Lançamento {} não encontrado.", id),
            ),
            AppError::Store(StoreError::Constraint(detail)) => {
                tracing::warn!("Violação de restrição no banco: {}", detail);
                (StatusCode::CONFLICT, "O lançamento viola uma restrição do banco.".to_string())
            }
            AppError::Store(StoreError::Unavailable(detail)) => {
                tracing::error!("🔥 Falha no serviço de dados: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Serviço de dados indisponível. Tente novamente.".to_string(),
                )
            }
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            e @ AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
