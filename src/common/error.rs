use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::menu::MenuStatus;
use crate::rbac::catalog::PermissionKey;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// As mensagens visíveis na API ficam em inglês (contrato do frontend);
// o detalhe interno fica no log via `tracing`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação do payload")]
    Payload(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Validation(String),

    #[error("Sem sessão autenticada")]
    Unauthorized,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // Carrega a chave que faltou, para o operador diagnosticar o 403.
    #[error("Permissão ausente: {0}")]
    MissingPermission(PermissionKey),

    #[error("Cargo do alvo é igual ou superior ao do autor")]
    CannotManageUser,

    #[error("Cargo atribuído é igual ou superior ao do autor")]
    CannotAssignRole,

    // Cobre tanto o recurso inexistente quanto o recurso de outro tenant:
    // a resposta externa é a mesma de propósito (não vaza existência).
    #[error("Recurso não encontrado (ou fora do tenant)")]
    NotFound,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: MenuStatus, to: MenuStatus },

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::Payload(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized | AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            AppError::MissingPermission(key) => (
                StatusCode::FORBIDDEN,
                format!("Insufficient permissions: requires '{key}'"),
            ),
            AppError::CannotManageUser => (
                StatusCode::FORBIDDEN,
                "Cannot manage users with equal or higher role".to_string(),
            ),
            AppError::CannotAssignRole => (
                StatusCode::FORBIDDEN,
                "Cannot assign a role equal to or higher than your own".to_string(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Access denied: Resource not found".to_string(),
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("Invalid menu status transition: {from} -> {to}"),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),

            // Todos os outros (Database, Bcrypt, Jwt, Internal) viram 500 genérico.
            // O detalhe fica só no log.
            e => {
                tracing::error!("Erro interno do servidor: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
