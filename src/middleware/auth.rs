// src/middleware/auth.rs
//
// Decodifica o Bearer token e insere a Identity nas extensions.
// Aqui NÃO se carrega permissão nenhuma: isso é papel do guard, que
// faz a leitura fresca do banco a cada requisição.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let identity = app_state.auth_service.decode_identity(token)?;
            request.extensions_mut().insert(identity);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}
