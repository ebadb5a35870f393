// src/services/auth.rs
//
// Emissão e validação do token de sessão. O token carrega SÓ a
// identidade (sub): cargo e permissões são relidos do banco a cada
// requisição pelo guard, então o token nunca fica defasado.

use std::sync::Arc;

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PrincipalStore;
use crate::models::auth::{Claims, Identity};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn PrincipalStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn PrincipalStore>, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();
        // Verificação de senha em thread separada (bcrypt é pesado).
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("falha na task de verificação de senha: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub fn decode_identity(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(Identity {
            user_id: token_data.claims.sub,
        })
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
