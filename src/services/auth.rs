// src/services/auth.rs

use std::sync::Arc;

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthStatus, AuthStatusResponse, Claims, CredentialStore, User},
};

/// Sessão autenticada: o usuário e o id da sessão que guarda a planilha.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user: User,
    pub session_id: Uuid,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<CredentialStore>,
    jwt_secret: String,
    expiry_days: i64,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, jwt_secret: String, expiry_days: i64) -> Self {
        Self {
            credentials: Arc::new(credentials),
            jwt_secret,
            expiry_days,
        }
    }

    pub fn expiry_days(&self) -> i64 {
        self.expiry_days
    }

    pub fn find_user(&self, username: &str) -> Option<User> {
        self.credentials
            .usernames
            .get(username)
            .map(|entry| User::from_entry(username, entry))
    }

    /// Confere usuário e senha e abre uma nova sessão.
    pub async fn login_user(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let entry = self
            .credentials
            .usernames
            .get(username)
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = entry.password.clone();

        // bcrypt é caro: roda em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            tracing::warn!("Tentativa de login rejeitada para '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        let user = User::from_entry(username, entry);
        let token = self.create_token(username, Uuid::new_v4())?;
        tracing::info!("🔑 Login de {} ({})", user.name, user.role);

        Ok((token, user))
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionIdentity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário removido do cadastro perde o acesso mesmo com token válido
        let user = self
            .find_user(&token_data.claims.sub)
            .ok_or(AppError::InvalidToken)?;

        Ok(SessionIdentity {
            user,
            session_id: token_data.claims.sid,
        })
    }

    /// Estado da autenticação: pendente sem token, rejeitado com token inválido.
    pub fn status(&self, token: Option<&str>) -> AuthStatusResponse {
        match token.map(|t| self.validate_token(t)) {
            None => AuthStatusResponse {
                status: AuthStatus::Pending,
                message: "Por favor, insira suas credenciais".into(),
                user: None,
            },
            Some(Err(_)) => AuthStatusResponse {
                status: AuthStatus::Rejected,
                message: "Usuário ou senha incorretos".into(),
                user: None,
            },
            Some(Ok(identity)) => AuthStatusResponse {
                status: AuthStatus::Authenticated,
                message: format!("Bem-vindo, {} 👋", identity.user.name),
                user: Some(identity.user),
            },
        }
    }

    fn create_token(&self, username: &str, session_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.expiry_days);

        let claims = Claims {
            sub: username.to_string(),
            sid: session_id,
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
