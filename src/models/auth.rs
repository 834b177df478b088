// src/models/auth.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Cadastro de usuários lido do arquivo de credenciais
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialStore {
    pub usernames: HashMap<String, CredentialEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Hash bcrypt da senha
    pub password: String,
    /// Papel: o papel privilegiado vê todos os clientes, os demais são o próprio cliente.
    pub role: String,
}

// Usuário resolvido a partir do cadastro
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "joao")]
    pub username: String,
    #[schema(example = "João Silva")]
    pub name: String,
    #[schema(example = "joao@empresa.com.br")]
    pub email: String,
    #[schema(example = "PAIVA")]
    pub role: String,
}

impl User {
    pub fn from_entry(username: &str, entry: &CredentialEntry) -> Self {
        Self {
            username: username.to_string(),
            name: format!("{} {}", entry.first_name, entry.last_name),
            email: entry.email.clone(),
            role: entry.role.clone(),
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Informe o usuário."))]
    #[schema(example = "joao")]
    pub username: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    #[schema(example = "senha-secreta")]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Authenticated,
    Rejected,
    Pending,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub status: AuthStatus,
    #[schema(example = "Bem-vindo, João Silva 👋")]
    pub message: String,
    pub user: Option<User>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username)
    pub sid: Uuid,   // Sessão: cada login tem sua própria cópia da planilha
    pub exp: usize,
    pub iat: usize,
}
