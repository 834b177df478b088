// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Planilha sem uma das colunas obrigatórias: o dashboard não é montado.
    #[error("Coluna obrigatória ausente na planilha: {0}")]
    MissingColumn(String),

    #[error("Usuário ou senha incorretos")]
    InvalidCredentials,

    #[error("Credenciais não informadas")]
    MissingCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Falha ao baixar ou ler a planilha de origem (local ou SharePoint).
    #[error("Falha ao obter a planilha: {0}")]
    SourceError(String),

    #[error("Erro ao gerar CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::SourceError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::SourceError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
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
            AppError::MissingColumn(column) => {
                tracing::error!("🔥 Planilha sem a coluna obrigatória '{}'", column);
                let body = Json(json!({
                    "error": format!("A planilha não possui a coluna obrigatória '{}'.", column),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::SourceError(reason) => {
                tracing::error!("🔥 Falha ao obter a planilha: {}", reason);
                (StatusCode::BAD_GATEWAY, "Não foi possível carregar a planilha de reparos.")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Usuário ou senha incorretos"),
            AppError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Por favor, insira suas credenciais"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Sessão inválida ou expirada."),

            // O resto vira 500 e fica registrado no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_maps_to_unprocessable_entity() {
        let response = AppError::MissingColumn("SERIAL".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn authentication_failures_are_unauthorized() {
        assert_eq!(AppError::InvalidCredentials.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingCredentials.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn source_failure_is_bad_gateway() {
        let response = AppError::SourceError("timeout".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
