// src/handlers/auth.rs

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{token_from_headers, AuthenticatedUser},
    models::auth::{AuthResponse, AuthStatusResponse, LoginUserPayload, User},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado; o token também vai no cookie de sessão", body = AuthResponse),
        (status = 400, description = "Usuário ou senha não informados"),
        (status = 401, description = "Usuário ou senha incorretos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    let cookie = Cookie::build((app_state.settings.cookie.name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(app_state.auth_service.expiry_days()));

    Ok((jar.add(cookie), Json(AuthResponse { token, user })))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão encerrada e cookie removido")
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> CookieJar {
    let cookie_name = app_state.settings.cookie.name.clone();

    // Token vencido ou inválido: só remove o cookie
    if let Some(token) = token_from_headers(&headers, &cookie_name) {
        if let Ok(identity) = app_state.auth_service.validate_token(&token) {
            app_state.dashboard_service.end_session(identity.session_id).await;
            tracing::info!("👋 Logout de {}", identity.user.username);
        }
    }

    jar.remove(Cookie::build((cookie_name, "")).path("/"))
}

// GET /api/auth/status
#[utoipa::path(
    get,
    path = "/api/auth/status",
    tag = "Auth",
    responses(
        (status = 200, description = "Estado da autenticação: authenticated, rejected ou pending", body = AuthStatusResponse)
    )
)]
pub async fn status(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Json<AuthStatusResponse> {
    let token = token_from_headers(&headers, &app_state.settings.cookie.name);
    Json(app_state.auth_service.status(token.as_deref()))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário da sessão", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(AuthenticatedUser(identity): AuthenticatedUser) -> Json<User> {
    Json(identity.user)
}
