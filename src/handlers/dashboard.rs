// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        dashboard::{DashboardResponse, RefreshResponse},
        filters::Selection,
    },
    services::presentation::{self, EXPORT_FILE_NAME},
};

// POST /api/dashboard
#[utoipa::path(
    post,
    path = "/api/dashboard",
    tag = "Dashboard",
    request_body = Selection,
    responses(
        (status = 200, description = "Indicadores, gráficos e tabelas da seleção atual", body = DashboardResponse),
        (status = 401, description = "Não autorizado"),
        (status = 422, description = "Planilha sem uma coluna obrigatória"),
        (status = 502, description = "Falha ao obter a planilha")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(selection): Json<Selection>,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state
        .dashboard_service
        .get_dashboard(identity.session_id, &identity.user.role, &selection)
        .await?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// POST /api/dashboard/export
#[utoipa::path(
    post,
    path = "/api/dashboard/export",
    tag = "Dashboard",
    request_body = Selection,
    responses(
        (status = 200, description = "CSV com as linhas filtradas", body = String, content_type = "text/csv"),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(selection): Json<Selection>,
) -> Result<impl IntoResponse, AppError> {
    let body = app_state
        .dashboard_service
        .export_csv(identity.session_id, &identity.user.role, &selection)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

// POST /api/dashboard/refresh
#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Planilha recarregada para esta sessão", body = RefreshResponse),
        (status = 401, description = "Não autorizado"),
        (status = 502, description = "Falha ao obter a planilha")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let data = app_state.dashboard_service.refresh(identity.session_id).await?;

    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            rows: data.records.len(),
            last_updated: data.last_modified.map(presentation::format_timestamp),
        }),
    ))
}
