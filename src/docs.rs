// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::status,

        // --- Users ---
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::export_csv,
        handlers::dashboard::refresh,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::AuthStatus,
            models::auth::AuthStatusResponse,

            // --- Filtros ---
            models::filters::DateRangeInput,
            models::filters::Selection,
            models::filters::FilterOptions,

            // --- Dashboard ---
            models::record::Record,
            models::dashboard::StatusKpis,
            models::dashboard::CategoryCount,
            models::dashboard::CategoryValue,
            models::dashboard::MonthlyCount,
            models::dashboard::MonthlyValue,
            models::dashboard::TimelineEntry,
            models::dashboard::DashboardMetrics,
            models::dashboard::TableView,
            models::dashboard::MonthlyValueView,
            models::dashboard::FinancialView,
            models::dashboard::DashboardResponse,
            models::dashboard::RefreshResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e estado da autenticação"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Dashboard", description = "Indicadores, gráficos e exportação dos reparos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
