// src/services/dashboard_service.rs

use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    loader::RecordSource,
    models::{
        dashboard::DashboardResponse,
        filters::{DateRangeInput, RoleScope, Selection},
    },
    services::{
        filter_cascade, metrics, presentation, schema,
        session_store::{SessionData, SessionStore},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<RecordSource>,
    sessions: SessionStore,
    privileged_role: String,
}

impl DashboardService {
    pub fn new(source: RecordSource, sessions: SessionStore, privileged_role: impl Into<String>) -> Self {
        Self {
            source: Arc::new(source),
            sessions,
            privileged_role: privileged_role.into(),
        }
    }

    /// Busca e projeta a planilha. Falha na busca ou coluna ausente abortam tudo.
    async fn load(&self) -> Result<SessionData, AppError> {
        let started = Instant::now();
        let raw = self.source.fetch().await?;
        if raw.table.is_empty() {
            tracing::warn!("⚠️ Planilha sem linhas de dados em {}", self.source.describe());
        }
        let records = schema::project(&raw.table)?;

        tracing::info!(
            "✅ {} registros carregados de {} em {:?}",
            records.len(),
            self.source.describe(),
            started.elapsed()
        );

        Ok(SessionData {
            records,
            last_modified: raw.last_modified,
            loaded_at: Utc::now(),
        })
    }

    /// Dados da sessão; na primeira chamada a planilha é baixada.
    pub async fn session_data(&self, session_id: Uuid) -> Result<Arc<SessionData>, AppError> {
        if let Some(data) = self.sessions.get(session_id).await {
            return Ok(data);
        }
        self.refresh(session_id).await
    }

    /// Baixa a planilha de novo para esta sessão (sem retentativa).
    pub async fn refresh(&self, session_id: Uuid) -> Result<Arc<SessionData>, AppError> {
        let data = self.load().await?;
        if let Some(previous) = self.sessions.get(session_id).await {
            tracing::debug!("Sessão {} substitui a cópia carregada em {}", session_id, previous.loaded_at);
        }
        let data = self.sessions.insert(session_id, data).await;
        tracing::debug!("{} sessões com planilha em memória", self.sessions.len().await);
        Ok(data)
    }

    pub async fn end_session(&self, session_id: Uuid) {
        if self.sessions.remove(session_id).await {
            tracing::info!("🧹 Dados da sessão {} descartados", session_id);
        }
    }

    pub fn scope_for(&self, role: &str, selection: &Selection) -> RoleScope {
        RoleScope::resolve(role, &self.privileged_role, selection.clients.clone())
    }

    pub async fn get_dashboard(
        &self,
        session_id: Uuid,
        role: &str,
        selection: &Selection,
    ) -> Result<DashboardResponse, AppError> {
        let data = self.session_data(session_id).await?;
        let scope = self.scope_for(role, selection);
        let today = Local::now().date_naive();
        Ok(build_dashboard(&data, &scope, selection, today))
    }

    pub async fn export_csv(
        &self,
        session_id: Uuid,
        role: &str,
        selection: &Selection,
    ) -> Result<Vec<u8>, AppError> {
        let data = self.session_data(session_id).await?;
        let scope = self.scope_for(role, selection);
        let view = filter_cascade::apply(&data.records, &scope, selection);

        tracing::info!("📥 Exportando {} registros filtrados", view.records.len());
        presentation::export_csv(&view.records)
    }
}

/// Uma passada completa: cascata → agregação → formatação.
pub fn build_dashboard(
    data: &SessionData,
    scope: &RoleScope,
    selection: &Selection,
    today: NaiveDate,
) -> DashboardResponse {
    let view = filter_cascade::apply(&data.records, scope, selection);
    let metrics = metrics::aggregate(&view.records);
    let financial = presentation::financial_view(&view.records, &metrics);
    let detail_table = presentation::detail_table(&view.records);

    // Sugestão do filtro de chegada: da primeira chegada da planilha até hoje
    let first_arrival = data.records.iter().filter_map(|r| r.arrival_date).min();
    let arrival_range_default = DateRangeInput { start: first_arrival, end: Some(today) };

    DashboardResponse {
        last_updated: data.last_modified.map(presentation::format_timestamp),
        notices: view.notices,
        options: view.options,
        arrival_range_default,
        metrics,
        financial,
        detail_table,
    }
}
