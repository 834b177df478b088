// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::filters::{DateRangeInput, FilterOptions};

// 1. Cards do topo
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusKpis {
    pub repaired: usize,    // Reparada
    pub returned: usize,    // Retorno
    pub in_progress: usize, // Analisando
    pub no_repair: usize,   // Sem Reparo
}

// 2. Séries para os gráficos
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    #[schema(example = "PL-7731")]
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValue {
    #[schema(example = "BM-12")]
    pub label: String,
    #[schema(value_type = f64, example = 1500.5)]
    pub value: Decimal,
}

/// Contagem por mês/ano (`YYYY-MM`). Meses sem ocorrência não aparecem.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    #[schema(example = "2024-01")]
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyValue {
    #[schema(example = "2024-01")]
    pub month: String,
    #[schema(value_type = f64)]
    pub value: Decimal,
}

/// Barra do gráfico de Gantt por serial.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub serial: Option<String>,
    pub board: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
}

/// Tudo o que o agregador calcula sobre a visão filtrada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_records: usize,
    pub distinct_serials: usize,
    pub status_kpis: StatusKpis,
    pub status_distribution: Vec<CategoryCount>,
    pub board_counts: Vec<CategoryCount>,
    pub monthly_arrivals: Vec<MonthlyCount>,
    pub monthly_repairs: Vec<MonthlyCount>,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    pub value_by_batch: Vec<CategoryValue>,
    pub value_by_board: Vec<CategoryValue>,
    pub monthly_value: Vec<MonthlyValue>,
    pub mean_days_to_repair: Option<f64>,
    pub timeline: Vec<TimelineEntry>,
}

// 3. Tabelas já formatadas para exibição
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyValueView {
    #[schema(example = "2024-01")]
    pub month: String,
    #[schema(value_type = f64)]
    pub value: Decimal,
    #[schema(example = "R$ 1.234,50")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialView {
    #[schema(example = "R$ 1.234,50")]
    pub total_label: String,
    pub monthly: Vec<MonthlyValueView>,
    pub table: TableView,
}

// 4. Resposta completa de uma avaliação do dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Última modificação da planilha (dd/mm/aaaa HH:MM)
    #[schema(example = "15/01/2024 09:30")]
    pub last_updated: Option<String>,
    /// Avisos informativos (ex.: intervalo de datas incompleto)
    pub notices: Vec<String>,
    pub options: FilterOptions,
    /// Valor sugerido para o filtro de chegada: primeira chegada até hoje
    pub arrival_range_default: DateRangeInput,
    pub metrics: DashboardMetrics,
    pub financial: FinancialView,
    pub detail_table: TableView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub rows: usize,
    #[schema(example = "15/01/2024 09:30")]
    pub last_updated: Option<String>,
}
