// src/services/presentation.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardMetrics, FinancialView, MonthlyValueView, TableView},
        record::{columns, Record, REQUIRED_COLUMNS},
    },
};

pub const EXPORT_FILE_NAME: &str = "reparos_filtrados.csv";
pub const NO_REPORT_PLACEHOLDER: &str = "Sem laudo";

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// Data/hora da última atualização da planilha.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M").to_string()
}

/// Moeda no padrão brasileiro: `1234.5` -> `R$ 1.234,50`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("R$ {sign}{grouped},{frac_part}")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_web_link(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Link clicável para o laudo, ou o marcador "Sem laudo".
/// Só endereços http(s) viram âncora.
pub fn report_link(link: Option<&str>) -> String {
    match link.map(str::trim).filter(|l| is_web_link(l)) {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">📄 Abrir laudo</a>",
            escape_html(url)
        ),
        None => NO_REPORT_PLACEHOLDER.to_string(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// ---
// Tabela detalhada
// ---

/// Colunas da tabela detalhada: sem CLIENTE, BM e VALOR; reparo e entrega no fim.
pub fn detail_columns() -> Vec<String> {
    let hidden = [columns::CLIENT, columns::BATCH, columns::VALUE];
    let moved = [columns::REPAIR_DATE, columns::FORECAST_DATE];

    let mut cols: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !hidden.contains(*c) && !moved.contains(*c))
        .map(|c| c.to_string())
        .collect();
    cols.push(columns::REPORT_LINK.to_string());
    cols.extend(moved.iter().map(|c| c.to_string()));
    cols
}

fn detail_row(r: &Record) -> Vec<String> {
    vec![
        text(&r.seq),
        text(&r.board),
        text(&r.version),
        text(&r.serial),
        text(&r.priority),
        format_date(r.arrival_date),
        text(&r.location),
        text(&r.status),
        text(&r.follow_up),
        format_date(r.warranty_date),
        text(&r.delivery),
        report_link(r.report_link.as_deref()),
        format_date(r.repair_date),
        format_date(r.forecast_date),
    ]
}

pub fn detail_table(records: &[&Record]) -> TableView {
    TableView {
        columns: detail_columns(),
        rows: records.iter().map(|r| detail_row(r)).collect(),
    }
}

// ---
// Financeiro
// ---

pub fn financial_view(records: &[&Record], metrics: &DashboardMetrics) -> FinancialView {
    let header = [columns::BATCH, columns::VALUE, columns::SERIAL, columns::BOARD, columns::ARRIVAL_DATE]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = records
        .iter()
        .filter_map(|r| {
            let value = r.value?;
            Some(vec![
                text(&r.batch),
                format_brl(value),
                text(&r.serial),
                text(&r.board),
                format_date(r.arrival_date),
            ])
        })
        .collect();

    let monthly = metrics
        .monthly_value
        .iter()
        .map(|point| MonthlyValueView {
            month: point.month.clone(),
            value: point.value,
            label: format_brl(point.value),
        })
        .collect();

    FinancialView {
        total_label: format_brl(metrics.total_value),
        monthly,
        table: TableView { columns: header, rows },
    }
}

// ---
// Exportação CSV
// ---

/// Cabeçalho do CSV: colunas projetadas sem a coluna interna de cliente.
pub fn export_columns() -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| *c != columns::CLIENT)
        .chain(std::iter::once(columns::REPORT_LINK))
        .collect()
}

fn iso_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

pub fn export_row(r: &Record) -> Vec<String> {
    vec![
        text(&r.seq),
        text(&r.board),
        text(&r.version),
        text(&r.serial),
        text(&r.priority),
        iso_date(r.arrival_date),
        iso_date(r.repair_date),
        iso_date(r.forecast_date),
        text(&r.location),
        text(&r.status),
        text(&r.follow_up),
        iso_date(r.warranty_date),
        text(&r.delivery),
        text(&r.batch),
        r.value.map(|v| v.to_string()).unwrap_or_default(),
        text(&r.report_link),
    ]
}

/// Serializa exatamente as linhas da visão filtrada (UTF-8, vírgula).
pub fn export_csv(records: &[&Record]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(export_columns())?;
    for record in records {
        writer.write_record(export_row(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao finalizar o CSV: {}", e)))
}
