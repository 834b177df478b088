// src/services/schema.rs

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::FromPrimitive, Decimal};

use crate::{
    common::error::AppError,
    loader::{Cell, RawTable},
    models::record::{columns, Record, REQUIRED_COLUMNS},
};

// Formatos de data aceitos em células de texto
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

// Faixa de números seriais válidos do Excel (1900-01-01 .. 9999-12-31)
const EXCEL_SERIAL_MIN: f64 = 1.0;
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// Índices das colunas projetadas dentro da tabela bruta.
struct ColumnMap {
    required: [usize; 16],
    report_link: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, AppError> {
        let mut required = [0usize; 16];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = table
                .column_index(name)
                .ok_or_else(|| AppError::MissingColumn(name.to_string()))?;
        }
        Ok(Self {
            required,
            report_link: table.column_index(columns::REPORT_LINK),
        })
    }
}

/// Projeta a tabela bruta nas colunas do dashboard, preservando a ordem das linhas.
///
/// Datas e valores inválidos viram ausentes; só a falta de uma coluna
/// obrigatória é erro.
pub fn project(table: &RawTable) -> Result<Vec<Record>, AppError> {
    let map = ColumnMap::resolve(table)?;
    let [seq, board, version, serial, priority, arrival, repair, forecast, client, location, status, follow_up, warranty, delivery, batch, value] =
        map.required;

    let records = (0..table.len())
        .map(|row| {
            let cell = move |col: usize| table.cell(row, col);
            Record {
                seq: coerce_text(cell(seq)),
                board: coerce_text(cell(board)),
                version: coerce_text(cell(version)),
                serial: coerce_text(cell(serial)).and_then(|s| normalize_serial(&s)),
                priority: coerce_text(cell(priority)),
                arrival_date: coerce_date(cell(arrival)),
                repair_date: coerce_date(cell(repair)),
                forecast_date: coerce_date(cell(forecast)),
                client: coerce_text(cell(client)),
                location: coerce_text(cell(location)),
                status: coerce_text(cell(status)),
                follow_up: coerce_text(cell(follow_up)),
                warranty_date: coerce_date(cell(warranty)),
                delivery: coerce_text(cell(delivery)),
                batch: coerce_text(cell(batch)),
                value: coerce_money(cell(value)),
                report_link: map.report_link.and_then(|col| coerce_text(cell(col))),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!("Projeção concluída: {} registros", records.len());
    Ok(records)
}

/// Texto sem espaços nas pontas; vazio vira ausente. Números inteiros
/// aparecem sem casa decimal (SEQ 12.0 -> "12").
pub fn coerce_text(cell: &Cell) -> Option<String> {
    let text = match cell {
        Cell::Empty => return None,
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(dt) => dt.date().format("%Y-%m-%d").to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Serial sem nenhum espaço interno.
pub fn normalize_serial(serial: &str) -> Option<String> {
    let normalized: String = serial.chars().filter(|c| !c.is_whitespace()).collect();
    (!normalized.is_empty()).then_some(normalized)
}

/// Conversão de data em melhor esforço: falhas viram `None`.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Text(s) => parse_date_text(s.trim()),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Valor monetário: números, "1234.5", "1.234,50" ou "R$ 1.234,50".
/// Qualquer outra coisa vira `None`.
pub fn coerce_money(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) if n.is_finite() => Decimal::from_f64(*n).map(|d| d.normalize()),
        Cell::Text(s) => parse_money_text(s),
        _ => None,
    }
}

fn parse_money_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // Com vírgula, o padrão é brasileiro: ponto separa milhar.
    let canonical = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    Decimal::from_str(&canonical).ok().map(|d| d.normalize())
}
