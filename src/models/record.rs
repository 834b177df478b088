// src/models/record.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Nomes das colunas da aba "Reparos Paiva", exatamente como aparecem na planilha.
pub mod columns {
    pub const SEQ: &str = "SEQ";
    pub const BOARD: &str = "PLACA";
    pub const VERSION: &str = "VERSÃO";
    pub const SERIAL: &str = "SERIAL";
    pub const PRIORITY: &str = "Prioridade";
    pub const ARRIVAL_DATE: &str = "DATA DE CHEGADA";
    pub const REPAIR_DATE: &str = "DATA DE REPARO";
    pub const FORECAST_DATE: &str = "ENTREGA/PREVISÃO";
    pub const CLIENT: &str = "CLIENTE";
    pub const LOCATION: &str = "LOCAL";
    pub const STATUS: &str = "Status";
    pub const FOLLOW_UP: &str = "FOLLOW-UP";
    pub const WARRANTY: &str = "GARANTIA";
    pub const DELIVERY: &str = "Entrega";
    pub const BATCH: &str = "BM";
    pub const VALUE: &str = "VALOR";
    pub const REPORT_LINK: &str = "LAUDO";
}

/// Colunas obrigatórias, na ordem em que o dashboard as projeta.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    columns::SEQ,
    columns::BOARD,
    columns::VERSION,
    columns::SERIAL,
    columns::PRIORITY,
    columns::ARRIVAL_DATE,
    columns::REPAIR_DATE,
    columns::FORECAST_DATE,
    columns::CLIENT,
    columns::LOCATION,
    columns::STATUS,
    columns::FOLLOW_UP,
    columns::WARRANTY,
    columns::DELIVERY,
    columns::BATCH,
    columns::VALUE,
];

// Status reconhecidos pelos cards de KPI
pub const STATUS_REPAIRED: &str = "Reparada";
pub const STATUS_RETURNED: &str = "Retorno";
pub const STATUS_ANALYSING: &str = "Analisando";
pub const STATUS_NO_REPAIR: &str = "Sem Reparo";

/// Um ticket de reparo já projetado e tipado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[schema(example = "128")]
    pub seq: Option<String>,

    #[schema(example = "PL-7731")]
    pub board: Option<String>,

    #[schema(example = "v2.1")]
    pub version: Option<String>,

    #[schema(example = "SN00451A")]
    pub serial: Option<String>,

    #[schema(example = "Alta")]
    pub priority: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub arrival_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-22")]
    pub repair_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-30")]
    pub forecast_date: Option<NaiveDate>,

    #[schema(example = "ACME")]
    pub client: Option<String>,

    #[schema(example = "Bancada 3")]
    pub location: Option<String>,

    #[schema(example = "Reparada")]
    pub status: Option<String>,

    pub follow_up: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-07-22")]
    pub warranty_date: Option<NaiveDate>,

    #[schema(example = "Sim")]
    pub delivery: Option<String>,

    #[schema(example = "BM-12")]
    pub batch: Option<String>,

    #[schema(value_type = Option<f64>, example = 1234.5)]
    pub value: Option<Decimal>,

    #[schema(example = "https://empresa.sharepoint.com/laudos/SN00451A.pdf")]
    pub report_link: Option<String>,
}

impl Record {
    /// Data final usada na linha do tempo: reparo, senão entrega/previsão.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.repair_date.or(self.forecast_date)
    }

    /// Dias entre chegada e reparo, apenas quando as duas datas existem.
    pub fn days_to_repair(&self) -> Option<i64> {
        match (self.arrival_date, self.repair_date) {
            (Some(arrival), Some(repair)) => Some((repair - arrival).num_days()),
            _ => None,
        }
    }
}
