// src/models/filters.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Intervalo de datas escolhido na barra lateral. Só filtra com as duas pontas;
/// início depois do fim simplesmente não casa com nenhuma linha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeInput {
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-01")]
    pub start: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-03-31")]
    pub end: Option<NaiveDate>,
}

impl DateRangeInput {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// As duas pontas, se o usuário escolheu ambas.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Seleções do usuário para uma avaliação do dashboard.
///
/// Lista vazia significa "filtro não aplicado". `clients` só é considerado
/// para o papel privilegiado; `None` equivale a todos os clientes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    #[schema(example = json!(["ACME", "Globex"]))]
    pub clients: Option<Vec<String>>,

    #[schema(example = json!(["PL-7731"]))]
    pub boards: Vec<String>,

    pub serials: Vec<String>,

    #[schema(example = json!(["Alta"]))]
    pub priorities: Vec<String>,

    #[schema(example = json!(["Reparada", "Retorno"]))]
    pub statuses: Vec<String>,

    pub deliveries: Vec<String>,

    pub batches: Vec<String>,

    pub arrival_range: DateRangeInput,

    pub delivery_range: DateRangeInput,
}

/// Escopo de clientes visível para a sessão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    /// Papel privilegiado: multi-seleção de clientes (None = todos).
    AllClients(Option<Vec<String>>),
    /// Papel restrito ao próprio cliente, sem controle na interface.
    SingleClient(String),
}

impl RoleScope {
    pub fn resolve(role: &str, privileged_role: &str, clients: Option<Vec<String>>) -> Self {
        if role == privileged_role {
            RoleScope::AllClients(clients)
        } else {
            RoleScope::SingleClient(role.trim().to_string())
        }
    }
}

/// Opções oferecidas em cada etapa, calculadas sobre a saída da etapa anterior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Ausente quando o papel é restrito a um único cliente.
    pub clients: Option<Vec<String>>,
    pub boards: Vec<String>,
    pub serials: Vec<String>,
    pub priorities: Vec<String>,
    pub statuses: Vec<String>,
    pub deliveries: Vec<String>,
    pub batches: Vec<String>,
}
