// src/services/filter_cascade.rs

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{
    filters::{DateRangeInput, FilterOptions, RoleScope, Selection},
    record::Record,
};

pub const ARRIVAL_RANGE_NOTICE: &str = "🗓️ Selecione a data inicial e final para aplicar o filtro.";
pub const DELIVERY_RANGE_NOTICE: &str =
    "🗓️ Selecione a data inicial e final para aplicar o filtro de entrega.";

/// Resultado de uma avaliação da cascata. Referencia os registros da sessão,
/// não copia nada; é descartado assim que agregado e formatado.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a Record>,
    pub options: FilterOptions,
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionOrder {
    /// Ordem de primeira aparição
    Appearance,
    Sorted,
}

type TextField = fn(&Record) -> Option<&str>;
type DateField = fn(&Record) -> Option<NaiveDate>;

/// Valores distintos (não ausentes) de um campo, na ordem pedida.
fn distinct_values(records: &[&Record], field: TextField, order: OptionOrder) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values: Vec<String> = records
        .iter()
        .filter_map(|&record| field(record))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect();

    if order == OptionOrder::Sorted {
        values.sort();
    }
    values
}

/// Uma etapa de multi-seleção: as opções saem da entrada da etapa e uma
/// seleção vazia deixa tudo passar.
fn narrow<'a>(
    input: Vec<&'a Record>,
    selected: &[String],
    field: TextField,
    order: OptionOrder,
) -> (Vec<&'a Record>, Vec<String>) {
    let options = distinct_values(&input, field, order);
    if selected.is_empty() {
        return (input, options);
    }

    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let output = input
        .into_iter()
        .filter(|&record| field(record).is_some_and(|value| wanted.contains(value)))
        .collect();
    (output, options)
}

/// Etapa 1: escopo de clientes da sessão.
fn scope_by_role<'a>(records: &'a [Record], scope: &RoleScope) -> (Vec<&'a Record>, Option<Vec<String>>) {
    let all: Vec<&Record> = records.iter().collect();
    match scope {
        // Sem escolha: todos os clientes conhecidos, ou seja, linhas sem cliente ficam de fora
        RoleScope::AllClients(None) => {
            let options = distinct_values(&all, |r| r.client.as_deref(), OptionOrder::Sorted);
            let output = all.into_iter().filter(|record| record.client.is_some()).collect();
            (output, Some(options))
        }
        RoleScope::AllClients(Some(selected)) => {
            let (output, options) = narrow(all, selected, |r| r.client.as_deref(), OptionOrder::Sorted);
            (output, Some(options))
        }
        RoleScope::SingleClient(client) => {
            let client = client.trim();
            let output = all
                .into_iter()
                .filter(|record| record.client.as_deref().map(str::trim) == Some(client))
                .collect();
            (output, None)
        }
    }
}

/// Intervalo inclusivo; só filtra quando as duas pontas foram escolhidas.
fn within_range<'a>(input: Vec<&'a Record>, range: &DateRangeInput, field: DateField) -> Option<Vec<&'a Record>> {
    let (start, end) = range.bounds()?;
    Some(
        input
            .into_iter()
            .filter(|&record| field(record).is_some_and(|date| start <= date && date <= end))
            .collect(),
    )
}

/// Aplica a cascata completa, na ordem fixa:
/// cliente → placa → serial → prioridade → status → entrega → BM →
/// período de chegada → período de entrega.
///
/// As opções de cada etapa são calculadas sobre a saída da etapa anterior,
/// então escolher um cliente reduz as placas oferecidas, e assim por diante.
pub fn apply<'a>(records: &'a [Record], scope: &RoleScope, selection: &Selection) -> FilteredView<'a> {
    let mut options = FilterOptions::default();
    let mut notices = Vec::new();

    let (by_client, client_options) = scope_by_role(records, scope);
    options.clients = client_options;

    let (by_board, boards) = narrow(by_client, &selection.boards, |r| r.board.as_deref(), OptionOrder::Appearance);
    options.boards = boards;

    let (by_serial, serials) = narrow(by_board, &selection.serials, |r| r.serial.as_deref(), OptionOrder::Appearance);
    options.serials = serials;

    let (by_priority, priorities) =
        narrow(by_serial, &selection.priorities, |r| r.priority.as_deref(), OptionOrder::Appearance);
    options.priorities = priorities;

    let (by_status, statuses) = narrow(by_priority, &selection.statuses, |r| r.status.as_deref(), OptionOrder::Sorted);
    options.statuses = statuses;

    let (by_delivery, deliveries) =
        narrow(by_status, &selection.deliveries, |r| r.delivery.as_deref(), OptionOrder::Sorted);
    options.deliveries = deliveries;

    let (by_batch, batches) = narrow(by_delivery, &selection.batches, |r| r.batch.as_deref(), OptionOrder::Sorted);
    options.batches = batches;

    // Os filtros de data são independentes entre si e das multi-seleções
    let by_arrival = match within_range(by_batch.clone(), &selection.arrival_range, |r| r.arrival_date) {
        Some(filtered) => filtered,
        None => {
            notices.push(ARRIVAL_RANGE_NOTICE.to_string());
            by_batch
        }
    };

    let by_delivery_date = match within_range(by_arrival.clone(), &selection.delivery_range, |r| r.forecast_date) {
        Some(filtered) => filtered,
        None => {
            notices.push(DELIVERY_RANGE_NOTICE.to_string());
            by_arrival
        }
    };

    for notice in &notices {
        tracing::info!("{}", notice);
    }

    FilteredView {
        records: by_delivery_date,
        options,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(client: &str, board: &str, serial: &str, status: &str, arrival: NaiveDate) -> Record {
        Record {
            client: Some(client.into()),
            board: Some(board.into()),
            serial: Some(serial.into()),
            priority: Some("Normal".into()),
            status: Some(status.into()),
            delivery: Some("Não".into()),
            batch: Some("BM-1".into()),
            arrival_date: Some(arrival),
            ..Default::default()
        }
    }

    fn dataset() -> Vec<Record> {
        vec![
            record("ACME", "PL-1", "S1", "Reparada", date(2024, 1, 10)),
            record("ACME", "PL-2", "S2", "Retorno", date(2024, 2, 5)),
            record("Globex", "PL-3", "S3", "Analisando", date(2024, 3, 1)),
            record("Globex", "PL-1", "S4", "Reparada", date(2024, 3, 20)),
            Record {
                forecast_date: Some(date(2024, 4, 2)),
                ..record("Initech", "PL-9", "S5", "Sem Reparo", date(2024, 4, 1))
            },
        ]
    }

    fn all_clients() -> RoleScope {
        RoleScope::AllClients(None)
    }

    fn serials(view: &FilteredView) -> Vec<String> {
        view.records.iter().filter_map(|r| r.serial.clone()).collect()
    }

    #[test]
    fn empty_selection_passes_everything_through() {
        let data = dataset();
        let view = apply(&data, &all_clients(), &Selection::default());
        assert_eq!(view.records.len(), data.len());
    }

    #[test]
    fn empty_stage_selection_equals_omitting_the_stage() {
        let data = dataset();
        let with_empty_boards = Selection {
            statuses: vec!["Reparada".into()],
            boards: vec![],
            ..Default::default()
        };
        let without_board_stage = Selection { statuses: vec!["Reparada".into()], ..Default::default() };

        let a = apply(&data, &all_clients(), &with_empty_boards);
        let b = apply(&data, &all_clients(), &without_board_stage);
        assert_eq!(a.records, b.records);

        // Lista vazia de clientes também é "sem filtro" no papel privilegiado
        let empty_clients = apply(&data, &RoleScope::AllClients(Some(vec![])), &Selection::default());
        assert_eq!(empty_clients.records.len(), data.len());
    }

    #[test]
    fn default_client_scope_drops_rows_without_client() {
        let data = vec![
            record("ACME", "PL-1", "S1", "Reparada", date(2024, 1, 10)),
            Record { client: None, ..record("", "PL-2", "S2", "Retorno", date(2024, 1, 11)) },
        ];

        let view = apply(&data, &all_clients(), &Selection::default());
        assert_eq!(view.options.clients, Some(vec!["ACME".into()]));
        assert_eq!(serials(&view), vec!["S1"]);

        // Lista vazia continua sem filtro
        let empty = apply(&data, &RoleScope::AllClients(Some(vec![])), &Selection::default());
        assert_eq!(serials(&empty), vec!["S1", "S2"]);
    }

    #[test]
    fn later_stages_offer_values_from_the_upstream_selection() {
        let mut data = dataset();
        data[0].priority = Some("Alta".into());
        data[0].delivery = Some("Sim".into());
        data[0].batch = Some("BM-9".into());
        data[3].delivery = Some("Sim".into());
        data[3].batch = Some("BM-2".into());

        let selection = Selection { boards: vec!["PL-1".into()], ..Default::default() };
        let view = apply(&data, &all_clients(), &selection);

        assert_eq!(view.options.priorities, vec!["Alta", "Normal"]);
        assert_eq!(view.options.deliveries, vec!["Sim"]);
        assert_eq!(view.options.batches, vec!["BM-2", "BM-9"]);

        // Prioridade escolhida restringe entrega e BM oferecidos
        let selection = Selection { priorities: vec!["Alta".into()], ..Default::default() };
        let view = apply(&data, &all_clients(), &selection);

        assert_eq!(view.options.priorities, vec!["Alta", "Normal"]);
        assert_eq!(view.options.deliveries, vec!["Sim"]);
        assert_eq!(view.options.batches, vec!["BM-9"]);
        assert_eq!(serials(&view), vec!["S1"]);

        let selection = Selection { deliveries: vec!["Não".into()], ..Default::default() };
        let view = apply(&data, &all_clients(), &selection);
        assert_eq!(view.options.deliveries, vec!["Não", "Sim"]);
        assert_eq!(view.options.batches, vec!["BM-1"]);
    }

    #[test]
    fn inverted_range_yields_an_empty_view() {
        let data = dataset();
        let selection = Selection {
            arrival_range: DateRangeInput::new(date(2024, 3, 1), date(2024, 1, 1)),
            ..Default::default()
        };
        let view = apply(&data, &all_clients(), &selection);

        assert!(view.records.is_empty());
        assert!(!view.notices.iter().any(|n| n == ARRIVAL_RANGE_NOTICE));
    }

    #[test]
    fn board_options_follow_the_client_selection() {
        let data = dataset();
        let scope = RoleScope::AllClients(Some(vec!["ACME".into()]));
        let view = apply(&data, &scope, &Selection::default());

        assert_eq!(view.options.clients, Some(vec!["ACME".into(), "Globex".into(), "Initech".into()]));
        assert_eq!(view.options.boards, vec!["PL-1".to_string(), "PL-2".to_string()]);
        assert_eq!(serials(&view), vec!["S1", "S2"]);
    }

    #[test]
    fn each_stage_offers_values_from_the_previous_stage_output() {
        let data = dataset();
        let selection = Selection { boards: vec!["PL-1".into()], ..Default::default() };
        let view = apply(&data, &all_clients(), &selection);

        // Placas ainda vêm da etapa anterior (todos os clientes)...
        assert_eq!(view.options.boards, vec!["PL-1", "PL-2", "PL-3", "PL-9"]);
        // ...mas seriais e status já refletem a placa escolhida
        assert_eq!(view.options.serials, vec!["S1", "S4"]);
        assert_eq!(view.options.statuses, vec!["Reparada"]);
    }

    #[test]
    fn sorted_stages_sort_and_appearance_stages_do_not() {
        let data = vec![
            record("B", "PL-Z", "S2", "Retorno", date(2024, 1, 1)),
            record("A", "PL-A", "S1", "Analisando", date(2024, 1, 2)),
        ];
        let view = apply(&data, &all_clients(), &Selection::default());

        assert_eq!(view.options.clients, Some(vec!["A".into(), "B".into()]));
        assert_eq!(view.options.boards, vec!["PL-Z", "PL-A"]);
        assert_eq!(view.options.statuses, vec!["Analisando", "Retorno"]);
    }

    #[test]
    fn restricted_role_only_sees_its_client() {
        let mut data = dataset();
        data[2].client = Some("  Globex ".into());
        let view = apply(&data, &RoleScope::SingleClient("Globex".into()), &Selection::default());

        assert_eq!(serials(&view), vec!["S3", "S4"]);
        assert_eq!(view.options.clients, None);
    }

    #[test]
    fn arrival_range_is_inclusive() {
        let data = dataset();
        let selection = Selection {
            arrival_range: DateRangeInput::new(date(2024, 2, 5), date(2024, 3, 20)),
            ..Default::default()
        };
        let view = apply(&data, &all_clients(), &selection);

        assert_eq!(serials(&view), vec!["S2", "S3", "S4"]);
        assert!(!view.notices.iter().any(|n| n == ARRIVAL_RANGE_NOTICE));
    }

    #[test]
    fn partial_range_passes_through_with_a_notice() {
        let data = dataset();
        let selection = Selection {
            arrival_range: DateRangeInput { start: Some(date(2024, 3, 1)), end: None },
            ..Default::default()
        };
        let view = apply(&data, &all_clients(), &selection);

        assert_eq!(view.records.len(), data.len());
        assert_eq!(view.notices, vec![ARRIVAL_RANGE_NOTICE.to_string(), DELIVERY_RANGE_NOTICE.to_string()]);
    }

    #[test]
    fn delivery_range_uses_forecast_date_and_drops_missing_dates() {
        let data = dataset();
        let selection = Selection {
            delivery_range: DateRangeInput::new(date(2024, 4, 1), date(2024, 4, 30)),
            ..Default::default()
        };
        let view = apply(&data, &all_clients(), &selection);

        assert_eq!(serials(&view), vec!["S5"]);
        assert_eq!(view.notices, vec![ARRIVAL_RANGE_NOTICE.to_string()]);
    }

    #[test]
    fn reapplying_the_cascade_is_a_fixed_point() {
        let data = dataset();
        let scope = RoleScope::AllClients(Some(vec!["ACME".into(), "Globex".into()]));
        let selection = Selection {
            boards: vec!["PL-1".into(), "PL-3".into()],
            statuses: vec!["Reparada".into(), "Analisando".into()],
            arrival_range: DateRangeInput::new(date(2024, 1, 1), date(2024, 3, 31)),
            ..Default::default()
        };

        let first = apply(&data, &scope, &selection);
        let once: Vec<Record> = first.records.iter().map(|r| (*r).clone()).collect();
        let second = apply(&once, &scope, &selection);
        let twice: Vec<Record> = second.records.iter().map(|r| (*r).clone()).collect();

        assert_eq!(once, twice);
        assert_eq!(serials(&first), vec!["S1", "S3", "S4"]);
    }

    #[test]
    fn everything_filtered_out_is_not_an_error() {
        let data = dataset();
        let selection = Selection { serials: vec!["NÃO-EXISTE".into()], ..Default::default() };
        let view = apply(&data, &all_clients(), &selection);

        assert!(view.records.is_empty());
        assert!(view.options.priorities.is_empty());
    }
}
