// src/services/metrics.rs

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    dashboard::{
        CategoryCount, CategoryValue, DashboardMetrics, MonthlyCount, MonthlyValue, StatusKpis,
        TimelineEntry,
    },
    record::{Record, STATUS_ANALYSING, STATUS_NO_REPAIR, STATUS_REPAIRED, STATUS_RETURNED},
};

/// Chave de mês/ano; a ordem de (ano, mês) é a ordem cronológica.
type MonthKey = (i32, u32);

fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

fn month_label((year, month): MonthKey) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Calcula todos os indicadores sobre a visão filtrada. Visão vazia gera zeros.
pub fn aggregate(records: &[&Record]) -> DashboardMetrics {
    DashboardMetrics {
        total_records: records.len(),
        distinct_serials: distinct_serials(records),
        status_kpis: status_kpis(records),
        status_distribution: count_by(records, |r| r.status.as_deref()),
        board_counts: count_by(records, |r| r.board.as_deref()),
        monthly_arrivals: monthly_counts(records, |r| r.arrival_date),
        monthly_repairs: monthly_counts(records, |r| r.repair_date),
        total_value: total_value(records),
        value_by_batch: value_by(records, |r| r.batch.as_deref()),
        value_by_board: value_by(records, |r| r.board.as_deref()),
        monthly_value: monthly_value(records),
        mean_days_to_repair: mean_days_to_repair(records),
        timeline: timeline(records),
    }
}

pub fn distinct_serials(records: &[&Record]) -> usize {
    records
        .iter()
        .filter_map(|r| r.serial.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Contagem dos status reconhecidos. Status fora da lista não entra em nenhum card.
pub fn status_kpis(records: &[&Record]) -> StatusKpis {
    let mut kpis = StatusKpis::default();
    for status in records.iter().filter_map(|r| r.status.as_deref()) {
        match status {
            STATUS_REPAIRED => kpis.repaired += 1,
            STATUS_RETURNED => kpis.returned += 1,
            STATUS_ANALYSING => kpis.in_progress += 1,
            STATUS_NO_REPAIR => kpis.no_repair += 1,
            _ => {}
        }
    }
    kpis
}

fn count_by(records: &[&Record], field: fn(&Record) -> Option<&str>) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &record in records {
        if let Some(label) = field(record) {
            *counts.entry(label).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(label, count)| CategoryCount { label: label.to_string(), count })
        .collect()
}

/// Série mensal sem preencher meses vazios.
pub fn monthly_counts(records: &[&Record], field: fn(&Record) -> Option<NaiveDate>) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<MonthKey, usize> = BTreeMap::new();
    for &record in records {
        if let Some(date) = field(record) {
            *buckets.entry(month_key(date)).or_default() += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(key, count)| MonthlyCount { month: month_label(key), count })
        .collect()
}

/// Registros que entram no financeiro: apenas os que têm valor numérico.
fn with_value<'a>(records: &'a [&'a Record]) -> impl Iterator<Item = (&'a Record, Decimal)> + 'a {
    records
        .iter()
        .filter_map(|&record| record.value.map(|value| (record, value)))
}

/// Soma dos valores; ausentes e não numéricos ficam de fora só deste total.
pub fn total_value(records: &[&Record]) -> Decimal {
    with_value(records).map(|(_, value)| value).sum()
}

fn value_by(records: &[&Record], field: fn(&Record) -> Option<&str>) -> Vec<CategoryValue> {
    let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
    for (record, value) in with_value(records) {
        if let Some(label) = field(record) {
            *sums.entry(label).or_default() += value;
        }
    }
    sums.into_iter()
        .map(|(label, value)| CategoryValue { label: label.to_string(), value })
        .collect()
}

/// Evolução mensal dos gastos, pelo mês de chegada.
pub fn monthly_value(records: &[&Record]) -> Vec<MonthlyValue> {
    let mut sums: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for (record, value) in with_value(records) {
        if let Some(arrival) = record.arrival_date {
            *sums.entry(month_key(arrival)).or_default() += value;
        }
    }
    sums.into_iter()
        .map(|(key, value)| MonthlyValue { month: month_label(key), value })
        .collect()
}

/// Média de dias entre chegada e reparo, só sobre pares completos.
pub fn mean_days_to_repair(records: &[&Record]) -> Option<f64> {
    let days: Vec<i64> = records.iter().filter_map(|r| r.days_to_repair()).collect();
    if days.is_empty() {
        return None;
    }
    Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

/// Barras do Gantt: chegada até reparo (ou previsão). Sem as duas pontas, fica de fora.
pub fn timeline(records: &[&Record]) -> Vec<TimelineEntry> {
    records
        .iter()
        .filter_map(|r| {
            let start = r.arrival_date?;
            let end = r.effective_end_date()?;
            Some(TimelineEntry {
                serial: r.serial.clone(),
                board: r.board.clone(),
                start,
                end,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::loader::Cell;
    use crate::services::schema::coerce_money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn refs(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    #[test]
    fn value_sum_skips_missing_and_non_numeric() {
        let raw = [Cell::Number(100.0), Cell::Text("abc".into()), Cell::Empty, Cell::Number(50.0)];
        let records: Vec<Record> = raw
            .iter()
            .map(|cell| Record { value: coerce_money(cell), ..Default::default() })
            .collect();

        let metrics = aggregate(&refs(&records));

        assert_eq!(metrics.total_value, Decimal::from(150));
        assert_eq!(metrics.total_records, 4);
    }

    #[test]
    fn mean_days_to_repair_ignores_incomplete_pairs() {
        let records = vec![
            Record { arrival_date: Some(date(2024, 1, 1)), repair_date: Some(date(2024, 1, 3)), ..Default::default() },
            Record { arrival_date: Some(date(2024, 1, 1)), ..Default::default() },
            Record { arrival_date: Some(date(2024, 1, 5)), repair_date: Some(date(2024, 1, 10)), ..Default::default() },
        ];
        assert_eq!(mean_days_to_repair(&refs(&records)), Some(3.5));
        assert_eq!(mean_days_to_repair(&[]), None);
    }

    #[test]
    fn monthly_series_omit_empty_months() {
        let records = vec![
            Record { arrival_date: Some(date(2024, 3, 2)), ..Default::default() },
            Record { arrival_date: Some(date(2024, 1, 15)), repair_date: Some(date(2024, 3, 1)), ..Default::default() },
            Record { arrival_date: Some(date(2024, 1, 20)), ..Default::default() },
        ];
        let metrics = aggregate(&refs(&records));

        assert_eq!(
            metrics.monthly_arrivals,
            vec![
                MonthlyCount { month: "2024-01".into(), count: 2 },
                MonthlyCount { month: "2024-03".into(), count: 1 },
            ]
        );
        assert_eq!(metrics.monthly_repairs, vec![MonthlyCount { month: "2024-03".into(), count: 1 }]);
    }

    #[test]
    fn status_kpis_only_count_recognized_statuses() {
        let records: Vec<Record> = ["Reparada", "Retorno", "X", "Reparada"]
            .iter()
            .map(|s| Record { status: Some(s.to_string()), ..Default::default() })
            .collect();
        let metrics = aggregate(&refs(&records));

        assert_eq!(metrics.total_records, 4);
        assert_eq!(metrics.status_kpis.repaired, 2);
        assert_eq!(metrics.status_kpis.returned, 1);
        assert_eq!(metrics.status_kpis.in_progress, 0);
        assert_eq!(metrics.status_kpis.no_repair, 0);
        // "X" continua visível na distribuição do gráfico de pizza
        assert!(metrics.status_distribution.iter().any(|c| c.label == "X" && c.count == 1));
    }

    #[test]
    fn value_is_grouped_by_batch_and_board() {
        let rec = |batch: &str, board: &str, value: Option<&str>| Record {
            batch: Some(batch.into()),
            board: Some(board.into()),
            value: value.map(|v| Decimal::from_str(v).unwrap()),
            arrival_date: Some(date(2024, 2, 1)),
            ..Default::default()
        };
        let records = vec![
            rec("BM-2", "PL-1", Some("10.50")),
            rec("BM-1", "PL-1", Some("20")),
            rec("BM-2", "PL-2", Some("5")),
            rec("BM-3", "PL-2", None),
        ];
        let metrics = aggregate(&refs(&records));

        assert_eq!(
            metrics.value_by_batch,
            vec![
                CategoryValue { label: "BM-1".into(), value: Decimal::from(20) },
                CategoryValue { label: "BM-2".into(), value: Decimal::from_str("15.5").unwrap() },
            ]
        );
        assert_eq!(
            metrics.value_by_board,
            vec![
                CategoryValue { label: "PL-1".into(), value: Decimal::from_str("30.5").unwrap() },
                CategoryValue { label: "PL-2".into(), value: Decimal::from(5) },
            ]
        );
        assert_eq!(
            metrics.monthly_value,
            vec![MonthlyValue { month: "2024-02".into(), value: Decimal::from_str("35.5").unwrap() }]
        );
    }

    #[test]
    fn distinct_serials_and_board_counts() {
        let rec = |serial: Option<&str>, board: &str| Record {
            serial: serial.map(str::to_string),
            board: Some(board.into()),
            ..Default::default()
        };
        let records = vec![rec(Some("S1"), "PL-1"), rec(Some("S1"), "PL-1"), rec(Some("S2"), "PL-2"), rec(None, "PL-2")];
        let metrics = aggregate(&refs(&records));

        assert_eq!(metrics.distinct_serials, 2);
        assert_eq!(
            metrics.board_counts,
            vec![
                CategoryCount { label: "PL-1".into(), count: 2 },
                CategoryCount { label: "PL-2".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn timeline_falls_back_to_forecast_and_drops_open_ended_rows() {
        let records = vec![
            Record {
                serial: Some("S1".into()),
                arrival_date: Some(date(2024, 1, 1)),
                forecast_date: Some(date(2024, 1, 20)),
                ..Default::default()
            },
            Record { serial: Some("S2".into()), arrival_date: Some(date(2024, 1, 1)), ..Default::default() },
            Record { serial: Some("S3".into()), repair_date: Some(date(2024, 1, 5)), ..Default::default() },
        ];
        let entries = timeline(&refs(&records));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].serial.as_deref(), Some("S1"));
        assert_eq!(entries[0].end, date(2024, 1, 20));
    }

    #[test]
    fn empty_view_yields_zeroed_metrics() {
        let metrics = aggregate(&[]);
        assert_eq!(metrics, DashboardMetrics::default());
    }
}
