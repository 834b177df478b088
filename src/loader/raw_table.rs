// src/loader/raw_table.rs

use calamine::{Data, Range};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Valor bruto de uma célula, antes de qualquer conversão de tipo.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            // Datas do Excel; durações não são datas válidas
            Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Empty),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Tabela em memória com colunas nomeadas, como lida da origem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Monta a tabela a partir de uma aba: a primeira linha é o cabeçalho.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();

        let columns = match rows.next() {
            Some(header) => header.iter().map(|cell| cell.to_string().trim().to_string()).collect(),
            None => return Self::default(),
        };

        let rows = rows
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Célula da linha `row` na coluna `col`; linhas curtas leem como vazias.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&Cell::Empty)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tabela bruta mais a data de última modificação do arquivo de origem.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub table: RawTable,
    pub last_modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_becomes_columns() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("SERIAL ".into()));
        range.set_value((0, 1), Data::String("VALOR".into()));
        range.set_value((1, 0), Data::String("SN1".into()));
        range.set_value((1, 1), Data::Float(10.5));
        range.set_value((2, 0), Data::String("SN2".into()));

        let table = RawTable::from_range(&range);

        assert_eq!(table.columns, vec!["SERIAL", "VALOR"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::Number(10.5));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
        assert_eq!(table.column_index("VALOR"), Some(1));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 0));
        range.set_value((0, 0), Data::String("SERIAL".into()));
        range.set_value((2, 0), Data::String("SN9".into()));

        let table = RawTable::from_range(&range);

        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0), &Cell::Text("SN9".into()));
    }

    #[test]
    fn out_of_bounds_cells_read_as_empty() {
        let table = RawTable::new(vec!["A".into(), "B".into()], vec![vec![Cell::Bool(true)]]);
        assert_eq!(table.cell(0, 1), &Cell::Empty);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
    }
}
