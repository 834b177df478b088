// src/loader/spreadsheet.rs

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Reader};
use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    loader::raw_table::{Cell, RawDataset, RawTable},
};

/// Planilha local (xlsx/xls/ods ou csv).
#[derive(Debug, Clone)]
pub struct LocalSpreadsheet {
    pub path: PathBuf,
    pub sheet_name: String,
}

impl LocalSpreadsheet {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self { path: path.into(), sheet_name: sheet_name.into() }
    }

    pub async fn fetch(&self) -> Result<RawDataset, AppError> {
        let path = self.path.clone();
        let sheet_name = self.sheet_name.clone();

        // Leitura de arquivo é bloqueante: roda fora do runtime
        tokio::task::spawn_blocking(move || read_local(&path, &sheet_name))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de leitura da planilha: {}", e))?
    }
}

fn read_local(path: &Path, sheet_name: &str) -> Result<RawDataset, AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::SourceError(format!("{}: {}", path.display(), e)))?;
    let last_modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let table = if is_csv {
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::SourceError(format!("{}: {}", path.display(), e)))?;
        // CSV corrompido é falha da origem, como qualquer outra leitura
        read_csv(file).map_err(|e| AppError::SourceError(format!("{}: {}", path.display(), e)))?
    } else {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range(sheet_name)?;
        RawTable::from_range(&range)
    };

    tracing::info!("📄 Planilha local '{}' lida: {} linhas", path.display(), table.len());

    Ok(RawDataset { table, last_modified })
}

/// Lê uma planilha a partir dos bytes baixados (formato detectado pelo conteúdo).
pub fn read_workbook_bytes(bytes: Vec<u8>, sheet_name: &str) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(sheet_name)?;
    Ok(RawTable::from_range(&range))
}

/// CSV com cabeçalho; todas as células chegam como texto.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let columns = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_fields_become_text_cells() {
        let data = "SERIAL,VALOR\nSN1,100\nSN2,\n";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.columns, vec!["SERIAL", "VALOR"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::Text("100".into()));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
    }

    #[tokio::test]
    async fn local_csv_is_loaded_with_modification_time() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "SEQ,SERIAL").unwrap();
        writeln!(file, "1,SN1").unwrap();

        let source = LocalSpreadsheet::new(file.path(), "Reparos Paiva");
        let dataset = source.fetch().await.unwrap();

        assert_eq!(dataset.table.len(), 1);
        assert!(dataset.last_modified.is_some());
    }

    #[tokio::test]
    async fn missing_file_is_a_source_error() {
        let source = LocalSpreadsheet::new("/nao/existe/reparos.xlsx", "Reparos Paiva");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::SourceError(_)));
    }

    #[tokio::test]
    async fn unreadable_csv_is_a_source_error() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"SEQ,SERIAL\n1,\xff\xfe\n").unwrap();

        let source = LocalSpreadsheet::new(file.path(), "Reparos Paiva");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::SourceError(_)));
    }
}
