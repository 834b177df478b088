// src/loader.rs

pub mod raw_table;
pub mod sharepoint;
pub mod spreadsheet;

pub use raw_table::{Cell, RawDataset, RawTable};
pub use sharepoint::{SharePointAuth, SharePointSource};
pub use spreadsheet::LocalSpreadsheet;

use crate::common::error::AppError;

/// De onde vem a planilha de reparos.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Local(LocalSpreadsheet),
    SharePoint(SharePointSource),
}

impl RecordSource {
    pub async fn fetch(&self) -> Result<RawDataset, AppError> {
        match self {
            RecordSource::Local(source) => source.fetch().await,
            RecordSource::SharePoint(source) => source.fetch().await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RecordSource::Local(source) => format!("arquivo local {}", source.path.display()),
            RecordSource::SharePoint(source) => format!("SharePoint {}{}", source.site_url, source.file_url),
        }
    }
}
