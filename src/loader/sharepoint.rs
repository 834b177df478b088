// src/loader/sharepoint.rs

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    loader::{raw_table::RawDataset, spreadsheet::read_workbook_bytes},
};

const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com";

/// Credenciais usadas para obter o token de acesso ao site.
#[derive(Debug, Clone)]
pub enum SharePointAuth {
    /// Aplicativo registrado (client credentials)
    App { client_id: String, client_secret: String },
    /// Par usuário/senha de uma conta do tenant
    User { client_id: String, username: String, password: String },
}

#[derive(Debug, Clone)]
pub struct SharePointSource {
    pub site_url: String,
    /// Caminho relativo ao servidor, ex.: /sites/Reparos/Documentos/Reparos.xlsx
    pub file_url: String,
    pub tenant_id: String,
    pub sheet_name: String,
    pub auth: SharePointAuth,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ListItemFields {
    #[serde(rename = "Modified")]
    modified: Option<DateTime<Utc>>,
}

impl SharePointSource {
    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    /// Escopo `.default` do host do site (ex.: https://empresa.sharepoint.com/.default).
    fn scope(&self) -> Result<String, AppError> {
        let parsed = reqwest::Url::parse(&self.site_url)
            .map_err(|e| AppError::SourceError(format!("URL do site inválida: {e}")))?;
        Ok(format!("{}/.default", parsed.origin().ascii_serialization()))
    }

    /// Endpoint REST do arquivo; aspas simples no caminho são duplicadas (OData).
    fn file_endpoint(&self) -> String {
        format!(
            "{}/_api/web/GetFileByServerRelativeUrl('{}')",
            self.site_url.trim_end_matches('/'),
            self.file_url.replace('\'', "''"),
        )
    }

    async fn access_token(&self, client: &reqwest::Client) -> Result<String, AppError> {
        let url = format!("{}/{}/oauth2/v2.0/token", TOKEN_ENDPOINT, self.tenant_id);
        let scope = self.scope()?;

        let form: Vec<(&str, &str)> = match &self.auth {
            SharePointAuth::App { client_id, client_secret } => vec![
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ],
            SharePointAuth::User { client_id, username, password } => vec![
                ("grant_type", "password"),
                ("client_id", client_id.as_str()),
                ("username", username.as_str()),
                ("password", password.as_str()),
                ("scope", scope.as_str()),
            ],
        };

        let token: TokenResponse = client
            .post(url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(token.access_token)
    }

    /// Baixa a planilha e a data de modificação. Tudo ou nada, sem retentativa.
    pub async fn fetch(&self) -> Result<RawDataset, AppError> {
        let started = Instant::now();
        let client = self.client();
        let token = self.access_token(&client).await?;
        let bearer = format!("Bearer {}", token);

        // 1. Conteúdo do arquivo
        let bytes = client
            .get(format!("{}/$value", self.file_endpoint()))
            .header(AUTHORIZATION, &bearer)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        // 2. Metadados do item (data de modificação)
        let fields: ListItemFields = client
            .get(format!("{}/ListItemAllFields?$select=Modified", self.file_endpoint()))
            .header(AUTHORIZATION, &bearer)
            .header(ACCEPT, "application/json;odata=nometadata")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let sheet_name = self.sheet_name.clone();
        let table = tokio::task::spawn_blocking(move || read_workbook_bytes(bytes.to_vec(), &sheet_name))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de leitura da planilha: {}", e))??;

        tracing::info!(
            "☁️ Planilha baixada do SharePoint: {} linhas em {:?}",
            table.len(),
            started.elapsed()
        );

        Ok(RawDataset { table, last_modified: fields.modified })
    }
}
