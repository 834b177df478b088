// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{
    loader::{LocalSpreadsheet, RecordSource, SharePointAuth, SharePointSource},
    models::auth::CredentialStore,
    services::{AuthService, DashboardService, SessionStore},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_COOKIE_NAME: &str = "dashboard_reparos";
const DEFAULT_COOKIE_EXPIRY_DAYS: i64 = 30;
const DEFAULT_PRIVILEGED_ROLE: &str = "PAIVA";
const DEFAULT_SHEET_NAME: &str = "Reparos Paiva";

/// Configuração do cookie de sessão.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    /// Chave de assinatura do token
    pub key: String,
    pub expiry_days: i64,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub credentials_file: PathBuf,
    pub cookie: CookieSettings,
    pub privileged_role: String,
    pub source: RecordSource,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let expiry_days = match env::var("COOKIE_EXPIRY_DAYS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("COOKIE_EXPIRY_DAYS inválido: {}", raw))?,
            Err(_) => DEFAULT_COOKIE_EXPIRY_DAYS,
        };

        let cookie = CookieSettings {
            name: var_or("COOKIE_NAME", DEFAULT_COOKIE_NAME),
            key: required("COOKIE_KEY")?,
            expiry_days,
        };

        Ok(Self {
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            credentials_file: required("CREDENTIALS_FILE")?.into(),
            cookie,
            privileged_role: var_or("PRIVILEGED_ROLE", DEFAULT_PRIVILEGED_ROLE),
            source: Self::source_from_env()?,
        })
    }

    fn source_from_env() -> anyhow::Result<RecordSource> {
        let sheet_name = var_or("SHEET_NAME", DEFAULT_SHEET_NAME);

        match var_or("DATA_SOURCE", "local").to_ascii_lowercase().as_str() {
            "local" => Ok(RecordSource::Local(LocalSpreadsheet::new(
                required("SPREADSHEET_PATH")?,
                sheet_name,
            ))),
            "sharepoint" => {
                let client_id = required("SHAREPOINT_CLIENT_ID")?;
                // Segredo do aplicativo tem prioridade; sem ele, usuário e senha
                let auth = match env::var("SHAREPOINT_CLIENT_SECRET") {
                    Ok(client_secret) => SharePointAuth::App { client_id, client_secret },
                    Err(_) => SharePointAuth::User {
                        client_id,
                        username: required("SHAREPOINT_USERNAME")?,
                        password: required("SHAREPOINT_PASSWORD")?,
                    },
                };
                Ok(RecordSource::SharePoint(SharePointSource {
                    site_url: required("SHAREPOINT_SITE_URL")?,
                    file_url: required("SHAREPOINT_FILE_URL")?,
                    tenant_id: required("SHAREPOINT_TENANT_ID")?,
                    sheet_name,
                    auth,
                }))
            }
            other => anyhow::bail!("DATA_SOURCE desconhecida: {} (use 'local' ou 'sharepoint')", other),
        }
    }
}

pub fn load_credentials(path: &PathBuf) -> anyhow::Result<CredentialStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("lendo o arquivo de credenciais {}", path.display()))?;
    let store: CredentialStore = serde_json::from_str(&text).context("arquivo de credenciais inválido")?;
    Ok(store)
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings::from_env()?;
        let credentials = load_credentials(&settings.credentials_file)?;
        tracing::info!("✅ {} usuários carregados do cadastro", credentials.usernames.len());

        // --- Monta o gráfico de dependências ---
        let auth_service = AuthService::new(
            credentials,
            settings.cookie.key.clone(),
            settings.cookie.expiry_days,
        );
        let dashboard_service = DashboardService::new(
            settings.source.clone(),
            // Cópia da planilha vive o mesmo prazo do cookie de sessão
            SessionStore::new(chrono::Duration::days(settings.cookie.expiry_days)),
            settings.privileged_role.clone(),
        );
        tracing::info!("📊 Fonte da planilha: {}", settings.source.describe());

        Ok(Self {
            settings: Arc::new(settings),
            auth_service,
            dashboard_service,
        })
    }
}
