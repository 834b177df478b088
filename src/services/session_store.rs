// src/services/session_store.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::record::Record;

/// Cópia da planilha pertencente a uma sessão.
#[derive(Debug)]
pub struct SessionData {
    pub records: Vec<Record>,
    pub last_modified: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
}

/// Dados carregados por sessão. Nenhuma sessão enxerga ou altera os dados de outra.
///
/// Uma cópia vive no máximo `ttl` desde a carga, o mesmo prazo do token que a
/// abriu; depois disso é descartada na próxima inserção.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionData>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    fn is_expired(&self, data: &SessionData, now: DateTime<Utc>) -> bool {
        data.loaded_at + self.ttl <= now
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Arc<SessionData>> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&session_id)
            .filter(|data| !self.is_expired(data, now))
            .cloned()
    }

    /// Substitui (ou cria) os dados da sessão e devolve a nova cópia.
    /// Aproveita a escrita para descartar sessões vencidas.
    pub async fn insert(&self, session_id: Uuid, data: SessionData) -> Arc<SessionData> {
        let data = Arc::new(data);
        let mut sessions = self.sessions.write().await;

        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!("🧹 {} sessões vencidas descartadas", purged);
        }

        sessions.insert(session_id, data.clone());
        data
    }

    pub async fn remove(&self, session_id: Uuid) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(rows: usize) -> SessionData {
        SessionData {
            records: vec![Record::default(); rows],
            last_modified: None,
            loaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(Duration::days(30));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.insert(a, data(2)).await;
        store.insert(b, data(5)).await;

        assert_eq!(store.get(a).await.unwrap().records.len(), 2);
        assert_eq!(store.get(b).await.unwrap().records.len(), 5);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted_on_insert() {
        let store = SessionStore::new(Duration::days(30));
        for _ in 0..50 {
            let stale = SessionData { loaded_at: Utc::now() - Duration::days(400), ..data(1) };
            store.insert(Uuid::new_v4(), stale).await;
        }

        let fresh = Uuid::new_v4();
        store.insert(fresh, data(2)).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(fresh).await.unwrap().records.len(), 2);
    }

    #[tokio::test]
    async fn expired_session_reads_as_missing() {
        let store = SessionStore::new(Duration::days(30));
        let id = Uuid::new_v4();
        store
            .insert(id, SessionData { loaded_at: Utc::now() - Duration::days(31), ..data(1) })
            .await;

        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn insert_replaces_and_remove_drops() {
        let store = SessionStore::new(Duration::days(30));
        let id = Uuid::new_v4();

        let old = store.insert(id, data(1)).await;
        store.insert(id, data(3)).await;

        // Quem ainda segura a cópia antiga não é afetado
        assert_eq!(old.records.len(), 1);
        assert_eq!(store.get(id).await.unwrap().records.len(), 3);

        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(!store.remove(id).await);
    }
}
