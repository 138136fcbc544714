// src/api/state.rs
use chrono::Utc;
use log::{debug, info};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;

use super::handlers::ws::{SessionUpdate, WsBroker};
use crate::config::AppConfig;
use crate::session::{Collaborators, SessionController};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub collaborators: Collaborators,
    pub sessions: Arc<RwLock<HashMap<String, SessionController>>>,
    pub db_pool: Option<Arc<SqlitePool>>,
    pub broker: WsBroker,
}

impl AppState {
    pub fn new(config: AppConfig, collaborators: Collaborators, db_pool: Option<Arc<SqlitePool>>) -> Self {
        Self {
            config: Arc::new(config),
            collaborators,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            db_pool,
            broker: WsBroker::new(),
        }
    }

    /// Creates a session, registers it and forwards its events to WebSocket clients.
    pub async fn open_session(&self) -> SessionController {
        self.evict_finished().await;

        let controller = SessionController::new(self.collaborators.clone(), self.config.session.clone());

        let mut events = controller.subscribe();
        let broker = self.broker.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => broker.broadcast(SessionUpdate(event)).await,
                    Err(RecvError::Lagged(skipped)) => debug!("WebSocket forwarder skipped {} events", skipped),
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.sessions
            .write()
            .await
            .insert(controller.id().to_string(), controller.clone());
        controller
    }

    pub async fn session(&self, id: &str) -> Option<SessionController> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn all_sessions(&self) -> Vec<SessionController> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Drops sessions submitted longer than `finished_retention_secs` ago.
    /// Sessions with a delivery still in flight are kept.
    pub async fn evict_finished(&self) -> usize {
        let retention = i64::try_from(self.config.session.finished_retention_secs).unwrap_or(i64::MAX);
        let now = Utc::now();

        let mut expired = Vec::new();
        for session in self.all_sessions().await {
            let Some(submitted_at) = session.submitted_at().await else {
                continue;
            };
            if session.is_delivering().await {
                continue;
            }
            if (now - submitted_at).num_seconds() >= retention {
                expired.push(session.id().to_string());
            }
        }

        if expired.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.dispose();
            }
        }
        info!("🧹 Evicted {} finished sessions", expired.len());
        expired.len()
    }

    pub async fn close_session(&self, id: &str) -> Option<SessionController> {
        let removed = self.sessions.write().await.remove(id);
        if let Some(controller) = &removed {
            controller.dispose();
        }
        removed
    }
}
