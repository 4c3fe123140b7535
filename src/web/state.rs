//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre todos os handlers Axum.
//!
//! ```text
//! AppState
//!  ├── kb             Arc<RwLock<KnowledgeBase>>   ← leitura por consulta, escrita por insert/load
//!  ├── consultations  Arc<Mutex<ConsultationStore>> ← uma sessão por consulta em andamento
//!  ├── events_tx      broadcast::Sender             → /events (SSE)
//!  └── config         Arc<AppConfig>                ← data_dir para salvar/carregar
//! ```
//!
//! Ordem de locks: `consultations` antes de `kb`. Nenhum lock atravessa
//! um `.await`.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::core::KnowledgeBase;
use crate::session::ConsultationStore;
use crate::settings::AppConfig;
use crate::web::events::KnowledgeEvent;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Base de conhecimento compartilhada, protegida por `RwLock`.
    pub kb: Arc<RwLock<KnowledgeBase>>,
    /// Consultas em andamento, por id.
    pub consultations: Arc<Mutex<ConsultationStore>>,
    /// Canal broadcast para eventos SSE.
    pub events_tx: Arc<broadcast::Sender<KnowledgeEvent>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(kb: Arc<RwLock<KnowledgeBase>>, config: AppConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            kb,
            consultations: Arc::new(Mutex::new(ConsultationStore::new(
                config.session_ttl_minutes,
            ))),
            events_tx: Arc::new(events_tx),
            config: Arc::new(config),
        }
    }

    /// Publica um evento; sem assinantes o envio falha e é ignorado.
    pub fn publish(&self, event: KnowledgeEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::trace!("Evento SSE sem assinantes");
        }
    }
}
