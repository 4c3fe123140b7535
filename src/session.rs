//! # Sessões de Consulta Web
//!
//! Na interface web cada consulta vive entre várias requisições HTTP:
//! o navegador recebe uma pergunta, responde, recebe a próxima... O
//! [`ConsultationStore`] guarda um [`InferenceEngine`] por consulta em
//! andamento, identificado por UUID v4.
//!
//! ## Ciclo de Vida
//!
//! ```text
//! POST /consultation            → start()  → id + primeira pergunta
//! POST /consultation/{id}/answer → answer() → próxima pergunta
//!                                           → ou resultado (sessão removida)
//! sessões abandonadas            → prune()  após `session_ttl_minutes`
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{KnowledgeBase, Property};
use crate::inference::{Answer, InferenceEngine, Step};

/// Id desconhecido: nunca existiu, já terminou ou expirou.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("consulta {0} não encontrada ou expirada")]
pub struct SessionNotFound(pub Uuid);

/// Uma consulta web em andamento.
pub struct ConsultationSession {
    pub engine: InferenceEngine,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Estado de uma consulta após uma chamada ao store.
#[derive(Clone, Debug)]
pub struct Progress {
    pub id: Uuid,
    pub step: Step,
    /// Propriedades aceitas até aqui (motivos da recomendação).
    pub accepted: Vec<Property>,
    pub questions_asked: usize,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        matches!(self.step, Step::Done(_))
    }

    fn of(id: Uuid, engine: &InferenceEngine, step: Step) -> Self {
        Self {
            id,
            step,
            accepted: engine.accepted_properties().to_vec(),
            questions_asked: engine.questions_asked(),
        }
    }
}

/// Registro das consultas web em andamento.
pub struct ConsultationStore {
    sessions: HashMap<Uuid, ConsultationSession>,
    ttl: Duration,
}

impl ConsultationStore {
    /// TTL abaixo de 1 minuto vira 1 minuto; acima do representável, sem expiração.
    pub fn new(ttl_minutes: i64) -> Self {
        let ttl = Duration::try_minutes(ttl_minutes.max(1)).unwrap_or(Duration::MAX);
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Inicia uma consulta e devolve a primeira pergunta (ou o resultado,
    /// se a base dispensar perguntas). Consultas já concluídas não são guardadas.
    pub fn start(&mut self, kb: Arc<RwLock<KnowledgeBase>>) -> Progress {
        let now = Utc::now();
        self.prune(now);

        let id = Uuid::new_v4();
        let mut engine = InferenceEngine::new(kb);
        engine.start();
        let step = engine.next();
        let progress = Progress::of(id, &engine, step);

        if progress.is_done() {
            tracing::debug!(%id, "Consulta concluída sem perguntas");
        } else {
            tracing::debug!(%id, "Consulta web iniciada");
            self.sessions.insert(
                id,
                ConsultationSession {
                    engine,
                    started_at: now,
                    last_activity: now,
                },
            );
        }
        progress
    }

    /// Registra a resposta e avança. Ao terminar, a sessão é removida.
    pub fn answer(&mut self, id: Uuid, answer: Answer) -> Result<Progress, SessionNotFound> {
        let session = self.sessions.get_mut(&id).ok_or(SessionNotFound(id))?;
        session.last_activity = Utc::now();
        session.engine.set_response(answer);
        let step = session.engine.next();
        let progress = Progress::of(id, &session.engine, step);

        if progress.is_done() {
            if let Some(done) = self.sessions.remove(&id) {
                let elapsed = Utc::now() - done.started_at;
                tracing::debug!(%id, elapsed_ms = elapsed.num_milliseconds(), "Sessão de consulta encerrada");
            }
        }
        Ok(progress)
    }

    /// Remove sessões sem atividade há mais que o TTL. Retorna quantas saíram.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.last_activity <= ttl);
        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Consultas abandonadas removidas");
        }
        removed
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
