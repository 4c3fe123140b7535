//! # Eventos SSE da Base de Conhecimento
//!
//! Define o enum [`KnowledgeEvent`] — mudanças na base e consultas
//! concluídas, enviadas em tempo real a todos os navegadores abertos via
//! Server-Sent Events (SSE). O frontend recarrega a árvore da base a cada
//! evento.
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "type": "EntryInserted", "entry": "Ágar Sangue", "property": "Hemólise", "entries": 7, "properties": 23 }
//! ```

use serde::Serialize;

/// Evento emitido pela camada web, enviado via SSE ao frontend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum KnowledgeEvent {
    /// Par entrada/propriedade inserido pelo formulário.
    EntryInserted {
        entry: String,
        property: String,
        /// Totais da base após a inserção.
        entries: usize,
        properties: usize,
    },

    /// Arquivo carregado (somado) sobre a base.
    Loaded {
        filename: String,
        entries: usize,
        properties: usize,
    },

    Saved { filename: String, entries: usize },

    /// Consulta web concluída. `result` é `None` quando nada foi encontrado.
    ConsultationFinished {
        id: String,
        result: Option<String>,
        questions: usize,
    },
}
