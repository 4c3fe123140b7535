//! # Documento Versionado da Base de Conhecimento
//!
//! Formato JSON usado para salvar e carregar uma [`KnowledgeBase`]:
//!
//! ```json
//! {
//!   "__v": 1,
//!   "description": "Meios de cultivo",
//!   "entries": [
//!     { "name": "Ágar Sangue", "description": "...", "props": ["Enriquecido"] }
//!   ]
//! }
//! ```
//!
//! ## O que é persistido
//!
//! Descrição da base, e para cada entrada (em ordem) nome, descrição e a
//! lista ordenada de **nomes** de propriedades. Nada além disso.
//!
//! ## Carregamento
//!
//! [`load_from()`](KnowledgeBase::load_from) valida o cabeçalho antes de
//! tocar na base e depois reaplica as entradas via get-or-add — ou seja,
//! o carregamento **soma** à base existente em vez de substituí-la.
//! Um registro de entrada malformado interrompe o processo com
//! [`FormatError::InvalidEntry`], mantendo as entradas anteriores já
//! aplicadas (sem rollback).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::knowledge_base::KnowledgeBase;
use crate::error::FormatError;

/// Única versão de documento suportada.
pub const FORMAT_VERSION: u32 = 1;

/// Documento completo, na forma em que é gravado.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    #[serde(rename = "__v")]
    pub version: u32,
    pub description: String,
    pub entries: Vec<EntryRecord>,
}

/// Registro de uma entrada no documento.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub description: String,
    pub props: Vec<String>,
}

impl KnowledgeBaseDocument {
    /// Serializa como JSON indentado (legível para edição manual).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl KnowledgeBase {
    /// Gera o documento versionado desta base.
    pub fn save_to(&self) -> KnowledgeBaseDocument {
        KnowledgeBaseDocument {
            version: FORMAT_VERSION,
            description: self.description().to_string(),
            entries: self
                .entries()
                .iter()
                .map(|entry| EntryRecord {
                    name: entry.name().to_string(),
                    description: entry.description.clone(),
                    props: entry
                        .properties()
                        .iter()
                        .map(|p| p.name().to_string())
                        .collect(),
                })
                .collect(),
        }
    }

    /// Carrega um documento JSON sobre esta base.
    ///
    /// # Erros
    ///
    /// - [`FormatError::Json`] — texto não é um objeto JSON
    /// - [`FormatError::MissingVersion`] / [`FormatError::UnsupportedVersion`] — `__v` ≠ 1
    /// - [`FormatError::MissingField`] — `description` ou `entries` ausentes
    /// - [`FormatError::InvalidEntry`] — registro de entrada malformado
    ///
    /// Os três primeiros casos não alteram a base. O último deixa aplicadas
    /// as entradas anteriores ao registro inválido.
    pub fn load_from(&mut self, document: &str) -> Result<(), FormatError> {
        let mut root: serde_json::Map<String, Value> = serde_json::from_str(document)?;

        match root.get("__v") {
            None => return Err(FormatError::MissingVersion),
            // `1.0` vale como `1`; a string "1" não
            Some(v) if v.as_f64() == Some(f64::from(FORMAT_VERSION)) => {}
            Some(v) => {
                return Err(FormatError::UnsupportedVersion {
                    found: v.clone(),
                    expected: FORMAT_VERSION,
                })
            }
        }

        let description = match root.remove("description") {
            Some(Value::String(s)) => s,
            _ => return Err(FormatError::MissingField("description")),
        };
        let records = match root.remove("entries") {
            Some(Value::Array(items)) => items,
            _ => return Err(FormatError::MissingField("entries")),
        };

        self.set_description(description);

        for (index, raw) in records.into_iter().enumerate() {
            let record: EntryRecord = serde_json::from_value(raw)
                .map_err(|source| FormatError::InvalidEntry { index, source })?;
            let entry = self.get_or_add_entry(&record.name);
            entry.description = record.description;
            for prop in &record.props {
                entry.get_or_add_property(prop);
            }
        }

        tracing::debug!(
            entries = self.entry_count(),
            properties = self.property_count(),
            "KB: documento aplicado"
        );
        Ok(())
    }
}
