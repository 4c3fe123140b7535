//! # Módulo Core — Modelo de Dados do Sistema Especialista
//!
//! Tipos fundamentais sobre os quais o motor de inferência opera:
//!
//! - [`Property`] — atributo sim/não, identificado pelo nome normalizado
//! - [`Entry`] — candidato a recomendação (ex: um meio de cultura) com propriedades ordenadas
//! - [`KnowledgeBase`] — coleção ordenada de entradas + descrição
//! - [`KnowledgeBaseDocument`] — forma versionada (`__v = 1`) usada na persistência
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::KnowledgeBase;
//!
//! let mut kb = KnowledgeBase::new();
//! kb.insert("Ágar MacConkey", "Seletivo para Gram-negativos")?;
//! kb.insert("Ágar MacConkey", "Diferencia fermentação de lactose")?;
//!
//! let json = kb.save_to().to_json()?;
//! let mut copia = KnowledgeBase::new();
//! copia.load_from(&json)?;
//! ```

/// Sub-módulo com [`Property`] e a normalização de nomes.
pub mod property;

/// Sub-módulo com [`Entry`].
pub mod entry;

/// Sub-módulo com [`KnowledgeBase`] — contêiner central.
pub mod knowledge_base;

/// Sub-módulo com o formato de documento versionado.
pub mod document;

pub use document::{EntryRecord, KnowledgeBaseDocument, FORMAT_VERSION};
pub use entry::Entry;
pub use knowledge_base::KnowledgeBase;
pub use property::{normalize_name, Property};
