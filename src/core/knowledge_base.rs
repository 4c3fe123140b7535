//! # KnowledgeBase — Contêiner Central de Conhecimento
//!
//! A [`KnowledgeBase`] guarda as [`Entry`]s do sistema especialista em
//! **ordem de inserção**. Essa ordem é a ordem de busca do motor de
//! inferência: a primeira entrada compatível com as respostas vence.
//!
//! ## Armazenamento
//!
//! - **Entradas**: `Vec<Entry>` — únicas por nome normalizado
//! - **Descrição**: texto livre da base (ex: "Meios de cultivo")
//!
//! As buscas por nome são lineares. Bases de sistemas especialistas de
//! sala de aula têm dezenas de entradas, não milhares.
//!
//! ## Persistência
//!
//! O formato versionado em JSON fica em [`document`](super::document):
//! [`save_to()`](KnowledgeBase::save_to) e [`load_from()`](KnowledgeBase::load_from).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::KnowledgeBase;
//!
//! let mut kb = KnowledgeBase::new();
//! let entry = kb.get_or_add_entry("Ágar Sangue");
//! entry.get_or_add_property("Enriquecido");
//!
//! // Mesmo nome, outra grafia — mesma entrada
//! assert_eq!(kb.get_or_add_entry(" ágar sangue").properties().len(), 1);
//! assert_eq!(kb.entry_count(), 1);
//! ```

use std::fmt;

use super::entry::Entry;
use super::property::normalize_name;
use crate::error::{require, EmptyFieldError, Field};

/// Descrição atribuída a uma base recém-criada.
pub const DEFAULT_DESCRIPTION: &str = "Base de conhecimento";

/// Coleção ordenada de entradas únicas, mais metadados.
///
/// No servidor web ela é compartilhada como `Arc<RwLock<KnowledgeBase>>`;
/// no console pertence à sessão interativa.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    description: String,
    entries: Vec<Entry>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Cria uma base vazia com a descrição padrão.
    pub fn new() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Entradas na ordem de inserção (= ordem de busca da inferência).
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Busca uma entrada pelo nome (case-insensitive, aparado).
    pub fn find_entry(&self, name: &str) -> Option<&Entry> {
        let key = normalize_name(name);
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Retorna a entrada existente com esse nome ou anexa uma nova.
    ///
    /// Nunca falha. Chamadas repetidas com o mesmo nome (em qualquer
    /// capitalização ou com espaços nas pontas) devolvem sempre a mesma
    /// entrada e a base cresce no máximo uma vez.
    pub fn get_or_add_entry(&mut self, name: &str) -> &mut Entry {
        let key = normalize_name(name);
        let idx = match self.entries.iter().position(|e| e.key() == key) {
            Some(idx) => idx,
            None => {
                tracing::debug!(entry = %name.trim(), "KB: entrada criada");
                self.entries.push(Entry::new(name));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Insere (ou reaproveita) a entrada `entry_name` e lhe adiciona `property_name`.
    ///
    /// Operação usada pelas interfaces: ambos os campos são obrigatórios.
    /// Com qualquer um em branco nada é alterado e [`EmptyFieldError`] é
    /// devolvido para a interface exibir o aviso.
    pub fn insert(
        &mut self,
        entry_name: &str,
        property_name: &str,
    ) -> Result<&Entry, EmptyFieldError> {
        let entry_name = require(entry_name, Field::EntryName)?;
        let property_name = require(property_name, Field::PropertyName)?;
        let entry = self.get_or_add_entry(entry_name);
        entry.get_or_add_property(property_name);
        Ok(&*entry)
    }

    /// Número de entradas.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Total de propriedades somando todas as entradas (sem deduplicar entre entradas).
    pub fn property_count(&self) -> usize {
        self.entries.iter().map(|e| e.properties().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Listagem "Ver base": descrição entre colchetes seguida das entradas.
impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.description)?;
        for entry in &self.entries {
            write!(f, "\n{}\n", entry)?;
        }
        Ok(())
    }
}
