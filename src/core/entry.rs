//! # Entry — Candidato a Recomendação
//!
//! Uma [`Entry`] é um item da base de conhecimento — no caso de uso
//! principal, um **meio de cultura** (ex: "Ágar MacConkey"). Ela possui
//! um nome, uma descrição livre e uma lista **ordenada** de
//! [`Property`]s únicas.
//!
//! A ordem das propriedades importa: é a ordem em que as perguntas são
//! feitas durante a consulta.

use std::fmt;

use serde::Serialize;

use super::property::{normalize_name, Property};

/// Item nomeado da base de conhecimento.
///
/// Invariante: nenhuma propriedade da entrada repete o nome normalizado
/// de outra. Propriedades só entram via [`get_or_add_property`](Entry::get_or_add_property).
#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    name: String,
    #[serde(skip)]
    key: String,
    /// Texto livre exibido junto com a recomendação.
    pub description: String,
    properties: Vec<Property>,
}

impl Entry {
    /// Cria uma entrada vazia (sem descrição nem propriedades).
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            key: normalize_name(name),
            description: String::new(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chave normalizada do nome.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Propriedades na ordem de inserção.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// `true` se `name` identifica esta entrada (comparação normalizada).
    pub fn same_name(&self, name: &str) -> bool {
        self.key == normalize_name(name)
    }

    /// Busca uma propriedade desta entrada pelo nome.
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        let key = normalize_name(name);
        self.properties.iter().find(|p| p.key() == key)
    }

    /// `true` se a entrada possui uma propriedade com o mesmo nome de `property`.
    ///
    /// A comparação é por nome, nunca por instância — é isto que permite
    /// às regras de inferência cruzar propriedades de entradas diferentes.
    pub fn has_property(&self, property: &Property) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    /// Retorna a propriedade existente com esse nome, ou anexa uma nova.
    ///
    /// Idempotente por nome: chamar duas vezes com "Lactose" e " lactose"
    /// devolve a mesma propriedade e não cria duplicata.
    pub fn get_or_add_property(&mut self, name: &str) -> &Property {
        let key = normalize_name(name);
        match self.properties.iter().position(|p| p.key() == key) {
            Some(idx) => &self.properties[idx],
            None => {
                tracing::debug!(entry = %self.name, property = %name.trim(), "KB: propriedade adicionada");
                self.properties.push(Property::new(name));
                &self.properties[self.properties.len() - 1]
            }
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entry {}

/// Listagem legível da entrada (usada em "Ver base" e no console).
///
/// ```text
/// Entrada "Ágar Sangue":
///     Meio enriquecido para observar hemólise.
///     - Enriquecido
///     - Contém sangue
/// ```
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entrada \"{}\":", self.name)?;
        if !self.description.is_empty() {
            write!(f, "\n    {}", self.description)?;
        }
        for prop in &self.properties {
            write!(f, "\n    - {}", prop.name())?;
        }
        Ok(())
    }
}
