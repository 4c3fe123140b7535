//! # Property — Atributo Sim/Não de uma Entrada
//!
//! Uma [`Property`] é um atributo nomeado que uma entrada pode possuir
//! (ex: "Seletivo para Gram-negativos", "Contém sangue de carneiro").
//! Durante a consulta, cada propriedade vira uma pergunta de sim/não.
//!
//! ## Identidade por Nome
//!
//! Duas propriedades são **iguais** se seus nomes coincidem após
//! normalização — `trim` → Unicode NFC → minúsculas. Não há identidade
//! por instância: a mesma propriedade conceitual aparece como instâncias
//! distintas em entradas diferentes, e as regras de inferência comparam
//! sempre pelo nome normalizado (veja [`Property::same_name`]).
//!
//! ```text
//! "  Hemólise " ≡ "hemólise" ≡ "HEMÓLISE"   (mesma chave: "hemólise")
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Normaliza um nome para comparação: aparado, NFC e em minúsculas.
///
/// A normalização NFC garante que "á" digitado como caractere único e
/// como "a" + acento combinante produzam a mesma chave.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_lowercase()
}

/// Atributo nomeado e imutável de uma [`Entry`](super::Entry).
///
/// Criada uma única vez quando referenciada pela primeira vez por uma
/// entrada, e nunca modificada depois.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Property {
    /// Nome exibido (aparado, capitalização original preservada).
    name: String,
    /// Chave de identidade — resultado de [`normalize_name`].
    key: String,
}

impl Property {
    /// Cria uma propriedade a partir de um nome (espaços nas pontas são removidos).
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            key: normalize_name(name),
        }
    }

    /// Nome legível da propriedade.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chave normalizada usada na comparação.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `true` se `name` se refere a esta propriedade (comparação normalizada).
    pub fn same_name(&self, name: &str) -> bool {
        self.key == normalize_name(name)
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Property::new(&name)
    }
}

impl From<Property> for String {
    fn from(property: Property) -> Self {
        property.name
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
