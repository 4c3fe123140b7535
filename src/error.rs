//! # Erros do Domínio
//!
//! Taxonomia dos erros recuperáveis do sistema especialista. Nenhum deles é
//! fatal ao processo — todos são capturados e reportados na fronteira mais
//! próxima da sua origem (console ou handler web).
//!
//! | Erro | Origem | Recuperação |
//! |------|--------|-------------|
//! | [`FormatError`] | [`KnowledgeBase::load_from`](crate::core::KnowledgeBase::load_from) | Mensagem "arquivo inválido"; a KB fica no estado parcial alcançado |
//! | [`InputError`] | Parsing de [`Answer`](crate::inference::Answer) | Nova pergunta ao usuário |
//! | [`EmptyFieldError`] | Inserção de entrada/propriedade, nome de arquivo | No-op + aviso |

use thiserror::Error;

/// Documento de base de conhecimento inválido ou de versão não suportada.
#[derive(Debug, Error)]
pub enum FormatError {
    /// O texto não é JSON válido (ou não é um objeto).
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    /// O campo `__v` está ausente.
    #[error("documento sem a tag de versão `__v`")]
    MissingVersion,

    /// O campo `__v` existe mas não é a versão suportada.
    #[error("versão de documento não suportada: {found} (esperado {expected})")]
    UnsupportedVersion {
        found: serde_json::Value,
        expected: u32,
    },

    /// Campo obrigatório de nível superior ausente ou com tipo errado.
    #[error("campo obrigatório ausente ou inválido: `{0}`")]
    MissingField(&'static str),

    /// Registro de entrada malformado. As entradas anteriores já foram aplicadas.
    #[error("entrada #{index} malformada: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Campo de formulário que não admite valor vazio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    EntryName,
    PropertyName,
    FileName,
}

impl Field {
    /// Label PT-BR usado nas mensagens de aviso.
    pub fn label(&self) -> &'static str {
        match self {
            Field::EntryName => "nome da entrada",
            Field::PropertyName => "propriedade",
            Field::FileName => "nome do arquivo",
        }
    }
}

/// Um campo obrigatório chegou vazio (ou só com espaços).
#[derive(Debug, Error, PartialEq, Eq)]
#[error("não são admitidos valores vazios: {}", .field.label())]
pub struct EmptyFieldError {
    pub field: Field,
}

impl EmptyFieldError {
    pub fn new(field: Field) -> Self {
        Self { field }
    }
}

/// Resposta que não é nem "sim" nem "não".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("resposta inválida: {input:?} (use s/n)")]
pub struct InputError {
    pub input: String,
}

/// Retorna o texto aparado, ou [`EmptyFieldError`] se estiver em branco.
pub fn require(value: &str, field: Field) -> Result<&str, EmptyFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EmptyFieldError::new(field))
    } else {
        Ok(trimmed)
    }
}
