//! # Persistência — Salvamento e Carregamento da KB em Disco
//!
//! Módulo responsável por gravar e ler o documento versionado da
//! [`KnowledgeBase`] (veja [`core::document`](crate::core::document)).
//!
//! ## Nomes de Arquivo
//!
//! As interfaces recebem só um **nome** de arquivo digitado pelo usuário.
//! [`resolve_path()`] o transforma em caminho dentro do diretório de dados:
//!
//! | Entrada | Resultado |
//! |---------|-----------|
//! | `"medios"` | `data/medios.json` |
//! | `"medios.json"` | `data/medios.json` |
//! | `"  "` | [`FileNameError::Empty`] |
//! | `"../x"`, `"/etc/x"`, `"."` | [`FileNameError::Invalid`] |
//!
//! ## ⚠️ Atomicidade
//!
//! A escrita **não é atômica** — crash durante escrita pode corromper
//! o arquivo.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::KnowledgeBase;
use crate::error::{require, EmptyFieldError, Field};

/// Nome de arquivo recusado por [`resolve_path()`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileNameError {
    #[error(transparent)]
    Empty(#[from] EmptyFieldError),
    #[error("nome de arquivo inválido: {0:?}")]
    Invalid(String),
}

/// Resolve o nome digitado pelo usuário para um caminho dentro de `data_dir`.
///
/// Acrescenta `.json` quando não há extensão. Caminhos absolutos e
/// componentes `..` são recusados.
pub fn resolve_path(data_dir: &Path, filename: &str) -> Result<PathBuf, FileNameError> {
    let filename = require(filename, Field::FileName)?;
    let relative = Path::new(filename);

    let only_normal = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    // "." e "./." não nomeiam arquivo: set_extension sairia de data_dir
    let names_file = matches!(relative.components().last(), Some(Component::Normal(_)));
    if !only_normal || !names_file {
        return Err(FileNameError::Invalid(filename.to_string()));
    }

    let mut path = data_dir.join(relative);
    if path.extension().is_none() {
        path.set_extension("json");
    }
    if !path.starts_with(data_dir) {
        return Err(FileNameError::Invalid(filename.to_string()));
    }
    Ok(path)
}

/// Salva a KnowledgeBase em disco como JSON pretty-printed.
///
/// Cria o diretório pai se não existir.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o diretório, serializar,
/// ou escrever no arquivo.
pub fn save_kb(path: &Path, kb: &KnowledgeBase) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = kb
        .save_to()
        .to_json()
        .context("Falha ao serializar KnowledgeBase")?;
    std::fs::write(path, json)
        .with_context(|| format!("Falha ao escrever {}", path.display()))?;
    tracing::info!(path = %path.display(), entries = kb.entry_count(), "KB salva em disco");
    Ok(())
}

/// Carrega um arquivo sobre a base existente (soma via get-or-add).
///
/// # Erros
///
/// Erro de leitura, ou [`FormatError`](crate::error::FormatError) embrulhado
/// com contexto — recuperável na interface via `downcast_ref`.
pub fn load_kb(path: &Path, kb: &mut KnowledgeBase) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    kb.load_from(&json)
        .with_context(|| format!("Falha ao interpretar {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        entries = kb.entry_count(),
        properties = kb.property_count(),
        "KB carregada do disco"
    );
    Ok(())
}

/// Abre a base inicial: o arquivo se existir, senão uma base vazia.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido
/// ou em versão não suportada.
pub fn open_kb(path: &Path) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();
    if !path.exists() {
        tracing::info!(path = %path.display(), "Arquivo de KB não encontrado, iniciando KB vazia");
        return Ok(kb);
    }
    load_kb(path, &mut kb)?;
    Ok(kb)
}
