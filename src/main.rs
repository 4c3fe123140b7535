#![allow(dead_code)]
#![allow(rustdoc::broken_intra_doc_links, rustdoc::invalid_html_tags)]
//! # Meios de Cultivo — Sistema Especialista
//!
//! **Ponto de entrada principal** do recomendador de meios de cultivo
//! (ágares) por eliminação: o sistema pergunta "É/Tem X?" até sobrar a
//! primeira entrada compatível com todas as respostas.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Lê .env (dotenvy)
//!   ├── Configura tracing/logging
//!   ├── Carrega AppConfig (padrões → arquivo → ambiente → argumento)
//!   ├── Carrega a KB inicial do disco (ou cria vazia)
//!   └── Modo:
//!       ├── web     → AppState + Router, servidor TCP
//!       └── console → menu interativo em spawn_blocking
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Servidor web em http://localhost:3000
//! cargo run
//!
//! # Menu no terminal, com logs detalhados
//! RUST_LOG=debug cargo run -- console
//! ```

/// Módulo `core` — Property, Entry, KnowledgeBase e o documento versionado.
mod core;

/// Módulo `error` — erros recuperáveis do domínio.
mod error;

/// Módulo `inference` — regras de eliminação e o motor de consulta.
mod inference;

/// Módulo `persistence` — arquivos da KB no diretório de dados.
mod persistence;

/// Módulo `settings` — AppConfig em camadas.
mod settings;

/// Módulo `console` — menu interativo (modo bloqueante).
mod console;

/// Módulo `session` — consultas web em andamento.
mod session;

/// Módulo `web` — servidor axum, handlers HTMX, templates e SSE.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

use crate::core::KnowledgeBase;
use crate::settings::{AppConfig, Mode};
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // .env é opcional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mode_arg = std::env::args().nth(1);
    let config = AppConfig::load()
        .context("Falha ao carregar configuração")?
        .with_mode_arg(mode_arg.as_deref())
        .map_err(anyhow::Error::msg)?;

    tracing::info!(mode = ?config.mode, kb_path = %config.kb_path.display(), "🧫 Meios de Cultivo — Starting...");

    // KB ausente ou inválida não impede a inicialização.
    let kb = match persistence::open_kb(&config.kb_path) {
        Ok(kb) => kb,
        Err(e) => {
            tracing::warn!(error = %e, "Falha ao carregar KB do disco, iniciando vazia");
            KnowledgeBase::new()
        }
    };
    let kb = Arc::new(RwLock::new(kb));

    match config.mode {
        Mode::Web => run_web(kb, config).await,
        Mode::Console => run_console(kb, config).await,
    }
}

async fn run_web(kb: Arc<RwLock<KnowledgeBase>>, config: AppConfig) -> Result<()> {
    let addr = config.bind_addr.clone();
    let app = web::create_router(AppState::new(kb, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao escutar em {}", addr))?;
    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// O menu lê stdin de forma bloqueante, então roda fora do executor.
async fn run_console(kb: Arc<RwLock<KnowledgeBase>>, config: AppConfig) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut console =
            console::Console::new(kb, config.data_dir, stdin.lock(), std::io::stdout());
        console.run()
    })
    .await
    .context("Tarefa do console interrompida")?
    .context("Erro de I/O no console")?;
    Ok(())
}
