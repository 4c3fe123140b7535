//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Os handlers seguem o padrão
//! **HTMX fragment** — retornam fragmentos HTML (não páginas completas)
//! que o HTMX injeta no DOM via `hx-swap`.
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Página principal (Maud) |
//! | `status` | GET | JSON | Totais da base e consultas abertas |
//! | `sse_events` | GET | SSE stream | Mudanças na base |
//! | `start_consultation` | POST | HTMX fragment | Primeira pergunta |
//! | `answer_consultation` | POST | HTMX fragment | Próxima pergunta ou resultado |
//! | `knowledge_sidebar` | GET | HTMX fragment | Árvore da base |
//! | `knowledge_document` | GET | JSON | Documento versionado |
//! | `insert_entry` | POST | HTMX fragment | Aviso de inserção |
//! | `save_knowledge` / `load_knowledge` | POST | HTMX fragment | Aviso do arquivo |
//!
//! ## Erros
//!
//! Nenhum erro derruba o servidor: entradas vazias e arquivos inválidos
//! viram um aviso HTML com status 4xx; id de consulta desconhecido → 404.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::Html;
use axum::{Form, Json};
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::state::AppState;
use super::templates;
use crate::core::KnowledgeBaseDocument;
use crate::error::FormatError;
use crate::inference::{Answer, Step};
use crate::persistence;
use crate::session::Progress;
use crate::web::events::KnowledgeEvent;

/// Resposta do endpoint `/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub description: String,
    pub entries: usize,
    pub properties: usize,
    /// Consultas web em andamento.
    pub consultations: usize,
}

/// Formulário de resposta (`answer=s` ou `answer=n`).
#[derive(Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub answer: String,
}

/// Formulário de inserção.
#[derive(Deserialize)]
pub struct InsertForm {
    #[serde(default)]
    pub entry: String,
    #[serde(default)]
    pub property: String,
}

/// Formulário de salvar/carregar.
#[derive(Deserialize)]
pub struct FileForm {
    #[serde(default)]
    pub filename: String,
}

type HtmlResponse = (StatusCode, Html<String>);

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

fn notice(status: StatusCode, text: &str) -> HtmlResponse {
    let ok = status.is_success();
    (status, markup_to_html(templates::notice(ok, text)))
}

/// GET `/` — Página principal.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let kb = state.kb.read();
    markup_to_html(templates::full_page(&kb))
}

/// GET `/status` — Totais da base, em JSON.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let consultations = state.consultations.lock().len();
    let kb = state.kb.read();
    Json(StatusResponse {
        description: kb.description().to_string(),
        entries: kb.entry_count(),
        properties: kb.property_count(),
        consultations,
    })
}

/// GET `/events` — Stream SSE de [`KnowledgeEvent`].
///
/// Keep-alive a cada 15s; assinantes atrasados perdem mensagens
/// silenciosamente (filter_map retorna None).
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None,
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Publica `ConsultationFinished` quando a consulta acabou.
fn publish_if_finished(state: &AppState, progress: &Progress) {
    if let Step::Done(outcome) = &progress.step {
        state.publish(KnowledgeEvent::ConsultationFinished {
            id: progress.id.to_string(),
            result: outcome.entry().map(|e| e.name().to_string()),
            questions: progress.questions_asked,
        });
    }
}

/// POST `/consultation` — Inicia uma consulta.
///
/// Devolve o card da primeira pergunta, ou direto o resultado quando a
/// base está vazia (ou tem uma entrada sem propriedades na frente).
pub async fn start_consultation(State(state): State<AppState>) -> Html<String> {
    let progress = state.consultations.lock().start(state.kb.clone());
    publish_if_finished(&state, &progress);
    markup_to_html(templates::consultation_card(&progress))
}

/// POST `/consultation/{id}/answer` — Registra `s`/`n` e avança.
///
/// ```text
/// id inválido ou desconhecido → 404 + card "não encontrada"
/// resposta inválida           → 422 + aviso (a pergunta continua pendente)
/// ok                          → próxima pergunta ou resultado
/// ```
pub async fn answer_consultation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AnswerForm>,
) -> HtmlResponse {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            markup_to_html(templates::not_found_card()),
        )
    };

    let Ok(id) = Uuid::parse_str(&id) else {
        return not_found();
    };

    let answer = match form.answer.parse::<Answer>() {
        Ok(answer) => answer,
        Err(e) => return notice(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    };

    let result = state.consultations.lock().answer(id, answer);
    match result {
        Ok(progress) => {
            publish_if_finished(&state, &progress);
            (
                StatusCode::OK,
                markup_to_html(templates::consultation_card(&progress)),
            )
        }
        Err(e) => {
            tracing::debug!(error = %e, "Resposta para consulta desconhecida");
            not_found()
        }
    }
}

/// GET `/knowledge/sidebar` — Árvore da base.
///
/// Recarregada pelo frontend a cada evento SSE de inserção/carregamento.
pub async fn knowledge_sidebar(State(state): State<AppState>) -> Html<String> {
    let kb = state.kb.read();
    markup_to_html(templates::sidebar_content(&kb))
}

/// GET `/knowledge/document` — A base no formato de arquivo.
pub async fn knowledge_document(State(state): State<AppState>) -> Json<KnowledgeBaseDocument> {
    Json(state.kb.read().save_to())
}

/// POST `/knowledge/entries` — Insere o par entrada/propriedade.
pub async fn insert_entry(
    State(state): State<AppState>,
    Form(form): Form<InsertForm>,
) -> HtmlResponse {
    let inserted = {
        let mut kb = state.kb.write();
        match kb.insert(&form.entry, &form.property) {
            Ok(entry) => {
                let name = entry.name().to_string();
                Ok((name, kb.entry_count(), kb.property_count()))
            }
            Err(e) => Err(e),
        }
    };

    match inserted {
        Ok((name, entries, properties)) => {
            let property = form.property.trim().to_string();
            tracing::info!(entry = %name, property = %property, "Entrada inserida via web");
            let text = format!("\"{}\" agora tem \"{}\"", name, property);
            state.publish(KnowledgeEvent::EntryInserted {
                entry: name,
                property,
                entries,
                properties,
            });
            notice(StatusCode::OK, &text)
        }
        Err(e) => notice(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Aviso: {}", e),
        ),
    }
}

/// POST `/knowledge/save` — Salva a base em `data_dir/<filename>`.
///
/// A escrita roda em `spawn_blocking`, com o lock de leitura tomado lá dentro.
pub async fn save_knowledge(
    State(state): State<AppState>,
    Form(form): Form<FileForm>,
) -> HtmlResponse {
    let path = match persistence::resolve_path(&state.config.data_dir, &form.filename) {
        Ok(path) => path,
        Err(e) => return notice(StatusCode::UNPROCESSABLE_ENTITY, &format!("Aviso: {}", e)),
    };

    // Disco fora do executor: o lock fica preso só na thread bloqueante
    let kb = state.kb.clone();
    let target = path.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let kb = kb.read();
        (persistence::save_kb(&target, &kb), kb.entry_count())
    })
    .await;
    let (result, entries) = match joined {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = %e, "Task de salvamento falhou");
            return notice(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno ao salvar");
        }
    };

    match result {
        Ok(()) => {
            state.publish(KnowledgeEvent::Saved {
                filename: path.display().to_string(),
                entries,
            });
            notice(StatusCode::OK, &format!("Salvo em {}", path.display()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Falha ao salvar KB");
            notice(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Erro ao salvar: {:#}", e),
            )
        }
    }
}

/// POST `/knowledge/load` — Soma o conteúdo de um arquivo à base.
///
/// Um [`FormatError`] pode deixar a base parcialmente carregada (as
/// entradas anteriores ao registro inválido permanecem). A leitura roda em
/// `spawn_blocking`, como em [`save_knowledge`].
pub async fn load_knowledge(
    State(state): State<AppState>,
    Form(form): Form<FileForm>,
) -> HtmlResponse {
    let path = match persistence::resolve_path(&state.config.data_dir, &form.filename) {
        Ok(path) => path,
        Err(e) => return notice(StatusCode::UNPROCESSABLE_ENTITY, &format!("Aviso: {}", e)),
    };

    let kb = state.kb.clone();
    let source = path.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut kb = kb.write();
        let result = persistence::load_kb(&source, &mut kb);
        (result, kb.entry_count(), kb.property_count())
    })
    .await;
    let (result, entries, properties) = match joined {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = %e, "Task de carregamento falhou");
            return notice(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno ao carregar");
        }
    };

    // Mesmo com erro a base pode ter mudado: avisa os navegadores.
    state.publish(KnowledgeEvent::Loaded {
        filename: path.display().to_string(),
        entries,
        properties,
    });

    match result {
        Ok(()) => notice(StatusCode::OK, "Arquivo carregado com sucesso"),
        Err(e) => {
            tracing::warn!(error = %e, "Falha ao carregar KB");
            match e.downcast_ref::<FormatError>() {
                Some(format) => notice(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &format!("Arquivo inválido ou com formato incorreto: {}", format),
                ),
                None => notice(StatusCode::BAD_REQUEST, &format!("Erro ao carregar: {:#}", e)),
            }
        }
    }
}
