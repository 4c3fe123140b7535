//! # Módulo Web — Consultas pelo Navegador
//!
//! Camada web construída com **Axum** + **HTMX** + **Maud** + **SSE**.
//! Usa o motor no modo **retomável**: cada pergunta é uma resposta HTTP e
//! cada clique em Sim/Não é uma nova requisição.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Browser (HTMX + SSE)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                                   │
//! │  ├── GET  /                          → página principal     │
//! │  ├── GET  /status                    → JSON: totais         │
//! │  ├── GET  /events                    → SSE stream           │
//! │  ├── POST /consultation              → card da 1ª pergunta  │
//! │  ├── POST /consultation/{id}/answer  → próximo card         │
//! │  ├── GET  /knowledge/sidebar         → HTMX fragment        │
//! │  ├── GET  /knowledge/document        → JSON do documento    │
//! │  ├── POST /knowledge/entries         → HTMX fragment        │
//! │  ├── POST /knowledge/save            → HTMX fragment        │
//! │  └── POST /knowledge/load            → HTMX fragment        │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Enum de eventos SSE |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        // ── API JSON / SSE ────────────────────────────────────
        .route("/status", get(handlers::status))
        .route("/events", get(handlers::sse_events))
        .route("/knowledge/document", get(handlers::knowledge_document))
        // ── Consulta (HTMX fragments) ─────────────────────────
        .route("/consultation", post(handlers::start_consultation))
        .route(
            "/consultation/{id}/answer",
            post(handlers::answer_consultation),
        )
        // ── Base de conhecimento (HTMX fragments) ─────────────
        .route("/knowledge/sidebar", get(handlers::knowledge_sidebar))
        .route("/knowledge/entries", post(handlers::insert_entry))
        .route("/knowledge/save", post(handlers::save_knowledge))
        .route("/knowledge/load", post(handlers::load_knowledge))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parking_lot::RwLock;
    use tower::ServiceExt;

    use super::*;
    use crate::core::KnowledgeBase;
    use crate::settings::AppConfig;
    use crate::web::events::KnowledgeEvent;

    fn test_state(data_dir: PathBuf) -> AppState {
        let mut kb = KnowledgeBase::new();
        kb.set_description("Meios de teste");
        let blood = kb.get_or_add_entry("Ágar Sangue");
        blood.description = "Observa hemólise.".to_string();
        blood.get_or_add_property("Enriquecido");
        blood.get_or_add_property("Sangue");
        kb.get_or_add_entry("MacConkey").get_or_add_property("Seletivo");

        let config = AppConfig {
            data_dir,
            ..AppConfig::default()
        };
        AppState::new(Arc::new(RwLock::new(kb)), config)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("agar-web-{}", uuid::Uuid::new_v4()))
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Extrai o id da consulta do atributo hx-post do card.
    fn consultation_id(html: &str) -> String {
        let start = html.find("/consultation/").unwrap() + "/consultation/".len();
        html[start..start + 36].to_string()
    }

    #[tokio::test]
    async fn test_status_reports_totals() {
        let app = create_router(test_state(temp_dir()));
        let req = Request::builder()
            .uri("/status")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["description"], "Meios de teste");
        assert_eq!(json["entries"], 2);
        assert_eq!(json["properties"], 3);
        assert_eq!(json["consultations"], 0);
    }

    #[tokio::test]
    async fn test_index_renders_tree() {
        let app = create_router(test_state(temp_dir()));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Ágar Sangue"));
        assert!(html.contains("Iniciar consulta"));
    }

    #[tokio::test]
    async fn test_consultation_round_trip() {
        let state = test_state(temp_dir());
        let mut events = state.events_tx.subscribe();
        let app = create_router(state.clone());

        let res = app
            .clone()
            .oneshot(form("/consultation", ""))
            .await
            .unwrap();
        let html = body_text(res).await;
        assert!(html.contains("<strong>Enriquecido</strong>"));
        let id = consultation_id(&html);
        assert_eq!(state.consultations.lock().len(), 1);

        let uri = format!("/consultation/{}/answer", id);
        let res = app.clone().oneshot(form(&uri, "answer=n")).await.unwrap();
        let html = body_text(res).await;
        assert!(html.contains("<strong>Seletivo</strong>"));

        let res = app.clone().oneshot(form(&uri, "answer=s")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Recomenda-se"));
        assert!(html.contains("MacConkey"));
        assert!(html.contains("<li>Seletivo</li>"));
        assert!(state.consultations.lock().is_empty());

        match events.try_recv().unwrap() {
            KnowledgeEvent::ConsultationFinished {
                result, questions, ..
            } => {
                assert_eq!(result.as_deref(), Some("MacConkey"));
                assert_eq!(questions, 2);
            }
            other => panic!("evento inesperado: {:?}", other),
        }

        // Consulta encerrada não aceita mais respostas
        let res = app.oneshot(form(&uri, "answer=s")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_answer_validation() {
        let app = create_router(test_state(temp_dir()));

        let res = app
            .clone()
            .oneshot(form("/consultation/nao-e-uuid/answer", "answer=s"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .clone()
            .oneshot(form("/consultation", ""))
            .await
            .unwrap();
        let id = consultation_id(&body_text(res).await);
        let uri = format!("/consultation/{}/answer", id);

        let res = app.clone().oneshot(form(&uri, "answer=talvez")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // A pergunta continua pendente após resposta inválida
        let res = app.oneshot(form(&uri, "answer=s")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("<strong>Sangue</strong>"));
    }

    #[tokio::test]
    async fn test_insert_entry_and_blank_fields() {
        let state = test_state(temp_dir());
        let app = create_router(state.clone());

        let res = app
            .clone()
            .oneshot(form("/knowledge/entries", "entry=MacConkey&property=Lactose"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        {
            let kb = state.kb.read();
            assert_eq!(kb.entry_count(), 2);
            assert_eq!(kb.find_entry("macconkey").unwrap().properties().len(), 2);
        }

        let res = app
            .oneshot(form("/knowledge/entries", "entry=Novo&property=+"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(res).await.contains("não são admitidos valores vazios"));
        assert!(state.kb.read().find_entry("Novo").is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_into_other_state() {
        let dir = temp_dir();
        let app = create_router(test_state(dir.clone()));
        let res = app
            .oneshot(form("/knowledge/save", "filename=copia"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(dir.join("copia.json").exists());

        let other = AppState::new(
            Arc::new(RwLock::new(KnowledgeBase::new())),
            AppConfig {
                data_dir: dir.clone(),
                ..AppConfig::default()
            },
        );
        let app = create_router(other.clone());
        let res = app
            .clone()
            .oneshot(form("/knowledge/load", "filename=copia.json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(other.kb.read().entry_count(), 2);
        assert_eq!(other.kb.read().description(), "Meios de teste");

        let req = Request::builder()
            .uri("/knowledge/document")
            .body(Body::empty())
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&body_text(app.oneshot(req).await.unwrap()).await).unwrap();
        assert_eq!(json["__v"], 1);
        assert_eq!(json["entries"][0]["props"][1], "Sangue");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    /// Com a base travada por outra thread, o salvamento espera fora do executor
    #[tokio::test]
    async fn test_save_waits_for_lock_off_the_executor() {
        let dir = temp_dir();
        let state = test_state(dir.clone());
        let app = create_router(state.clone());

        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let kb = state.kb.clone();
        let holder = std::thread::spawn(move || {
            let _guard = kb.write();
            locked_tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(300));
        });
        locked_rx.recv().unwrap();

        let save = tokio::spawn(app.oneshot(form("/knowledge/save", "filename=travada")));
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(!save.is_finished());

        let res = save.await.unwrap().unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(dir.join("travada.json").exists());
        holder.join().unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_bad_names_and_formats() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("v2.json"), r#"{"__v": 2}"#).unwrap();
        let app = create_router(test_state(dir.clone()));

        let res = app
            .clone()
            .oneshot(form("/knowledge/load", "filename=v2"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(res).await.contains("Arquivo inválido"));

        let res = app
            .clone()
            .oneshot(form("/knowledge/load", "filename=..%2Fsegredo"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = app
            .oneshot(form("/knowledge/load", "filename=sumiu"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
