//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML compilados pelo macro [`maud`](https://maud.lambda.xyz/).
//! O servidor devolve **fragments HTML** e o HTMX os injeta no DOM; não há
//! JavaScript de aplicação além do ouvinte SSE que recarrega a árvore.
//!
//! ## Templates Disponíveis
//!
//! | Função | Tipo | Descrição |
//! |--------|------|-----------|
//! | [`full_page()`] | Página completa | Consulta + formulários + árvore da base |
//! | [`consultation_card()`] | Fragment HTMX | Pergunta atual ou resultado |
//! | [`not_found_card()`] | Fragment HTMX | Consulta inexistente/expirada |
//! | [`notice()`] | Fragment HTMX | Aviso de sucesso ou erro dos formulários |
//! | [`sidebar_content()`] | Fragment HTMX | Árvore entradas → propriedades |
//!
//! ## Layout Principal (`full_page`)
//!
//! ```text
//! ┌──────────────── nav-bar ───────────────────────┐
//! │ MC │ Meios de Cultivo              │ ● 7 entradas │
//! ├──────────────────────────┬─────────────────────┤
//! │  Consulta                │ Base de conhecimento│
//! │  ┌────────────────────┐  │  ▸ Ágar Sangue      │
//! │  │ É/Tem Seletivo?    │  │     - Enriquecido   │
//! │  │   [Sim]  [Não]     │  │     - Sangue        │
//! │  └────────────────────┘  │  ▸ MacConkey        │
//! │  Inserir │ Salvar/Carregar│     ...             │
//! └──────────────────────────┴─────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};
use uuid::Uuid;

use crate::core::{KnowledgeBase, Property};
use crate::inference::{Outcome, Step};
use crate::session::Progress;

/// Página principal.
///
/// O painel de consulta começa com o botão "Iniciar consulta"; cada clique
/// em Sim/Não substitui o conteúdo de `#consultation` pelo próximo card.
pub fn full_page(kb: &KnowledgeBase) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Meios de Cultivo — Sistema Especialista" }
                // Avisos 4xx/5xx também são fragments a exibir.
                meta name="htmx-config" content=r#"{"responseHandling":[{"code":"204","swap":false},{"code":"...","swap":true}]}"#;
                link rel="stylesheet" href="/assets/style.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                div class="app-shell" {
                    nav class="nav-bar" {
                        a href="/" class="nav-brand" {
                            span class="nav-brand-icon" { "MC" }
                            span class="nav-brand-text" {
                                "Meios de " em { "Cultivo" }
                            }
                        }
                        div class="nav-status" {
                            span class="nav-status-dot" {}
                            span id="status-text" { (kb.description()) }
                        }
                    }

                    div class="app-container" {
                        div class="main-panel" {
                            section class="panel" {
                                h2 { "Consulta" }
                                div id="consultation" {
                                    (start_button("Iniciar consulta"))
                                }
                            }

                            section class="panel" {
                                h2 { "Inserir entrada" }
                                form hx-post="/knowledge/entries"
                                    hx-target="#kb-notice"
                                    hx-swap="innerHTML" {
                                    input type="text" name="entry" placeholder="Entrada (ex: Ágar Sangue)" autocomplete="off";
                                    input type="text" name="property" placeholder="Propriedade (ex: Enriquecido)" autocomplete="off";
                                    button type="submit" { "Inserir" }
                                }
                            }

                            section class="panel" {
                                h2 { "Arquivo" }
                                form hx-target="#kb-notice" hx-swap="innerHTML" {
                                    input type="text" name="filename" placeholder="medios_cultivo.json" autocomplete="off";
                                    button type="submit" hx-post="/knowledge/save" { "Salvar" }
                                    button type="submit" hx-post="/knowledge/load" { "Carregar" }
                                }
                                a href="/knowledge/document" target="_blank" class="hint" { "Ver documento JSON" }
                            }

                            div id="kb-notice" {}
                        }

                        div class="sidebar" {
                            div class="sidebar-header" {
                                h2 { "Base de conhecimento" }
                            }
                            div id="knowledge-sidebar"
                                hx-get="/knowledge/sidebar"
                                hx-trigger="kb-changed from:body"
                                hx-swap="innerHTML" {
                                (sidebar_content(kb))
                            }
                        }
                    }
                }

                (PreEscaped(r#"<script>
(function() {
  var es = new EventSource('/events');
  es.onmessage = function(e) {
    try {
      var ev = JSON.parse(e.data);
      if (ev.type === 'EntryInserted' || ev.type === 'Loaded') {
        htmx.trigger(document.body, 'kb-changed');
      }
    } catch(err) {}
  };
})();
</script>"#))
            }
        }
    }
}

fn start_button(label: &str) -> Markup {
    html! {
        button class="start-btn"
            hx-post="/consultation"
            hx-target="#consultation"
            hx-swap="innerHTML" {
            (label)
        }
    }
}

/// Card da consulta: a pergunta pendente ou o resultado final.
pub fn consultation_card(progress: &Progress) -> Markup {
    match &progress.step {
        Step::Question(property) => {
            question_card(progress.id, property, progress.questions_asked)
        }
        Step::Done(outcome) => result_card(outcome, &progress.accepted),
    }
}

fn question_card(id: Uuid, property: &Property, number: usize) -> Markup {
    html! {
        div class="card question-card" {
            div class="card-meta" { "Pergunta " (number) }
            div class="question" { "É/Tem " strong { (property.name()) } "?" }
            form hx-post=(format!("/consultation/{}/answer", id))
                hx-target="#consultation"
                hx-swap="innerHTML" {
                button type="submit" name="answer" value="s" class="answer-btn yes" { "Sim" }
                button type="submit" name="answer" value="n" class="answer-btn no" { "Não" }
            }
        }
    }
}

fn result_card(outcome: &Outcome, accepted: &[Property]) -> Markup {
    html! {
        @match outcome {
            Outcome::Found(entry) => {
                div class="card result-card found" {
                    div class="card-meta" { "Recomenda-se" }
                    h3 { (entry.name()) }
                    @if !entry.description.is_empty() {
                        p class="description" { (entry.description) }
                    }
                    @if !accepted.is_empty() {
                        div class="reasons" {
                            "Sugerido porque:"
                            ul {
                                @for prop in accepted {
                                    li { (prop.name()) }
                                }
                            }
                        }
                    }
                }
            }
            Outcome::NotFound => {
                div class="card result-card not-found" {
                    div class="card-meta" { "Sem resultado" }
                    p { "Nenhuma entrada corresponde às propriedades informadas." }
                }
            }
        }
        (start_button("Nova consulta"))
    }
}

/// Consulta inexistente, já concluída ou expirada.
pub fn not_found_card() -> Markup {
    html! {
        div class="card result-card not-found" {
            p { "Consulta não encontrada ou expirada." }
        }
        (start_button("Iniciar consulta"))
    }
}

/// Aviso curto exibido em `#kb-notice`.
pub fn notice(ok: bool, text: &str) -> Markup {
    html! {
        div class=(if ok { "notice ok" } else { "notice error" }) { (text) }
    }
}

/// Árvore da base: cada entrada com sua descrição e propriedades.
pub fn sidebar_content(kb: &KnowledgeBase) -> Markup {
    html! {
        div class="kb-stats" {
            div class="stat" {
                span class="stat-value" { (kb.entry_count()) }
                span class="stat-label" { "Entradas" }
            }
            div class="stat" {
                span class="stat-value" { (kb.property_count()) }
                span class="stat-label" { "Propriedades" }
            }
        }

        @if kb.is_empty() {
            div class="sidebar-empty" {
                p { "Nenhuma entrada ainda." }
                p class="hint" { "Insira uma entrada ou carregue um arquivo." }
            }
        } @else {
            ul class="kb-tree" {
                @for entry in kb.entries() {
                    li class="kb-entry" {
                        details {
                            summary { (entry.name()) }
                            @if !entry.description.is_empty() {
                                p class="description" { (entry.description) }
                            }
                            ul {
                                @for prop in entry.properties() {
                                    li class="kb-property" { (prop.name()) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_card_posts_to_consultation() {
        let id = Uuid::new_v4();
        let progress = Progress {
            id,
            step: Step::Question(Property::new("Seletivo")),
            accepted: vec![],
            questions_asked: 1,
        };
        let html = consultation_card(&progress).into_string();
        assert!(html.contains(&format!("/consultation/{}/answer", id)));
        assert!(html.contains("<strong>Seletivo</strong>"));
        assert!(html.contains(r#"value="s""#));
    }

    #[test]
    fn test_sidebar_escapes_names() {
        let mut kb = KnowledgeBase::new();
        kb.insert("<script>", "x").unwrap();
        let html = sidebar_content(&kb).into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
