//! # Consultation — Máquina de Estados da Consulta
//!
//! Uma [`Consultation`] é **uma** execução do algoritmo de eliminação,
//! desde a memória zerada até o resultado final. Ela não faz I/O: quem
//! a conduz chama [`next()`](Consultation::next) para obter a próxima
//! pergunta e [`set_response()`](Consultation::set_response) para
//! registrar a resposta antes de pedir a seguinte.
//!
//! ## Estados
//!
//! ```text
//!            ┌──────────────────────── resposta "sim" ─────────────┐
//!            ▼                                                     │
//!   ScanningEntry{e, p} ── propriedade não perguntada ──► AwaitingAnswer{e, p}
//!       │   ▲                                                      │
//!       │   └──────────── resposta "não" (próxima entrada) ────────┘
//!       │
//!       ├── entrada sem perguntas restantes ──► Done(Found)
//!       └── fim das entradas ─────────────────► Done(NotFound)
//! ```
//!
//! ## Algoritmo
//!
//! Para cada entrada, na ordem da base:
//! 1. Pula a entrada se ela falha nas regras 2 ou 3 ([`rules`](super::rules))
//! 2. Pergunta cada propriedade ainda não respondida (regra 1)
//! 3. "Não" desqualifica a entrada; "sim" segue para a próxima propriedade
//! 4. Sem desqualificação, a entrada é o resultado — **primeira** compatível vence
//!
//! Uma entrada sem propriedades que passe pelas regras 2 e 3 é aceita
//! imediatamente, sem nenhuma pergunta.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::rules;
use crate::core::{Entry, KnowledgeBase, Property};
use crate::error::InputError;

/// Resposta do usuário a uma pergunta sobre uma propriedade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Label PT-BR ("Sim" / "Não").
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Sim",
            Answer::No => "Não",
        }
    }
}

/// Aceita `s`/`sim`/`y`/`yes` e `n`/`não`/`nao`/`no`, sem diferenciar maiúsculas.
impl FromStr for Answer {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sim" | "y" | "yes" => Ok(Answer::Yes),
            "n" | "não" | "nao" | "no" => Ok(Answer::No),
            _ => Err(InputError {
                input: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resultado final de uma consulta.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A primeira entrada compatível com todas as respostas.
    Found(Entry),
    /// Nenhuma entrada sobreviveu.
    NotFound,
}

impl Outcome {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Outcome::Found(entry) => Some(entry),
            Outcome::NotFound => None,
        }
    }
}

/// O que a consulta pede ao chamador a seguir.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Perguntar ao usuário sobre esta propriedade.
    Question(Property),
    /// Fim — não há mais perguntas.
    Done(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Examinando a entrada `entry` a partir da propriedade `property`.
    /// `property == 0` marca a chegada à entrada (regras 2 e 3 ainda não checadas).
    ScanningEntry { entry: usize, property: usize },
    /// A propriedade `property` da entrada `entry` foi perguntada.
    AwaitingAnswer { entry: usize, property: usize },
    Done,
}

/// Estado efêmero de uma consulta.
#[derive(Clone, Debug)]
pub struct Consultation {
    accepted: Vec<Property>,
    denied: Vec<Property>,
    pending_response: Option<Answer>,
    result: Option<Entry>,
    state: State,
    questions_asked: usize,
}

impl Default for Consultation {
    fn default() -> Self {
        Self::new()
    }
}

impl Consultation {
    /// Nova consulta, posicionada antes da primeira entrada.
    pub fn new() -> Self {
        Self {
            accepted: Vec::new(),
            denied: Vec::new(),
            pending_response: None,
            result: None,
            state: State::ScanningEntry {
                entry: 0,
                property: 0,
            },
            questions_asked: 0,
        }
    }

    /// Zera a memória e volta ao início. Única forma de "reiniciar".
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Registra a resposta à pergunta produzida pelo último [`next()`](Consultation::next).
    pub fn set_response(&mut self, answer: Answer) {
        self.pending_response = Some(answer);
    }

    /// Avança o algoritmo até a próxima pergunta ou até o fim.
    ///
    /// - Se a última pergunta ainda não tem resposta registrada, ela é
    ///   devolvida de novo (nenhuma resposta antiga é reaproveitada).
    /// - Depois de terminada, a consulta devolve sempre o mesmo `Done`.
    pub fn next(&mut self, kb: &KnowledgeBase) -> Step {
        loop {
            match self.state {
                State::Done => return Step::Done(self.outcome()),

                State::AwaitingAnswer { entry, property } => {
                    let Some(asked) = property_at(kb, entry, property) else {
                        // a base mudou durante a consulta; a entrada some da busca
                        self.state = State::ScanningEntry {
                            entry: entry + 1,
                            property: 0,
                        };
                        continue;
                    };
                    let Some(answer) = self.pending_response.take() else {
                        return Step::Question(asked.clone());
                    };

                    tracing::debug!(property = %asked, answer = %answer, "Consulta: resposta registrada");
                    match answer {
                        Answer::Yes => {
                            self.accepted.push(asked.clone());
                            self.state = State::ScanningEntry {
                                entry,
                                property: property + 1,
                            };
                        }
                        Answer::No => {
                            self.denied.push(asked.clone());
                            self.state = State::ScanningEntry {
                                entry: entry + 1,
                                property: 0,
                            };
                        }
                    }
                }

                State::ScanningEntry { entry, property } => {
                    let Some(candidate) = kb.entries().get(entry) else {
                        return self.finish(None);
                    };

                    if property == 0
                        && !rules::is_candidate(candidate, &self.accepted, &self.denied)
                    {
                        self.state = State::ScanningEntry {
                            entry: entry + 1,
                            property: 0,
                        };
                        continue;
                    }

                    let next_question = candidate
                        .properties()
                        .iter()
                        .enumerate()
                        .skip(property)
                        .find(|(_, p)| rules::not_yet_asked(p, &self.accepted, &self.denied));

                    match next_question {
                        Some((idx, question)) => {
                            self.state = State::AwaitingAnswer {
                                entry,
                                property: idx,
                            };
                            self.pending_response = None;
                            self.questions_asked += 1;
                            tracing::debug!(entry = %candidate.name(), property = %question, "Consulta: pergunta");
                            return Step::Question(question.clone());
                        }
                        None => return self.finish(Some(candidate.clone())),
                    }
                }
            }
        }
    }

    fn finish(&mut self, result: Option<Entry>) -> Step {
        match &result {
            Some(entry) => tracing::info!(
                entry = %entry.name(),
                questions = self.questions_asked,
                "Consulta concluída: entrada encontrada"
            ),
            None => tracing::info!(
                questions = self.questions_asked,
                "Consulta concluída: nenhuma entrada compatível"
            ),
        }
        self.result = result;
        self.state = State::Done;
        Step::Done(self.outcome())
    }

    /// `true` depois que o sentinela `Done` foi produzido.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Resultado final; `NotFound` enquanto a consulta não terminou.
    pub fn outcome(&self) -> Outcome {
        match &self.result {
            Some(entry) => Outcome::Found(entry.clone()),
            None => Outcome::NotFound,
        }
    }

    pub fn result(&self) -> Option<&Entry> {
        self.result.as_ref()
    }

    /// Propriedades confirmadas ("sim"), na ordem das respostas.
    pub fn accepted_properties(&self) -> &[Property] {
        &self.accepted
    }

    /// Propriedades rejeitadas ("não"), na ordem das respostas.
    pub fn denied_properties(&self) -> &[Property] {
        &self.denied
    }

    /// Quantas perguntas foram feitas até agora.
    pub fn questions_asked(&self) -> usize {
        self.questions_asked
    }
}

fn property_at(kb: &KnowledgeBase, entry: usize, property: usize) -> Option<&Property> {
    kb.entries().get(entry)?.properties().get(property)
}
