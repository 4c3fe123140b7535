//! # Módulo Inference — Motor de Inferência do Sistema Especialista
//!
//! Este módulo contém o **motor de inferência por eliminação**: dado um
//! conjunto parcial de respostas sim/não sobre propriedades, encontra a
//! primeira entrada da base compatível com todas elas.
//!
//! ## Exemplo
//!
//! ```text
//! Base: [Ágar Sangue {Enriquecido, Sangue}, Ágar Chocolate {Enriquecido}]
//!
//! É/Tem Enriquecido? s
//! É/Tem Sangue? n          → Ágar Sangue eliminado
//!                          → Ágar Chocolate: Enriquecido já aceito
//! Recomendação: Ágar Chocolate
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`rules`] | As três regras de eliminação |
//! | [`consultation`] | Máquina de estados de uma consulta |
//! | [`engine`] | [`InferenceEngine`] — modos bloqueante e retomável |

/// Sub-módulo com as regras de eliminação.
pub mod rules;

/// Sub-módulo com a máquina de estados da consulta.
pub mod consultation;

/// Sub-módulo com o motor e a trait [`AnswerSource`].
pub mod engine;

pub use consultation::{Answer, Consultation, Outcome, Step};
pub use engine::{AnswerSource, InferenceEngine};
