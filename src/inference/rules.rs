//! # Regras de Eliminação
//!
//! As três regras que o motor aplica sobre a memória da consulta
//! (propriedades **aceitas** e **negadas** até o momento):
//!
//! | Regra | Aplica-se a | Condição para seguir |
//! |-------|-------------|----------------------|
//! | **1** | Propriedade | Ainda não foi perguntada nesta consulta |
//! | **2** | Entrada | Possui **todas** as propriedades já aceitas |
//! | **3** | Entrada | Não possui **nenhuma** propriedade já negada |
//!
//! ```text
//! aceitas = {Seletivo}     negadas = {Sangue}
//!
//! Ágar Sangue  {Enriquecido, Sangue}        ✗ regra 2 (falta Seletivo)
//! MacConkey    {Seletivo, Lactose}          ✓ → pergunta só "Lactose" (regra 1)
//! ```
//!
//! Todas as comparações são por nome normalizado (veja
//! [`Property`](crate::core::Property)), nunca por instância.

use crate::core::{Entry, Property};

/// Regra 1 — a propriedade ainda não foi respondida (em nenhuma entrada).
pub fn not_yet_asked(property: &Property, accepted: &[Property], denied: &[Property]) -> bool {
    !accepted.contains(property) && !denied.contains(property)
}

/// Regra 2 — a entrada tem todas as propriedades confirmadas até aqui.
pub fn has_all_accepted(entry: &Entry, accepted: &[Property]) -> bool {
    accepted.iter().all(|p| entry.has_property(p))
}

/// Regra 3 — a entrada não tem nenhuma propriedade rejeitada até aqui.
pub fn has_none_denied(entry: &Entry, denied: &[Property]) -> bool {
    !denied.iter().any(|p| entry.has_property(p))
}

/// Regras 2 e 3 juntas: a entrada ainda pode ser o resultado.
pub fn is_candidate(entry: &Entry, accepted: &[Property], denied: &[Property]) -> bool {
    has_all_accepted(entry, accepted) && has_none_denied(entry, denied)
}
