//! # InferenceEngine — Motor de Inferência por Eliminação
//!
//! O [`InferenceEngine`] liga uma [`Consultation`] a uma base de
//! conhecimento compartilhada e oferece os dois modos de execução:
//!
//! | Modo | Chamadas | Quem obtém as respostas |
//! |------|----------|-------------------------|
//! | **Bloqueante** | [`run()`](InferenceEngine::run) | O próprio motor, via [`AnswerSource`] |
//! | **Retomável** | [`next()`](InferenceEngine::next) + [`set_response()`](InferenceEngine::set_response) | O chamador, entre uma chamada e outra |
//!
//! Os dois modos executam exatamente a mesma máquina de estados — `run()`
//! apenas a conduz até o fim perguntando à fonte de respostas.
//!
//! ## Exemplo de Uso (modo retomável)
//!
//! ```rust
//! let mut engine = InferenceEngine::new(kb.clone());
//! engine.start();
//! while let Step::Question(prop) = engine.next() {
//!     let answer = perguntar_na_interface(&prop);
//!     engine.set_response(answer);
//! }
//! match engine.outcome() {
//!     Outcome::Found(entry) => println!("Recomendado: {}", entry.name()),
//!     Outcome::NotFound => println!("Nenhuma entrada compatível"),
//! }
//! ```
//!
//! ## Concorrência
//!
//! O motor não guarda lock entre chamadas: cada `next()` adquire um read
//! lock curto na base. Alterar a base durante uma consulta em andamento
//! não é suportado (o resultado fica indefinido, mas nunca há pânico).

use std::sync::Arc;

use parking_lot::RwLock;

use super::consultation::{Answer, Consultation, Outcome, Step};
use crate::core::{Entry, KnowledgeBase, Property};

/// Fonte de respostas sim/não para o modo bloqueante.
///
/// No console é um prompt que repete a pergunta até receber `s` ou `n`;
/// nos testes, uma lista de respostas pré-definidas.
pub trait AnswerSource {
    fn ask(&mut self, property: &Property) -> Answer;
}

/// Qualquer closure `FnMut(&Property) -> Answer` serve como fonte de respostas.
impl<F> AnswerSource for F
where
    F: FnMut(&Property) -> Answer,
{
    fn ask(&mut self, property: &Property) -> Answer {
        self(property)
    }
}

/// Motor de inferência ligado a uma base de conhecimento.
///
/// Uma instância por interface (console) ou por consulta (web). Não há
/// motor global: quem precisa de um o cria e o possui.
pub struct InferenceEngine {
    kb: Arc<RwLock<KnowledgeBase>>,
    consultation: Consultation,
}

impl InferenceEngine {
    pub fn new(kb: Arc<RwLock<KnowledgeBase>>) -> Self {
        Self {
            kb,
            consultation: Consultation::new(),
        }
    }

    /// Executa uma consulta completa no modo bloqueante.
    ///
    /// Zera a memória, pergunta à `source` cada propriedade necessária e
    /// devolve o resultado. O algoritmo em si nunca falha.
    pub fn run<S: AnswerSource + ?Sized>(&mut self, source: &mut S) -> Outcome {
        self.start();
        loop {
            match self.next() {
                Step::Question(property) => {
                    let answer = source.ask(&property);
                    self.consultation.set_response(answer);
                }
                Step::Done(outcome) => return outcome,
            }
        }
    }

    /// Inicia uma nova consulta no modo retomável (memória zerada).
    pub fn start(&mut self) {
        self.consultation.reset();
    }

    /// Próxima pergunta, ou `Done` com o resultado.
    pub fn next(&mut self) -> Step {
        let kb = self.kb.read();
        self.consultation.next(&kb)
    }

    /// Registra a resposta à pergunta devolvida pelo último [`next()`](InferenceEngine::next).
    pub fn set_response(&mut self, answer: Answer) {
        self.consultation.set_response(answer);
    }

    /// Entrada encontrada pela última consulta concluída.
    pub fn result(&self) -> Option<&Entry> {
        self.consultation.result()
    }

    pub fn outcome(&self) -> Outcome {
        self.consultation.outcome()
    }

    pub fn is_done(&self) -> bool {
        self.consultation.is_done()
    }

    /// Propriedades confirmadas — exibidas como "motivos" da recomendação.
    pub fn accepted_properties(&self) -> &[Property] {
        self.consultation.accepted_properties()
    }

    pub fn denied_properties(&self) -> &[Property] {
        self.consultation.denied_properties()
    }

    pub fn questions_asked(&self) -> usize {
        self.consultation.questions_asked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn shared(entries: &[(&str, &[&str])]) -> Arc<RwLock<KnowledgeBase>> {
        let mut kb = KnowledgeBase::new();
        for (name, props) in entries {
            let entry = kb.get_or_add_entry(name);
            for p in *props {
                entry.get_or_add_property(p);
            }
        }
        Arc::new(RwLock::new(kb))
    }

    /// Fonte de respostas fixa por nome de propriedade; registra o que foi perguntado.
    struct Scripted {
        answers: HashMap<&'static str, Answer>,
        asked: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[(&'static str, Answer)]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl AnswerSource for Scripted {
        fn ask(&mut self, property: &Property) -> Answer {
            self.asked.push(property.name().to_string());
            self.answers
                .get(property.name())
                .copied()
                .unwrap_or(Answer::No)
        }
    }

    #[test]
    fn test_run_finds_first_compatible_entry() {
        let kb = shared(&[("A", &["x", "y"]), ("B", &["x"])]);
        let mut engine = InferenceEngine::new(kb);
        let mut source = Scripted::new(&[("x", Answer::Yes), ("y", Answer::No)]);

        let outcome = engine.run(&mut source);

        assert_eq!(outcome.entry().map(|e| e.name()), Some("B"));
        assert_eq!(source.asked, vec!["x", "y"]);
        assert_eq!(engine.result().map(|e| e.name()), Some("B"));
        assert_eq!(engine.accepted_properties(), &[Property::new("x")]);
    }

    #[test]
    fn test_run_with_closure_source() {
        let kb = shared(&[("A", &["x"])]);
        let mut engine = InferenceEngine::new(kb);
        let mut no = |_: &Property| Answer::No;

        assert_eq!(engine.run(&mut no), Outcome::NotFound);
        assert!(engine.result().is_none());
    }

    /// Cada execução de run() começa com memória zerada
    #[test]
    fn test_run_resets_between_consultations() {
        let kb = shared(&[("A", &["x"]), ("B", &["y"])]);
        let mut engine = InferenceEngine::new(kb);

        let mut only_y = Scripted::new(&[("y", Answer::Yes)]);
        assert_eq!(engine.run(&mut only_y).entry().map(|e| e.name()), Some("B"));

        let mut only_x = Scripted::new(&[("x", Answer::Yes)]);
        assert_eq!(engine.run(&mut only_x).entry().map(|e| e.name()), Some("A"));
        assert_eq!(only_x.asked, vec!["x"]);
    }

    /// Modo retomável e modo bloqueante chegam ao mesmo resultado.
    /// Com `x` aceito, a entrada vazia `C` cai pela regra 2; com `x` negado, ela vence.
    #[test]
    fn test_resumable_mode_matches_blocking_mode() {
        let kb = shared(&[("A", &["x", "z"]), ("B", &["x", "y"]), ("C", &[])]);
        let cases: [(&[(&'static str, Answer)], Option<&str>, usize); 2] = [
            (&[("x", Answer::Yes), ("z", Answer::No), ("y", Answer::No)], None, 3),
            (&[("x", Answer::No)], Some("C"), 1),
        ];

        for (script, expected_name, expected_questions) in cases {
            let mut blocking = InferenceEngine::new(kb.clone());
            let expected = blocking.run(&mut Scripted::new(script));

            let mut resumable = InferenceEngine::new(kb.clone());
            let answers: HashMap<&str, Answer> = script.iter().copied().collect();
            resumable.start();
            let outcome = loop {
                match resumable.next() {
                    Step::Question(p) => resumable.set_response(answers[p.name()]),
                    Step::Done(outcome) => break outcome,
                }
            };

            assert_eq!(outcome, expected);
            assert_eq!(outcome.entry().map(|e| e.name()), expected_name);
            assert!(resumable.is_done());
            assert_eq!(resumable.questions_asked(), expected_questions);
        }
    }

    #[test]
    fn test_engine_sees_entries_added_between_consultations() {
        let kb = shared(&[("A", &["x"])]);
        let mut engine = InferenceEngine::new(kb.clone());
        let mut no = |_: &Property| Answer::No;
        assert_eq!(engine.run(&mut no), Outcome::NotFound);

        kb.write().get_or_add_entry("Padrão");
        assert_eq!(
            engine.run(&mut no).entry().map(|e| e.name()),
            Some("Padrão")
        );
    }
}
