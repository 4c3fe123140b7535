//! # Console — Menu Interativo no Terminal
//!
//! Interface de texto do sistema especialista. Usa o motor no **modo
//! bloqueante**: durante "Consultar", o próprio motor pergunta cada
//! propriedade através de uma [`ConsoleAnswerSource`].
//!
//! ```text
//! 1. Inserir entrada
//! 2. Consultar
//! 3. Ver base
//! 4. Salvar
//! 5. Carregar de arquivo
//! 6. Sair
//!
//! > 2
//! É/Tem Enriquecido? (s/n): talvez
//! Digite uma resposta válida (s/n): s
//! ...
//! ```
//!
//! O console é genérico sobre `BufRead`/`Write`, então os testes usam
//! buffers em memória no lugar de stdin/stdout. Fim da entrada equivale
//! a "Sair" (e, no meio de uma consulta, a responder "não").

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{KnowledgeBase, Property};
use crate::error::{require, Field, FormatError};
use crate::inference::{Answer, AnswerSource, InferenceEngine, Outcome};
use crate::persistence;

const MENU: &str = "\
1. Inserir entrada
2. Consultar
3. Ver base
4. Salvar
5. Carregar de arquivo
6. Sair
";

/// Lê uma linha sem o terminador; `None` no fim da entrada.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Fonte de respostas que pergunta no terminal até receber `s` ou `n`.
pub struct ConsoleAnswerSource<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> ConsoleAnswerSource<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self, property: &Property) -> io::Result<Answer> {
        write!(self.output, "É/Tem {}? (s/n): ", property)?;
        loop {
            self.output.flush()?;
            let Some(line) = read_line(&mut *self.input)? else {
                return Ok(Answer::No);
            };
            match line.parse::<Answer>() {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    tracing::debug!(error = %e, "Console: resposta inválida");
                    write!(self.output, "Digite uma resposta válida (s/n): ")?;
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> AnswerSource for ConsoleAnswerSource<'_, R, W> {
    fn ask(&mut self, property: &Property) -> Answer {
        self.read_answer(property).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Console: falha de I/O ao ler resposta, assumindo \"não\"");
            Answer::No
        })
    }
}

/// Sessão interativa do console: possui o motor e a entrada/saída.
pub struct Console<R, W> {
    kb: Arc<RwLock<KnowledgeBase>>,
    engine: InferenceEngine,
    data_dir: PathBuf,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(kb: Arc<RwLock<KnowledgeBase>>, data_dir: PathBuf, input: R, output: W) -> Self {
        Self {
            engine: InferenceEngine::new(kb.clone()),
            kb,
            data_dir,
            input,
            output,
        }
    }

    /// Devolve a saída (usado pelos testes para inspecionar o texto).
    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        read_line(&mut self.input)
    }

    /// Laço do menu até "6" ou fim da entrada.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };

            match choice.trim() {
                "6" => break,
                "1" => self.insert_entry()?,
                "2" => self.consult()?,
                "3" => self.show_base()?,
                "4" => self.save()?,
                "5" => self.load()?,
                other => {
                    tracing::debug!(choice = %other, "Console: opção inválida");
                    writeln!(self.output, "Opção inválida")?;
                }
            }
            writeln!(self.output)?;
        }
        tracing::info!("Console encerrado");
        Ok(())
    }

    fn insert_entry(&mut self) -> io::Result<()> {
        let name = self.prompt("Nome da entrada: ")?.unwrap_or_default();
        let name = match require(&name, Field::EntryName) {
            Ok(name) => name.to_string(),
            Err(e) => return writeln!(self.output, "Aviso: {}", e),
        };

        writeln!(
            self.output,
            "Digite as propriedades da entrada, uma por linha. Deixe uma linha vazia para terminar"
        )?;
        let mut props = Vec::new();
        while let Some(line) = self.prompt("> ")? {
            let prop = line.trim();
            if prop.is_empty() {
                break;
            }
            props.push(prop.to_string());
        }

        let mut kb = self.kb.write();
        let entry = kb.get_or_add_entry(&name);
        for prop in &props {
            entry.get_or_add_property(prop);
        }
        tracing::info!(entry = %entry.name(), properties = entry.properties().len(), "Console: entrada inserida");
        writeln!(self.output, "Entrada adicionada: {}", entry)
    }

    fn consult(&mut self) -> io::Result<()> {
        let mut source = ConsoleAnswerSource::new(&mut self.input, &mut self.output);
        let outcome = self.engine.run(&mut source);

        match outcome {
            Outcome::Found(entry) => {
                writeln!(self.output, "Recomenda-se: {}", entry.name())?;
                if !entry.description.is_empty() {
                    writeln!(self.output, "\n{}", entry.description)?;
                }
                writeln!(self.output, "\nSugerido porque:")?;
                for prop in self.engine.accepted_properties() {
                    writeln!(self.output, "- {}", prop)?;
                }
                Ok(())
            }
            Outcome::NotFound => writeln!(
                self.output,
                "Nenhuma entrada corresponde às propriedades informadas"
            ),
        }
    }

    fn show_base(&mut self) -> io::Result<()> {
        let kb = self.kb.read();
        writeln!(self.output, "{}", *kb)
    }

    fn save(&mut self) -> io::Result<()> {
        let filename = self.prompt("Nome do arquivo: ")?.unwrap_or_default();
        let path = match persistence::resolve_path(&self.data_dir, &filename) {
            Ok(path) => path,
            Err(e) => return writeln!(self.output, "Aviso: {}", e),
        };

        let result = persistence::save_kb(&path, &self.kb.read());
        match result {
            Ok(()) => writeln!(self.output, "Salvo com sucesso em {}", path.display()),
            Err(e) => {
                tracing::error!(error = %e, "Falha ao salvar KB");
                writeln!(self.output, "Erro ao salvar: {:#}", e)
            }
        }
    }

    fn load(&mut self) -> io::Result<()> {
        let filename = self.prompt("Nome do arquivo: ")?.unwrap_or_default();
        let path = match persistence::resolve_path(&self.data_dir, &filename) {
            Ok(path) => path,
            Err(e) => return writeln!(self.output, "Aviso: {}", e),
        };

        let result = persistence::load_kb(&path, &mut self.kb.write());
        match result {
            Ok(()) => writeln!(self.output, "Arquivo carregado com sucesso"),
            Err(e) => {
                tracing::warn!(error = %e, "Falha ao carregar KB");
                match e.downcast_ref::<FormatError>() {
                    Some(format) => writeln!(
                        self.output,
                        "Arquivo inválido ou com formato incorreto: {}",
                        format
                    ),
                    None => writeln!(self.output, "Erro ao carregar: {:#}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_kb() -> Arc<RwLock<KnowledgeBase>> {
        let mut kb = KnowledgeBase::new();
        let blood = kb.get_or_add_entry("Ágar Sangue");
        blood.description = "Observa hemólise.".to_string();
        blood.get_or_add_property("Enriquecido");
        blood.get_or_add_property("Sangue");
        kb.get_or_add_entry("Ágar Chocolate")
            .get_or_add_property("Enriquecido");
        Arc::new(RwLock::new(kb))
    }

    fn run_console(kb: Arc<RwLock<KnowledgeBase>>, data_dir: PathBuf, input: &str) -> String {
        let mut console = Console::new(kb, data_dir, Cursor::new(input.to_string()), Vec::new());
        console.run().unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_answer_source_reprompts_until_valid() {
        let mut input = Cursor::new("talvez\n\nS\n");
        let mut output = Vec::new();
        let answer =
            ConsoleAnswerSource::new(&mut input, &mut output).ask(&Property::new("Sangue"));

        assert_eq!(answer, Answer::Yes);
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("É/Tem Sangue? (s/n): "));
        assert_eq!(text.matches("Digite uma resposta válida (s/n): ").count(), 2);
    }

    #[test]
    fn test_answer_source_end_of_input_means_no() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let answer = ConsoleAnswerSource::new(&mut input, &mut output).ask(&Property::new("x"));
        assert_eq!(answer, Answer::No);
    }

    #[test]
    fn test_consult_prints_recommendation_and_reasons() {
        let out = run_console(sample_kb(), PathBuf::from("data"), "2\ns\nn\n6\n");

        assert!(out.contains("É/Tem Enriquecido? (s/n): "));
        assert!(out.contains("É/Tem Sangue? (s/n): "));
        assert!(out.contains("Recomenda-se: Ágar Chocolate"));
        assert!(out.contains("Sugerido porque:\n- Enriquecido\n"));
    }

    #[test]
    fn test_consult_without_match() {
        let out = run_console(sample_kb(), PathBuf::from("data"), "2\nn\n6\n");
        assert!(out.contains("Nenhuma entrada corresponde às propriedades informadas"));
    }

    #[test]
    fn test_insert_then_view() {
        let kb = sample_kb();
        let out = run_console(
            kb.clone(),
            PathBuf::from("data"),
            "1\nMacConkey\nSeletivo\nLactose\nseletivo\n\n3\n6\n",
        );

        let kb = kb.read();
        let entry = kb.find_entry("macconkey").unwrap();
        assert_eq!(entry.properties().len(), 2);
        assert!(out.contains("Entrada adicionada: Entrada \"MacConkey\":"));
        assert!(out.contains("[Base de conhecimento]"));
        assert!(out.contains("    - Lactose"));
    }

    #[test]
    fn test_insert_with_blank_name_is_noop() {
        let kb = sample_kb();
        let out = run_console(kb.clone(), PathBuf::from("data"), "1\n   \n6\n");
        assert!(out.contains("Aviso: não são admitidos valores vazios: nome da entrada"));
        assert_eq!(kb.read().entry_count(), 2);
    }

    #[test]
    fn test_invalid_option_and_end_of_input() {
        let out = run_console(sample_kb(), PathBuf::from("data"), "9\n");
        assert!(out.contains("Opção inválida"));
    }

    #[test]
    fn test_save_and_load_round_trip_through_menu() {
        let dir = std::env::temp_dir().join(format!("agar-console-{}", uuid::Uuid::new_v4()));

        let out = run_console(sample_kb(), dir.clone(), "4\nmeios\n6\n");
        assert!(out.contains("Salvo com sucesso"));
        assert!(dir.join("meios.json").exists());

        let empty = Arc::new(RwLock::new(KnowledgeBase::new()));
        let out = run_console(empty.clone(), dir.clone(), "5\nmeios.json\n6\n");
        assert!(out.contains("Arquivo carregado com sucesso"));
        assert_eq!(empty.read().entry_count(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_reports_bad_files_without_crashing() {
        let dir = std::env::temp_dir().join(format!("agar-console-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("velho.json"), r#"{"__v": 0}"#).unwrap();

        let out = run_console(
            sample_kb(),
            dir.clone(),
            "5\nvelho\n5\ninexistente\n5\n\n4\n../fora\n6\n",
        );
        assert!(out.contains("Arquivo inválido ou com formato incorreto"));
        assert!(out.contains("Erro ao carregar"));
        assert!(out.contains("Aviso: não são admitidos valores vazios: nome do arquivo"));
        assert!(out.contains("nome de arquivo inválido"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
