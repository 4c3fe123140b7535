//! # Configuração da Aplicação
//!
//! A configuração é montada em camadas (a última vence):
//!
//! ```text
//! padrões embutidos
//!   └── arquivo TOML (AGAR_CONFIG, ou config/agar.toml se existir)
//!         └── variáveis de ambiente AGAR__<CHAVE> (ex: AGAR__BIND_ADDR)
//!               └── primeiro argumento da linha de comando: `web` | `console`
//! ```
//!
//! O `.env` é lido por `dotenvy` em `main()` antes desta carga.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Um ano.
const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Interface a ser iniciada.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Servidor web com consultas retomáveis (HTMX).
    Web,
    /// Menu interativo no terminal com consulta bloqueante.
    Console,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(Mode::Web),
            "console" | "cli" => Ok(Mode::Console),
            other => Err(format!("modo desconhecido: {other:?} (use `web` ou `console`)")),
        }
    }
}

/// Configuração completa da aplicação.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub mode: Mode,
    /// Endereço do servidor web (ex: `0.0.0.0:3000`).
    pub bind_addr: String,
    /// Base carregada na inicialização. Ausente ou inválida → base vazia.
    pub kb_path: PathBuf,
    /// Diretório onde "Salvar"/"Carregar" resolvem os nomes de arquivo.
    pub data_dir: PathBuf,
    /// Consultas web abandonadas são descartadas após este tempo.
    pub session_ttl_minutes: i64,
    /// Capacidade do canal broadcast de eventos SSE.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Web,
            bind_addr: "0.0.0.0:3000".to_string(),
            kb_path: PathBuf::from("data/medios_cultivo.json"),
            data_dir: PathBuf::from("data"),
            session_ttl_minutes: 30,
            event_capacity: 256,
        }
    }
}

impl AppConfig {
    /// Carrega a configuração de arquivo + ambiente sobre os padrões.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("AGAR_CONFIG").unwrap_or_else(|_| "config/agar.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Como [`load()`](AppConfig::load), com caminho de arquivo explícito.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("mode", "web")?
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("kb_path", defaults.kb_path.to_string_lossy().into_owned())?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("session_ttl_minutes", defaults.session_ttl_minutes)?
            .set_default("event_capacity", defaults.event_capacity as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let cfg: Self = builder
            .add_source(config::Environment::with_prefix("AGAR").separator("__"))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejeita valores que deixariam o servidor inutilizável.
    fn validate(&self) -> Result<(), config::ConfigError> {
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.session_ttl_minutes) {
            return Err(config::ConfigError::Message(format!(
                "session_ttl_minutes deve estar entre 1 e {}, recebido {}",
                MAX_SESSION_TTL_MINUTES, self.session_ttl_minutes
            )));
        }
        if self.event_capacity == 0 {
            return Err(config::ConfigError::Message(
                "event_capacity deve ser maior que zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Aplica o modo vindo da linha de comando, se houver.
    pub fn with_mode_arg(mut self, arg: Option<&str>) -> Result<Self, String> {
        if let Some(arg) = arg {
            self.mode = arg.parse()?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("web".parse::<Mode>(), Ok(Mode::Web));
        assert_eq!(" Console ".parse::<Mode>(), Ok(Mode::Console));
        assert_eq!("cli".parse::<Mode>(), Ok(Mode::Console));
        assert!("gui".parse::<Mode>().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = AppConfig::load_from(Path::new("config/nao-existe.toml")).unwrap();
        assert_eq!(cfg.kb_path, PathBuf::from("data/medios_cultivo.json"));
        assert_eq!(cfg.session_ttl_minutes, 30);
        assert_eq!(cfg.event_capacity, 256);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("agar-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("agar.toml");
        std::fs::write(&file, "mode = \"console\"\nsession_ttl_minutes = 5\n").unwrap();

        let cfg = AppConfig::load_from(&file).unwrap();
        assert_eq!(cfg.mode, Mode::Console);
        assert_eq!(cfg.session_ttl_minutes, 5);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let dir = std::env::temp_dir().join(format!("agar-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("agar.toml");

        for body in [
            "session_ttl_minutes = 0\n",
            "session_ttl_minutes = -3\n",
            "session_ttl_minutes = 9223372036854775807\n",
            "event_capacity = 0\n",
        ] {
            std::fs::write(&file, body).unwrap();
            let err = AppConfig::load_from(&file).unwrap_err();
            assert!(matches!(err, config::ConfigError::Message(_)), "{body}: {err}");
        }

        std::fs::write(&file, "session_ttl_minutes = 525600\n").unwrap();
        assert_eq!(AppConfig::load_from(&file).unwrap().session_ttl_minutes, 525_600);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_mode_arg_overrides_config() {
        let cfg = AppConfig::default().with_mode_arg(Some("console")).unwrap();
        assert_eq!(cfg.mode, Mode::Console);
        assert!(AppConfig::default().with_mode_arg(Some("x")).is_err());
        assert_eq!(
            AppConfig::default().with_mode_arg(None).unwrap().mode,
            Mode::Web
        );
    }
}
