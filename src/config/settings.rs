use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{QuickstartError, QuickstartResult};

/// Escopo somente-leitura da Google Tasks API
pub const TASKS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/tasks.readonly";

/// Prefixo das variáveis de ambiente que sobrescrevem as settings
pub const ENV_PREFIX: &str = "TASKS_QUICKSTART";

/// Limite de itens por página aceito pela API
const MAX_PAGE_SIZE: u32 = 100;

/// Configuração imutável do quickstart, passada por referência para cada etapa
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Nome enviado como User-Agent para a API
    pub application_name: String,
    /// Nome do recurso com o client secret, relativo a `resources_dir`
    pub credentials_path: String,
    /// Diretório onde ficam os recursos empacotados com o binário
    pub resources_dir: PathBuf,
    /// Diretório do token store
    pub tokens_dir: PathBuf,
    pub scopes: Vec<String>,
    pub max_results: u32,
    pub callback_host: String,
    pub callback_port: u16,
    /// Tempo máximo de espera pelo redirect do navegador
    pub auth_timeout_secs: u64,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Chave do usuário no token store
    pub user_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application_name: "Google Tasks API Rust Quickstart".to_string(),
            credentials_path: "/credentials.json".to_string(),
            resources_dir: PathBuf::from("resources"),
            tokens_dir: PathBuf::from("tokens"),
            scopes: vec![TASKS_READONLY_SCOPE.to_string()],
            max_results: 10,
            callback_host: "localhost".to_string(),
            callback_port: 8888,
            auth_timeout_secs: 300,
            api_base_url: "https://tasks.googleapis.com/tasks/v1".to_string(),
            request_timeout_secs: 30,
            user_id: "user".to_string(),
        }
    }
}

impl Settings {
    /// Carrega as settings: padrões compilados, arquivo opcional e variáveis
    /// de ambiente `TASKS_QUICKSTART_*`, nessa ordem de precedência crescente.
    pub fn load(config_file: Option<&Path>) -> QuickstartResult<Self> {
        let defaults = Config::try_from(&Settings::default())
            .map_err(|e| QuickstartError::config_error(format!("failed to build defaults: {}", e)))?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = config_file {
            tracing::debug!("Carregando arquivo de configuração {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("scopes"),
        );

        let settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| QuickstartError::config_error(format!("failed to load settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Valida os campos que as etapas seguintes assumem corretos
    pub fn validate(&self) -> QuickstartResult<()> {
        if self.application_name.trim().is_empty() {
            return Err(QuickstartError::config_error("application_name must not be empty"));
        }

        if self.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(QuickstartError::config_error("at least one OAuth scope is required"));
        }

        if self.max_results == 0 || self.max_results > MAX_PAGE_SIZE {
            return Err(QuickstartError::config_error(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.max_results
            )));
        }

        if self.auth_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(QuickstartError::config_error("timeouts must be greater than zero"));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(QuickstartError::config_error(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }

        if !is_loopback_host(&self.callback_host) {
            return Err(QuickstartError::config_error(format!(
                "callback_host must be a loopback host (the listener binds 127.0.0.1), got '{}'",
                self.callback_host
            )));
        }

        if self.user_id.trim().is_empty() {
            return Err(QuickstartError::config_error("user_id must not be empty"));
        }

        Ok(())
    }

    /// Caminho do client secret no disco
    pub fn credentials_file(&self) -> PathBuf {
        self.resources_dir.join(self.credentials_path.trim_start_matches('/'))
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `localhost` ou um IP de loopback
fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
