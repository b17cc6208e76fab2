use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::QuickstartError;

/// Inicializa o subscriber de logs.
///
/// Lê `RUST_LOG`; sem ela usa `warn` (ou `debug` com `verbose`). Saída no
/// stderr, formato compacto, para que o stdout traga apenas o resultado.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: testes e binários podem chamar mais de uma vez
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

pub fn log_settings_loaded(application_name: &str, max_results: u32) {
    info!("⚙️ Configuração carregada: {} (maxResults={})", application_name, max_results);
}

pub fn log_step_started(step: &str) {
    debug!("▶️ Etapa iniciada: {}", step);
}

pub fn log_transition(from: &str, to: &str) {
    info!("Pipeline: {} → {}", from, to);
}

pub fn log_step_failed(step: &str, err: &QuickstartError) {
    error!("❌ Etapa '{}' falhou ({:?}): {}", step, err.kind(), err);
}

pub fn log_pipeline_finished(exit_code: i32) {
    debug!("Pipeline finalizado com código de saída {}", exit_code);
}
