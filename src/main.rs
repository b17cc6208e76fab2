use std::path::PathBuf;

use clap::Parser;
use tasks_quickstart::config::Settings;
use tasks_quickstart::pipeline::{render_error, Quickstart};
use tasks_quickstart::utils::logging;

/// Google Tasks quickstart - lista até dez task lists do usuário autorizado
#[derive(Parser)]
#[command(name = "tasks-quickstart")]
#[command(version)]
#[command(about = "Lista as task lists do Google Tasks via OAuth2", long_about = None)]
struct Cli {
    /// Arquivo de configuração opcional (TOML, YAML ou JSON)
    #[arg(short = 'c', long, env = "TASKS_QUICKSTART_CONFIG")]
    config: Option<PathBuf>,

    /// Modo verbose para debug
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            println!("{}", render_error(&e));
            std::process::exit(e.exit_code());
        }
    };
    logging::log_settings_loaded(&settings.application_name, settings.max_results);

    let report = Quickstart::new(settings).run(ctrl_c()).await;

    println!("{}", report.render());
    std::process::exit(report.exit_code());
}

/// Resolve no Ctrl-C. Se o handler não puder ser registrado, nunca resolve.
///
/// O pipeline mantém este future vivo do consentimento até a busca das listas,
/// então o handler de SIGINT instalado no primeiro poll sempre tem quem o observe.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Não foi possível registrar o handler de Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::warn!("🛑 Ctrl-C recebido, cancelando execução");
}
