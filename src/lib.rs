//! # Google Tasks Quickstart
//!
//! Autentica na Google Tasks API via OAuth2 (fluxo authorization-code de
//! aplicação instalada), busca até dez task lists e as formata.
//!
//! ## Etapas
//!
//! 1. Transporte HTTP (`transport`)
//! 2. Credencial (`auth`)
//! 3. Cliente da API (`client`)
//! 4. Busca e formatação (`task_lists`)
//!
//! ## Exemplo
//!
//! ```no_run
//! use tasks_quickstart::{Quickstart, Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::load(None).expect("settings");
//!     let report = Quickstart::new(settings).run(std::future::pending()).await;
//!     println!("{}", report.render());
//! }
//! ```

/// Módulo de autenticação OAuth2
pub mod auth;

/// Módulo de cliente API
pub mod client;

/// Módulo de configuração
pub mod config;

/// Módulo de tratamento de erros
pub mod error;

pub mod exit_codes;
pub mod pipeline;
pub mod task_lists;
pub mod transport;
pub mod utils;

// Re-exportações para conveniência
pub use client::TasksClient;
pub use config::Settings;
pub use error::{ErrorKind, QuickstartError, QuickstartResult};
pub use pipeline::{PipelineState, Quickstart, Report};
