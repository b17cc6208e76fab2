//! Orquestração das quatro etapas do quickstart como máquina de estados.
//!
//! `Start → TransportReady → Authorized → ClientReady → ListsFetched → Rendered`,
//! com `Failed(kind)` alcançável a partir de qualquer estado. A primeira falha
//! encerra a execução.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::auth::{build_auth_flow, load_client_secret, ConsentPrompt, Credential, FileTokenStore, TokenStore};
use crate::client::{TaskList, TasksClient};
use crate::config::Settings;
use crate::error::{ErrorKind, QuickstartError, QuickstartResult};
use crate::exit_codes;
use crate::task_lists::{fetch_task_lists, format_task_lists};
use crate::transport::HttpTransport;
use crate::utils::logging;

/// Estado do pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    TransportReady,
    Authorized,
    ClientReady,
    ListsFetched,
    Rendered,
    Failed(ErrorKind),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Failed(kind) => write!(f, "Failed({:?})", kind),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Resultado de uma execução do pipeline
#[derive(Debug)]
pub struct Report {
    /// Estados percorridos, começando em `Start`
    pub history: Vec<PipelineState>,
    /// Texto formatado das task lists ou o erro que encerrou a execução
    pub result: QuickstartResult<String>,
}

impl Report {
    pub fn final_state(&self) -> PipelineState {
        self.history.last().copied().unwrap_or(PipelineState::Start)
    }

    /// Saída única do programa para o stdout
    pub fn render(&self) -> String {
        match &self.result {
            Ok(formatted) => format!("Task lists:\n{}", formatted),
            Err(e) => render_error(e),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(_) => exit_codes::OK,
            Err(e) => e.exit_code(),
        }
    }
}

/// Renderiza um erro no mesmo formato do pipeline
pub fn render_error(err: &QuickstartError) -> String {
    format!("Error: {}", err)
}

/// Quickstart configurado, pronto para uma execução
pub struct Quickstart {
    settings: Settings,
    store: Option<Box<dyn TokenStore>>,
    prompt: Option<Box<dyn ConsentPrompt>>,
}

impl Quickstart {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            store: None,
            prompt: None,
        }
    }

    /// Usa outro token store no lugar do `FileTokenStore` em `tokens_dir`
    pub fn with_token_store(mut self, store: Box<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn ConsentPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Executa as etapas em sequência.
    ///
    /// `cancel` vale para a execução inteira: interrompe a espera pelo
    /// consentimento (`AuthFailure`) e a busca das listas (`RequestFailure`).
    pub async fn run(self, cancel: impl Future<Output = ()>) -> Report {
        tokio::pin!(cancel);

        let mut tracker = Tracker::new();
        let result = self.execute(&mut tracker, cancel.as_mut()).await;

        if let Err(e) = &result {
            tracker.fail(e);
        }

        let report = Report {
            history: tracker.history,
            result,
        };
        logging::log_pipeline_finished(report.exit_code());
        report
    }

    async fn execute<C>(self, tracker: &mut Tracker, mut cancel: Pin<&mut C>) -> QuickstartResult<String>
    where
        C: Future<Output = ()>,
    {
        let Quickstart { settings, store, prompt } = self;

        tracker.begin("transport");
        let transport = HttpTransport::new(&settings)?;
        tracker.advance(PipelineState::TransportReady);

        tracker.begin("credential");
        let credential = Self::obtain_credential(&transport, &settings, store, prompt, cancel.as_mut()).await?;
        tracker.advance(PipelineState::Authorized);

        tracker.begin("client");
        let client = TasksClient::new(&transport, credential, &settings);
        tracker.advance(PipelineState::ClientReady);

        tracker.begin("fetch");
        // `cancel` ainda pendente: se tivesse completado a autorização teria falhado
        let items: Vec<TaskList> = tokio::select! {
            fetched = fetch_task_lists(&client, settings.max_results) => fetched?,
            _ = cancel.as_mut() => return Err(QuickstartError::request_error("request cancelled")),
        };
        tracker.advance(PipelineState::ListsFetched);

        let formatted = format_task_lists(&items);
        tracker.advance(PipelineState::Rendered);

        Ok(formatted)
    }

    async fn obtain_credential(
        transport: &HttpTransport,
        settings: &Settings,
        store: Option<Box<dyn TokenStore>>,
        prompt: Option<Box<dyn ConsentPrompt>>,
        cancel: impl Future<Output = ()>,
    ) -> QuickstartResult<Credential> {
        let secret = load_client_secret(settings)?;

        let store = match store {
            Some(store) => store,
            None => Box::new(FileTokenStore::new(&settings.tokens_dir)?),
        };

        let mut flow = build_auth_flow(transport, &secret, settings, store)?;
        if let Some(prompt) = prompt {
            flow = flow.with_prompt(prompt);
        }

        flow.authorize(&settings.user_id, cancel).await
    }
}

/// Registra as transições e a etapa corrente
struct Tracker {
    history: Vec<PipelineState>,
    step: &'static str,
}

impl Tracker {
    fn new() -> Self {
        Self {
            history: vec![PipelineState::Start],
            step: "start",
        }
    }

    fn current(&self) -> PipelineState {
        self.history.last().copied().unwrap_or(PipelineState::Start)
    }

    fn begin(&mut self, step: &'static str) {
        self.step = step;
        logging::log_step_started(step);
    }

    fn advance(&mut self, next: PipelineState) {
        logging::log_transition(&self.current().to_string(), &next.to_string());
        self.history.push(next);
    }

    fn fail(&mut self, err: &QuickstartError) {
        logging::log_step_failed(self.step, err);
        self.advance(PipelineState::Failed(err.kind()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_success() {
        let report = Report {
            history: vec![PipelineState::Start, PipelineState::Rendered],
            result: Ok("Groceries (abc123)\nWork (def456)".to_string()),
        };

        assert_eq!(report.render(), "Task lists:\nGroceries (abc123)\nWork (def456)");
        assert_eq!(report.exit_code(), exit_codes::OK);
        assert_eq!(report.final_state(), PipelineState::Rendered);
    }

    #[test]
    fn test_render_failure() {
        let report = Report {
            history: vec![PipelineState::Start, PipelineState::Failed(ErrorKind::EmptyResult)],
            result: Err(QuickstartError::EmptyResult),
        };

        assert_eq!(report.render(), "Error: No task lists found.");
        assert_eq!(report.exit_code(), exit_codes::EMPTY_RESULT);
    }

    #[test]
    fn test_render_error_before_pipeline() {
        let err = QuickstartError::config_error("max_results must be between 1 and 100, got 0");
        assert_eq!(
            render_error(&err),
            "Error: Invalid configuration: max_results must be between 1 and 100, got 0"
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::ListsFetched.to_string(), "ListsFetched");
        assert_eq!(
            PipelineState::Failed(ErrorKind::AuthFailure).to_string(),
            "Failed(AuthFailure)"
        );
    }

    #[test]
    fn test_tracker_records_failure_after_last_state() {
        let mut tracker = Tracker::new();
        tracker.begin("transport");
        tracker.advance(PipelineState::TransportReady);
        tracker.begin("credential");
        tracker.fail(&QuickstartError::auth_error("denied"));

        assert_eq!(
            tracker.history,
            vec![
                PipelineState::Start,
                PipelineState::TransportReady,
                PipelineState::Failed(ErrorKind::AuthFailure),
            ]
        );
    }
}
