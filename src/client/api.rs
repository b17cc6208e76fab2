use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;

use crate::auth::token::Credential;
use crate::client::models::TaskLists;
use crate::config::Settings;
use crate::error::{QuickstartError, QuickstartResult};
use crate::transport::HttpTransport;

/// Cliente da Google Tasks API ligado a um transporte e a uma credencial
#[derive(Debug, Clone)]
pub struct TasksClient {
    transport: HttpTransport,
    credential: Credential,
    base_url: String,
    application_name: String,
}

impl TasksClient {
    /// Etapa 3: constrói o cliente. O nome da aplicação vai no User-Agent.
    pub fn new(transport: &HttpTransport, credential: Credential, settings: &Settings) -> Self {
        Self {
            transport: transport.clone(),
            credential,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            application_name: settings.application_name.clone(),
        }
    }

    /// Constrói URL completa para um endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET /users/@me/lists, uma única página com até `max_results` itens
    pub async fn list_task_lists(&self, max_results: u32) -> QuickstartResult<TaskLists> {
        let url = self.build_url("users/@me/lists");
        tracing::debug!("GET {} (maxResults={})", url, max_results);

        let response = self
            .transport
            .client()
            .get(&url)
            .query(&[("maxResults", max_results.to_string())])
            .header(AUTHORIZATION, self.credential.authorization_header())
            .header(USER_AGENT, self.application_name.as_str())
            .send()
            .await
            .map_err(|e| QuickstartError::request_error(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QuickstartError::request_error(format!("failed to read response body: {}", e)))?;

        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(Self::handle_error_response(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| QuickstartError::request_error(format!("unexpected response body: {}", e)))
    }

    /// Traduz respostas de erro da API
    fn handle_error_response(status: StatusCode, body: &str) -> QuickstartError {
        match status.as_u16() {
            401 => QuickstartError::request_error("credential rejected by the API (401)"),
            403 => QuickstartError::request_error("access forbidden, check the granted scopes (403)"),
            429 => QuickstartError::request_error("rate limit exceeded (429)"),
            500..=599 => QuickstartError::request_error(format!("server error ({})", status.as_u16())),
            code => QuickstartError::request_error(format!("API error ({}): {}", code, body.trim())),
        }
    }
}
