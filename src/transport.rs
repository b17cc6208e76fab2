//! Etapa 1: transporte HTTP compartilhado pelo fluxo OAuth2 e pelo cliente da API.

use reqwest::{redirect, Client};

use crate::config::Settings;
use crate::error::{QuickstartError, QuickstartResult};

/// Handle de transporte HTTP configurado
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Constrói o transporte com timeout de requisição e sem seguir redirects
    /// (o endpoint de token não deve ser redirecionado).
    pub fn new(settings: &Settings) -> QuickstartResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| QuickstartError::config_error(format!("failed to build HTTP transport: {}", e)))?;

        tracing::debug!("Transporte HTTP criado (timeout: {:?})", settings.request_timeout());

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Executa uma requisição do `oauth2` sobre este transporte
    pub(crate) async fn execute_oauth(
        &self,
        request: oauth2::HttpRequest,
    ) -> Result<oauth2::HttpResponse, reqwest::Error> {
        let response = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(oauth2::HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}
