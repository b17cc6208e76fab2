use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use oauth2::basic::{BasicClient, BasicErrorResponseType};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, CsrfToken,
    PkceCodeChallenge, RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenUrl,
};
use url::Url;

use crate::auth::callback::CallbackServer;
use crate::auth::secret::ClientSecret;
use crate::auth::token::{Credential, TokenStore};
use crate::config::Settings;
use crate::error::{QuickstartError, QuickstartResult};
use crate::transport::HttpTransport;

/// Forma de apresentar a URL de consentimento ao usuário
pub trait ConsentPrompt: Send + Sync {
    fn present(&self, authorization_url: &Url);
}

/// Imprime a URL no stderr e tenta abrir o navegador padrão
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPrompt;

impl ConsentPrompt for BrowserPrompt {
    fn present(&self, authorization_url: &Url) {
        eprintln!("Please open the following address in your browser:");
        eprintln!("  {}", authorization_url);

        if let Err(e) = webbrowser::open(authorization_url.as_str()) {
            tracing::warn!("⚠️ Não foi possível abrir o navegador automaticamente: {}", e);
        } else {
            tracing::info!("🌐 Navegador aberto automaticamente");
        }
    }
}

/// Fluxo authorization-code ligado ao transporte, ao client secret, aos
/// escopos e ao token store.
pub struct AuthorizationFlow {
    oauth: BasicClient,
    transport: HttpTransport,
    scopes: Vec<String>,
    store: Box<dyn TokenStore>,
    callback_host: String,
    callback_port: u16,
    timeout: Duration,
    prompt: Box<dyn ConsentPrompt>,
}

/// Constrói o fluxo OAuth2.
///
/// Falha com `Config` quando as URLs do client secret ou os escopos são inválidos.
pub fn build_auth_flow(
    transport: &HttpTransport,
    secret: &ClientSecret,
    settings: &Settings,
    store: Box<dyn TokenStore>,
) -> QuickstartResult<AuthorizationFlow> {
    let scopes: Vec<String> = settings
        .scopes
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if scopes.is_empty() {
        return Err(QuickstartError::config_error("at least one OAuth scope is required"));
    }

    let auth_url = AuthUrl::new(secret.auth_uri.clone())
        .map_err(|e| QuickstartError::config_error(format!("invalid auth_uri '{}': {}", secret.auth_uri, e)))?;
    let token_url = TokenUrl::new(secret.token_uri.clone())
        .map_err(|e| QuickstartError::config_error(format!("invalid token_uri '{}': {}", secret.token_uri, e)))?;

    let oauth = BasicClient::new(
        ClientId::new(secret.client_id.clone()),
        Some(OAuthClientSecret::new(secret.client_secret.clone())),
        auth_url,
        Some(token_url),
    );

    Ok(AuthorizationFlow {
        oauth,
        transport: transport.clone(),
        scopes,
        store,
        callback_host: settings.callback_host.clone(),
        callback_port: settings.callback_port,
        timeout: settings.auth_timeout(),
        prompt: Box::new(BrowserPrompt),
    })
}

impl AuthorizationFlow {
    /// Substitui a forma de apresentar a URL de consentimento
    pub fn with_prompt(mut self, prompt: Box<dyn ConsentPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Obtém uma credencial utilizável para `user_id`.
    ///
    /// Reaproveita a credencial armazenada quando possível (renovando-a se o
    /// access token venceu); caso contrário executa o consentimento interativo.
    pub async fn authorize(&self, user_id: &str, cancel: impl Future<Output = ()>) -> QuickstartResult<Credential> {
        let now = Utc::now();

        match self.store.load(user_id)? {
            Some(stored) if stored.is_reusable_at(now) => {
                if !stored.is_expired_at(now) {
                    tracing::info!("✅ Credencial armazenada válida, reutilizando");
                    return Ok(stored);
                }

                tracing::info!("🔄 Access token expirado, renovando com refresh token...");
                match self.refresh(&stored).await? {
                    Some(refreshed) => {
                        self.store.save(user_id, &refreshed)?;
                        return Ok(refreshed);
                    }
                    None => {
                        tracing::warn!("❌ Refresh token rejeitado, iniciando novo consentimento");
                        self.store.delete(user_id)?;
                    }
                }
            }
            Some(_) => tracing::info!("Credencial armazenada expirada e sem refresh token"),
            None => tracing::info!("🆕 Nenhuma credencial armazenada, iniciando consentimento"),
        }

        let credential = self.authorize_interactively(cancel).await?;
        self.store.save(user_id, &credential)?;
        tracing::info!("✅ Autorização OAuth2 concluída");
        Ok(credential)
    }

    /// Renova o access token. `Ok(None)` indica refresh token rejeitado pelo servidor.
    async fn refresh(&self, stored: &Credential) -> QuickstartResult<Option<Credential>> {
        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            return Ok(None);
        };

        let result = self
            .oauth
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(|request| self.transport.execute_oauth(request))
            .await;

        match result {
            Ok(response) => Ok(Some(Credential::from_token_response(
                &response,
                Some(refresh_token),
                &stored.scopes,
                Utc::now(),
            ))),
            Err(RequestTokenError::ServerResponse(response))
                if *response.error() == BasicErrorResponseType::InvalidGrant =>
            {
                Ok(None)
            }
            Err(e) => Err(QuickstartError::auth_error(format!("failed to refresh access token: {}", e))),
        }
    }

    async fn authorize_interactively(&self, cancel: impl Future<Output = ()>) -> QuickstartResult<Credential> {
        let state = CsrfToken::new_random();
        let mut receiver = CallbackServer::bind(&self.callback_host, self.callback_port, state.secret().clone())?;

        let redirect_url = RedirectUrl::new(receiver.redirect_uri())
            .map_err(|e| QuickstartError::config_error(format!("invalid redirect URI: {}", e)))?;
        let client = self.oauth.clone().set_redirect_uri(redirect_url);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (authorization_url, _) = client
            .authorize_url(move || state)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::debug!("URL de autorização gerada: {}", authorization_url);
        self.prompt.present(&authorization_url);

        tracing::info!("⏳ Aguardando autorização do usuário...");
        let code = receiver.wait_for_code(self.timeout, cancel).await?;
        tracing::info!("✅ Código de autorização recebido, trocando por token...");

        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(|request| self.transport.execute_oauth(request))
            .await
            .map_err(|e| QuickstartError::auth_error(format!("failed to exchange authorization code: {}", e)))?;

        Ok(Credential::from_token_response(&response, None, &self.scopes, Utc::now()))
    }
}
