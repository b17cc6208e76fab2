use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::Filter;

use crate::error::{QuickstartError, QuickstartResult};

/// Caminho do redirect OAuth2 servido pelo listener local
pub const CALLBACK_PATH: &str = "Callback";

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<QuickstartResult<String>>>>>;

/// Servidor HTTP local que recebe o redirect do consentimento.
///
/// O servidor é encerrado quando este valor é descartado.
pub struct CallbackServer {
    host: String,
    local_addr: SocketAddr,
    receiver: Option<oneshot::Receiver<QuickstartResult<String>>>,
    server: JoinHandle<()>,
}

impl CallbackServer {
    /// Abre o listener em 127.0.0.1:`port` (0 escolhe uma porta livre).
    ///
    /// Precisa ser chamado dentro de um runtime Tokio.
    pub fn bind(host: &str, port: u16, expected_state: String) -> QuickstartResult<Self> {
        let (tx, rx) = oneshot::channel::<QuickstartResult<String>>();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));

        let callback_route = warp::path(CALLBACK_PATH)
            .and(warp::path::end())
            .and(warp::query::<HashMap<String, String>>())
            .map(move |params: HashMap<String, String>| {
                tracing::debug!("Callback OAuth2 recebido com parâmetros {:?}", params.keys().collect::<Vec<_>>());

                let result = Self::process_callback(&params, &expected_state);
                let page = if result.is_ok() { SUCCESS_PAGE } else { ERROR_PAGE };

                if let Ok(mut sender) = tx.lock() {
                    if let Some(tx) = sender.take() {
                        let _ = tx.send(result);
                    }
                }

                warp::reply::html(page)
            });

        let status_route = warp::path::end().map(|| warp::reply::html(WAITING_PAGE));

        let routes = callback_route
            .or(status_route)
            .with(warp::filters::log::log("tasks_quickstart::callback"));

        let (local_addr, server_future) = warp::serve(routes)
            .try_bind_ephemeral(([127, 0, 0, 1], port))
            .map_err(|e| {
                QuickstartError::auth_error(format!("failed to bind callback listener on port {}: {}", port, e))
            })?;

        tracing::info!("Servidor de callback ouvindo em http://{}", local_addr);

        Ok(Self {
            host: host.to_string(),
            local_addr,
            receiver: Some(rx),
            server: tokio::spawn(server_future),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URI de redirect registrada no pedido de autorização
    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.local_addr.port(), CALLBACK_PATH)
    }

    /// Aguarda o código de autorização.
    ///
    /// Termina com erro no timeout ou quando `cancel` completa antes do redirect.
    pub async fn wait_for_code(
        &mut self,
        timeout: Duration,
        cancel: impl Future<Output = ()>,
    ) -> QuickstartResult<String> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| QuickstartError::auth_error("callback already consumed"))?;

        tokio::select! {
            outcome = receiver => match outcome {
                Ok(result) => result,
                Err(_) => Err(QuickstartError::auth_error("callback channel closed")),
            },
            _ = tokio::time::sleep(timeout) => Err(QuickstartError::AuthTimeout { seconds: timeout.as_secs() }),
            _ = cancel => Err(QuickstartError::auth_error("authorization cancelled")),
        }
    }

    /// Valida os parâmetros do redirect e extrai o código
    fn process_callback(params: &HashMap<String, String>, expected_state: &str) -> QuickstartResult<String> {
        if let Some(error) = params.get("error") {
            return Err(match error.as_str() {
                "access_denied" => QuickstartError::auth_error("access denied by user"),
                other => QuickstartError::auth_error(format!("authorization server returned '{}'", other)),
            });
        }

        let code = params
            .get("code")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| QuickstartError::auth_error("authorization code missing from redirect"))?;

        match params.get("state") {
            Some(state) if state == expected_state => Ok(code.clone()),
            _ => Err(QuickstartError::auth_error("OAuth2 state mismatch")),
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

const WAITING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Tasks Quickstart - Waiting</title></head>
<body><h1>Waiting for authorization...</h1><p>Complete the consent step in the Google page.</p></body>
</html>
"#;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Tasks Quickstart - Authorized</title></head>
<body><h1>Received verification code.</h1><p>You may now close this window.</p></body>
</html>
"#;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Tasks Quickstart - Error</title></head>
<body><h1>Authorization failed.</h1><p>Return to the terminal for details. You may close this window.</p></body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_process_callback_success() {
        let result = CallbackServer::process_callback(&params(&[("code", "abc"), ("state", "s1")]), "s1");
        assert_eq!(result.unwrap(), "abc");
    }

    #[test]
    fn test_process_callback_invalid_state() {
        let result = CallbackServer::process_callback(&params(&[("code", "abc"), ("state", "other")]), "s1");
        assert!(result.unwrap_err().to_string().contains("state mismatch"));
    }

    #[test]
    fn test_process_callback_access_denied() {
        let err = CallbackServer::process_callback(&params(&[("error", "access_denied")]), "s1").unwrap_err();
        assert!(matches!(err, QuickstartError::Auth(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_process_callback_missing_code() {
        let result = CallbackServer::process_callback(&params(&[("state", "s1")]), "s1");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_receives_code_from_redirect() {
        let mut server = CallbackServer::bind("localhost", 0, "state-123".to_string()).unwrap();
        let url = format!(
            "http://{}/{}?code=the-code&state=state-123",
            server.local_addr(),
            CALLBACK_PATH
        );

        let browser = tokio::spawn(async move { reqwest::get(url).await.unwrap().text().await.unwrap() });

        let code = server
            .wait_for_code(Duration::from_secs(5), std::future::pending())
            .await
            .unwrap();
        assert_eq!(code, "the-code");

        let page = browser.await.unwrap();
        assert!(page.contains("Received verification code"));
    }

    #[tokio::test]
    async fn test_redirect_uri_uses_bound_port() {
        let server = CallbackServer::bind("localhost", 0, "s".to_string()).unwrap();
        let expected = format!("http://localhost:{}/Callback", server.local_addr().port());
        assert_eq!(server.redirect_uri(), expected);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_auth_failure() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let result = CallbackServer::bind("localhost", port, "s".to_string());
        assert!(matches!(result, Err(QuickstartError::Auth(_))));
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let mut server = CallbackServer::bind("localhost", 0, "s".to_string()).unwrap();
        let err = server
            .wait_for_code(Duration::from_millis(50), std::future::pending())
            .await
            .unwrap_err();

        assert!(matches!(err, QuickstartError::AuthTimeout { .. }));
    }

    #[tokio::test]
    async fn test_wait_is_cancellable() {
        let mut server = CallbackServer::bind("localhost", 0, "s".to_string()).unwrap();
        let err = server
            .wait_for_code(Duration::from_secs(30), std::future::ready(()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cancelled"));
    }
}
