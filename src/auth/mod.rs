//! # Autenticação OAuth2 com a Google Tasks API
//!
//! ## Responsabilidades:
//! - Carregar o client secret empacotado
//! - Reaproveitar, renovar ou obter credenciais (consentimento interativo)
//! - Persistir credenciais por usuário
//!
//! ## Estrutura:
//! - `secret.rs`: client secret do Google (`installed` / `web`)
//! - `token.rs`: credencial e token store em disco
//! - `callback.rs`: listener local do redirect
//! - `flow.rs`: fluxo authorization-code com PKCE

pub mod callback;
pub mod flow;
pub mod secret;
pub mod token;

pub use callback::CallbackServer;
pub use flow::{build_auth_flow, AuthorizationFlow, BrowserPrompt, ConsentPrompt};
pub use secret::{load_client_secret, ClientSecret};
pub use token::{Credential, FileTokenStore, TokenStore};
