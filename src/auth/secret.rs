use std::io::ErrorKind as IoErrorKind;

use serde::Deserialize;

use crate::config::Settings;
use crate::error::{QuickstartError, QuickstartResult};

/// Identidade OAuth2 da aplicação (não do usuário)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Documento baixado do console do Google: uma seção `installed` ou `web`
#[derive(Debug, Deserialize)]
struct ClientSecretDocument {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Interpreta o JSON de client secret
    pub fn from_json(raw: &str) -> QuickstartResult<Self> {
        let document: ClientSecretDocument = serde_json::from_str(raw)
            .map_err(|e| QuickstartError::parse_error(format!("malformed JSON: {}", e)))?;

        let secret = document
            .installed
            .or(document.web)
            .ok_or_else(|| QuickstartError::parse_error("expected an 'installed' or 'web' section"))?;

        secret.check()?;
        Ok(secret)
    }

    fn check(&self) -> QuickstartResult<()> {
        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("auth_uri", &self.auth_uri),
            ("token_uri", &self.token_uri),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(QuickstartError::parse_error(format!("field '{}' is empty", field)));
            }
        }

        Ok(())
    }
}

/// Localiza e interpreta o client secret empacotado.
///
/// Falha com `ResourceNotFound` quando o arquivo não existe e com `Parse`
/// quando o conteúdo não é um client secret válido.
pub fn load_client_secret(settings: &Settings) -> QuickstartResult<ClientSecret> {
    let path = settings.credentials_file();
    tracing::debug!("Lendo client secret de {}", path.display());

    let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => QuickstartError::resource_not_found(settings.credentials_path.clone()),
        _ => QuickstartError::parse_error(format!("failed to read {}: {}", path.display(), e)),
    })?;

    ClientSecret::from_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "quickstart",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    fn settings_for(dir: &std::path::Path) -> Settings {
        Settings {
            resources_dir: dir.to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_parse_installed_secret() {
        let secret = ClientSecret::from_json(INSTALLED).unwrap();

        assert_eq!(secret.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_parse_web_secret() {
        let raw = INSTALLED.replace("\"installed\"", "\"web\"");
        assert!(ClientSecret::from_json(&raw).is_ok());
    }

    #[test]
    fn test_parse_rejects_unknown_layout() {
        let result = ClientSecret::from_json(r#"{"other": {}}"#);
        assert!(matches!(result, Err(QuickstartError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_empty_client_id() {
        let raw = INSTALLED.replace("123.apps.googleusercontent.com", "");
        let err = ClientSecret::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_client_secret(&settings_for(dir.path())).unwrap_err();

        assert!(matches!(err, QuickstartError::ResourceNotFound(_)));
        assert_eq!(err.to_string(), "Resource not found: /credentials.json");
    }

    #[test]
    fn test_malformed_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("credentials.json"), "not json at all").unwrap();

        let err = load_client_secret(&settings_for(dir.path())).unwrap_err();
        assert!(matches!(err, QuickstartError::Parse(_)));
    }

    #[test]
    fn test_load_valid_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("credentials.json"), INSTALLED).unwrap();

        let secret = load_client_secret(&settings_for(dir.path())).unwrap();
        assert_eq!(secret.client_secret, "shh");
    }
}
