use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicTokenResponse;
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};

use crate::error::{QuickstartError, QuickstartResult};

/// Margem antes da expiração em que o access token já é tratado como vencido
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Credencial OAuth2 autorizada (par access/refresh token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    /// Monta a credencial a partir da resposta do endpoint de token.
    ///
    /// Respostas de refresh normalmente não trazem um novo refresh token; nesse
    /// caso o anterior é mantido.
    pub fn from_token_response(
        response: &BasicTokenResponse,
        previous_refresh_token: Option<&str>,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| previous_refresh_token.map(str::to_string));

        let expires_at = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| now + d);

        let scopes = response
            .scopes()
            .map(|granted| granted.iter().map(|s| s.as_str().to_string()).collect())
            .unwrap_or_else(|| requested_scopes.to_vec());

        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token,
            token_type: default_token_type(),
            expires_at,
            scopes,
        }
    }

    /// Verdadeiro quando o access token vence em menos de um minuto
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - now <= Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }

    /// Uma credencial armazenada pode ser reaproveitada sem novo consentimento
    /// quando ainda é válida ou quando pode ser renovada.
    pub fn is_reusable_at(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_some() || !self.is_expired_at(now)
    }

    /// Valor do header Authorization
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Armazenamento persistente de credenciais por usuário
pub trait TokenStore: Send + Sync {
    fn load(&self, user_id: &str) -> QuickstartResult<Option<Credential>>;

    fn save(&self, user_id: &str, credential: &Credential) -> QuickstartResult<()>;

    fn delete(&self, user_id: &str) -> QuickstartResult<()>;
}

/// Token store em disco: um documento JSON por usuário dentro do diretório
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Cria (se necessário) o diretório do token store
    pub fn new(dir: impl AsRef<Path>) -> QuickstartResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_private_dir(&dir).map_err(|e| {
            QuickstartError::config_error(format!("failed to create token directory {}: {}", dir.display(), e))
        })?;

        Ok(Self { dir })
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        let file_name: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, user_id: &str) -> QuickstartResult<Option<Credential>> {
        let path = self.path_for(user_id);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(QuickstartError::auth_error(format!(
                    "failed to read stored credential {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                tracing::warn!("⚠️ Credencial armazenada ilegível em {}, ignorando: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, user_id: &str, credential: &Credential) -> QuickstartResult<()> {
        let path = self.path_for(user_id);
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| QuickstartError::auth_error(format!("failed to serialize credential: {}", e)))?;

        write_private_file(&path, json.as_bytes()).map_err(|e| {
            QuickstartError::auth_error(format!("failed to write stored credential {}: {}", path.display(), e))
        })?;

        tracing::info!("Credencial salva em {}", path.display());
        Ok(())
    }

    fn delete(&self, user_id: &str) -> QuickstartResult<()> {
        let path = self.path_for(user_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuickstartError::auth_error(format!(
                "failed to delete stored credential {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` só vale na criação; um arquivo pré-existente é corrigido aqui
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)
}
