use thiserror::Error;

use crate::exit_codes;

/// Categoria estável de uma falha do pipeline.
///
/// Cada variante de [`QuickstartError`] pertence a exatamente uma categoria, e
/// cada categoria tem seu próprio código de saída.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ResourceNotFound,
    ParseError,
    ConfigError,
    AuthFailure,
    RequestFailure,
    EmptyResult,
}

impl ErrorKind {
    /// Código de saída do processo para esta categoria
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::ResourceNotFound => exit_codes::RESOURCE_NOT_FOUND,
            ErrorKind::ParseError => exit_codes::PARSE_ERROR,
            ErrorKind::ConfigError => exit_codes::CONFIG_ERROR,
            ErrorKind::AuthFailure => exit_codes::AUTH_FAILURE,
            ErrorKind::RequestFailure => exit_codes::REQUEST_FAILURE,
            ErrorKind::EmptyResult => exit_codes::EMPTY_RESULT,
        }
    }
}

/// Erros do pipeline de listagem de task lists
#[derive(Error, Debug)]
pub enum QuickstartError {
    /// O recurso com o client secret não existe
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// O client secret existe mas não pôde ser interpretado
    #[error("Invalid client secret: {0}")]
    Parse(String),

    /// Configuração inválida (settings, URLs do fluxo, escopos, diretório de tokens)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Falha na autorização OAuth2 (negada, rede, bind do listener, token store)
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// O usuário não concluiu o consentimento dentro do prazo
    #[error("Authorization failed: timed out after {seconds}s waiting for the browser redirect")]
    AuthTimeout { seconds: u64 },

    /// Falha de rede ou HTTP ao chamar a API de tasks
    #[error("Request failed: {0}")]
    Request(String),

    /// A requisição funcionou mas não retornou nenhuma task list
    #[error("No task lists found.")]
    EmptyResult,
}

impl QuickstartError {
    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound(resource.into())
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn request_error(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Categoria do erro
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Self::Parse(_) => ErrorKind::ParseError,
            Self::Config(_) => ErrorKind::ConfigError,
            Self::Auth(_) | Self::AuthTimeout { .. } => ErrorKind::AuthFailure,
            Self::Request(_) => ErrorKind::RequestFailure,
            Self::EmptyResult => ErrorKind::EmptyResult,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

/// Tipo de resultado padrão do crate
pub type QuickstartResult<T> = Result<T, QuickstartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let missing = QuickstartError::resource_not_found("/credentials.json");
        assert_eq!(missing.to_string(), "Resource not found: /credentials.json");

        assert_eq!(QuickstartError::EmptyResult.to_string(), "No task lists found.");

        let timeout = QuickstartError::AuthTimeout { seconds: 300 };
        assert!(timeout.to_string().contains("timed out after 300s"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(QuickstartError::parse_error("x").kind(), ErrorKind::ParseError);
        assert_eq!(QuickstartError::config_error("x").kind(), ErrorKind::ConfigError);
        assert_eq!(QuickstartError::auth_error("x").kind(), ErrorKind::AuthFailure);
        assert_eq!(QuickstartError::AuthTimeout { seconds: 1 }.kind(), ErrorKind::AuthFailure);
        assert_eq!(QuickstartError::request_error("x").kind(), ErrorKind::RequestFailure);
        assert_eq!(QuickstartError::EmptyResult.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let kinds = [
            ErrorKind::ResourceNotFound,
            ErrorKind::ParseError,
            ErrorKind::ConfigError,
            ErrorKind::AuthFailure,
            ErrorKind::RequestFailure,
            ErrorKind::EmptyResult,
        ];

        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != exit_codes::OK));

        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
