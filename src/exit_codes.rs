//! Códigos de saída estáveis do binário `tasks-quickstart`.

/// Task lists impressas com sucesso.
pub const OK: i32 = 0;
/// O client secret não foi encontrado no diretório de recursos.
pub const RESOURCE_NOT_FOUND: i32 = 2;
/// O client secret existe mas está malformado.
pub const PARSE_ERROR: i32 = 3;
/// Settings, URLs do fluxo OAuth2 ou diretório de tokens inválidos.
pub const CONFIG_ERROR: i32 = 4;
/// Consentimento negado, timeout, cancelamento ou falha na troca de tokens.
pub const AUTH_FAILURE: i32 = 5;
/// Erro de rede ou HTTP na chamada à API de tasks.
pub const REQUEST_FAILURE: i32 = 6;
/// A API respondeu sem nenhuma task list.
pub const EMPTY_RESULT: i32 = 7;
