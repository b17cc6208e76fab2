//! Etapa 4: busca e formatação das task lists.

use crate::client::{TaskList, TasksClient};
use crate::error::{QuickstartError, QuickstartResult};

/// Busca uma única página com até `limit` task lists.
///
/// Uma coleção ausente ou vazia é `EmptyResult`. O `nextPageToken` nunca é seguido.
pub async fn fetch_task_lists(client: &TasksClient, limit: u32) -> QuickstartResult<Vec<TaskList>> {
    let page = client.list_task_lists(limit).await?;

    if let Some(token) = page.next_page_token.as_deref() {
        tracing::debug!("Há mais páginas (nextPageToken={}), ignorando", token);
    }

    match page.items {
        Some(items) if !items.is_empty() => {
            tracing::info!("📋 {} task list(s) recebida(s)", items.len());
            Ok(items)
        }
        _ => Err(QuickstartError::EmptyResult),
    }
}

/// Uma linha `"<title> (<id>)"` por item, na ordem recebida
pub fn format_task_lists(items: &[TaskList]) -> String {
    items
        .iter()
        .map(|list| format!("{} ({})", list.title, list.id))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::config::Settings;
    use crate::transport::HttpTransport;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_with_body(server: &MockServer, body: serde_json::Value) -> TasksClient {
        Mock::given(method("GET"))
            .and(path("/users/@me/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;

        let settings = Settings {
            api_base_url: server.uri(),
            ..Settings::default()
        };
        let transport = HttpTransport::new(&settings).unwrap();
        TasksClient::new(&transport, Credential::new("token"), &settings)
    }

    #[test]
    fn test_format_task_lists() {
        let items = vec![TaskList::new("Groceries", "abc123"), TaskList::new("Work", "def456")];
        assert_eq!(format_task_lists(&items), "Groceries (abc123)\nWork (def456)");
    }

    #[test]
    fn test_format_single_and_empty() {
        assert_eq!(format_task_lists(&[TaskList::new("Inbox", "x1")]), "Inbox (x1)");
        assert_eq!(format_task_lists(&[]), "");
    }

    #[test]
    fn test_format_keeps_untitled_lists() {
        assert_eq!(format_task_lists(&[TaskList::new("", "id-9")]), " (id-9)");
    }

    #[tokio::test]
    async fn test_fetch_returns_items_in_order() {
        let server = MockServer::start().await;
        let client = client_with_body(
            &server,
            serde_json::json!({
                "items": [
                    {"id": "abc123", "title": "Groceries"},
                    {"id": "def456", "title": "Work"}
                ],
                "nextPageToken": "ignored"
            }),
        )
        .await;

        let items = fetch_task_lists(&client, 10).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Work"]);
    }

    #[tokio::test]
    async fn test_fetch_without_items_is_empty_result() {
        let server = MockServer::start().await;
        let client = client_with_body(&server, serde_json::json!({"kind": "tasks#taskLists"})).await;

        let err = fetch_task_lists(&client, 10).await.unwrap_err();
        assert!(matches!(err, QuickstartError::EmptyResult));
    }

    #[tokio::test]
    async fn test_fetch_with_empty_items_is_empty_result() {
        let server = MockServer::start().await;
        let client = client_with_body(&server, serde_json::json!({"items": []})).await;

        let err = fetch_task_lists(&client, 10).await.unwrap_err();
        assert_eq!(err.to_string(), "No task lists found.");
    }
}
