use serde::{Deserialize, Serialize};

/// Uma task list como devolvida pela API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
}

impl TaskList {
    pub fn new(title: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated: None,
            self_link: None,
            etag: None,
        }
    }
}

/// Página de `tasklists.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLists {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Ausente quando o usuário não tem nenhuma lista
    #[serde(default)]
    pub items: Option<Vec<TaskList>>,
}
