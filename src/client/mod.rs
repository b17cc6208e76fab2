pub mod api;
pub mod models;

pub use api::TasksClient;
pub use models::{TaskList, TaskLists};
