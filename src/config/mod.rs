pub mod settings;

pub use settings::{Settings, ENV_PREFIX, TASKS_READONLY_SCOPE};
