pub mod quickstart_error;

pub use quickstart_error::{ErrorKind, QuickstartError, QuickstartResult};
