pub mod registry;
pub mod types;

pub use registry::{RegistryConfig, TaskRegistry};
pub use types::{TaskId, TaskResult, TaskState};
