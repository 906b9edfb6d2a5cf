pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod pool;
pub mod result;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "scrape/lib.rs"]
pub mod scrape;
#[path = "credit/lib.rs"]
pub mod credit;
#[path = "generation/lib.rs"]
pub mod generation;
#[path = "task/lib.rs"]
pub mod task;
#[path = "api/lib.rs"]
pub mod api;

pub use config::{GeneratorConfig, PoolConfig};
pub use error::{ConfigError, GenerationError};
pub use generation::{Gateway, GatewayOutcome, GenerationRequest, Principal};
pub use result::{GeneralSpecResult, GenerationResult};
pub use task::{TaskResult, TaskState};
