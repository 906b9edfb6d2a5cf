pub mod gateway;
pub mod handle;
pub mod orchestrator;
pub mod request;

pub use gateway::{Gateway, GatewayOutcome, GeneralOutcome};
pub use handle::{GenerationHandle, Outcome, Settlement, WaitInterrupted};
pub use orchestrator::GenerationOrchestrator;
pub use request::{GeneralSpecRequest, GenerationRequest, Principal};
