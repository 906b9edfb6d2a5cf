pub mod client;
pub mod extract;
pub mod gemini_adapter;
pub mod lookups;
pub mod openai_adapter;
pub mod retry;
pub mod rotation;
pub mod types;

pub use client::AiClient;
pub use gemini_adapter::{GeminiAdapter, GeminiConfig};
pub use lookups::{CertificationLookup, GeneralSpecLookup, Lookup, MainSpecLookup};
pub use openai_adapter::{OpenAiAdapter, OpenAiConfig};
pub use retry::{RetryFailure, RetryPolicy};
pub use rotation::KeyRing;
pub use types::{CompletionRequest, LLMResponse, ProviderAdapter, ProviderError};
