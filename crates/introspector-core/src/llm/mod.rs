mod traits;
mod claude;
mod openrouter;
pub mod sse;
pub mod provider;

pub use traits::*;
pub use claude::ClaudeClient;
pub use openrouter::OpenRouterClient;
pub use provider::{Backend, ConfiguredProvider, ProviderConfig};
