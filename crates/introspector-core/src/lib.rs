pub mod error;
pub mod constants;
pub mod config;
pub mod llm;
pub mod prompt;
pub mod summary;
pub mod session;
pub mod vault;

// Re-export key types
pub use error::{IntrospectError, Result};
pub use config::{Settings, SettingsSource, SharedSettings};
pub use llm::{Backend, ConfiguredProvider, FragmentStream, Message, ProviderAdapter, ProviderConfig, Role};
pub use prompt::Style;
pub use session::{Advance, ConversationEngine, Session, SessionState, Turn, TurnKind};
pub use summary::{SummaryParser, SummaryResult};
pub use vault::{ContextProvider, LinkExistenceChecker, NoteDraft, NotePersister};
