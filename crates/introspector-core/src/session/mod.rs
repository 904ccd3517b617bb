mod engine;
mod model;

pub use engine::{Advance, ConversationEngine, Turn, TurnKind};
pub use model::{is_aha, signals_resolution, Session, SessionState};
