//! Prompt construction. Everything here is pure and free of I/O.

mod style;
mod system;
mod summary;

pub use style::Style;
pub use system::{build_system_prompt, CONTEXT_HEADER, SYSTEM_PROMPT_BASE};
pub use summary::{build_summary_prompt, format_summary_request, format_transcript, SUMMARY_PROMPT};
