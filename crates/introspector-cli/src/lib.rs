// Library interface for introspector-cli.
// The binary and the integration tests share these modules.

pub mod app;
pub mod commands;
pub mod note;
pub mod theme;
pub mod vault;

pub use commands::{handle_command, CommandResult};
pub use theme::Theme;
pub use vault::FsVault;
