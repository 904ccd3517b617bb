use introspector_core::{Backend, Style};

/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Discard the current session and open a new one.
    NewSession,
    /// Summarize the session and save it as a note.
    Finish,
    /// Use this style for the next session.
    StyleChanged(Style),
    /// Switch backend; takes effect on the next provider call.
    BackendChanged(Backend),
    /// Switch model for the active backend; takes effect on the next call.
    ModelChanged(String),
    /// Show session and provider status.
    ShowStatus,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return CommandResult::NotACommand;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" => CommandResult::NewSession,
        "/done" | "/capture" => CommandResult::Finish,
        "/status" => CommandResult::ShowStatus,

        "/style" => {
            if arg.is_empty() {
                let styles = Style::ALL
                    .iter()
                    .map(|s| format!("  {:<11} {}", s.id(), s.label()))
                    .collect::<Vec<_>>()
                    .join("\n");
                CommandResult::Message(format!("Available styles:\n{styles}\nUsage: /style <style>"))
            } else {
                match arg.parse::<Style>() {
                    Ok(style) => CommandResult::StyleChanged(style),
                    Err(e) => CommandResult::Message(e.to_string()),
                }
            }
        }
        "/backend" => {
            if arg.is_empty() {
                let backends = Backend::all()
                    .iter()
                    .map(|b| b.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                CommandResult::Message(format!(
                    "Available backends: {backends}\nUsage: /backend <direct|routed>"
                ))
            } else {
                match arg.parse::<Backend>() {
                    Ok(backend) => CommandResult::BackendChanged(backend),
                    Err(e) => CommandResult::Message(e.to_string()),
                }
            }
        }
        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-id>".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/version" => CommandResult::Message(format!("Introspector v{}", env!("CARGO_PKG_VERSION"))),

        _ => CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands.")),
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ Introspector Commands ────────────────────────────────────────╮

  SESSION
    /done, /capture           Summarize and save the session
    /new                      Start a fresh session
    /style <style>            Style for the next session
    /status                   Show session and provider status

  PROVIDER
    /backend <backend>        Switch backend (direct, routed)
    /model <id>               Switch model for the active backend

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit

  Say \"aha\" in a message to capture the insight right away.

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
