use anyhow::{bail, Result};
use futures::StreamExt;
use introspector_core::{
    Advance, ConfiguredProvider, ContextProvider, ConversationEngine, IntrospectError,
    NotePersister, SharedSettings, Style, Turn,
};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{handle_command, CommandResult};
use crate::theme::Theme;
use crate::vault::FsVault;

/// Per-run choices that are not part of the persisted settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub style: Style,
    pub use_context: bool,
    pub theme: Theme,
}

fn build_engine(settings: &SharedSettings) -> Result<ConversationEngine> {
    let provider = ConfiguredProvider::new(Arc::new(settings.clone()));
    if !provider.is_configured() {
        let backend = provider.current_config().backend;
        bail!(
            "No API key for the {} backend. Set {} or add api_key to {}",
            backend.name(),
            backend.default_api_key_env(),
            introspector_core::Settings::config_path().display()
        );
    }
    Ok(ConversationEngine::new(Arc::new(provider)))
}

async fn load_context(vault: &FsVault, options: &SessionOptions) -> Option<String> {
    if !options.use_context {
        return None;
    }
    match vault.context().await {
        Ok(context) if !context.trim().is_empty() => Some(context),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "could not read vault context");
            None
        }
    }
}

/// Print a turn's fragments as they arrive. Returns the full text.
async fn print_turn(
    mut turn: Turn<'_>,
    theme: &Theme,
    color: Option<crossterm::style::Color>,
) -> std::result::Result<String, IntrospectError> {
    let mut stdout = io::stdout();
    while let Some(fragment) = turn.next().await {
        match fragment {
            Ok(text) => {
                print!("{}", theme.paint(&text, color));
                let _ = stdout.flush();
            }
            Err(e) => {
                println!();
                return Err(e);
            }
        }
    }
    println!();
    Ok(turn.text().to_string())
}

async fn open_session(
    engine: &mut ConversationEngine,
    vault: &FsVault,
    options: &SessionOptions,
) {
    let theme = &options.theme;
    let context = load_context(vault, options).await;
    println!(
        "{}",
        theme.paint(&format!("[{}]", options.style.label()), theme.muted)
    );

    let result = match engine.begin(options.style, context).await {
        Ok(turn) => print_turn(turn, theme, theme.opening).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => println!(),
        Err(e) => {
            eprintln!(
                "{}",
                theme.paint(&format!("Could not start the session: {e}"), theme.error)
            );
            eprintln!("{}", theme.paint("Try /new to retry.", theme.muted));
        }
    }
}

async fn finish_session(engine: &mut ConversationEngine, vault: &FsVault, theme: &Theme) {
    println!("{}", theme.paint("Capturing your insights...", theme.muted));

    let summary = match engine.finalize(vault).await {
        Ok(summary) => summary,
        Err(IntrospectError::InsufficientHistory { .. }) => {
            println!(
                "{}",
                theme.paint("Have a conversation first before finishing.", theme.muted)
            );
            return;
        }
        Err(IntrospectError::SessionFinished) => {
            println!(
                "{}",
                theme.paint("This session is already captured. Use /new to start another.", theme.muted)
            );
            return;
        }
        Err(e) => {
            eprintln!("{}", theme.paint(&format!("Summary failed: {e}"), theme.error));
            if e.is_retryable() {
                eprintln!("{}", theme.paint("Try /done again.", theme.muted));
            }
            return;
        }
    };

    for insight in &summary.insights {
        println!("  {}", theme.paint(&format!("- {insight}"), theme.assistant));
    }
    if !summary.links.is_empty() {
        println!("  {}", theme.paint(&summary.links.join(" "), theme.muted));
    }

    let Some(draft) = engine.note_draft(summary) else {
        return;
    };
    match vault.save(&draft).await {
        Ok(path) => println!(
            "{}",
            theme.paint(&format!("Saved to {}", path.display()), theme.success)
        ),
        Err(e) => eprintln!(
            "{}",
            theme.paint(&format!("Could not save the note: {e}"), theme.error)
        ),
    }
}

fn print_status(engine: &ConversationEngine, settings: &SharedSettings, options: &SessionOptions) {
    let config = settings.snapshot().provider.resolve();
    println!("Backend:    {}", config.backend.name());
    println!("Model:      {}", config.model);
    println!(
        "API key:    {}",
        if config.is_configured() { "set" } else { "missing" }
    );
    println!("Next style: {}", options.style.label());
    match engine.session() {
        Some(session) => {
            println!("Session:    {} ({:?})", session.style().label(), session.state());
            println!("Messages:   {}", session.len());
        }
        None => println!("Session:    none"),
    }
}

// ── Interactive loop ────────────────────────────────────────────────────

pub async fn run_interactive(
    settings: SharedSettings,
    vault: Arc<FsVault>,
    mut options: SessionOptions,
) -> Result<()> {
    let mut engine = build_engine(&settings)?;
    let theme = options.theme.clone();

    println!(
        "{}",
        theme.paint("Introspector. Type /help for commands, /exit to leave.", theme.muted)
    );
    open_session(&mut engine, &vault, &options).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", theme.paint(">", theme.user));
        let _ = io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match handle_command(&line) {
            CommandResult::NotACommand => {}
            CommandResult::Quit => break,
            CommandResult::Message(msg) => {
                println!("{msg}");
                continue;
            }
            CommandResult::NewSession => {
                open_session(&mut engine, &vault, &options).await;
                continue;
            }
            CommandResult::Finish => {
                finish_session(&mut engine, &vault, &theme).await;
                continue;
            }
            CommandResult::ShowStatus => {
                print_status(&engine, &settings, &options);
                continue;
            }
            CommandResult::StyleChanged(style) => {
                options.style = style;
                println!("Style set to {}. Use /new to start a session with it.", style.label());
                continue;
            }
            CommandResult::BackendChanged(backend) => {
                settings.update(|s| s.provider.backend = backend);
                println!("Backend set to {}.", backend.name());
                continue;
            }
            CommandResult::ModelChanged(model) => {
                settings.update(|s| s.provider.set_model(model.clone()));
                println!("Model set to {model}.");
                continue;
            }
        }

        // Resolve the turn before touching the engine again.
        let outcome = match engine.advance(&line).await {
            Ok(Advance::Ignored) => continue,
            Ok(Advance::Reply(turn)) => print_turn(turn, &theme, theme.assistant)
                .await
                .map(|_| false),
            Ok(Advance::Finalize) => Ok(true),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => finish_session(&mut engine, &vault, &theme).await,
            Ok(false) => {
                let signalled = engine
                    .session()
                    .is_some_and(|session| session.resolution_signalled());
                if signalled {
                    println!(
                        "{}",
                        theme.paint("Ready to capture? Type aha or /done.", theme.muted)
                    );
                }
            }
            Err(IntrospectError::SessionFinished) => println!(
                "{}",
                theme.paint("This session is captured. Use /new to start another.", theme.muted)
            ),
            Err(IntrospectError::NoActiveSession) => println!(
                "{}",
                theme.paint("No session is open. Use /new to start one.", theme.muted)
            ),
            Err(e) => eprintln!("{}", theme.paint(&format!("Error: {e}"), theme.error)),
        }
    }

    Ok(())
}

// ── Single-prompt mode ──────────────────────────────────────────────────

/// Open a session, send one message, print the reply and exit.
pub async fn run_single_prompt(
    settings: SharedSettings,
    vault: Arc<FsVault>,
    options: SessionOptions,
    prompt: &str,
) -> Result<()> {
    let mut engine = build_engine(&settings)?;
    let context = load_context(&vault, &options).await;

    let opening = engine.begin(options.style, context).await?;
    print_turn(opening, &options.theme, options.theme.opening).await?;
    println!();

    let finalize = match engine.advance(prompt).await? {
        Advance::Reply(turn) => {
            print_turn(turn, &options.theme, options.theme.assistant).await?;
            false
        }
        Advance::Finalize => true,
        Advance::Ignored => false,
    };
    if finalize {
        finish_session(&mut engine, &vault, &options.theme).await;
    }
    Ok(())
}
