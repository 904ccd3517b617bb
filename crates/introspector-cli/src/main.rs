use anyhow::Result;
use clap::Parser;
use introspector_cli::app::{self, SessionOptions};
use introspector_cli::{FsVault, Theme};
use introspector_core::{Backend, Settings, SharedSettings, Style};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "introspector")]
#[command(about = "Introspector - guided reflection that ends in a captured note")]
#[command(version)]
struct Cli {
    /// Send a single message after the opening and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Conversation style (socratic, warm, challenger)
    #[arg(short, long)]
    style: Option<Style>,

    /// Provider backend (direct, routed)
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Model id for the selected backend
    #[arg(short, long)]
    model: Option<String>,

    /// Notes directory used for context, link checks and saving
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Settings file to load instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not send recent notes as context
    #[arg(long)]
    no_context: bool,

    /// Color theme (dark, light, plain)
    #[arg(long, default_value = "dark")]
    theme: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(path)?,
        None => Settings::load(),
    };

    if let Some(backend) = cli.backend {
        settings.provider.backend = backend;
    }
    if let Some(ref model) = cli.model {
        settings.provider.set_model(model.clone());
    }
    if let Some(ref root) = cli.vault {
        settings.vault.root = root.clone();
    }

    let theme = if std::env::var_os("NO_COLOR").is_some() {
        Theme::plain()
    } else {
        Theme::by_name(&cli.theme)
    };
    let options = SessionOptions {
        style: cli.style.unwrap_or(settings.default_style),
        use_context: !cli.no_context,
        theme,
    };

    let vault = Arc::new(FsVault::from_settings(&settings.vault));
    let settings = SharedSettings::new(settings);

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(settings, vault, options, &prompt).await?;
    } else {
        app::run_interactive(settings, vault, options).await?;
    }

    Ok(())
}
