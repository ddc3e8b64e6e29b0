//! snaptask: command-line front end for the suggestion engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snaptask::{Config, SuggestionEngine};

/// Suggest tasks from photos or text
#[derive(Parser)]
#[command(name = "snaptask")]
#[command(version = snaptask::PKG_VERSION)]
#[command(about = "Suggest task titles from photos or text")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest tasks for an image (path, file:// URI, http(s) URL, or data URL)
    Image {
        /// Image reference
        reference: String,
        /// Read inline base64 from this file instead of the reference
        #[arg(long)]
        base64_file: Option<PathBuf>,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a task for typed text (no network)
    Text {
        /// Task text
        text: String,
    },

    /// Show configuration and route without calling upstream
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Text { text } => {
            let engine = SuggestionEngine::from_config(config)?;
            let s = engine.suggest_from_text(&text);
            println!("{} [{}]", s.title, s.category);
        }

        Command::Check => {
            println!("context: {:?}", config.context);
            println!("token present: {}", config.has_credential());
            println!("endpoint: {}", config.inference.endpoint_url);
            println!(
                "relay: {}",
                config.relay.base_url.as_deref().unwrap_or("(not set)")
            );
            println!("vision model: {}", config.models.vision_model_id());

            let engine = SuggestionEngine::from_config(config)?;
            match engine.gateway().check_ready() {
                Ok(()) => println!("route {}: ready", engine.gateway().route()),
                Err(e) => println!("route {}: {e}", engine.gateway().route()),
            }
        }

        Command::Image {
            reference,
            base64_file,
            json,
        } => {
            let inline = match base64_file {
                Some(path) => Some(tokio::fs::read_to_string(path).await?),
                None => None,
            };

            let engine = SuggestionEngine::from_config(config)?;
            let outcome = engine
                .suggest_from_image(&reference, inline.as_deref())
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if outcome.is_empty() {
                println!("no suggestions");
                if let Some(reason) = &outcome.diagnostic {
                    println!("reason: {reason}");
                }
            } else {
                for s in &outcome.suggestions {
                    println!("{} [{}]", s.title, s.category);
                }
            }
        }
    }

    Ok(())
}
