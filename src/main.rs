use anyhow::Result;
use clap::{Parser, Subcommand};
use gemma_vision_chat::ai::{GeminiClient, GenerativeModel};
use gemma_vision_chat::interactive;
use gemma_vision_chat::models::Config;
use gemma_vision_chat::server::{self, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemma-vision-chat")]
#[command(about = "Ask a hosted Gemini model about text and images")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the chat page and the JSON `/chat` endpoint.
    Serve {
        /// Address to bind (overrides HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT).
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Prompt for text and an image path in the terminal.
    Ask,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemma_vision_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Using model {}", config.model);
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(
        config.google_api_key.clone(),
        config.model.clone(),
    ));

    let outcome = match args.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.host);
            let port = port.unwrap_or(config.port);
            server::serve(AppState::new(model), &host, port).await
        }
        Command::Ask => interactive::run(model).await,
    };

    if let Err(e) = outcome {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
