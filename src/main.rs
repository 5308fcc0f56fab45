use anyhow::Result;
use clap::{Parser, Subcommand};
use imagen_studio::ai::{GeminiChatClient, ImagenClient};
use imagen_studio::batch::BatchGenerator;
use imagen_studio::console;
use imagen_studio::models::Config;
use imagen_studio::session::SessionStore;
use imagen_studio::translate::GoogleTranslateClient;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "imagen-studio")]
#[command(about = "Gemini chat and batch Imagen generation from the terminal")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive single-turn chat against the Gemini text model.
    Chat,
    /// Interactive batch image generation with per-session output.
    Generate {
        /// Identifier for the session output directory; defaults to the
        /// current unix timestamp.
        #[arg(long)]
        session_id: Option<String>,
        /// Base directory for session output.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagen_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Reuse one HTTP connection pool across service clients.
    let http_client = reqwest::Client::new();

    let outcome = match args.command {
        Command::Chat => run_chat(&config, http_client).await,
        Command::Generate {
            session_id,
            output_dir,
        } => run_generate(&config, http_client, session_id, output_dir).await,
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run_chat(config: &Config, http_client: reqwest::Client) -> Result<()> {
    let chat = GeminiChatClient::new_with_client(
        config.gemini_api_key.clone(),
        config.chat_model.clone(),
        http_client,
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    console::run_chat(&chat, &mut input, &mut out).await?;

    Ok(())
}

async fn run_generate(
    config: &Config,
    http_client: reqwest::Client,
    session_id: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let request = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        console::read_batch_request(&mut input, &mut out)?
    };

    let Some(request) = request else {
        return Ok(());
    };

    let translator = GoogleTranslateClient::new_with_client(
        config.source_lang.clone(),
        config.target_lang.clone(),
        http_client.clone(),
    );
    let image_gen = ImagenClient::new_with_client(
        config.gemini_api_key.clone(),
        config.image_model.clone(),
        http_client,
    );

    let base_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let store = SessionStore::create(&base_dir, session_id)?;
    let generator = BatchGenerator::new(Box::new(translator), Box::new(image_gen), store);

    info!(
        "Generating {} image(s) for each of {} prompt(s) into {}",
        request.images_per_prompt,
        request.prompts.len(),
        generator.store().session_dir().display()
    );

    tokio::select! {
        result = generator.run(&request.prompts, request.images_per_prompt) => {
            let summary = result?;
            info!(
                "Run {} finished: {}/{} prompts succeeded, {} image(s) written",
                summary.session_id,
                summary.summary.successful_prompts,
                summary.summary.total_prompts,
                summary.summary.total_images
            );
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            // Images already on disk stay; no summary is written for a
            // cancelled run.
            error!("Run cancelled; partial output kept, no summary written");
            std::process::exit(130);
        }
    }
}
