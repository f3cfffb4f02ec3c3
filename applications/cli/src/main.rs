use anyhow::Context;
use aria_cli::config::AppConfig;
use aria_cli::player::{self, PlayerOptions};
use aria_core::{PlaybackSource, TrackCatalog};
use aria_playback::{ChannelOutput, FileStore, PlaybackController, PlayerSession};
use aria_server_client::AriaServerClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Aria Player - headless playback host", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    server: Option<String>,

    /// User whose liked songs are used (overrides config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Where the playback state is saved (overrides config)
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tracks of a source
    Tracks {
        #[arg(short, long, default_value = "all")]
        source: PlaybackSource,
    },

    /// Start an interactive player
    Play {
        /// Source to play from (default: the saved one)
        #[arg(short, long)]
        source: Option<PlaybackSource>,

        /// Start with shuffle on
        #[arg(long)]
        shuffle: bool,

        /// Play-time multiplier of the simulated output
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout belongs to the player
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "aria=info,aria_cli=info,aria_playback=info,aria_server_client=info".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.server {
        config.server.url = url;
    }
    if let Some(user) = cli.user {
        config.server.user_id = Some(user);
    }
    if let Some(path) = cli.state_file {
        config.storage.state_file = path;
    }

    tracing::info!(server = %config.server.url, "Starting Aria Player");

    let client = AriaServerClient::new(config.server.client_config())
        .context("Invalid server configuration")?;

    match cli.command {
        Commands::Tracks { source } => {
            let tracks = client
                .fetch_tracks(source)
                .await
                .with_context(|| format!("Failed to fetch {source} tracks"))?;
            player::print_tracks(&tracks, None);
        }
        Commands::Play {
            source,
            shuffle,
            speed,
        } => {
            let (output, commands) = ChannelOutput::new();
            let controller = PlaybackController::new(output, config.player.clone());
            let store = FileStore::new(config.storage.state_file.clone());
            let session = PlayerSession::new(controller, Arc::new(client), store);

            player::run(
                session,
                commands,
                PlayerOptions {
                    source,
                    shuffle,
                    speed,
                },
            )
            .await?;
        }
    }

    Ok(())
}
