//! `clauseease` command-line entry point: run the API server or analyse a
//! single contract from disk.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clause_types::SimplificationLevel;
use clauseease_api::{build_router, state::build_pipeline, AppState, Config};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "clauseease")]
#[command(about = "Contract clause analysis and plain-language simplification")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite connection string (overrides DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,

        /// Directory served at `/` (overrides STATIC_DIR)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Analyse one PDF, DOCX or TXT file and print the result as JSON
    Analyze {
        file: PathBuf,

        /// basic, intermediate or advanced
        #[arg(short, long, default_value = "basic")]
        level: SimplificationLevel,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let (log_level, crate_directive) = if cli.verbose {
        (Level::DEBUG, "clauseease_api=debug")
    } else {
        (Level::INFO, "clauseease_api=info")
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive(crate_directive.parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env()?;

    match cli.command {
        Command::Serve {
            port,
            database_url,
            static_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(url) = database_url {
                config.database_url = url;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            serve(config).await
        }
        Command::Analyze { file, level } => analyze(&config, file, level).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Initializing ClauseEase API...");
    let state = Arc::new(AppState::new(&config).await?);
    let app = build_router(state, config.static_dir.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting ClauseEase API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn analyze(config: &Config, file: PathBuf, level: SimplificationLevel) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let analysis = tokio::task::spawn_blocking(move || -> Result<_> {
        let extracted = clause_ingest::extract_file(&file)?;
        Ok(pipeline.run(&extracted.text, level)?)
    })
    .await??;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
