use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use warden_core::tasks::spawn_history_prune_task;

mod context;
mod transport;

use context::ServerContext;
use transport::{parse_event, JsonLinesExecutor};

#[derive(Parser, Debug, Clone)]
#[command(name = "warden")]
#[command(author, version, about = "Warden - two-stage group chat moderator")]
pub struct Args {
    /// Path to a JSON moderation config. Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Postgres connection URL. Falls back to DATABASE_URL; without either,
    /// all stores are kept in memory.
    #[arg(long)]
    pub db_url: Option<String>,

    /// Model name passed to the capability provider.
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Read from OPENROUTER_KEY, never from the command line.
    #[arg(skip)]
    pub api_key: Option<String>,
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("warden=info".parse()?);
    let sub = fmt().with_env_filter(filter).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;

    let mut args = Args::parse();
    if args.db_url.is_none() {
        args.db_url = std::env::var("DATABASE_URL").ok();
    }
    args.api_key = std::env::var("OPENROUTER_KEY").ok();

    info!(
        config = ?args.config,
        postgres = args.db_url.is_some(),
        "Warden starting"
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    let executor = Arc::new(JsonLinesExecutor::new(tokio::io::stdout()));
    let ctx = ServerContext::new(&args, executor).await?;

    let prune_handle = spawn_history_prune_task(
        ctx.history.clone(),
        ctx.config.history.prune_interval(),
        ctx.config.history.keep_count,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Input closed; waiting for {} in-flight message(s)", in_flight.len());
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read input: {:?}", e);
                        break;
                    }
                };
                let event = match parse_event(&line) {
                    Ok(Some(event)) => event,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("Skipping input line: {}", e);
                        continue;
                    }
                };
                let service = ctx.message_service.clone();
                in_flight.spawn(async move {
                    service.handle_event(event).await;
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    error!("Message task panicked: {:?}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C detected; dropping {} in-flight message(s)", in_flight.len());
                in_flight.abort_all();
                break;
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                error!("Message task panicked: {:?}", e);
            }
        }
    }

    debug!("Stopping history prune task");
    prune_handle.abort();
    Ok(())
}
