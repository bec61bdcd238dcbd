//! ttl-session binary entry point.

use std::sync::Arc;

use tracing::info;
use ttl_session::api::{serve, AppState};
use ttl_session::cli::{self, Args};
use ttl_session::config::Config;
use ttl_session::{logging, SessionStore, Sweeper};

#[tokio::main]
async fn main() -> ttl_session::Result<()> {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'ttl-session --help' for more information.");
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return Ok(());
    }
    if args.version {
        cli::print_version();
        return Ok(());
    }

    run(args).await
}

async fn run(args: Args) -> ttl_session::Result<()> {
    let config = Config::load(&args)?;

    logging::init_with_filter(config.log_filter()).ok();
    info!("ttl-session v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(SessionStore::new(config.store_config()?)?);
    info!(
        ttl_secs = store.ttl().as_secs(),
        sweep_interval_secs = store.sweep_interval().as_secs(),
        "Session store initialized"
    );

    let sweeper = Sweeper::spawn(Arc::clone(&store));
    let state = AppState::with_store(Arc::clone(&store), config.transport()?);

    let result = serve(config.to_server_config()?, state).await;

    sweeper.stop().await;
    info!(dropped = store.clear(), "Session store closed");

    result
}
