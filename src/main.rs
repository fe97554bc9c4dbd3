use breezy_storage::config::StoreConfig;
use breezy_storage::errors::Result;
use breezy_storage::{log, server};

use clap::Parser;
use std::path::PathBuf;
// Allow the server to return its version with a --version flag
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
struct Opts {
    #[clap(short, long)]
    version: bool,
    #[clap(short, long)]
    debug: bool,
    #[clap(short, long)]
    port: Option<u16>,
    #[clap(short, long)]
    config: Option<PathBuf>,
}

async fn run(opts: Opts) -> Result<()> {
    let _guard = log::init_logging(opts.debug)?;
    let config = match &opts.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    tracing::info!(version = VERSION, port = ?opts.port, "starting Breezy storage server");
    let srv = server::get_server(opts.port, config)?;
    srv.start().await
}

#[tokio::main]
async fn main() {
    let opts: Opts = Opts::parse();
    if opts.version {
        println!("{}", VERSION);
        return;
    }
    if let Err(e) = run(opts).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
