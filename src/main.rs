//! stop-herald: Stop hook binary.
//!
//! Reads the session event JSON from stdin. Always exits 0.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use stop_herald::{Config, Environment, Hook};

#[derive(Parser, Debug)]
#[command(name = "stop-herald", about = "Session-end logging and spoken completion hook")]
struct Args {
    /// Also copy the transcript to <log_dir>/chat.json
    #[arg(long)]
    chat: bool,

    /// Path to config YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };

    // stdout belongs to the host; logs go to stderr. RUST_LOG wins if set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug,hyper_util=info,reqwest=info,rustls=info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        warn!("Failed to read stdin: {e}");
        return;
    }

    let env = Environment::capture();
    let config = Config::load(args.config.as_deref());
    let hook = Hook::new(config, env);

    // A panic anywhere in the run still ends in a clean exit.
    let run = tokio::spawn(async move { hook.run(&input, args.chat).await });
    if let Err(e) = run.await {
        warn!("Hook run aborted: {e}");
    }
}
