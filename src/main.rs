// Bucket Relay - CLI Entry Point

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use bucket_relay::models::config::default_notify_title;
use bucket_relay::services::{DesktopNotifier, NoopNotifier, Notifier, NotifyWatchSource};
use bucket_relay::utils::init_logging;
use bucket_relay::{Relay, RelayConfig};

/// Mirror source files to destinations and relay newer destination edits back
#[derive(Debug, Parser)]
#[command(name = "bucket-relay", version, about)]
struct Cli {
    /// JSON array of entries, e.g. '[{"src":"a.txt","dst":"b.txt"}]'
    entries: String,

    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,

    /// Title used for desktop notifications
    #[arg(long, default_value_t = default_notify_title())]
    notify_title: String,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    exit_code(run(cli).await)
}

/// Log a fatal error once and map it to a failing exit status
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RelayConfig::from_json(&cli.entries)
        .context("failed to parse entries")?
        .with_notify(!cli.no_notify)
        .with_notify_title(cli.notify_title);

    let notifier: Arc<dyn Notifier> = if config.notify {
        Arc::new(DesktopNotifier::new(config.notify_title.clone()))
    } else {
        Arc::new(NoopNotifier)
    };

    let (watcher, channels) = NotifyWatchSource::new().context("failed to initialize")?;
    let mut relay = Relay::new(watcher, channels, notifier);
    relay
        .register(&config.entries)
        .context("failed to initialize")?;

    relay.run().await.context("failed to run")
}
