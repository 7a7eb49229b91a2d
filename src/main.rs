use clap::{Parser, Subcommand};
use graphdesk::replay::replay_file;
use graphdesk::{AssemblerConfig, ServerProfile};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Graph database client core tools
#[derive(Parser, Debug)]
#[command(name = "graphdesk")]
#[command(about = "Graph database client core tools", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a recorded graph event stream (JSON Lines) and print the snapshot
    Replay {
        /// Path to the events file
        events: PathBuf,

        /// Flush a partial snapshot every N events
        #[arg(long)]
        flush_every: Option<usize>,

        /// Ingestions an explanation link may wait for its referent
        #[arg(long, default_value_t = 1024)]
        max_link_retries: u64,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a server profile file is complete
    CheckProfile {
        /// Path to the profile JSON file
        profile: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting graphdesk v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Replay {
            events,
            flush_every,
            max_link_retries,
            pretty,
        } => {
            let config = AssemblerConfig { max_link_retries };
            let report = replay_file(&events, config, flush_every)?;
            for reason in &report.rejected {
                warn!("Rejected: {}", reason);
            }
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
        Command::CheckProfile { profile } => {
            let loaded = ServerProfile::load(&profile)?;
            loaded.validate()?;
            let target = loaded.connect_target()?;
            info!("Profile OK: {:?}", target);
            println!("{} profile for {} is valid", loaded.kind.display_name(), loaded.address);
        }
    }

    Ok(())
}
