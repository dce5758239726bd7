mod config;
mod registry;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{default_config_path, AppConfig};
use debridcast::{clean_title, CastDispatcher, CastOutcome, DeviceProtocol, MediaReference};
use debridcast_core::mime_for;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "debridcast",
    version,
    about = "Cast direct media links to DLNA renderers and media centers"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play (or queue) a media URL on a receiver
    Cast {
        url: String,
        /// Device id or name; defaults to the default device
        #[arg(short, long)]
        device: Option<String>,
        /// Release filename used for the title, when the URL does not carry it
        #[arg(long)]
        filename: Option<String>,
        #[arg(long)]
        size: Option<u64>,
    },
    /// Manage registered receivers
    Devices {
        #[command(subcommand)]
        action: DevicesCommand,
    },
    /// Preview the title and MIME type sent for a filename
    Title { filename: String },
}

#[derive(Subcommand)]
enum DevicesCommand {
    List,
    Add {
        name: String,
        address: String,
        #[arg(long, default_value = "dlna")]
        protocol: DeviceProtocol,
        /// JSON-RPC port for media centers
        #[arg(long)]
        port: Option<u16>,
    },
    Remove { id: String },
    Default { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn,debridcast=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    tracing::debug!("Config path: {}", config_path.display());

    match cli.command {
        Command::Cast {
            url,
            device,
            filename,
            size,
        } => {
            let config = AppConfig::load(&config_path)?;
            let target = config.resolve(device.as_deref())?;

            let mut media = MediaReference::new(url, filename.unwrap_or_default());
            media.size_bytes = size;

            let dispatcher = CastDispatcher::new(config.cast.clone())?;
            match dispatcher.cast(target, &media).await {
                CastOutcome::Success { queued: true, .. } => println!("Queued on {}", target.name),
                CastOutcome::Success { warning, .. } => {
                    println!("Playing on {}", target.name);
                    if let Some(warning) = warning {
                        eprintln!("warning: {}", warning);
                    }
                }
                CastOutcome::Failure { reason } => {
                    eprintln!("Cast failed: {}", reason);
                    std::process::exit(1);
                }
            }
        }
        Command::Devices { action } => run_devices(action, &config_path)?,
        Command::Title { filename } => {
            let extension = Path::new(&filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            println!("{}", clean_title(&filename));
            println!("{}", mime_for(extension));
        }
    }

    Ok(())
}

fn run_devices(action: DevicesCommand, config_path: &Path) -> Result<()> {
    let mut config = AppConfig::load(config_path)?;

    match action {
        DevicesCommand::List => {
            if config.list().is_empty() {
                println!("No devices configured");
            }
            for device in config.list() {
                let marker = if config.default_device.as_deref() == Some(device.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let endpoint = match device.protocol {
                    DeviceProtocol::MediaCenter => format!("{}:{}", device.address, device.port),
                    DeviceProtocol::Dlna => device.address.clone(),
                };
                println!(
                    "{} {}  {}  {}  {}",
                    marker, device.id, device.name, device.protocol, endpoint
                );
            }
            return Ok(());
        }
        DevicesCommand::Add {
            name,
            address,
            protocol,
            port,
        } => {
            let device = config.add(&name, &address, protocol, port)?;
            println!("Added {} ({})", device.name, device.id);
        }
        DevicesCommand::Remove { id } => {
            let device = config.remove(&id)?;
            println!("Removed {}", device.name);
        }
        DevicesCommand::Default { id } => {
            config.set_default(&id)?;
            println!("Default device set to {}", id);
        }
    }

    config.save(config_path)
}
