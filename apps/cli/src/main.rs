mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use planet_core::config::UpdateConfig;
use planet_core::payload::{FirmwareImage, LampType};
use planet_core::session::spawn_update;
use tracing::{error, info};

use progress::ConsoleRenderer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LampArg {
    Pro,
    Compact,
}

impl From<LampArg> for LampType {
    fn from(arg: LampArg) -> Self {
        match arg {
            LampArg::Pro => LampType::Pro,
            LampArg::Compact => LampType::Compact,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Planet Updater - easily update your Elos Planet lamps", long_about = None)]
struct Args {
    /// Choose lamp type
    #[arg(long = "type", value_enum, value_name = "pro|compact")]
    lamp_type: Option<LampArg>,

    /// Firmware file to flash instead of the stock asset
    #[arg(long)]
    firmware: Option<PathBuf>,

    /// Directory holding the stock firmware assets
    #[arg(long)]
    firmware_dir: Option<PathBuf>,

    /// Give up on a silent lamp after this many seconds
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<u64>,

    /// Give up connecting after this many seconds
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// Load settings from a TOML file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debugging messages
    #[arg(short, long)]
    debug: bool,

    /// The WiFish address
    destination: String,

    /// The WiFish IP port number
    port: u16,
}

impl Args {
    fn into_config(self) -> Result<UpdateConfig> {
        let mut config = match &self.config {
            Some(path) => UpdateConfig::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => UpdateConfig::default(),
        };

        config.destination = self.destination;
        config.port = self.port;
        if let Some(lamp) = self.lamp_type {
            config.lamp_type = Some(lamp.into());
        }
        if let Some(path) = self.firmware {
            config.firmware_path = Some(path);
        }
        if let Some(dir) = self.firmware_dir {
            config.firmware_dir = dir;
        }
        if self.read_timeout.is_some() {
            config.read_timeout_secs = self.read_timeout;
        }
        if self.connect_timeout.is_some() {
            config.connect_timeout_secs = self.connect_timeout;
        }
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.debug {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(version = env!("CARGO_PKG_VERSION"), "Planet Updater starting");

    if let Err(e) = run(args) {
        error!("Couldn't complete update: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;

    let Some(source) = config.firmware_source() else {
        bail!("no firmware selected: pass --type or --firmware");
    };
    let image = FirmwareImage::load(&source)?;
    info!(
        firmware = %source.display(),
        size = image.len(),
        packets = image.packet_count(),
        "Firmware selected"
    );

    let mut renderer = ConsoleRenderer::new(config.destination.clone());
    let handle = spawn_update(config, image.raw_data().to_vec());
    for event in handle.events() {
        renderer.render(&event);
    }
    drop(renderer);

    handle.wait()?;
    Ok(())
}
