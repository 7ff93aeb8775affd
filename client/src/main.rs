use clap::Parser;
use client::config::ClientConfig;
use client::input::WanderInput;
use client::network::Client;
use log::info;
use shared::{GameMode, PlayerClass};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Display name (trimmed to 12 characters by the server)
    #[arg(short = 'n', long, default_value = "Agent")]
    name: String,

    /// Player color as a hex string
    #[arg(short = 'c', long, default_value = "#3498db")]
    color: String,

    /// Class tag: square, tank, triangle or scout
    #[arg(long, default_value = "square")]
    class: String,

    /// Arena to join: normal or rescue
    #[arg(short = 'm', long, default_value = "normal")]
    mode: String,

    /// Seconds to play before leaving; runs until disconnected if omitted
    #[arg(short = 'd', long)]
    duration: Option<u64>,

    /// Seed for the wander bot's input
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig {
            server_addr: args.server,
            fake_ping_ms: args.fake_ping,
            name: args.name,
            color: args.color,
            class: PlayerClass::from_tag(&args.class),
            mode: GameMode::from_tag(&args.mode),
            run_for: args.duration.map(Duration::from_secs),
            seed: args.seed,
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ClientConfig::from(Args::parse());

    info!("Starting client...");
    info!("Connecting to: {}", config.server_addr);
    if config.fake_ping_ms > 0 {
        info!("Simulating {}ms latency", config.fake_ping_ms);
    }

    let input = Box::new(WanderInput::new(config.seed));
    let mut client = Client::new(config, input).await?;

    tokio::select! {
        result = client.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, leaving");
        }
    }

    Ok(())
}
