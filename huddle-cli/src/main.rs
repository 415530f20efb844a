use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use huddle_server::{AppState, HostPolicy, RoomPolicy, TransportConfig, router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", about = "WebRTC signaling and room coordination server")]
struct Args {
    #[arg(long, env = "HUDDLE_ADDR", default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// Seconds an empty room is kept before the sweeper removes it.
    #[arg(long, env = "HUDDLE_IDLE_TIMEOUT_SECS", default_value_t = 600)]
    idle_timeout_secs: u64,

    #[arg(long, env = "HUDDLE_SWEEP_INTERVAL_SECS", default_value_t = 30)]
    sweep_interval_secs: u64,

    /// What happens when the host leaves: `promote` or `hostless`.
    #[arg(long, env = "HUDDLE_HOST_POLICY", default_value_t = HostPolicy::PromoteLongestTenured)]
    host_policy: HostPolicy,

    /// Allow more than one host-role participant per room.
    #[arg(long, env = "HUDDLE_CO_HOSTS")]
    co_hosts: bool,

    #[arg(long, env = "HUDDLE_QUEUE_CAPACITY", default_value_t = 256)]
    queue_capacity: usize,

    #[arg(long, env = "HUDDLE_HEARTBEAT_SECS", default_value_t = 15)]
    heartbeat_secs: u64,

    #[arg(long, env = "HUDDLE_MISSED_HEARTBEATS", default_value_t = 2)]
    missed_heartbeats: u32,

    /// Tracing filter; falls back to RUST_LOG, then `info`.
    #[arg(long, env = "HUDDLE_LOG")]
    log: Option<String>,
}

impl Args {
    fn room_policy(&self) -> RoomPolicy {
        RoomPolicy {
            host_reassignment: self.host_policy,
            allow_co_hosts: self.co_hosts,
        }
    }

    fn transport(&self) -> TransportConfig {
        TransportConfig {
            queue_capacity: self.queue_capacity,
            heartbeat_interval: Duration::from_secs(self.heartbeat_secs.max(1)),
            missed_heartbeats: self.missed_heartbeats,
        }
    }
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).context("Invalid --log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let state = Arc::new(AppState::new(args.transport(), args.room_policy()));
    let sweeper = state.coordinator.spawn_sweeper(
        Duration::from_secs(args.idle_timeout_secs),
        Duration::from_secs(args.sweep_interval_secs.max(1)),
    );

    let listener = TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;

    println!("{}", "🚀 Huddle signaling server".green().bold());
    println!("   📡 WebSocket: ws://{}/ws", args.addr);
    println!("   🩺 Health:    http://{}/health", args.addr);
    println!(
        "   {} host policy: {}, co-hosts: {}",
        "⚙".cyan(),
        args.host_policy,
        args.co_hosts
    );
    info!("Listening on {}", args.addr);

    axum::serve(listener, router(state))
        .await
        .context("Server terminated unexpectedly")?;

    sweeper.abort();
    Ok(())
}
