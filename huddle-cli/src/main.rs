use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use huddle_core::{
    CallConfig, CallSession, CallSnapshot, LoopbackHub, NegotiationState, ParticipantId,
    SessionCommand, SessionHandle,
};
use huddle_native::{NativeConfig, NativePlatform};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", about = "Multi-party WebRTC call signaling tools")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs a full-mesh call between native parties in this process.
    Loopback {
        #[arg(short, long, default_value_t = 2)]
        participants: usize,

        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,

        /// JSON call configuration applied to every party.
        #[arg(long)]
        config: Option<String>,

        /// Skip STUN and use host candidates only.
        #[arg(long)]
        host_only: bool,

        /// Send placeholder media so remote tracks arrive.
        #[arg(long)]
        pump: bool,
    },
    /// Validates a JSON call configuration.
    CheckConfig { file: String },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(path: &Path) -> Result<CallConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    CallConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn state_label(state: Option<NegotiationState>) -> ColoredString {
    match state {
        Some(NegotiationState::Connected) => "connected".green().bold(),
        Some(NegotiationState::Negotiating) => "negotiating".yellow(),
        Some(NegotiationState::New) => "new".normal(),
        Some(NegotiationState::Closed) => "closed".red(),
        None => "no connection".dimmed(),
    }
}

fn print_report(id: &ParticipantId, snapshot: &CallSnapshot) {
    println!("  {} (local media: {})", id.as_str().cyan().bold(), snapshot.local_media);
    for entry in &snapshot.participants {
        let role = entry
            .role
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_else(|| "-".to_owned());
        println!(
            "    -> {:<12} {:<10} {} (pending candidates: {})",
            entry.id.as_str(),
            role,
            state_label(entry.state),
            entry.pending_candidates
        );
    }
}

async fn all_connected(parties: &[(ParticipantId, SessionHandle)], expected: usize) -> bool {
    for (_, handle) in parties {
        match handle.snapshot().await {
            Ok(s) if s.participants.len() == expected && s.all_connected() => {}
            _ => return false,
        }
    }
    true
}

async fn run_loopback(
    participants: usize,
    timeout: Duration,
    config: CallConfig,
    native: NativeConfig,
) -> Result<bool> {
    let hub = LoopbackHub::new();
    let mut parties = Vec::with_capacity(participants);

    for n in 1..=participants {
        let id = ParticipantId::from(format!("party-{n}"));
        let platform = NativePlatform::new(native.clone())?;
        let party_config = CallConfig {
            local_participant: Some(id.clone()),
            ..config.clone()
        };
        let (session, handle) =
            CallSession::new(platform, hub.relay_for(id.clone()), party_config)?;
        tokio::task::spawn_local(session.run());
        handle.send(SessionCommand::JoinCall)?;
        hub.join(id.clone(), handle.clone())?;
        parties.push((id, handle));
    }

    info!("Waiting up to {:?} for {} parties", timeout, participants);
    let start = Instant::now();
    let mut connected = false;
    while start.elapsed() < timeout {
        if all_connected(&parties, participants - 1).await {
            connected = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!("{}", "Call state:".bold());
    for (id, handle) in &parties {
        let snapshot = handle.snapshot().await?;
        print_report(id, &snapshot);
    }
    for (_, handle) in &parties {
        handle.shutdown();
    }
    Ok(connected)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Loopback {
            participants,
            timeout_secs,
            config,
            host_only,
            pump,
        } => {
            if participants < 2 {
                bail!("A call needs at least 2 participants");
            }

            let call_config = match config {
                Some(path) => load_config(Path::new(&path))?,
                None => CallConfig::default(),
            };
            let native = NativeConfig {
                host_only,
                pump_samples: pump,
                ..Default::default()
            };

            println!(
                "{}",
                format!("Starting loopback call with {participants} parties...")
                    .green()
                    .bold()
            );
            let local = tokio::task::LocalSet::new();
            let connected = local
                .run_until(run_loopback(
                    participants,
                    Duration::from_secs(timeout_secs),
                    call_config,
                    native,
                ))
                .await?;

            if !connected {
                bail!("Not every pair connected within {timeout_secs}s");
            }
            println!("{}", "All pairs connected.".green().bold());
        }
        Commands::CheckConfig { file } => {
            let config = load_config(Path::new(&file))?;
            let servers = config.resolved_ice_servers();
            println!("{} {}", "Valid:".green().bold(), file);
            println!("   ICE servers: {}", servers.len());
            for server in &servers {
                println!("     {}", server.urls.join(", "));
            }
            println!("   Early candidates: {:?}", config.early_candidates);
            println!("   Max pending candidates: {}", config.max_pending_candidates);
            println!("   Close on unregister: {}", config.close_on_unregister);
        }
    }

    Ok(())
}
