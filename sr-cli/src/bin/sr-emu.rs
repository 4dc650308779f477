//! Selective Repeat simulator
//!
//! Runs a sender and receiver over an emulated lossy, corrupting link and
//! prints the resulting statistics.

use clap::Parser;
use sr::sim::Simulation;
use sr_cli::{display_report, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sr-emu")]
#[command(about = "Selective Repeat ARQ simulator", long_about = None)]
struct Args {
    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of messages to simulate
    #[arg(short = 'n', long)]
    messages: Option<u64>,

    /// Packet loss probability [0.0 for no loss]
    #[arg(short, long)]
    loss: Option<f64>,

    /// Packet corruption probability [0.0 for no corruption]
    #[arg(short = 'x', long)]
    corrupt: Option<f64>,

    /// Average time between messages from the sender's application layer
    #[arg(long)]
    lambda: Option<f64>,

    /// Let packets overtake each other on the link
    #[arg(long)]
    reorder: bool,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Window size
    #[arg(short, long)]
    window: Option<u32>,

    /// Sequence number space
    #[arg(long)]
    max_seq: Option<u32>,

    /// Retransmission timeout in time units
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Trace level (0 = warn, 1 = info, 2 = debug, 3 = trace)
    #[arg(long, default_value = "0")]
    trace: u8,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(messages) = self.messages {
            config.network.messages = messages;
        }
        if let Some(loss) = self.loss {
            config.network.loss = loss;
        }
        if let Some(corrupt) = self.corrupt {
            config.network.corrupt = corrupt;
        }
        if let Some(lambda) = self.lambda {
            config.network.lambda = lambda;
        }
        if self.reorder {
            config.network.reorder = true;
        }
        if let Some(seed) = self.seed {
            config.network.seed = seed;
        }
        if let Some(window) = self.window {
            config.protocol.window_size = window;
        }
        if let Some(max_seq) = self.max_seq {
            config.protocol.max_seq = max_seq;
        }
        if let Some(timeout) = self.timeout {
            config.protocol.timeout_ms = timeout;
        }
    }
}

fn trace_filter(level: u8) -> &'static str {
    match level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(trace_filter(args.trace)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    println!("Selective Repeat simulator");
    println!("  Messages:      {}", config.network.messages);
    println!("  Loss:          {}", config.network.loss);
    println!("  Corruption:    {}", config.network.corrupt);
    println!("  Mean interval: {} units", config.network.lambda);
    println!("  Reorder:       {}", config.network.reorder);
    println!(
        "  Window:        {} (sequence space {}, timeout {} units)",
        config.protocol.window_size, config.protocol.max_seq, config.protocol.timeout_ms
    );

    let report = Simulation::new(&config.protocol, config.network.clone())?.run();
    display_report(&report);

    if !report.admitted.starts_with(&report.delivered) {
        anyhow::bail!(
            "delivery mismatch: {} admitted, {} delivered",
            report.admitted.len(),
            report.delivered.len()
        );
    }
    if !report.completed {
        tracing::warn!("simulation stopped before all messages were acknowledged");
    }

    Ok(())
}
