// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GCN notice relay CLI
//!
//! # Usage
//!
//! ```bash
//! # Forward the default feed to one listener
//! gcn-relay --forward 10.0.0.5:5348
//!
//! # Custom group, give up on read-back after 10 seconds
//! gcn-relay --group-address 239.1.2.3 --forward host:5348 --ack-timeout 10
//!
//! # Send a test alert, or an IMALIVE, to a listener
//! gcn-relay send --to host:5348 --ra 10:00:00 --dec -20:30:00 --error 3
//! gcn-relay send --to host:5348 --imalive
//! ```

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gcn::time::parse_timestamp;
use gcn::{Dec, Position, Ra};
use gcn_relay::{
    send_notice, ConfigError, Destination, Relay, RelayConfig, TcpConnector, TestAlert,
};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GCN notice relay
#[derive(Parser, Debug)]
#[command(name = "gcn-relay")]
#[command(about = "GCN notice relay - forward raw notices to TCP listeners")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Destination as host:port (repeatable)
    #[arg(short, long = "forward", value_name = "HOST:PORT")]
    forward: Vec<Destination>,

    /// Multicast group address
    #[arg(long)]
    group_address: Option<Ipv4Addr>,

    /// Multicast port
    #[arg(long)]
    multicast_port: Option<u16>,

    /// Interface to join the multicast group on
    #[arg(long)]
    interface: Option<Ipv4Addr>,

    /// Packets queued per destination
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Read-back timeout in seconds
    #[arg(long)]
    ack_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "relay.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Send one SWIFT BAT test alert (or an IMALIVE) to a listener
    Send {
        /// Listener as host:port
        #[arg(long, value_name = "HOST:PORT")]
        to: Destination,

        /// Send an IMALIVE instead of an alert
        #[arg(long)]
        imalive: bool,

        /// Right ascension (HH:MM:SS.ss)
        #[arg(long, allow_hyphen_values = true, required_unless_present = "imalive")]
        ra: Option<Ra>,

        /// Declination ([+|-]DD:MM:SS.ss)
        #[arg(long, allow_hyphen_values = true, required_unless_present = "imalive")]
        dec: Option<Dec>,

        /// Error radius in arc-minutes
        #[arg(long, default_value_t = 3.0)]
        error: f64,

        /// Burst time (yyyy-MM-ddTHH:mm:ss), defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        date: Option<DateTime<Utc>>,

        /// Trigger number
        #[arg(long, default_value_t = 1)]
        trigger_number: u32,

        /// Message sequence number
        #[arg(long, default_value_t = 0)]
        sequence_number: u32,

        /// Read-back timeout in seconds, 0 waits forever
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
            Commands::Send {
                to,
                imalive,
                ra,
                dec,
                error,
                date,
                trigger_number,
                sequence_number,
                timeout,
            } => {
                let now = Utc::now();
                let packet = match (imalive, ra, dec) {
                    (false, Some(ra), Some(dec)) => {
                        let mut alert = TestAlert::new(Position { ra, dec }, date.unwrap_or(now));
                        alert.error_arcmin = error;
                        alert.trigger_number = trigger_number;
                        alert.sequence_number = sequence_number;
                        alert.packet(1, &now)
                    }
                    _ => gcn_relay::imalive(1, &now),
                };
                let timeout = (timeout > 0).then(|| Duration::from_secs(timeout));
                send_notice(&TcpConnector, &to, &packet, timeout).await?;
                Ok(())
            }
        };
    }

    let config = build_config(&args)?;

    info!("+----------------------------------------------------+");
    info!(
        "|       GCN Notice Relay v{}                      |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!(
        "|  Feed:     {:38} |",
        format!("{}:{}", config.multicast_group, config.multicast_port)
    );
    for dest in &config.destinations {
        info!("|  Forward:  {:38} |", dest.to_string());
    }
    info!("|  Queue:    {:38} |", config.queue_capacity);
    info!("+----------------------------------------------------+");

    let relay = Relay::new(config);

    let shutdown = relay.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping relay...");
        shutdown.trigger();
    });

    relay.run().await?;
    Ok(())
}

fn build_config(args: &Args) -> Result<RelayConfig, ConfigError> {
    let mut config = match args.config {
        Some(ref path) => {
            info!("Loading config from {:?}", path);
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    for dest in &args.forward {
        config.add_destination(dest.clone());
    }
    if let Some(group) = args.group_address {
        config.multicast_group = group;
    }
    if let Some(port) = args.multicast_port {
        config.multicast_port = port;
    }
    if let Some(interface) = args.interface {
        config.interface = interface;
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue_capacity = capacity;
    }
    if let Some(timeout) = args.ack_timeout {
        config.ack_timeout_secs = Some(timeout);
    }
    config.log_level = args.log_level.clone();

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig {
        destinations: vec![
            Destination::new("10.0.0.5", 5348),
            Destination::new("relay.example.org", 5349),
        ],
        ack_timeout_secs: Some(30),
        ..Default::default()
    };

    let toml_str = toml::to_string_pretty(&config)?;

    let content = format!(
        r#"# GCN Notice Relay Configuration
# Generated by gcn-relay gen-config

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match RelayConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!(
                "Feed:         {}:{}",
                config.multicast_group, config.multicast_port
            );
            println!("Destinations: {}", config.destinations.len());
            for dest in &config.destinations {
                println!("  - {}", dest);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}
