// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GCN alert daemon CLI
//!
//! # Usage
//!
//! ```bash
//! # All missions, default multicast group and control port
//! gcn-alertd --script ./alert.sh --all
//!
//! # SWIFT only, 5 arcminute error box, require point source
//! gcn-alertd --script ./alert.sh --swift --max-error-box 300 --swift-accept-mask 0x2
//!
//! # Log the command lines without starting anything
//! gcn-alertd --script ./alert.sh --all --dry-run
//! ```

use clap::{Parser, Subcommand};
use gcn::Mission;
use gcn_alertd::config::parse_mask;
use gcn_alertd::{AlertDaemon, AlertdConfig, ConfigError, DryRunLauncher, Launch, ScriptLauncher};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GCN alert daemon
#[derive(Parser, Debug)]
#[command(name = "gcn-alertd")]
#[command(about = "GCN alert daemon - start a script for incoming GRB notices")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script to start for each accepted alert
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Accept alerts from every mission
    #[arg(long)]
    all: bool,

    /// Accept HETE alerts
    #[arg(long)]
    hete: bool,

    /// Accept INTEGRAL alerts
    #[arg(long)]
    integral: bool,

    /// Accept SWIFT alerts
    #[arg(long)]
    swift: bool,

    /// Accept AGILE alerts
    #[arg(long)]
    agile: bool,

    /// Accept FERMI alerts
    #[arg(long)]
    fermi: bool,

    /// Multicast group address
    #[arg(long)]
    group_address: Option<Ipv4Addr>,

    /// Multicast port
    #[arg(long)]
    multicast_port: Option<u16>,

    /// Interface to join the multicast group on
    #[arg(long)]
    interface: Option<Ipv4Addr>,

    /// Control socket bind address
    #[arg(long)]
    control_bind: Option<IpAddr>,

    /// Control socket port
    #[arg(long)]
    control_port: Option<u16>,

    /// Largest accepted error box radius (arcseconds)
    #[arg(long, visible_alias = "meb")]
    max_error_box: Option<f64>,

    /// Longest accepted burst to receipt delay (seconds)
    #[arg(long)]
    max_delay: Option<u64>,

    /// SWIFT status bits that must be set (decimal or 0x hex)
    #[arg(long, visible_alias = "sssam", value_parser = parse_mask)]
    swift_accept_mask: Option<u32>,

    /// SWIFT status bits that must be clear (decimal or 0x hex)
    #[arg(long, visible_alias = "sssrm", value_parser = parse_mask)]
    swift_reject_mask: Option<u32>,

    /// Reject SWIFT alerts whose merit parameters say "not a GRB"
    #[arg(long)]
    swift_merit: bool,

    /// Start with socket alerts disabled
    #[arg(long)]
    disable_socket_alerts: bool,

    /// Start with manual alerts disabled
    #[arg(long)]
    disable_manual_alerts: bool,

    /// Log the script command line instead of running it
    #[arg(long)]
    dry_run: bool,

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
        #[arg(short, long, default_value = "alertd.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
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
        };
    }

    let config = build_config(&args)?;

    info!("+----------------------------------------------------+");
    info!(
        "|       GCN Alert Daemon v{}                      |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!(
        "|  Feed:     {:38} |",
        format!("{}:{}", config.multicast_group, config.multicast_port)
    );
    info!("|  Control:  {:38} |", config.control_addr());
    info!("|  Script:   {:38} |", config.script.display().to_string());
    info!(
        "|  Missions: {:38} |",
        config.policy().allowed_missions.to_string()
    );
    info!(
        "|  Max box:  {:38} |",
        format!("{} arcsec", config.max_error_box_arcsec)
    );
    info!("+----------------------------------------------------+");

    let launcher: Arc<dyn Launch> = if args.dry_run {
        Arc::new(DryRunLauncher::new())
    } else {
        Arc::new(ScriptLauncher::new(config.script.clone()))
    };

    let daemon = AlertDaemon::new(config, launcher);

    let shutdown = daemon.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping daemon...");
        shutdown.trigger();
    });

    daemon.run().await?;
    Ok(())
}

fn build_config(args: &Args) -> Result<AlertdConfig, ConfigError> {
    let mut config = match args.config {
        Some(ref path) => {
            info!("Loading config from {:?}", path);
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AlertdConfig::default(),
    };

    if let Some(ref script) = args.script {
        config.script = script.clone();
    }

    if args.all {
        for mission in Mission::KNOWN {
            config.allow(mission);
        }
    }
    for (flag, mission) in [
        (args.hete, Mission::Hete),
        (args.integral, Mission::Integral),
        (args.swift, Mission::Swift),
        (args.agile, Mission::Agile),
        (args.fermi, Mission::Fermi),
    ] {
        if flag {
            config.allow(mission);
        }
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
    if let Some(bind) = args.control_bind {
        config.control_bind = bind;
    }
    if let Some(port) = args.control_port {
        config.control_port = port;
    }
    if let Some(max) = args.max_error_box {
        config.max_error_box_arcsec = max;
    }
    if let Some(delay) = args.max_delay {
        config.max_propagation_delay_secs = Some(delay);
    }
    if let Some(mask) = args.swift_accept_mask {
        config.swift_accept_mask = mask;
    }
    if let Some(mask) = args.swift_reject_mask {
        config.swift_reject_mask = mask;
    }
    if args.swift_merit {
        config.swift_filter_on_merit = true;
    }
    if args.disable_socket_alerts {
        config.socket_alerts_enabled = false;
    }
    if args.disable_manual_alerts {
        config.manual_alerts_enabled = false;
    }
    config.log_level = args.log_level.clone();

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = AlertdConfig {
        script: PathBuf::from("/usr/local/bin/grb_alert.sh"),
        allowed_missions: vec![Mission::Swift, Mission::Integral, Mission::Fermi],
        max_error_box_arcsec: 600.0,
        max_propagation_delay_secs: Some(3600),
        swift_accept_mask: 0x2,
        swift_reject_mask: 0x20,
        swift_filter_on_merit: true,
        ..Default::default()
    };

    let toml_str = toml::to_string_pretty(&config)?;

    let content = format!(
        r#"# GCN Alert Daemon Configuration
# Generated by gcn-alertd gen-config

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match AlertdConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Script:   {}", config.script.display());
            println!(
                "Feed:     {}:{}",
                config.multicast_group, config.multicast_port
            );
            println!("Control:  {}", config.control_addr());
            println!("Missions: {}", config.policy().allowed_missions);
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}
