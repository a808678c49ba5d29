pub mod bytes;

pub mod controller;

pub mod ctrl_surf;

pub mod midi;
pub mod mixer;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel as channel;
use std::{io::BufRead, time::Duration};

use controller::Request;
use midi::port::Direction;

/// Drives a Novation Launchkey MK3 in DAW mode against an in-memory mixer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the MIDI client ports
    #[arg(long, env = "LAUNCHKEY_CLIENT_NAME", default_value = "launchkey-controller")]
    client_name: String,

    /// Device port names contain one of these
    #[arg(
        long = "port-pattern",
        env = "LAUNCHKEY_PORT_PATTERN",
        value_delimiter = ',',
        default_values = ["Launchkey MK3", "LKMK3"],
    )]
    port_patterns: Vec<String>,

    /// Device DAW port names also contain this
    #[arg(long, default_value = "DAW")]
    daw_marker: String,

    #[arg(long, default_value_t = 1000)]
    probe_interval_ms: u64,

    #[arg(long, default_value_t = 500)]
    drain_timeout_ms: u64,

    /// Number of mixer tracks
    #[arg(long, default_value_t = 8)]
    tracks: usize,

    /// Number of plugin parameters per track
    #[arg(long, default_value_t = 12)]
    plugin_params: usize,

    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> controller::Config {
        controller::Config {
            client_name: self.client_name.as_str().into(),
            port_matcher: midi::port::PortMatcher {
                patterns: self.port_patterns.clone(),
                marker: self.daw_marker.clone(),
            },
            probe_interval: Duration::from_millis(self.probe_interval_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    let (req_tx, req_rx) = channel::unbounded();
    let handle = controller::Spawner {
        req_rx,
        config: cli.config(),
        host: mixer::Mixer::new(cli.tracks, cli.plugin_params),
    }
    .spawn();

    log::info!("Waiting for the device. Enter `h` for help");
    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let request = match parse_command(line.trim()) {
            Some(Command::Quit) => break,
            Some(Command::Help) => {
                println!("{HELP}");
                continue;
            }
            Some(Command::Request(request)) => request,
            None => continue,
        };

        if req_tx.send(request).is_err() {
            break;
        }
    }

    let _ = req_tx.send(Request::Shutdown);
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("Controller thread panicked"))?
        .context("Controller")?;

    log::info!("Exiting");

    Ok(())
}

const HELP: &str = "\
p                    probe the device ports
c <in|out> <port>    connect to the named port
d <in|out>           disconnect
q                    quit";

enum Command {
    Request(Request),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let (cmd, args) = line.split_once(' ').unwrap_or((line, ""));
    let direction = |arg: &str| match arg {
        "in" => Some(Direction::In),
        "out" => Some(Direction::Out),
        _ => {
            log::warn!("Expected `in` or `out`, got `{arg}`");
            None
        }
    };

    let command = match cmd {
        "" => return None,
        "q" => Command::Quit,
        "h" => Command::Help,
        "p" => Command::Request(Request::Probe),
        "c" => {
            let (dir, port_name) = args.trim().split_once(' ').unwrap_or((args.trim(), ""));
            let port_name = port_name.trim();
            if port_name.is_empty() {
                log::warn!("Missing port name");
                return None;
            }

            Command::Request(Request::Connect(direction(dir)?, port_name.into()))
        }
        "d" => Command::Request(Request::Disconnect(direction(args.trim())?)),
        other => {
            log::warn!("Unknown command `{other}`");
            return None;
        }
    };

    Some(command)
}
