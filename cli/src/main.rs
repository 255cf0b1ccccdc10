use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::config::{DEFAULT_ROOM, DEFAULT_WS_URL, Profile};

mod config;
mod console;
mod input;
mod offline;
mod online;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Hues and Cues at the terminal", long_about = None)]
struct Cli {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Profile file with defaults such as the username
    #[arg(long, env = "HUES_PROFILE", global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Pass-and-play on this device
    Offline {
        /// Names of the players, in seating order
        players: Vec<String>,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Join a room on a game server
    Online {
        #[arg(long, env = "HUES_WS_URL", default_value = DEFAULT_WS_URL)]
        url: String,

        #[arg(long, env = "HUES_ROOM", default_value = DEFAULT_ROOM)]
        room: String,

        /// Display name, falls back to the profile username
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_logging(cli.verbose.log_level_filter());
    let profile = Profile::load(cli.profile.as_deref())?;
    log::debug!("{:?}", cli);

    match cli.command {
        Mode::Offline { players, seed } => {
            let seed = match seed {
                Some(raw) => config::parse_seed(&raw)?,
                None => config::random_seed(),
            };
            offline::run(players, seed).await
        }
        Mode::Online { url, room, name } => {
            let name = name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .or_else(|| profile.username())
                .map(str::to_owned)
                .context("no player name, pass --name or set username in the profile")?;
            online::run(&url, &room, &name).await
        }
    }
}
