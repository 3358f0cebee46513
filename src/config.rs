//! Command line and environment configuration.

use std::time::Duration;

use clap::{ArgAction, Parser};

/// IPv4 NAT address lookup tool
#[derive(Parser, Debug, Clone)]
#[command(name = "natip", version, about, long_about = None)]
pub struct Cli {
    /// Only list lookup resolvers
    #[arg(short, long, conflicts_with = "all")]
    pub list: bool,

    /// Query every selected resolver and report each result
    #[arg(short, long)]
    pub all: bool,

    /// Use this specific resolver
    #[arg(short, long, visible_alias = "resolver", value_name = "NAME")]
    pub name: Option<String>,

    /// Timeout (in seconds) to wait for a response
    #[arg(
        short,
        long,
        default_value_t = 5,
        env = "NATIP_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Disable resolver from being used (repeatable)
    #[arg(
        short,
        long,
        visible_alias = "exclude",
        value_name = "NAME",
        action = ArgAction::Append
    )]
    pub disable: Vec<String>,

    /// Verbosity, repeat to increase
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to the "dig" binary, empty disables DNS
    #[arg(long, default_value = "dig", env = "NATIP_DIG_BIN", value_name = "PATH")]
    pub dig_bin: String,

    /// Path to the "stunip.py" binary, empty disables STUN
    #[arg(
        long,
        default_value = "stunip.py",
        env = "NATIP_STUNIP_BIN",
        value_name = "PATH"
    )]
    pub stunip_bin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    One,
    All,
}

/// Settings for one run, independent of how they were supplied.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub name: Option<String>,
    pub disable: Vec<String>,
    pub timeout: Duration,
    pub verbosity: u8,
    pub dig_bin: String,
    pub stunip_bin: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mode = if cli.list {
            Mode::List
        } else if cli.all {
            Mode::All
        } else {
            Mode::One
        };

        Self {
            mode,
            name: cli.name.filter(|name| !name.is_empty()),
            disable: cli.disable,
            timeout: Duration::from_secs(cli.timeout),
            verbosity: cli.verbose,
            dig_bin: cli.dig_bin,
            stunip_bin: cli.stunip_bin,
        }
    }
}

impl Config {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
