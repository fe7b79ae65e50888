use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dyn_array")]
#[command(version, about = "Walks a DynamicArray through its storage operations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Set verbose level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert, erase and resize a small array, printing each step
    Scenario,
    /// Push 1..=COUNT and report every reallocation
    Grow {
        #[arg(short, long, default_value_t = 100)]
        count: usize,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
