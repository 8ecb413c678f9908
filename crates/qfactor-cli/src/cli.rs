//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// qfactor - Shor's algorithm for N = 15 on simulated quantum circuits
#[derive(Debug, Parser)]
#[command(name = "qfactor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "QFACTOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Factor a number, printing every attempt
    Factor {
        /// Number to factor
        #[arg(short, long, default_value = "15", env = "QFACTOR_NUMBER")]
        number: u64,

        /// Base of the modular exponentiation (2, 4, 7, 8, 11 or 13)
        #[arg(short, long, default_value = "7", env = "QFACTOR_BASE")]
        base: u64,

        /// Counting qubits (defaults to the config file, then 8)
        #[arg(short, long, env = "QFACTOR_QUBITS")]
        qubits: Option<u32>,

        /// Timeout in seconds, 0 for none
        #[arg(short, long, env = "QFACTOR_TIMEOUT")]
        timeout: Option<f64>,

        /// Give up after this many attempts
        #[arg(long)]
        max_attempts: Option<u64>,

        /// Backend to use (statevector, sparse)
        #[arg(long, default_value = "statevector", env = "QFACTOR_BACKEND")]
        backend: String,

        /// Stop at the first factor, answering primes and even numbers directly
        #[arg(long)]
        first: bool,

        /// Hide the per-attempt output
        #[arg(long)]
        quiet: bool,
    },

    /// Run the factoring panel on both backends
    Panel {
        /// Number to factor (prompted on stdin when omitted)
        #[arg(short, long)]
        number: Option<u64>,

        /// Timeout per backend in seconds (prompted on stdin when omitted)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format (markdown, json)
        #[arg(short, long, default_value = "markdown")]
        format: String,
    },

    /// Show the phase estimation circuit for a base
    Circuit {
        /// Base of the modular exponentiation
        #[arg(short, long, default_value = "7")]
        base: u64,

        /// Counting qubits
        #[arg(short, long, default_value = "8")]
        qubits: u32,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}
