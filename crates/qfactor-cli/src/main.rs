//! qfactor Command-Line Interface
//!
//! ```text
//!   qfactor factor   -n 15 -b 7      script mode, prints every attempt
//!   qfactor panel    -n 15 -t 10     both backends, Markdown output
//!   qfactor circuit  -b 7 -q 8       inspect the phase estimation circuit
//!   qfactor backends                 list simulators
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, circuit, factor, panel, version};
use qfactor_cli::cli::{Cli, Commands};
use qfactor_cli::load_config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Every simulation runs on this one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    if let Err(e) = runtime.block_on(dispatch(cli)) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Factor {
            number,
            base,
            qubits,
            timeout,
            max_attempts,
            backend,
            first,
            quiet,
        } => {
            let args = factor::FactorArgs {
                number,
                base,
                qubits,
                timeout,
                max_attempts,
                backend,
                first,
                quiet,
            };
            factor::execute(&config, &args).await
        }

        Commands::Panel {
            number,
            timeout,
            format,
        } => panel::execute(&config, number, timeout, &format).await,

        Commands::Circuit { base, qubits } => circuit::execute(base, qubits),

        Commands::Backends => backends::execute(&config).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
