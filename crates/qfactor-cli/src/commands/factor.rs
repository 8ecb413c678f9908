//! Factor command implementation.

use std::time::Duration;

use anyhow::{Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qfactor_cli::build_backends;
use qfactor_hal::Backend;
use qfactor_shor::{
    QpeEstimator, SearchOptions, SearchOutcome, SearchReport, ShorConfig, search, search_first,
};

/// Command-line overrides for the configured search.
#[derive(Debug, Clone)]
pub struct FactorArgs {
    pub number: u64,
    pub base: u64,
    pub qubits: Option<u32>,
    pub timeout: Option<f64>,
    pub max_attempts: Option<u64>,
    pub backend: String,
    pub first: bool,
    pub quiet: bool,
}

impl FactorArgs {
    fn options(&self, config: &ShorConfig) -> SearchOptions {
        let mut opts = config.search.clone().with_show(!self.quiet);
        if let Some(qubits) = self.qubits {
            opts.qubits_count = qubits;
        }
        if let Some(secs) = self.timeout {
            opts = opts.with_timeout_secs(secs);
        }
        if let Some(max) = self.max_attempts {
            opts.retry.max_attempts = Some(max);
        }
        opts
    }
}

/// Execute the factor command.
pub async fn execute(config: &ShorConfig, args: &FactorArgs) -> Result<()> {
    let opts = args.options(config);
    println!(
        "{} Factoring {} with a = {} on {} ({} counting qubits)",
        style("→").cyan().bold(),
        style(args.number).green(),
        args.base,
        style(&args.backend).yellow(),
        opts.qubits_count
    );

    let (dense, sparse) = build_backends(config)?;
    let report = match args.backend.to_lowercase().as_str() {
        "statevector" | "sv" | "dense" => run(dense, args, &opts).await?,
        "sparse" => run(sparse, args, &opts).await?,
        other => bail!("Unknown backend: '{other}'. Available: statevector, sparse"),
    };

    print_report(&report);
    Ok(())
}

async fn run<B: Backend>(backend: B, args: &FactorArgs, opts: &SearchOptions) -> Result<SearchReport> {
    let estimator = QpeEstimator::new(backend);

    let spinner = (!opts.show).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("Estimating phases...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let report = if args.first {
        search_first(&estimator, args.number, args.base, opts).await
    } else {
        search(&estimator, args.number, args.base, opts).await
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    Ok(report?)
}

fn print_report(report: &SearchReport) {
    println!();
    match report.outcome {
        SearchOutcome::Found | SearchOutcome::ShortCircuit => {
            println!("{} Factors: {:?}", style("✓").green().bold(), report.factors);
        }
        SearchOutcome::TimedOut => {
            println!("{} TIMEOUT: no factor found", style("✗").yellow().bold());
        }
        SearchOutcome::AttemptsExhausted => {
            println!("{} No factor found within the attempt limit", style("✗").yellow().bold());
        }
    }
    println!("  Attempts: {}", report.attempts);
    println!("  Elapsed:  {:.3}s", report.elapsed.as_secs_f64());
}
