//! Backends command implementation.

use anyhow::Result;
use console::style;

use qfactor_hal::Backend;
use qfactor_shor::ShorConfig;
use qfactor_cli::build_backends;

/// Execute the backends command.
pub async fn execute(config: &ShorConfig) -> Result<()> {
    println!("{} Available backends:\n", style("qfactor").cyan().bold());

    let (dense, sparse) = build_backends(config)?;
    describe(&dense, "dense 2^n amplitude vector").await?;
    describe(&sparse, "non-zero amplitudes only").await?;

    Ok(())
}

async fn describe<B: Backend>(backend: &B, representation: &str) -> Result<()> {
    let caps = backend.capabilities();
    let available = backend.availability().await?.is_available;

    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style(backend.name()).bold(),
        if caps.is_simulator { "(local)" } else { "" }
    );
    println!("    State: {representation}");
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!("    Features: {}", caps.features.join(", "));
    println!();
    Ok(())
}
