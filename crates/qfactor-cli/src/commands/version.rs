//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Shor's algorithm on simulated quantum circuits",
        style("qfactor").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qfactor-ir              Circuit intermediate representation");
    println!("  qfactor-hal             Backend abstraction layer");
    println!("  qfactor-shor            Phase estimation and factor search");
    println!("  qfactor-adapter-sim     Dense statevector simulator");
    println!("  qfactor-adapter-sparse  Sparse amplitude simulator");
    println!("  qfactor-cli             Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
