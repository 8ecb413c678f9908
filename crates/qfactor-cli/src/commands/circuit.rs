//! Circuit command implementation.

use anyhow::Result;
use console::style;

use qfactor_shor::qpe_circuit;

/// Execute the circuit command.
pub fn execute(base: u64, qubits: u32) -> Result<()> {
    let circuit = qpe_circuit(base, qubits)?;

    println!(
        "{} Phase estimation circuit {}",
        style("→").cyan().bold(),
        style(circuit.name()).green()
    );
    println!("  Qubits:       {} ({qubits} counting + 4 work)", circuit.num_qubits());
    println!("  Clbits:       {}", circuit.num_clbits());
    println!("  Depth:        {}", circuit.depth());
    println!("  Instructions: {}", circuit.size());
    println!();
    println!("  {:<20} {:>6}", style("Operation").bold(), style("Count").bold());
    for (name, count) in circuit.count_ops() {
        println!("  {name:<20} {count:>6}");
    }

    Ok(())
}
