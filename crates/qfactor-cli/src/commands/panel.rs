//! Panel command implementation.

use std::io;

use anyhow::{Result, bail};

use qfactor_cli::panel::prompt_u64;
use qfactor_cli::{PanelState, build_backends, on_trigger, render_markdown};
use qfactor_shor::ShorConfig;

/// Execute the panel command.
pub async fn execute(
    config: &ShorConfig,
    number: Option<u64>,
    timeout: Option<u64>,
    format: &str,
) -> Result<()> {
    let mut state = PanelState::from_defaults(&config.panel);
    {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        if let Some(n) = number {
            state.number = n;
        } else {
            state.number =
                prompt_u64(&mut input, &mut output, "Type number for factoring", state.number)?;
        }
        if let Some(t) = timeout {
            state.timeout_secs = t;
        } else {
            state.timeout_secs =
                prompt_u64(&mut input, &mut output, "Type the timeout value", state.timeout_secs)?;
        }
    }

    let (dense, sparse) = build_backends(config)?;
    let reports = on_trigger(&state, dense, sparse).await?;

    match format.to_lowercase().as_str() {
        "markdown" | "md" => print!("{}", render_markdown(&state, &reports)),
        "json" => {
            let doc = serde_json::json!({ "state": state, "reports": reports });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        other => bail!("Unknown format: '{other}'. Available: markdown, json"),
    }
    Ok(())
}
