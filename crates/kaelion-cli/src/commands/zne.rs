//! Zne command implementation.

use std::fs;

use anyhow::Result;
use console::style;

use kaelion_run::{FOLD_FACTORS, ZneRunner};

use super::common::{build_plan, make_backend, spinner};

/// Execute the zne command.
pub async fn execute(
    plan_file: Option<&str>,
    families: &[String],
    depths: &[u32],
    shots: Option<u32>,
    backend: &str,
    export: Option<&str>,
) -> Result<()> {
    let plan = build_plan(plan_file, families, depths, shots, None, None, None)?;

    println!(
        "{} Zero-noise extrapolation on {}: fold factors {:?}",
        style("→").cyan().bold(),
        style(backend).yellow(),
        FOLD_FACTORS
    );

    let backend_impl = make_backend(backend).await?;
    let runner = ZneRunner::new(backend_impl.as_ref(), plan);

    let bar = spinner("Measuring folded curves...");
    let summaries = runner.run().await?;
    bar.finish_and_clear();

    println!(
        "\n{:<14} {:>10} {:>12} {:>10}",
        "family", "raw λ", "mitigated λ", "shift"
    );
    for summary in &summaries {
        let shift = summary.mitigated_lambda - summary.raw_lambda;
        println!(
            "{:<14} {:>10.4} {:>12.4} {:>+10.4}",
            summary.family.to_string(),
            summary.raw_lambda,
            summary.mitigated_lambda,
            shift
        );
    }

    if let Some(path) = export {
        fs::write(path, serde_json::to_string_pretty(&summaries)?)?;
        println!(
            "\n{} Summaries written to {}",
            style("✓").green().bold(),
            style(path).cyan()
        );
    }

    Ok(())
}
