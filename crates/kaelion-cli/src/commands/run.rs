//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use kaelion_hal::Backend;
use kaelion_run::{Runner, calibrate_readout};

use super::common::{build_plan, make_backend, spinner};

/// Execute the run command.
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    plan_file: Option<&str>,
    families: &[String],
    depths: &[u32],
    shots: Option<u32>,
    runs: Option<u32>,
    qubits: Option<u32>,
    seed: Option<u64>,
    backend: &str,
    no_correction: bool,
    export: Option<&str>,
) -> Result<()> {
    let mut plan = build_plan(plan_file, families, depths, shots, runs, qubits, seed)?;
    if no_correction {
        plan.readout_correction = false;
    }

    println!(
        "{} Decay experiment on {}: {} families, {} depths, {} runs, {} shots",
        style("→").cyan().bold(),
        style(backend).yellow(),
        plan.families.len(),
        plan.depths.len(),
        plan.runs,
        plan.shots
    );

    let backend_impl = make_backend(backend).await?;

    let avail = backend_impl.availability().await?;
    if !avail.is_available {
        anyhow::bail!("Backend '{backend}' is not available");
    }

    let mut runner = Runner::new(backend_impl.as_ref(), plan.clone());
    if plan.readout_correction {
        let bar = spinner("Calibrating readout...");
        let calibration =
            calibrate_readout(backend_impl.as_ref(), plan.num_qubits, plan.shots).await?;
        bar.finish_and_clear();
        println!(
            "  Readout fidelity: {:.4} (|0…0⟩), {:.4} (|1…1⟩)",
            calibration.fid_zero, calibration.fid_one
        );
        runner = runner.with_calibration(calibration);
    }

    let bar = spinner("Measuring decay curves...");
    let report = runner.run().await?;
    bar.finish_and_clear();

    println!("\n{}", report.render_table());

    for summary in &report.families {
        let marker = if summary.family.expects_scrambling() {
            style("scrambling").red()
        } else {
            style("non-scrambling").green()
        };
        println!(
            "  {:<14} λ = {:.4} ± {:.4}  ({marker})",
            summary.family.to_string(),
            summary.lambda,
            summary.alpha_err
        );
    }

    if let Some(path) = export {
        report.save(Path::new(path))?;
        println!(
            "\n{} Report written to {}",
            style("✓").green().bold(),
            style(path).cyan()
        );
    }

    Ok(())
}
