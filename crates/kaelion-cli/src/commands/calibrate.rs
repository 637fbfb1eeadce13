//! Calibrate command implementation.

use anyhow::Result;
use console::style;

use kaelion_run::calibrate_readout;

use super::common::{make_backend, spinner};

/// Execute the calibrate command.
pub async fn execute(qubits: u32, shots: u32, backend: &str) -> Result<()> {
    println!(
        "{} Readout calibration on {} ({} qubits, {} shots)",
        style("→").cyan().bold(),
        style(backend).yellow(),
        qubits,
        shots
    );

    let backend_impl = make_backend(backend).await?;

    let bar = spinner("Running calibration circuits...");
    let calibration = calibrate_readout(backend_impl.as_ref(), qubits, shots).await?;
    bar.finish_and_clear();

    println!("\n{} Calibration:", style("✓").green().bold());
    println!("  P(0…0 | 0…0): {:.4}", calibration.fid_zero);
    println!("  P(1…1 | 1…1): {:.4}", calibration.fid_one);
    println!("  Mean fidelity: {:.4}", calibration.readout_fidelity());
    println!(
        "  Correction factor: {:.4}",
        calibration.correction_factor()
    );

    Ok(())
}
