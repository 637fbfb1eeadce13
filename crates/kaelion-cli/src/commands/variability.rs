//! Variability command implementation.

use anyhow::Result;
use console::style;

use kaelion_otoc::DynamicsFamily;
use kaelion_run::{ExperimentPlan, VariabilityStudy, Verdict};

use super::common::{make_backend, spinner};

/// Execute the variability command.
pub async fn execute(
    family: &str,
    seeds: &[u64],
    repeats: u32,
    shots: Option<u32>,
    backend: &str,
) -> Result<()> {
    let family = DynamicsFamily::parse(family).ok_or_else(|| {
        let valid = DynamicsFamily::ALL.map(|f| f.id()).join(", ");
        anyhow::anyhow!("Unknown family: '{family}'. Available: {valid}")
    })?;

    let mut plan = ExperimentPlan::default();
    if let Some(shots) = shots {
        plan.shots = shots;
    }

    println!(
        "{} Variability diagnosis for {} on {}",
        style("→").cyan().bold(),
        style(family).green(),
        style(backend).yellow()
    );
    if !family.is_seeded() {
        println!(
            "  {} {family} draws deterministic circuits; any spread is the backend.",
            style("note:").yellow()
        );
    }

    let backend_impl = make_backend(backend).await?;
    let mut study = VariabilityStudy::new(backend_impl.as_ref(), plan).with_repeats(repeats);
    if !seeds.is_empty() {
        study = study.with_seeds(seeds.to_vec());
    }

    let bar = spinner("Rerunning seeds...");
    let report = study.run(family).await?;
    bar.finish_and_clear();

    println!("\n  Seed reruns:");
    for result in &report.seed_results {
        let flag = if result.below_threshold {
            style("weak").red()
        } else {
            style("ok").green()
        };
        println!(
            "    seed {:>6}: λ = {:.4}  [{flag}]",
            result.seed, result.lambda
        );
    }

    println!(
        "\n  Fixed seed {} × {}: mean λ = {:.4}, std = {:.4}",
        report.fixed_seed,
        report.fixed_statistics.num_runs(),
        report.fixed_statistics.mean,
        report.fixed_statistics.std
    );

    let verdict_line = match report.verdict {
        Verdict::SeedLimited => "some seeds draw weakly scrambling circuits",
        Verdict::HardwareNoise => "the backend is drifting between submissions",
        Verdict::Both => "weak seeds and backend drift are both present",
        Verdict::Stable => "neither seeds nor the backend show a problem",
    };
    println!(
        "\n{} Verdict: {}",
        style("✓").green().bold(),
        style(verdict_line).bold()
    );

    Ok(())
}
