//! Shared helpers for CLI commands.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use kaelion_adapter_sim::SimulatorBackend;
use kaelion_hal::Backend;
use kaelion_otoc::DynamicsFamily;
use kaelion_run::ExperimentPlan;

#[cfg(feature = "ibm")]
use kaelion_adapter_ibm::IbmBackend;

/// Construct a backend from its CLI name.
pub async fn make_backend(name: &str) -> Result<Box<dyn Backend>> {
    match name.to_lowercase().as_str() {
        "simulator" | "sim" => Ok(Box::new(SimulatorBackend::new())),
        #[cfg(feature = "ibm")]
        "ibm" => {
            println!("  Connecting to IBM Quantum...");
            match IbmBackend::connect_default().await {
                Ok(b) => Ok(Box::new(b)),
                Err(e) => anyhow::bail!(
                    "Failed to connect to IBM Quantum: {e}. Set IBM_API_KEY and IBM_SERVICE_CRN."
                ),
            }
        }
        #[cfg(feature = "ibm")]
        device if device.starts_with("ibm_") => {
            println!("  Connecting to IBM Quantum ({device})...");
            match IbmBackend::connect(device).await {
                Ok(b) => Ok(Box::new(b)),
                Err(e) => anyhow::bail!(
                    "Failed to connect to IBM Quantum: {e}. Set IBM_API_KEY and IBM_SERVICE_CRN."
                ),
            }
        }
        #[cfg(not(feature = "ibm"))]
        "ibm" => anyhow::bail!("IBM backend not available. Rebuild with --features ibm"),
        #[cfg(not(feature = "ibm"))]
        device if device.starts_with("ibm_") => {
            anyhow::bail!("IBM backend not available. Rebuild with --features ibm")
        }
        other => anyhow::bail!("Unknown backend: '{other}'. Available: simulator, ibm"),
    }
}

/// Load a plan file (or start from defaults) and apply flag overrides.
pub fn build_plan(
    plan_file: Option<&str>,
    families: &[String],
    depths: &[u32],
    shots: Option<u32>,
    runs: Option<u32>,
    qubits: Option<u32>,
    seed: Option<u64>,
) -> Result<ExperimentPlan> {
    let mut plan = match plan_file {
        Some(path) => ExperimentPlan::from_file(path)?,
        None => ExperimentPlan::default(),
    };

    if !families.is_empty() {
        plan.families = parse_families(families)?;
    }
    if !depths.is_empty() {
        plan.depths = depths.to_vec();
    }
    if let Some(shots) = shots {
        plan.shots = shots;
    }
    if let Some(runs) = runs {
        plan.runs = runs;
    }
    if let Some(qubits) = qubits {
        plan.num_qubits = qubits;
    }
    if let Some(seed) = seed {
        plan.base_seed = seed;
    }

    plan.validate()?;
    Ok(plan)
}

/// Parse family names, rejecting unknown ones with the valid list.
pub fn parse_families(names: &[String]) -> Result<Vec<DynamicsFamily>> {
    names
        .iter()
        .map(|name| {
            DynamicsFamily::parse(name).ok_or_else(|| {
                let valid = DynamicsFamily::ALL.map(|f| f.id()).join(", ");
                anyhow::anyhow!("Unknown family: '{name}'. Available: {valid}")
            })
        })
        .collect()
}

/// A steady-tick spinner with a message.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(tpl) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(tpl);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_families() {
        let parsed = parse_families(&["chaotic".into(), "kicked_ising".into()]).unwrap();
        assert_eq!(
            parsed,
            vec![DynamicsFamily::Chaotic, DynamicsFamily::KickedIsing]
        );
        assert!(parse_families(&["nonsense".into()]).is_err());
    }

    #[test]
    fn test_build_plan_overrides() {
        let plan = build_plan(
            None,
            &["syk".into()],
            &[1, 2, 4],
            Some(512),
            Some(2),
            Some(5),
            Some(7),
        )
        .unwrap();
        assert_eq!(plan.families, vec![DynamicsFamily::Syk]);
        assert_eq!(plan.depths, vec![1, 2, 4]);
        assert_eq!(plan.shots, 512);
        assert_eq!(plan.runs, 2);
        assert_eq!(plan.num_qubits, 5);
        assert_eq!(plan.base_seed, 7);
    }

    #[test]
    fn test_build_plan_rejects_invalid_override() {
        // Two depths cannot support a three-parameter fit.
        assert!(build_plan(None, &[], &[1, 2], None, None, None, None).is_err());
    }
}
