//! Backends command implementation.

use anyhow::Result;
use console::style;

use kaelion_adapter_sim::SimulatorBackend;
use kaelion_hal::Backend;

#[cfg(feature = "ibm")]
use kaelion_adapter_ibm::IbmBackend;

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("Kaelion").cyan().bold());

    let sim = SimulatorBackend::new();
    let caps = sim.capabilities();
    let available = sim.availability().await?.is_available;

    println!(
        "  {} {} (local)",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style("simulator").bold()
    );
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!();

    #[cfg(feature = "ibm")]
    {
        match IbmBackend::connect_default().await {
            Ok(ibm) => {
                let available = ibm.availability().await.is_ok_and(|a| a.is_available);
                let caps = ibm.capabilities();
                println!(
                    "  {} {} ({})",
                    if available {
                        style("●").green()
                    } else {
                        style("○").yellow()
                    },
                    style("ibm").bold(),
                    caps.name
                );
                println!("    Qubits: {}", caps.num_qubits);
                println!("    Max shots: {}", caps.max_shots);
                println!(
                    "    Gates: {} / {}",
                    caps.gate_set.single_qubit.join(", "),
                    caps.gate_set.two_qubit.join(", ")
                );
                if !available {
                    println!("    Status: offline or maintenance");
                }
            }
            Err(_) => {
                println!(
                    "  {} {} (not configured)",
                    style("○").dim(),
                    style("ibm").dim()
                );
                println!("    Set IBM_API_KEY and IBM_SERVICE_CRN to enable");
            }
        }
        println!();
    }

    #[cfg(not(feature = "ibm"))]
    {
        println!(
            "  {} {} (not compiled)",
            style("○").dim(),
            style("ibm").dim()
        );
        println!("    Rebuild with --features ibm to enable");
        println!();
    }

    Ok(())
}
