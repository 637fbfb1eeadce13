//! Kaelion command-line interface.
//!
//! Entry point for echo-decay experiments: full runs, zero-noise
//! extrapolation, readout calibration, seed-variability diagnosis, and
//! offline decay fitting.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, calibrate, fit, run, variability, version, zne};

/// Kaelion - echo-decay scrambling experiments on quantum backends
#[derive(Parser)]
#[command(name = "kaelion")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full decay experiment
    Run {
        /// Plan file (YAML); flags below override its fields
        #[arg(short, long)]
        plan: Option<String>,

        /// Families to measure (chaotic, integrable, intermediate,
        /// kicked_ising, floquet, syk); default all
        #[arg(short, long, value_delimiter = ',')]
        family: Vec<String>,

        /// Forward-evolution depths
        #[arg(short, long, value_delimiter = ',')]
        depths: Vec<u32>,

        /// Shots per circuit
        #[arg(short, long)]
        shots: Option<u32>,

        /// Independent runs per family
        #[arg(short, long)]
        runs: Option<u32>,

        /// Number of qubits
        #[arg(short = 'q', long)]
        qubits: Option<u32>,

        /// Base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Backend to use (simulator, ibm, or an IBM device name)
        #[arg(short, long, default_value = "simulator")]
        backend: String,

        /// Skip the readout-calibration correction
        #[arg(long)]
        no_correction: bool,

        /// Output file for the JSON report (table to stdout if omitted)
        #[arg(short, long)]
        export: Option<String>,
    },

    /// Run with noise folding and zero-noise extrapolation
    Zne {
        /// Plan file (YAML); flags below override its fields
        #[arg(short, long)]
        plan: Option<String>,

        /// Families to measure; default all
        #[arg(short, long, value_delimiter = ',')]
        family: Vec<String>,

        /// Forward-evolution depths
        #[arg(short, long, value_delimiter = ',')]
        depths: Vec<u32>,

        /// Shots per circuit
        #[arg(short, long)]
        shots: Option<u32>,

        /// Backend to use
        #[arg(short, long, default_value = "simulator")]
        backend: String,

        /// Output file for the JSON summaries
        #[arg(short, long)]
        export: Option<String>,
    },

    /// Measure readout fidelities only
    Calibrate {
        /// Number of qubits
        #[arg(short = 'q', long, default_value = "4")]
        qubits: u32,

        /// Shots per calibration circuit
        #[arg(short, long, default_value = "4096")]
        shots: u32,

        /// Backend to use
        #[arg(short, long, default_value = "simulator")]
        backend: String,
    },

    /// Diagnose run-to-run spread: circuit seeds vs backend noise
    Variability {
        /// Family to diagnose
        #[arg(short, long, default_value = "chaotic")]
        family: String,

        /// Suspect seeds to rerun (defaults to the plan's run seeds)
        #[arg(long, value_delimiter = ',')]
        seeds: Vec<u64>,

        /// Fixed-seed repetitions
        #[arg(long, default_value = "3")]
        repeats: u32,

        /// Shots per circuit
        #[arg(short, long)]
        shots: Option<u32>,

        /// Backend to use
        #[arg(short, long, default_value = "simulator")]
        backend: String,
    },

    /// Fit a decay curve from a file of (depth, probability) pairs
    Fit {
        /// Input file (JSON array of [depth, probability] pairs, or CSV)
        input: String,

        /// Effective temperature for λ normalization
        #[arg(long, default_value = "0.5")]
        t_eff: f64,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            plan,
            family,
            depths,
            shots,
            runs,
            qubits,
            seed,
            backend,
            no_correction,
            export,
        } => {
            run::execute(
                plan.as_deref(),
                &family,
                &depths,
                shots,
                runs,
                qubits,
                seed,
                &backend,
                no_correction,
                export.as_deref(),
            )
            .await
        }

        Commands::Zne {
            plan,
            family,
            depths,
            shots,
            backend,
            export,
        } => {
            zne::execute(
                plan.as_deref(),
                &family,
                &depths,
                shots,
                &backend,
                export.as_deref(),
            )
            .await
        }

        Commands::Calibrate {
            qubits,
            shots,
            backend,
        } => calibrate::execute(qubits, shots, &backend).await,

        Commands::Variability {
            family,
            seeds,
            repeats,
            shots,
            backend,
        } => variability::execute(&family, &seeds, repeats, shots, &backend).await,

        Commands::Fit { input, t_eff } => fit::execute(&input, t_eff),

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
