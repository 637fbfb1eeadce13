//! Statevector simulator backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use kaelion_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use kaelion_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Default qubit ceiling. 2^20 amplitudes is 16MB per job.
const DEFAULT_MAX_QUBITS: u32 = 20;

/// A completed or failed simulation job.
struct SimJob {
    status: JobStatus,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator implementing the [`Backend`] trait.
///
/// Jobs run synchronously at submission and are stored in memory, so
/// `wait()` returns on the first poll. The circuit is evolved once and
/// all shots are sampled from the final distribution.
pub struct SimulatorBackend {
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Base seed for shot sampling. `None` draws from entropy.
    seed: Option<u64>,
    /// Per-job offset so repeated submissions sample distinct streams.
    job_counter: AtomicU64,
}

impl SimulatorBackend {
    /// Create a simulator with the default qubit ceiling.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with a custom qubit ceiling.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
            job_counter: AtomicU64::new(0),
        }
    }

    /// Fix the sampling seed for reproducible counts.
    ///
    /// The `k`-th submitted job samples with seed `seed + k`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run a circuit and collect measurement counts.
    fn run(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let started = Instant::now();

        let mut state = Statevector::new(circuit.num_qubits());
        state.evolve(circuit);

        // Measurement map: clbit index -> qubit index. Circuits without
        // explicit measurements read out every qubit in order.
        let measure_map = measurement_map(circuit);
        let num_bits = measure_map.len();

        let job_index = self.job_counter.fetch_add(1, Ordering::Relaxed);
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(job_index)),
            None => SmallRng::from_entropy(),
        };

        let mut counts = Counts::new();
        for _ in 0..shots {
            let outcome = state.sample(&mut rng);
            counts.record(outcome_bits(outcome, &measure_map, num_bits));
        }

        let elapsed = started.elapsed().as_millis() as u64;
        ExecutionResult::new(counts, shots, self.name()).with_execution_time(elapsed)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the clbit -> qubit readout map for a circuit.
fn measurement_map(circuit: &Circuit) -> Vec<usize> {
    let mut map: Vec<Option<usize>> = vec![None; circuit.num_clbits()];
    for inst in circuit.instructions() {
        if matches!(inst.kind, InstructionKind::Measure) {
            let qubit = inst.qubits[0].0 as usize;
            let clbit = inst.clbits[0].0 as usize;
            map[clbit] = Some(qubit);
        }
    }
    if map.iter().all(Option::is_none) {
        return (0..circuit.num_qubits()).collect();
    }
    // Unwritten clbits read as qubit of the same index.
    map.into_iter()
        .enumerate()
        .map(|(i, q)| q.unwrap_or(i))
        .collect()
}

/// Render a sampled basis state as a big-endian bitstring over the
/// measured classical bits.
fn outcome_bits(outcome: usize, measure_map: &[usize], num_bits: usize) -> String {
    let mut bits = String::with_capacity(num_bits);
    for clbit in (0..num_bits).rev() {
        let qubit = measure_map[clbit];
        bits.push(if outcome >> qubit & 1 == 1 { '1' } else { '0' });
    }
    bits
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit uses {} qubits, simulator supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }

        for inst in circuit.instructions() {
            if inst.is_gate() && !self.capabilities.gate_set.contains(inst.name()) {
                reasons.push(format!("unsupported gate: {}", inst.name()));
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), shots))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{} shots exceeds limit of {}",
                shots, self.capabilities.max_shots
            )));
        }

        match self.validate(circuit).await? {
            ValidationResult::Valid => {}
            ValidationResult::Invalid { reasons } => {
                return Err(HalError::InvalidCircuit(reasons.join("; ")));
            }
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let result = self.run(circuit, shots);

        debug!(
            job_id = %job_id,
            qubits = circuit.num_qubits(),
            ops = circuit.num_ops(),
            elapsed_ms = result.execution_time_ms,
            "simulation complete"
        );

        self.lock_jobs().insert(
            job_id.0.clone(),
            SimJob {
                status: JobStatus::Completed,
                result: Some(result),
            },
        );

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock_jobs()
            .get(&job_id.0)
            .map(|job| job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.lock_jobs();
        let job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        match &job.status {
            JobStatus::Completed => job
                .result
                .clone()
                .ok_or_else(|| HalError::Backend("completed job has no result".into())),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            other => Err(HalError::Backend(format!(
                "job {} not finished (status: {other})",
                job_id.0
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.lock_jobs();
        let job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        // Jobs run synchronously at submit, so there is normally nothing
        // left to cancel. Terminal states stay as they are.
        if job.status.is_pending() {
            job.status = JobStatus::Cancelled;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_ir::{Circuit, QubitId};
    use kaelion_otoc::{DynamicsFamily, EchoSpec};

    fn bell_circuit() -> Circuit {
        let mut c = Circuit::with_size("bell", 2, 0);
        c.h(QubitId(0)).unwrap();
        c.cx(QubitId(0), QubitId(1)).unwrap();
        c.measure_all().unwrap();
        c
    }

    #[tokio::test]
    async fn test_submit_and_result() {
        let sim = SimulatorBackend::new();
        let job_id = sim.submit(&bell_circuit(), 1000).await.unwrap();

        assert_eq!(sim.status(&job_id).await.unwrap(), JobStatus::Completed);

        let result = sim.result(&job_id).await.unwrap();
        assert_eq!(result.counts.total_shots(), 1000);

        // Bell state only produces correlated outcomes.
        assert_eq!(result.counts.get("01"), 0);
        assert_eq!(result.counts.get("10"), 0);
        assert_eq!(result.counts.get("00") + result.counts.get("11"), 1000);
    }

    #[tokio::test]
    async fn test_seeded_sampling_is_reproducible() {
        let a = SimulatorBackend::new().with_seed(7);
        let b = SimulatorBackend::new().with_seed(7);

        let id_a = a.submit(&bell_circuit(), 500).await.unwrap();
        let id_b = b.submit(&bell_circuit(), 500).await.unwrap();

        let ra = a.result(&id_a).await.unwrap();
        let rb = b.result(&id_b).await.unwrap();
        assert_eq!(ra.counts, rb.counts);
    }

    #[tokio::test]
    async fn test_too_many_qubits_rejected() {
        let sim = SimulatorBackend::with_max_qubits(3);
        let mut c = Circuit::with_size("big", 5, 0);
        c.h(QubitId(0)).unwrap();
        c.measure_all().unwrap();

        let err = sim.submit(&c, 100).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let sim = SimulatorBackend::new();
        let err = sim.submit(&bell_circuit(), 0).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidShots(_)));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let sim = SimulatorBackend::new();
        let err = sim.status(&JobId::new("nope")).await.unwrap_err();
        assert!(matches!(err, HalError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn test_wait_returns_immediately() {
        let sim = SimulatorBackend::new();
        let job_id = sim.submit(&bell_circuit(), 100).await.unwrap();
        let result = sim.wait(&job_id).await.unwrap();
        assert_eq!(result.counts.total_shots(), 100);
    }

    #[tokio::test]
    async fn test_forward_inverse_is_identity() {
        // U followed by its exact inverse lands every shot on all-zeros.
        let sim = SimulatorBackend::new().with_seed(1);
        for family in DynamicsFamily::ALL {
            let spec = EchoSpec::new(family, 4, 4);
            let mut circuit = spec.forward().unwrap();
            let inverse = circuit.inverse().unwrap();
            circuit.compose(&inverse).unwrap();
            circuit.measure_all().unwrap();

            let job_id = sim.submit(&circuit, 256).await.unwrap();
            let result = sim.result(&job_id).await.unwrap();
            assert_eq!(
                result.counts.get("0000"),
                256,
                "family {family} did not return to |0000>"
            );
        }
    }

    #[tokio::test]
    async fn test_depth_zero_echo_baseline() {
        // With no dynamics the probe Z acts on |0> and drops out, leaving
        // qubit 0 in |+>, so the return probability is exactly 1/2.
        let sim = SimulatorBackend::new().with_seed(3);
        let circuit = EchoSpec::new(DynamicsFamily::Chaotic, 4, 0)
            .build()
            .unwrap();
        let job_id = sim.submit(&circuit, 4096).await.unwrap();
        let result = sim.result(&job_id).await.unwrap();

        let f = result.return_probability(4);
        assert!((f - 0.5).abs() < 0.05, "F = {f}");
        // Only the two q0 branches of |0000> ever appear.
        assert_eq!(
            result.counts.get("0000") + result.counts.get("0001"),
            4096
        );
    }

    #[tokio::test]
    async fn test_echo_probability_is_physical() {
        let sim = SimulatorBackend::new().with_seed(5);
        for family in DynamicsFamily::ALL {
            let circuit = EchoSpec::new(family, 4, 6).build().unwrap();
            let job_id = sim.submit(&circuit, 1024).await.unwrap();
            let result = sim.result(&job_id).await.unwrap();

            let f = result.return_probability(4);
            assert!((0.0..=1.0).contains(&f), "family {family}: F = {f}");
            assert_eq!(result.counts.total_shots(), 1024);
        }
    }

    #[tokio::test]
    async fn test_measurement_map_respects_clbits() {
        // Measure only qubit 1 into clbit 0 after flipping it.
        let mut c = Circuit::with_size("partial", 2, 1);
        c.x(QubitId(1)).unwrap();
        c.measure(QubitId(1), kaelion_ir::ClbitId(0)).unwrap();

        let sim = SimulatorBackend::new();
        let job_id = sim.submit(&c, 50).await.unwrap();
        let result = sim.result(&job_id).await.unwrap();
        assert_eq!(result.counts.get("1"), 50);
    }
}
