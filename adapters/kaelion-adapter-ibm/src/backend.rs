//! IBM Quantum backend implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use kaelion_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult, Job,
    JobId, JobStatus, ValidationResult,
};
use kaelion_ir::Circuit;

use crate::api::{DeviceInfo, IbmClient};
use crate::error::{IbmError, IbmResult};
use crate::qasm;

/// Default target device (Heron processor).
const DEFAULT_TARGET: &str = "ibm_torino";

/// IBM Quantum backend adapter.
///
/// Capabilities are fetched from the API at connect time, so qubit count
/// and shot limits always match the live device rather than a hardcoded
/// constant.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    capabilities: Capabilities,
    jobs: JobLedger,
}

/// A tracked submission: the HAL job record plus the classical register
/// width needed to decode its samples.
#[derive(Debug, Clone)]
struct SubmittedJob {
    job: Job,
    num_clbits: usize,
}

/// Jobs submitted through this backend instance.
///
/// Drives the Queued → Running → terminal transitions as statuses come
/// back from the API, and remembers each circuit's register width so
/// result decoding does not depend on which bits the shots happened to
/// set.
#[derive(Debug, Default)]
struct JobLedger(Mutex<HashMap<String, SubmittedJob>>);

impl JobLedger {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SubmittedJob>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, id: String, shots: u32, backend: &str, num_clbits: usize) {
        let job = Job::new(id.clone(), shots).with_backend(backend);
        self.lock().insert(id, SubmittedJob { job, num_clbits });
    }

    fn update(&self, id: &str, status: &JobStatus) {
        if let Some(tracked) = self.lock().get_mut(id) {
            tracked.job = tracked.job.clone().with_status(status.clone());
        }
    }

    fn job(&self, id: &str) -> Option<Job> {
        self.lock().get(id).map(|t| t.job.clone())
    }

    fn num_clbits(&self, id: &str) -> Option<usize> {
        self.lock().get(id).map(|t| t.num_clbits)
    }
}

impl IbmBackend {
    /// Connect to a specific IBM Quantum device.
    ///
    /// Reads `IBM_API_KEY` and `IBM_SERVICE_CRN` from the environment.
    pub async fn connect(target: impl Into<String>) -> IbmResult<Self> {
        let client = Self::client_from_env().await?;
        let target = target.into();
        let info = client.get_backend(&target).await?;
        Ok(Self::from_device(client, info))
    }

    /// Connect to the operational device with the shortest queue.
    pub async fn least_busy(min_qubits: u32) -> IbmResult<Self> {
        let client = Self::client_from_env().await?;
        let info = client.least_busy(min_qubits).await?;
        tracing::info!(
            device = %info.name,
            pending = ?info.pending_jobs,
            "selected least-busy IBM device"
        );
        Ok(Self::from_device(client, info))
    }

    /// Connect to the default target device.
    pub async fn connect_default() -> IbmResult<Self> {
        Self::connect(DEFAULT_TARGET).await
    }

    async fn client_from_env() -> IbmResult<IbmClient> {
        let api_key = std::env::var("IBM_API_KEY").map_err(|_| IbmError::MissingApiKey)?;
        let service_crn =
            std::env::var("IBM_SERVICE_CRN").map_err(|_| IbmError::MissingServiceCrn)?;
        tracing::info!("connecting to IBM Cloud API (IAM key exchange)");
        IbmClient::connect(&api_key, &service_crn).await
    }

    fn from_device(client: IbmClient, info: DeviceInfo) -> Self {
        let mut capabilities =
            Capabilities::ibm_heron(&info.name, u32::try_from(info.num_qubits).unwrap_or(u32::MAX));
        if let Some(max_shots) = info.max_shots {
            capabilities.max_shots = max_shots;
        }
        Self {
            client: Arc::new(client),
            target: info.name,
            capabilities,
            jobs: JobLedger::default(),
        }
    }

    /// The target device name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Tracked record for a job submitted through this backend instance.
    pub fn job(&self, job_id: &JobId) -> Option<Job> {
        self.jobs.job(&job_id.0)
    }

    /// Convert measurement results to counts.
    ///
    /// V2 Sampler results carry one hex sample per shot, per classical
    /// register. The register width comes from the result payload's
    /// `num_bits` when present, else from the submitted circuit's
    /// classical register (`fallback_width`). Inferring it from the
    /// samples alone would truncate bitstrings whenever no shot sets the
    /// top bit, and the echo signal concentrates on all-zeros.
    fn results_to_counts(
        results: &crate::api::JobResultResponse,
        fallback_width: Option<usize>,
    ) -> Counts {
        let mut counts = Counts::new();

        if let Some(result) = results.results.first() {
            if let Some(data) = &result.data {
                for register_data in data.values() {
                    let bit_width = register_data
                        .num_bits
                        .or(fallback_width)
                        .unwrap_or_else(|| infer_bit_width(&register_data.samples));

                    let mut sample_counts: HashMap<String, u64> = HashMap::new();
                    for sample in &register_data.samples {
                        let binary = hex_to_binary(sample, bit_width);
                        *sample_counts.entry(binary).or_insert(0) += 1;
                    }
                    for (bitstring, count) in sample_counts {
                        counts.add(bitstring, count);
                    }
                }
            }
        }

        counts
    }
}

/// Infer classical register bit width from hex samples.
///
/// Last-resort fallback for jobs whose width is known neither from the
/// result payload nor from a tracked submission. Uses the bit length of
/// the maximum sample value; all-zero samples still need one bit to
/// display "0".
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16).ok()
        })
        .max()
        .unwrap_or(0);

    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a hex sample to a binary string padded to `width` bits.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if let Ok(value) = u64::from_str_radix(hex, 16) {
        format!("{value:0>width$b}")
    } else {
        // Not hex, assume already binary.
        hex.to_string()
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.client.get_backend(&self.target).await {
            Ok(info) if info.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.pending_jobs,
                estimated_wait: None,
                status_message: None,
            }),
            Ok(_) => Ok(BackendAvailability::unavailable("device offline")),
            Err(e) => {
                tracing::warn!("IBM availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query device"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "circuit uses {} qubits, device has {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }

        for inst in circuit.instructions() {
            if inst.is_gate() && !caps.gate_set.contains(inst.name()) {
                reasons.push(format!("unsupported gate: {}", inst.name()));
                break;
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{} shots exceeds device limit of {}",
                shots, self.capabilities.max_shots
            )));
        }

        let qasm = qasm::emit(circuit).map_err(|e| HalError::InvalidCircuit(e.to_string()))?;

        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        tracing::info!(job_id = %response.id, device = %self.target, shots, "job submitted");
        self.jobs
            .record(response.id.clone(), shots, &self.target, circuit.num_clbits());
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(|e| match e {
                IbmError::JobNotFound(id) => HalError::JobNotFound(id),
                other => HalError::Backend(other.to_string()),
            })?;

        let job_status = match status.status.to_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "VALIDATING" | "RUNNING" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed(
                status
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            "CANCELLED" => JobStatus::Cancelled,
            // Unknown states are treated as still running.
            _ => JobStatus::Running,
        };

        self.jobs.update(&job_id.0, &job_status);
        Ok(job_status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        if !status.is_completed() {
            if status.is_failed() {
                return Err(HalError::JobFailed(
                    status
                        .error_message()
                        .unwrap_or_else(|| "job failed".to_string()),
                ));
            }
            if status.is_cancelled() {
                return Err(HalError::JobCancelled);
            }
            return Err(HalError::Backend(format!(
                "job {} not yet completed",
                job_id.0
            )));
        }

        let results = self
            .client
            .get_job_results(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        self.jobs.update(&job_id.0, &JobStatus::Completed);
        let counts = Self::results_to_counts(&results, self.jobs.num_clbits(&job_id.0));
        let total_shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);

        Ok(ExecutionResult::new(counts, total_shots, self.target.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client
            .cancel_job(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;
        self.jobs.update(&job_id.0, &JobStatus::Cancelled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClassicalRegisterData, JobResultResponse, SamplerResult};

    #[test]
    fn test_hex_to_binary_padding() {
        assert_eq!(hex_to_binary("0x0", 4), "0000");
        assert_eq!(hex_to_binary("0x1", 5), "00001");
        assert_eq!(hex_to_binary("0x3", 4), "0011");
        assert_eq!(hex_to_binary("0xf", 4), "1111");
    }

    #[test]
    fn test_infer_bit_width() {
        let samples: Vec<String> = vec!["0x0".into(), "0x3".into()];
        assert_eq!(infer_bit_width(&samples), 2);

        let samples: Vec<String> = vec!["0x0".into(), "0xf".into()];
        assert_eq!(infer_bit_width(&samples), 4);

        let samples: Vec<String> = vec!["0x0".into(), "0x0".into()];
        assert_eq!(infer_bit_width(&samples), 1);
    }

    fn response(samples: Vec<&str>, num_bits: Option<usize>) -> JobResultResponse {
        let mut data = HashMap::new();
        data.insert(
            "c".to_string(),
            ClassicalRegisterData {
                samples: samples.into_iter().map(String::from).collect(),
                num_bits,
            },
        );
        JobResultResponse {
            results: vec![SamplerResult {
                data: Some(data),
                metadata: None,
            }],
        }
    }

    #[test]
    fn test_results_to_counts_v2() {
        // 4-qubit echo: 3 returns to all-zeros, 1 escape to 0b1000.
        let results = response(vec!["0x0", "0x0", "0x8", "0x0"], Some(4));

        let counts = IbmBackend::results_to_counts(&results, None);
        assert_eq!(counts.get("0000"), 3);
        assert_eq!(counts.get("1000"), 1);
        assert_eq!(counts.total_shots(), 4);
    }

    #[test]
    fn test_perfect_echo_keeps_register_width() {
        // Every shot returned to all-zeros: nothing in the data says how
        // wide the register is, and F must still come out as 1, not 0.
        let results = response(vec!["0x0", "0x0", "0x0", "0x0"], Some(4));

        let counts = IbmBackend::results_to_counts(&results, None);
        assert_eq!(counts.get("0000"), 4);

        let result = ExecutionResult::new(counts, 4, "ibm_torino");
        assert_eq!(result.return_probability(4), 1.0);
    }

    #[test]
    fn test_tracked_width_pads_narrow_samples() {
        // No num_bits in the payload; the width recorded at submit time
        // must pad samples that never set the high bits.
        let results = response(vec!["0x0", "0x0", "0x3", "0x0"], None);

        let counts = IbmBackend::results_to_counts(&results, Some(4));
        assert_eq!(counts.get("0000"), 3);
        assert_eq!(counts.get("0011"), 1);

        let result = ExecutionResult::new(counts, 4, "ibm_torino");
        assert_eq!(result.return_probability(4), 0.75);
    }

    #[test]
    fn test_width_inference_is_last_resort() {
        // Unknown job from another process, pre-num_bits payload: the
        // old sample-based inference still applies.
        let results = response(vec!["0x0", "0xf"], None);
        let counts = IbmBackend::results_to_counts(&results, None);
        assert_eq!(counts.get("0000"), 1);
        assert_eq!(counts.get("1111"), 1);
    }

    #[test]
    fn test_results_to_counts_empty() {
        let results = JobResultResponse { results: vec![] };
        let counts = IbmBackend::results_to_counts(&results, None);
        assert_eq!(counts.total_shots(), 0);
    }

    #[test]
    fn test_job_ledger_transitions() {
        let ledger = JobLedger::default();
        ledger.record("job-1".to_string(), 4096, "ibm_torino", 4);

        let job = ledger.job("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.shots, 4096);
        assert_eq!(ledger.num_clbits("job-1"), Some(4));

        ledger.update("job-1", &JobStatus::Running);
        let job = ledger.job("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.finished_at.is_none());

        ledger.update("job-1", &JobStatus::Completed);
        let job = ledger.job("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.finished_at.is_some());

        // Unknown jobs are ignored, not invented.
        ledger.update("job-2", &JobStatus::Cancelled);
        assert!(ledger.job("job-2").is_none());
    }
}
