//! IBM Quantum Platform API client.
//!
//! Implements the IBM Quantum Cloud REST API (`quantum.cloud.ibm.com/api`):
//! IAM token exchange, device listing with least-busy selection, Sampler V2
//! job submission, status polling, and result retrieval.

use reqwest::{Client, header};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{IbmError, IbmResult};

/// IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// IBM Cloud IAM token endpoint.
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks the default reqwest UA).
const USER_AGENT: &str = "kaelion/0.3.0 (otoc-experiments)";

/// IBM Quantum API client.
///
/// The bearer token lives inside the client's default headers and is
/// deliberately not exposed anywhere, including `Debug` output.
pub struct IbmClient {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

impl IbmClient {
    /// Connect by exchanging an IBM Cloud API key for an IAM bearer token.
    ///
    /// The Service-CRN header required by the Quantum API is attached to
    /// every subsequent request.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let iam_response = iam_client
            .post(IAM_TOKEN_URL)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
            ))
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !iam_response.status().is_success() {
            let status = iam_response.status();
            let body = iam_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = iam_response
            .json()
            .await
            .map_err(|e| IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}")))?;
        let bearer_token = iam_token.access_token;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {bearer_token}"))
                .map_err(|_| IbmError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// List available devices with their configuration and queue status.
    pub async fn list_backends(&self) -> IbmResult<Vec<DeviceInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::Api {
                code: None,
                message: format!("list backends failed: {body}"),
            });
        }

        let devices: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(devices.devices.len());
        for device in &devices.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => {
                    tracing::warn!("skipping backend {}: {e}", device.name);
                }
            }
        }
        Ok(backends)
    }

    /// Fetch configuration and status for a single device.
    pub async fn get_backend(&self, name: &str) -> IbmResult<DeviceInfo> {
        let config_url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let config_response = self.client.get(&config_url).send().await?;

        if !config_response.status().is_success() {
            if config_response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            let body = config_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::Api {
                code: None,
                message: format!("backend configuration failed for {name}: {body}"),
            });
        }

        let config: BackendConfigResponse = config_response.json().await?;

        let status_url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let status_response = self.client.get(&status_url).send().await?;

        let (operational, pending_jobs) = if status_response.status().is_success() {
            let s: BackendStatusResponse = status_response.json().await?;
            (s.state, Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)))
        } else {
            // Config succeeded, so assume operational.
            (true, None)
        };

        Ok(DeviceInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            basis_gates: config.basis_gates,
            operational,
            pending_jobs,
            simulator: config.simulator.unwrap_or(false),
            max_shots: config.max_shots,
        })
    }

    /// Pick the operational hardware device with the shortest queue.
    ///
    /// Simulated devices are skipped so echo data always comes from real
    /// hardware when this selection path is used.
    pub async fn least_busy(&self, min_qubits: u32) -> IbmResult<DeviceInfo> {
        let backends = self.list_backends().await?;
        backends
            .into_iter()
            .filter(|b| {
                b.operational && !b.simulator && b.num_qubits >= min_qubits as usize
            })
            .min_by_key(|b| b.pending_jobs.unwrap_or(u32::MAX))
            .ok_or(IbmError::NoSuitableBackend(min_qubits))
    }

    /// Submit circuits through the Sampler V2 primitive.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);

        // Each PUB is (circuit, parameter bindings, shots). Optimization
        // level 1 lets IBM map virtual qubits onto hardware.
        let pubs: Vec<serde_json::Value> = circuits
            .into_iter()
            .map(|c| serde_json::json!([c, {}, shots]))
            .collect();

        let body = serde_json::json!({
            "program_id": "sampler",
            "backend": backend,
            "params": {
                "version": 2,
                "pubs": pubs,
                "options": { "optimization_level": 1 }
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::Api {
                code: None,
                message: format!("job submission failed: {body}"),
            });
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            let error: ApiErrorResponse = response.json().await?;
            return Err(IbmError::Api {
                code: error.code,
                message: error.message,
            });
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            let error: ApiErrorResponse = response.json().await?;
            return Err(IbmError::Api {
                code: error.code,
                message: error.message,
            });
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            let error: ApiErrorResponse = response.json().await?;
            return Err(IbmError::Api {
                code: error.code,
                message: error.message,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    length_queue: u64,
}

/// Merged device configuration and queue status.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device name, e.g. "ibm_torino".
    pub name: String,
    /// Number of physical qubits.
    pub num_qubits: usize,
    /// Native basis gates.
    pub basis_gates: Vec<String>,
    /// Whether the device is accepting jobs.
    pub operational: bool,
    /// Queue length, if reported.
    pub pending_jobs: Option<u32>,
    /// Whether this device is a hosted simulator.
    pub simulator: bool,
    /// Maximum shots per job, if reported.
    pub max_shots: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Initial status string.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Status string (mixed case on the Cloud API).
    pub status: String,
    /// State object with failure reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job state detail.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized(&self) -> String {
        self.status.to_uppercase()
    }

    /// Terminal states: completed, failed, or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.normalized().as_str(),
            "COMPLETED" | "FAILED" | "CANCELLED" | "ERROR"
        )
    }

    /// Successful completion.
    pub fn is_completed(&self) -> bool {
        self.normalized() == "COMPLETED"
    }

    /// Failed or errored.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized().as_str(), "FAILED" | "ERROR")
    }

    /// Cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized() == "CANCELLED"
    }

    /// Failure reason, if the API reported one.
    pub fn error_message(&self) -> Option<String> {
        self.state.as_ref().and_then(|s| s.reason.clone())
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Results from the Sampler primitive, one entry per PUB.
    pub results: Vec<SamplerResult>,
}

/// Sampler V2 result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// Map of classical register names to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Result metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Per-register sample data: one hex string per shot.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// Raw measurement samples, e.g. `["0x0", "0x3", ...]`.
    pub samples: Vec<String>,
    /// Register width in bits, when the API reports it.
    #[serde(default)]
    pub num_bits: Option<usize>,
}
