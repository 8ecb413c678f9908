//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qfactor_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, MeasurementLayout,
    ValidationResult, has_reset, mid_circuit_violations,
};
use qfactor_ir::{Circuit, flatten};

use crate::statevector::Statevector;

/// Default qubit limit: 2^20 amplitudes is 16 MiB.
const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local dense statevector backend.
///
/// The state is evolved once per job and then sampled `shots` times. Circuits
/// containing a reset are re-simulated for every shot instead, since the
/// reset outcome is random.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Maximum number of qubits supported.
    max_qubits: u32,
    /// Sampling source, seeded from the configuration when requested.
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("statevector"), DEFAULT_MAX_QUBITS, None)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(BackendConfig::new("statevector"), max_qubits, None)
    }

    /// Create a simulator whose samples are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(BackendConfig::new("statevector"), DEFAULT_MAX_QUBITS, Some(seed))
    }

    fn build(config: BackendConfig, max_qubits: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let capabilities = Capabilities::simulator(config.name.clone(), max_qubits)
            .with_feature("statevector");
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            max_qubits,
            rng: Mutex::new(rng),
        }
    }

    fn check(&self, circuit: &Circuit) -> Vec<String> {
        let mut reasons = Vec::new();
        if circuit.num_qubits() > self.max_qubits as usize {
            reasons.push(format!(
                "Circuit has {} qubits but {} only supports {}",
                circuit.num_qubits(),
                self.config.name,
                self.max_qubits
            ));
            return reasons;
        }
        match flatten(circuit) {
            Ok(ops) => reasons.extend(mid_circuit_violations(&ops)),
            Err(e) => reasons.push(e.to_string()),
        }
        reasons
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        let ops = flatten(circuit).map_err(|e| HalError::InvalidCircuit(e.to_string()))?;
        let layout = MeasurementLayout::from_ops(&ops, circuit.num_qubits(), circuit.num_clbits());
        debug!(
            "Starting simulation: {} qubits, {} primitive ops, {} shots",
            circuit.num_qubits(),
            ops.len(),
            shots
        );

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut memory = Vec::with_capacity(shots as usize);

        if has_reset(&ops) {
            for _ in 0..shots {
                let mut sv = Statevector::new(circuit.num_qubits());
                for op in &ops {
                    sv.apply(op, &mut *rng);
                }
                let dist = WeightedIndex::new(sv.probabilities())
                    .map_err(|e| HalError::Backend(format!("degenerate state: {e}")))?;
                memory.push(layout.bitstring(dist.sample(&mut *rng)));
            }
        } else {
            let mut sv = Statevector::new(circuit.num_qubits());
            for op in &ops {
                sv.apply(op, &mut *rng);
            }
            debug!("Evolved {} amplitudes", sv.amplitudes().len());

            let dist = WeightedIndex::new(sv.probabilities())
                .map_err(|e| HalError::Backend(format!("degenerate state: {e}")))?;
            for _ in 0..shots {
                memory.push(layout.bitstring(dist.sample(&mut *rng)));
            }
        }

        let mut counts = Counts::new();
        for bitstring in &memory {
            counts.insert(bitstring.clone(), 1);
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::new(counts, shots)
            .with_memory(memory)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_metadata(serde_json::json!({
                "backend": self.config.name,
                "method": "statevector",
                "num_qubits": circuit.num_qubits(),
            })))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::from_reasons(self.check(circuit)))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, {} accepts 1..={}",
                self.config.name, self.capabilities.max_shots
            )));
        }

        // Validate circuit size
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.max_qubits
            )));
        }
        let reasons = self.check(circuit);
        if !reasons.is_empty() {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.config.name.clone());

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }

        debug!("Submitted job: {}", job_id);

        // Simulation runs inline; the job is terminal before `submit` returns.
        let outcome = self.run_simulation(circuit, shots);

        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            sim_job.job.transition(JobStatus::Running);
            match outcome {
                Ok(result) => {
                    sim_job.result = Some(result);
                    sim_job.job.transition(JobStatus::Completed);
                }
                Err(e) => sim_job.job.transition(JobStatus::Failed(e.to_string())),
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            sim_job.job.transition(JobStatus::Cancelled);
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.get_u64("max_qubits")? {
            Some(v) => u32::try_from(v)
                .ok()
                .filter(|&q| q <= 30)
                .ok_or_else(|| {
                    HalError::Configuration(format!("max_qubits {v} exceeds the dense limit of 30"))
                })?,
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.get_u64("seed")?;
        Ok(Self::build(config, max_qubits, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.has_feature("statevector"));
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::with_seed(1);

        let circuit = Circuit::bell().unwrap();
        let job_id = backend.submit(&circuit, 1000).await.unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert!(status.is_success());

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);
        assert_eq!(result.memory.as_ref().map(Vec::len), Some(1000));

        // Bell state should produce only 00 and 11
        let counts = &result.counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);

        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.submit(&circuit, 100).await;

        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::bell().unwrap();
        assert!(matches!(
            backend.submit(&circuit, 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(backend.cancel(&missing).await.is_err());
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("statevector")
            .with_extra("max_qubits", serde_json::json!(12))
            .with_extra("seed", serde_json::json!(99));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.capabilities().num_qubits, 12);

        let too_big = BackendConfig::new("statevector").with_extra("max_qubits", serde_json::json!(40));
        assert!(matches!(
            SimulatorBackend::from_config(too_big),
            Err(HalError::Configuration(_))
        ));
    }
}
