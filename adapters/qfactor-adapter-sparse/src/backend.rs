//! Sparse simulator backend.

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
use qfactor_ir::{Circuit, ControlledOp, flatten};

use crate::state::SparseState;

/// Basis indices are `usize` bit masks.
const INDEX_BITS: u32 = usize::BITS - 1;
const DEFAULT_MAX_QUBITS: u32 = 32;

struct SparseJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Sparse amplitude-map backend.
///
/// Memory grows with the number of populated basis states rather than with
/// `2^n`, so wide registers that stay close to a permutation of the
/// computational basis (as modular exponentiation does) are cheap.
pub struct SparseBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SparseJob>>>,
    max_qubits: u32,
    rng: Mutex<StdRng>,
}

impl SparseBackend {
    /// Create a sparse backend with default settings.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("sparse"), DEFAULT_MAX_QUBITS, None)
    }

    /// Create a backend whose samples are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(BackendConfig::new("sparse"), DEFAULT_MAX_QUBITS, Some(seed))
    }

    fn build(config: BackendConfig, max_qubits: u32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let capabilities =
            Capabilities::simulator(config.name.clone(), max_qubits).with_feature("sparse");
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            max_qubits,
            rng: Mutex::new(rng),
        }
    }

    fn lower(&self, circuit: &Circuit) -> HalResult<Vec<ControlledOp>> {
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but {} only supports {}",
                circuit.num_qubits(),
                self.config.name,
                self.max_qubits
            )));
        }
        let ops = flatten(circuit).map_err(|e| HalError::InvalidCircuit(e.to_string()))?;
        let problems = mid_circuit_violations(&ops);
        if problems.is_empty() {
            Ok(ops)
        } else {
            Err(HalError::InvalidCircuit(problems.join("; ")))
        }
    }

    fn evolve(&self, ops: &[ControlledOp], num_qubits: usize, rng: &mut StdRng) -> SparseState {
        let mut state = SparseState::new(num_qubits);
        for op in ops {
            state.apply(op, rng);
        }
        state
    }

    fn sampler(state: &SparseState) -> HalResult<(Vec<usize>, WeightedIndex<f64>)> {
        let (indices, weights): (Vec<_>, Vec<_>) = state.probabilities().into_iter().unzip();
        let dist = WeightedIndex::new(weights)
            .map_err(|e| HalError::Backend(format!("degenerate state: {e}")))?;
        Ok((indices, dist))
    }

    #[instrument(skip(self, circuit, ops), fields(circuit = circuit.name()))]
    fn run_simulation(
        &self,
        circuit: &Circuit,
        ops: &[ControlledOp],
        shots: u32,
    ) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let layout = MeasurementLayout::from_ops(ops, circuit.num_qubits(), circuit.num_clbits());
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut memory = Vec::with_capacity(shots as usize);
        let mut peak_support = 0;

        if has_reset(ops) {
            for _ in 0..shots {
                let state = self.evolve(ops, circuit.num_qubits(), &mut *rng);
                peak_support = peak_support.max(state.support());
                let (indices, dist) = Self::sampler(&state)?;
                memory.push(layout.bitstring(indices[dist.sample(&mut *rng)]));
            }
        } else {
            let state = self.evolve(ops, circuit.num_qubits(), &mut *rng);
            peak_support = state.support();
            debug!(
                "Evolved {} qubits into {} populated basis states",
                state.num_qubits(),
                peak_support
            );
            let (indices, dist) = Self::sampler(&state)?;
            for _ in 0..shots {
                memory.push(layout.bitstring(indices[dist.sample(&mut *rng)]));
            }
        }

        let mut counts = Counts::new();
        for bits in &memory {
            counts.insert(bits.as_str(), 1);
        }

        let elapsed = start.elapsed();
        debug!("Sparse simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::new(counts, shots)
            .with_memory(memory)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_metadata(serde_json::json!({
                "backend": self.config.name,
                "method": "sparse",
                "support": peak_support,
            })))
    }
}

impl Default for SparseBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SparseBackend {
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
        let reasons = match self.lower(circuit) {
            Ok(_) => vec![],
            Err(e) => vec![e.to_string()],
        };
        Ok(ValidationResult::from_reasons(reasons))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, {} accepts 1..={}",
                self.config.name, self.capabilities.max_shots
            )));
        }
        let ops = self.lower(circuit)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), shots).with_backend(self.config.name.clone());
        debug!("Submitted job: {}", job_id);

        job.transition(JobStatus::Running);
        let result = match self.run_simulation(circuit, &ops, shots) {
            Ok(result) => {
                job.transition(JobStatus::Completed);
                Some(result)
            }
            Err(e) => {
                job.transition(JobStatus::Failed(e.to_string()));
                None
            }
        };

        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.insert(job_id.0.clone(), SparseJob { job, result });
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
        let entry = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&entry.result, &entry.job.status) {
            (Some(result), _) => Ok(result.clone()),
            (None, JobStatus::Failed(msg)) => Err(HalError::JobFailed(msg.clone())),
            (None, _) => Err(HalError::JobNotFound(job_id.0.clone())),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        entry.job.transition(JobStatus::Cancelled);
        Ok(())
    }
}

impl BackendFactory for SparseBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.get_u64("max_qubits")? {
            Some(v) if v <= u64::from(INDEX_BITS) => v as u32,
            Some(v) => {
                return Err(HalError::Configuration(format!(
                    "max_qubits {v} exceeds the {INDEX_BITS}-bit basis index"
                )));
            }
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.get_u64("seed")?;
        Ok(Self::build(config, max_qubits, seed))
    }
}
