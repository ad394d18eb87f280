//! Engine configuration and optimizer control block

use serde::{Deserialize, Serialize};

use vellum_foundation::Canvas;

/// Maximum recursion depth of the evaluator. Exceeding it means the
/// expression graph has an unresolved cycle.
pub const MAX_EVAL_DEPTH: u32 = 500;

/// Multiplier applied to the summed constraint penalties.
pub const CONSTR_WEIGHT: f64 = 1e4;

/// Initial exterior-point penalty weight.
pub const INIT_WEIGHT: f64 = 1e-3;

/// Default number of draws for resample-best.
pub const DEFAULT_SAMPLE_COUNT: u32 = 500;

/// Default seed; fixed so test runs are reproducible.
pub const DEFAULT_SEED: u64 = 17;

/// Optimization method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    GradientDescent,
    Newton,
    Bfgs,
    #[default]
    Lbfgs,
}

/// Optimizer configuration handed through to the external optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptConfig {
    pub method: Method,
}

/// Where the optimizer is in its outer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptStatus {
    #[default]
    NewIter,
    UnconstrainedRunning,
    UnconstrainedConverged,
    EpConverged,
}

/// L-BFGS memory carried between optimizer steps.
#[derive(Debug, Clone, PartialEq)]
pub struct BfgsParams {
    pub last_state: Option<Vec<f64>>,
    pub last_grad: Option<Vec<f64>>,
    pub inv_h: Option<Vec<Vec<f64>>>,
    pub s_list: Vec<Vec<f64>>,
    pub y_list: Vec<Vec<f64>>,
    pub num_unconstr_steps: u32,
    pub mem_size: usize,
}

impl Default for BfgsParams {
    fn default() -> Self {
        Self {
            last_state: None,
            last_grad: None,
            inv_h: None,
            s_list: Vec::new(),
            y_list: Vec::new(),
            num_unconstr_steps: 0,
            mem_size: 17,
        }
    }
}

/// Optimizer control block carried on the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub weight: f64,
    pub status: OptStatus,
    pub bfgs: BfgsParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            weight: INIT_WEIGHT,
            status: OptStatus::NewIter,
            bfgs: BfgsParams::default(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub canvas: Canvas,
    pub seed: u64,
    pub opt: OptConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            seed: DEFAULT_SEED,
            opt: OptConfig::default(),
        }
    }
}
