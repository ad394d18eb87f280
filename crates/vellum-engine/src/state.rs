//! State lifecycle
//!
//! Assembles the optimization problem from a translation: analysis, initial
//! sampling, function harvesting, and the varying-state vector. Shapes are
//! *not* evaluated at build time — that is deferred to the renderer so an
//! unresolved computation name is not a build-time error. Resampling draws
//! fresh candidates and keeps the one with the lowest energy.

use indexmap::IndexMap;
use tracing::{debug, info};

use vellum_foundation::{ArgVal, Path, RngStream, Shape, Value};
use vellum_ir::{analyze, FnSpec, TagExpr, Translation};

use crate::config::{EngineConfig, OptConfig, Params};
use crate::energy;
use crate::error::{CompilerError, Error, Result};
use crate::eval::{make_overlay, Evaluator};
use crate::layering;
use crate::sampler::{self, SampleMode};

/// Label dimensions supplied by the upstream compiler, keyed by object
/// name.
pub type LabelMap = IndexMap<String, (f64, f64)>;

/// The frozen output of core initialization.
#[derive(Debug, Clone)]
pub struct State {
    /// Evaluated shapes in declaration order; empty until the first
    /// [`State::eval_translation`] or resample.
    pub shapes: Vec<Shape<f64>>,
    pub shape_paths: Vec<Path>,
    pub shape_ordering: Vec<String>,
    pub shape_properties: Vec<(String, String, String)>,
    /// Source of truth for re-evaluation; sampled but never evaluated in
    /// place.
    pub translation: Translation<f64>,
    pub varying_paths: Vec<Path>,
    pub uninitialized_paths: Vec<Path>,
    pub pending_paths: Vec<Path>,
    pub varying_state: Vec<f64>,
    pub params: Params,
    pub obj_fns: Vec<FnSpec<f64>>,
    pub constr_fns: Vec<FnSpec<f64>>,
    pub rng: RngStream,
    pub config: EngineConfig,
}

impl State {
    pub fn opt_config(&self) -> OptConfig {
        self.config.opt
    }

    /// Evaluate every shape under the current varying state.
    ///
    /// Works on a copy of the translation: the returned store carries the
    /// memoized results, the state's own translation is untouched, and a
    /// failed evaluation leaves no partial memoization anywhere.
    pub fn eval_translation(&self) -> Result<(Vec<Shape<f64>>, Translation<f64>, RngStream)> {
        let mut rng = self.rng;
        let mut trans = self.translation.clone();
        let shapes = eval_shapes(
            &mut trans,
            &self.shape_paths,
            &self.varying_paths,
            &self.varying_state,
            &mut rng,
        )?;
        Ok((shapes, trans, rng))
    }

    /// Energy at the current varying state.
    pub fn eval_energy(&self) -> Result<f64> {
        self.eval_energy_on(&self.varying_state)
    }

    /// Energy at an arbitrary varying state, using the current penalty
    /// weight.
    pub fn eval_energy_on(&self, varying_state: &[f64]) -> Result<f64> {
        let mut rng = self.rng;
        energy::eval_energy_on(
            &self.translation,
            &self.obj_fns,
            &self.constr_fns,
            &self.varying_paths,
            self.params.weight,
            varying_state,
            &mut rng,
        )
    }

    /// Resample once.
    pub fn resample_one(self) -> Result<State> {
        self.resample_best(1)
    }

    /// Resample with the default draw count.
    pub fn resample(self) -> Result<State> {
        self.resample_best(crate::config::DEFAULT_SAMPLE_COUNT)
    }

    /// Draw `n` fresh candidates and keep the one with the lowest energy.
    ///
    /// Applying the winner installs its shapes, clears translation
    /// warnings, and resets the penalty weight and optimizer status.
    pub fn resample_best(self, n: u32) -> Result<State> {
        let draws = n.max(1);
        let canvas = self.config.canvas;
        let mut rng = self.rng;
        let mut best: Option<(f64, Translation<f64>, Vec<f64>)> = None;

        for draw in 0..draws {
            let mut candidate = self.translation.clone();
            sampler::sample_varying_fields(&mut candidate, &self.varying_paths, &canvas, &mut rng)?;
            sampler::sample_shapes(
                &mut candidate,
                &self.shape_paths,
                &canvas,
                &mut rng,
                SampleMode::Resample,
            )?;
            sampler::fill_unresolved_varying(&mut candidate, &self.varying_paths, &canvas, &mut rng)?;
            let varying_state = sampler::read_varying(&candidate, &self.varying_paths)?;

            // Energy evaluation forks the stream; only sampling advances it.
            let mut energy_rng = rng;
            let e = energy::eval_energy_on(
                &candidate,
                &self.obj_fns,
                &self.constr_fns,
                &self.varying_paths,
                self.params.weight,
                &varying_state,
                &mut energy_rng,
            )?;
            debug!(draw, energy = e, "resample candidate");

            if best.as_ref().is_none_or(|(best_e, _, _)| e < *best_e) {
                best = Some((e, candidate, varying_state));
            }
        }

        let (best_energy, mut translation, varying_state) =
            best.expect("resample always draws at least once");
        info!(draws, energy = best_energy, "resample winner selected");
        translation.clear_warnings();

        let mut scratch = translation.clone();
        let shapes = eval_shapes(
            &mut scratch,
            &self.shape_paths,
            &self.varying_paths,
            &varying_state,
            &mut rng,
        )?;
        let pending_paths = analyze::pending_paths(&translation);

        Ok(State {
            shapes,
            pending_paths,
            translation,
            varying_state,
            params: Params::default(),
            rng,
            ..self
        })
    }
}

/// Evaluate every shape path in declaration order against `scratch`,
/// which accumulates the memoized results.
fn eval_shapes(
    scratch: &mut Translation<f64>,
    shape_paths: &[Path],
    varying_paths: &[Path],
    varying_state: &[f64],
    rng: &mut RngStream,
) -> Result<Vec<Shape<f64>>> {
    let overlay = make_overlay(varying_paths, varying_state);
    let evaluator = Evaluator::new(&overlay);
    let mut shapes = Vec::with_capacity(shape_paths.len());
    for path in shape_paths {
        match evaluator.eval_path(0, path, scratch, rng)? {
            ArgVal::Gpi(shape) => shapes.push(shape),
            ArgVal::Val(_) => {
                return Err(Error::Ir(vellum_ir::Error::ExpectedGpi(path.clone())))
            }
        }
    }
    Ok(shapes)
}

/// Build the initial optimization problem and state.
///
/// This is the core's compile entry: the upstream parser/typechecker has
/// already produced the translation and label data. Layering cycles surface
/// as [`CompilerError::StyleLayering`]; every other fatal error as
/// [`CompilerError::StyleTypecheck`].
pub fn compile(
    translation: Translation<f64>,
    labels: &LabelMap,
    config: EngineConfig,
) -> std::result::Result<State, CompilerError> {
    let shape_ordering = layering::compute_layering(&translation)
        .map_err(|e| CompilerError::StyleLayering(e.to_string()))?
        .ok_or_else(|| {
            CompilerError::StyleLayering("layering declarations form a cycle".to_string())
        })?;
    build_state(translation, labels, config, shape_ordering).map_err(CompilerError::from)
}

fn build_state(
    mut trans: Translation<f64>,
    labels: &LabelMap,
    config: EngineConfig,
    shape_ordering: Vec<String>,
) -> Result<State> {
    let varying_paths = analyze::varying_paths(&trans)?;
    let uninitialized_paths = analyze::uninitialized_paths(&trans)?;
    let shape_paths = analyze::shape_paths(&trans);

    let mut rng = RngStream::new(config.seed);
    sampler::sample_varying_fields(&mut trans, &varying_paths, &config.canvas, &mut rng)?;
    sampler::sample_shapes(
        &mut trans,
        &shape_paths,
        &config.canvas,
        &mut rng,
        SampleMode::Initial,
    )?;
    sampler::fill_unresolved_varying(&mut trans, &varying_paths, &config.canvas, &mut rng)?;
    install_labels(&mut trans, &shape_paths, labels)?;

    let pending_paths = analyze::pending_paths(&trans);
    let shape_properties = analyze::shape_properties(&trans);

    let (mut obj_fns, mut constr_fns) = analyze::declared_fns(&trans);
    let (default_objs, default_constrs) = analyze::default_fns(&trans)?;
    obj_fns.extend(default_objs);
    constr_fns.extend(default_constrs);

    let varying_state = sampler::read_varying(&trans, &varying_paths)?;
    info!(
        shapes = shape_paths.len(),
        varying = varying_paths.len(),
        objectives = obj_fns.len(),
        constraints = constr_fns.len(),
        "optimization problem assembled"
    );

    Ok(State {
        shapes: Vec::new(),
        shape_paths,
        shape_ordering,
        shape_properties,
        translation: trans,
        varying_paths,
        uninitialized_paths,
        pending_paths,
        varying_state,
        params: Params::default(),
        obj_fns,
        constr_fns,
        rng,
        config,
    })
}

/// Install known label dimensions as pending values on text shapes.
fn install_labels(
    trans: &mut Translation<f64>,
    shape_paths: &[Path],
    labels: &LabelMap,
) -> Result<()> {
    for shape_path in shape_paths {
        let Path::Field { object, field } = shape_path else {
            continue;
        };
        let is_text = trans.gpi(object, field).map_err(Error::Ir)?.0 == "Text";
        if !is_text {
            continue;
        }
        if let Some((w, h)) = labels.get(object.name()) {
            trans
                .override_path(
                    &Path::property(object.clone(), field, "w"),
                    TagExpr::Pending(Value::Float(*w)),
                )
                .map_err(Error::Ir)?;
            trans
                .override_path(
                    &Path::property(object.clone(), field, "h"),
                    TagExpr::Pending(Value::Float(*h)),
                )
                .map_err(Error::Ir)?;
        }
    }
    Ok(())
}
