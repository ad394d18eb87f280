//! Energy assembly
//!
//! Evaluates every declared objective and constraint under a varying
//! overlay and combines them into one scalar:
//!
//! `energy = Σ objectives + constr_weight · weight · Σ penalty(constraints)`
//!
//! Constraint bodies return their raw violation; the exterior-point penalty
//! `max(0, v)²` is applied here. Evaluation runs against a scratch copy of
//! the translation so a failure never leaves a memoized intermediate in the
//! authoritative store.

use vellum_foundation::{Path, RngStream};
use vellum_ir::{FnSpec, Translation};
use vellum_registry as registry;

use crate::config::CONSTR_WEIGHT;
use crate::error::Result;
use crate::eval::{make_overlay, Evaluator};

/// Exterior-point penalty: zero when satisfied, quadratic in the violation.
pub fn penalty(violation: f64) -> f64 {
    violation.max(0.0).powi(2)
}

/// Evaluate the combined energy at one varying state.
pub fn eval_energy_on(
    trans: &Translation<f64>,
    obj_fns: &[FnSpec<f64>],
    constr_fns: &[FnSpec<f64>],
    varying_paths: &[Path],
    weight: f64,
    varying_state: &[f64],
    rng: &mut RngStream,
) -> Result<f64> {
    let overlay = make_overlay(varying_paths, varying_state);
    let evaluator = Evaluator::new(&overlay);
    let mut scratch = trans.clone();

    let mut objective_sum = 0.0;
    for spec in obj_fns {
        let args = evaluator.eval_exprs(0, &spec.args, &mut scratch, rng)?;
        objective_sum += registry::apply_objective(&spec.name, &args)?;
    }

    let mut penalty_sum = 0.0;
    for spec in constr_fns {
        let args = evaluator.eval_exprs(0, &spec.args, &mut scratch, rng)?;
        penalty_sum += penalty(registry::apply_constraint(&spec.name, &args)?);
    }

    Ok(objective_sum + CONSTR_WEIGHT * weight * penalty_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_shape() {
        assert_eq!(penalty(-1.0), 0.0);
        assert_eq!(penalty(0.0), 0.0);
        assert_eq!(penalty(2.0), 4.0);
    }

    #[test]
    fn test_empty_problem_has_zero_energy() {
        let trans: Translation<f64> = Translation::new();
        let mut rng = RngStream::new(17);
        let e = eval_energy_on(&trans, &[], &[], &[], 1e-3, &[], &mut rng).unwrap();
        assert_eq!(e, 0.0);
    }
}
