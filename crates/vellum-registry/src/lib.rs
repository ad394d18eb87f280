//! Function and shape registries
//!
//! Provides distributed registration for the three function dictionaries the
//! evaluator and energy assembler dispatch through — computations,
//! objectives, and constraints — plus the shape catalog that types and
//! samples graphical-primitive properties.
//!
//! # Architecture
//!
//! Registration uses [`linkme::distributed_slice`]:
//!
//! 1. Implementations declare a descriptor static tagged with
//!    `#[distributed_slice(...)]` against one of the four slices below.
//! 2. At link time all registrations are collected.
//! 3. At runtime the registry provides lookup by name, arity checking, and
//!    dispatch.
//!
//! This keeps implementations definable anywhere in the workspace (including
//! downstream crates) while remaining discoverable by name.

use linkme::distributed_slice;
use thiserror::Error;

use vellum_foundation::{ArgVal, Canvas, RngStream, Value, ValueType};

/// Errors raised by registry lookup and dispatch.
#[derive(Debug, Error)]
pub enum FnError {
    #[error("unknown computation: {0}")]
    UnknownComputation(String),

    #[error("unknown objective: {0}")]
    UnknownObjective(String),

    #[error("unknown constraint: {0}")]
    UnknownConstraint(String),

    #[error("unknown shape type: {0}")]
    UnknownShape(String),

    #[error("{name} expects {expected} arguments, found {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{name}: argument {index} has the wrong type: {message}")]
    ArgType {
        name: &'static str,
        index: usize,
        message: String,
    },
}

/// Fixed or variadic argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

impl Arity {
    /// Check a call's argument count against this arity.
    pub fn check(&self, name: &'static str, found: usize) -> Result<(), FnError> {
        match self {
            Arity::Fixed(expected) if *expected != found => Err(FnError::Arity {
                name,
                expected: *expected,
                found,
            }),
            _ => Ok(()),
        }
    }
}

/// A computation: pure over its value arguments apart from explicit RNG use.
pub type CompFn = fn(&[Value<f64>], &mut RngStream) -> Result<Value<f64>, FnError>;

/// An objective or constraint body over evaluated arguments.
///
/// Objectives return the quantity to minimize; constraints return their raw
/// violation (non-positive when satisfied).
pub type EnergyFn = fn(&[ArgVal<f64>]) -> Result<f64, FnError>;

/// A property sampler, drawing from the stream against canvas dimensions.
pub type SamplerFn = fn(&mut RngStream, &Canvas) -> Value<f64>;

/// A computed-property body over its evaluated argument properties.
pub type ComputeFn = fn(&[Value<f64>]) -> Result<Value<f64>, FnError>;

/// Descriptor for a registered computation.
pub struct CompDescriptor {
    /// DSL name (e.g. `"rgba"`, `"midpoint"`).
    pub name: &'static str,
    /// Signature string for diagnostics (e.g. `"rgba(r, g, b, a) -> Color"`).
    pub signature: &'static str,
    pub arity: Arity,
    pub implementation: CompFn,
}

/// Descriptor for a registered objective or constraint.
pub struct EnergyDescriptor {
    pub name: &'static str,
    pub signature: &'static str,
    pub arity: Arity,
    pub implementation: EnergyFn,
}

/// One property in a shape's schema: name, value type, and sampler.
pub struct PropertySpec {
    pub name: &'static str,
    pub ty: ValueType,
    pub sampler: SamplerFn,
}

/// A property derived from sibling properties rather than stored.
pub struct ComputedProperty {
    pub name: &'static str,
    /// Sibling property names evaluated as the compute arguments.
    pub args: &'static [&'static str],
    pub compute: ComputeFn,
}

/// Descriptor for a shape type in the catalog.
pub struct ShapeDescriptor {
    /// Type name (e.g. `"Circle"`).
    pub name: &'static str,
    /// Ordered property schema. A function because specs hold owned data.
    pub schema: fn() -> Vec<PropertySpec>,
    /// Properties whose values arrive externally after evaluation.
    pub pending: &'static [&'static str],
    /// Objective names attached to every instance of this type.
    pub default_objectives: &'static [&'static str],
    /// Constraint names attached to every instance of this type.
    pub default_constraints: &'static [&'static str],
    /// Properties computed from siblings at lookup time.
    pub computed: &'static [ComputedProperty],
}

/// All registered computations.
#[distributed_slice]
pub static COMPUTATIONS: [CompDescriptor];

/// All registered objectives.
#[distributed_slice]
pub static OBJECTIVES: [EnergyDescriptor];

/// All registered constraints.
#[distributed_slice]
pub static CONSTRAINTS: [EnergyDescriptor];

/// All registered shape types.
#[distributed_slice]
pub static SHAPES: [ShapeDescriptor];

/// Look up a computation by name.
pub fn computation(name: &str) -> Result<&'static CompDescriptor, FnError> {
    COMPUTATIONS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| FnError::UnknownComputation(name.to_string()))
}

/// Look up an objective by name.
pub fn objective(name: &str) -> Result<&'static EnergyDescriptor, FnError> {
    OBJECTIVES
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| FnError::UnknownObjective(name.to_string()))
}

/// Look up a constraint by name.
pub fn constraint(name: &str) -> Result<&'static EnergyDescriptor, FnError> {
    CONSTRAINTS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| FnError::UnknownConstraint(name.to_string()))
}

/// Look up a shape type by name.
pub fn shape(name: &str) -> Result<&'static ShapeDescriptor, FnError> {
    SHAPES
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| FnError::UnknownShape(name.to_string()))
}

/// Whether a property of a shape type is pending external substitution.
pub fn is_pending(shape_type: &str, property: &str) -> bool {
    shape(shape_type)
        .map(|d| d.pending.contains(&property))
        .unwrap_or(false)
}

/// The computed-property entry for `(shape_type, property)`, if any.
pub fn computed_property(shape_type: &str, property: &str) -> Option<&'static ComputedProperty> {
    shape(shape_type)
        .ok()?
        .computed
        .iter()
        .find(|c| c.name == property)
}

/// Invoke a computation with arity checking.
pub fn apply_computation(
    name: &str,
    args: &[Value<f64>],
    rng: &mut RngStream,
) -> Result<Value<f64>, FnError> {
    let desc = computation(name)?;
    desc.arity.check(desc.name, args.len())?;
    (desc.implementation)(args, rng)
}

/// Invoke an objective with arity checking.
pub fn apply_objective(name: &str, args: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let desc = objective(name)?;
    desc.arity.check(desc.name, args.len())?;
    (desc.implementation)(args)
}

/// Invoke a constraint with arity checking.
pub fn apply_constraint(name: &str, args: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let desc = constraint(name)?;
    desc.arity.check(desc.name, args.len())?;
    (desc.implementation)(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test entries registered via the slices directly.
    #[distributed_slice(COMPUTATIONS)]
    static TEST_DOUBLE: CompDescriptor = CompDescriptor {
        name: "test_double",
        signature: "test_double(x) -> Float",
        arity: Arity::Fixed(1),
        implementation: |args, _rng| {
            let x = args[0].as_float().ok_or(FnError::ArgType {
                name: "test_double",
                index: 0,
                message: "expected Float".to_string(),
            })?;
            Ok(Value::Float(x * 2.0))
        },
    };

    #[distributed_slice(OBJECTIVES)]
    static TEST_IDENTITY: EnergyDescriptor = EnergyDescriptor {
        name: "test_identity",
        signature: "test_identity(x) -> Float",
        arity: Arity::Fixed(1),
        implementation: |args| {
            args[0]
                .as_val()
                .and_then(Value::as_float)
                .ok_or(FnError::ArgType {
                    name: "test_identity",
                    index: 0,
                    message: "expected Float".to_string(),
                })
        },
    };

    #[test]
    fn test_lookup() {
        assert!(computation("test_double").is_ok());
        assert!(matches!(
            computation("missing"),
            Err(FnError::UnknownComputation(_))
        ));
    }

    #[test]
    fn test_apply_with_arity_check() {
        let mut rng = RngStream::new(17);
        let out = apply_computation("test_double", &[Value::Float(4.0)], &mut rng).unwrap();
        assert_eq!(out, Value::Float(8.0));

        let err = apply_computation("test_double", &[], &mut rng).unwrap_err();
        assert!(matches!(err, FnError::Arity { expected: 1, found: 0, .. }));
    }

    #[test]
    fn test_apply_objective() {
        let out = apply_objective("test_identity", &[ArgVal::Val(Value::Float(5.0))]).unwrap();
        assert_eq!(out, 5.0);
    }
}
