//! Constraints
//!
//! Each constraint returns its raw violation: non-positive when satisfied,
//! positive by the amount of violation otherwise. The energy assembler
//! applies the exterior-point penalty and weighting.

use linkme::distributed_slice;

use vellum_foundation::ArgVal;
use vellum_registry::{Arity, EnergyDescriptor, FnError, CONSTRAINTS};

use crate::args;

const MIN_SIZE: f64 = 20.0;
const MAX_SIZE: f64 = 700.0;
const DISJOINT_PADDING: f64 = 10.0;

fn positive(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    Ok(-args::val_float("positive", a, 0)?)
}

#[distributed_slice(CONSTRAINTS)]
static POSITIVE: EnergyDescriptor = EnergyDescriptor {
    name: "positive",
    signature: "positive(x): x > 0",
    arity: Arity::Fixed(1),
    implementation: positive,
};

fn less_than(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let x = args::val_float("lessThan", a, 0)?;
    let y = args::val_float("lessThan", a, 1)?;
    Ok(x - y)
}

#[distributed_slice(CONSTRAINTS)]
static LESS_THAN: EnergyDescriptor = EnergyDescriptor {
    name: "lessThan",
    signature: "lessThan(x, y): x < y",
    arity: Arity::Fixed(2),
    implementation: less_than,
};

fn min_size(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let s = args::size("minSize", args::gpi("minSize", a, 0)?, 0)?;
    Ok(MIN_SIZE - s)
}

#[distributed_slice(CONSTRAINTS)]
static MIN_SIZE_FN: EnergyDescriptor = EnergyDescriptor {
    name: "minSize",
    signature: "minSize(s): size(s) > 20",
    arity: Arity::Fixed(1),
    implementation: min_size,
};

fn max_size(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let s = args::size("maxSize", args::gpi("maxSize", a, 0)?, 0)?;
    Ok(s - MAX_SIZE)
}

#[distributed_slice(CONSTRAINTS)]
static MAX_SIZE_FN: EnergyDescriptor = EnergyDescriptor {
    name: "maxSize",
    signature: "maxSize(s): size(s) < 700",
    arity: Arity::Fixed(1),
    implementation: max_size,
};

fn contains(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let outer = args::gpi("contains", a, 0)?;
    let inner = args::gpi("contains", a, 1)?;
    let d = args::dist2(
        args::center("contains", outer, 0)?,
        args::center("contains", inner, 1)?,
    )
    .sqrt();
    let r_outer = args::size("contains", outer, 0)? / 2.0;
    let r_inner = args::size("contains", inner, 1)? / 2.0;
    Ok(d + r_inner - r_outer)
}

#[distributed_slice(CONSTRAINTS)]
static CONTAINS: EnergyDescriptor = EnergyDescriptor {
    name: "contains",
    signature: "contains(outer, inner)",
    arity: Arity::Fixed(2),
    implementation: contains,
};

fn disjoint(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let s = args::gpi("disjoint", a, 0)?;
    let t = args::gpi("disjoint", a, 1)?;
    let d = args::dist2(
        args::center("disjoint", s, 0)?,
        args::center("disjoint", t, 1)?,
    )
    .sqrt();
    let r_s = args::size("disjoint", s, 0)? / 2.0;
    let r_t = args::size("disjoint", t, 1)? / 2.0;
    Ok(r_s + r_t + DISJOINT_PADDING - d)
}

#[distributed_slice(CONSTRAINTS)]
static DISJOINT: EnergyDescriptor = EnergyDescriptor {
    name: "disjoint",
    signature: "disjoint(a, b)",
    arity: Arity::Fixed(2),
    implementation: disjoint,
};

fn smaller_than(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let s = args::size("smallerThan", args::gpi("smallerThan", a, 0)?, 0)?;
    let t = args::size("smallerThan", args::gpi("smallerThan", a, 1)?, 1)?;
    Ok(s - t)
}

#[distributed_slice(CONSTRAINTS)]
static SMALLER_THAN: EnergyDescriptor = EnergyDescriptor {
    name: "smallerThan",
    signature: "smallerThan(a, b): size(a) < size(b)",
    arity: Arity::Fixed(2),
    implementation: smaller_than,
};

fn outside_of(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let s = args::gpi("outsideOf", a, 0)?;
    let t = args::gpi("outsideOf", a, 1)?;
    let d = args::dist2(
        args::center("outsideOf", s, 0)?,
        args::center("outsideOf", t, 1)?,
    )
    .sqrt();
    let r_t = args::size("outsideOf", t, 1)? / 2.0;
    Ok(r_t - d)
}

#[distributed_slice(CONSTRAINTS)]
static OUTSIDE_OF: EnergyDescriptor = EnergyDescriptor {
    name: "outsideOf",
    signature: "outsideOf(a, b)",
    arity: Arity::Fixed(2),
    implementation: outside_of,
};

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use vellum_foundation::{ArgVal, Shape, Value};
    use vellum_registry::apply_constraint;

    fn circle(x: f64, y: f64, r: f64) -> ArgVal<f64> {
        let mut properties = IndexMap::new();
        properties.insert("x".to_string(), Value::Float(x));
        properties.insert("y".to_string(), Value::Float(y));
        properties.insert("r".to_string(), Value::Float(r));
        ArgVal::Gpi(Shape {
            shape_type: "Circle".to_string(),
            properties,
        })
    }

    #[test]
    fn test_positive_violation() {
        let out = apply_constraint("positive", &[ArgVal::Val(Value::Float(-2.0))]).unwrap();
        assert_eq!(out, 2.0);
        let ok = apply_constraint("positive", &[ArgVal::Val(Value::Float(3.0))]).unwrap();
        assert!(ok <= 0.0);
    }

    #[test]
    fn test_contains_satisfied_and_violated() {
        let outer = circle(0.0, 0.0, 50.0);
        let inner = circle(10.0, 0.0, 10.0);
        assert!(apply_constraint("contains", &[outer.clone(), inner]).unwrap() <= 0.0);

        let escaped = circle(100.0, 0.0, 10.0);
        assert!(apply_constraint("contains", &[outer, escaped]).unwrap() > 0.0);
    }

    #[test]
    fn test_min_size_on_small_circle() {
        let tiny = circle(0.0, 0.0, 2.0);
        // diameter 4 < 20
        assert_eq!(apply_constraint("minSize", &[tiny]).unwrap(), 16.0);
    }
}
