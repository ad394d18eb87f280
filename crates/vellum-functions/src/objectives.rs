//! Objectives
//!
//! Each objective returns the quantity the optimizer should minimize over
//! its evaluated arguments.

use linkme::distributed_slice;

use vellum_foundation::ArgVal;
use vellum_registry::{Arity, EnergyDescriptor, FnError, OBJECTIVES};

use crate::args;

fn dist(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let p = args::val_point("dist", a, 0)?;
    let q = args::val_point("dist", a, 1)?;
    Ok(args::dist2(p, q).sqrt())
}

#[distributed_slice(OBJECTIVES)]
static DIST: EnergyDescriptor = EnergyDescriptor {
    name: "dist",
    signature: "dist(p, q) -> Float",
    arity: Arity::Fixed(2),
    implementation: dist,
};

fn near(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let p = args::center("near", args::gpi("near", a, 0)?, 0)?;
    let q = args::center("near", args::gpi("near", a, 1)?, 1)?;
    Ok(args::dist2(p, q))
}

#[distributed_slice(OBJECTIVES)]
static NEAR: EnergyDescriptor = EnergyDescriptor {
    name: "near",
    signature: "near(a, b) -> Float",
    arity: Arity::Fixed(2),
    implementation: near,
};

fn same_center(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let p = args::center("sameCenter", args::gpi("sameCenter", a, 0)?, 0)?;
    let q = args::center("sameCenter", args::gpi("sameCenter", a, 1)?, 1)?;
    Ok(args::dist2(p, q))
}

#[distributed_slice(OBJECTIVES)]
static SAME_CENTER: EnergyDescriptor = EnergyDescriptor {
    name: "sameCenter",
    signature: "sameCenter(a, b) -> Float",
    arity: Arity::Fixed(2),
    implementation: same_center,
};

fn repel(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let p = args::center("repel", args::gpi("repel", a, 0)?, 0)?;
    let q = args::center("repel", args::gpi("repel", a, 1)?, 1)?;
    // Inverse-square falloff, bounded near coincident centers.
    Ok(10_000.0 / (args::dist2(p, q) + 1.0))
}

#[distributed_slice(OBJECTIVES)]
static REPEL: EnergyDescriptor = EnergyDescriptor {
    name: "repel",
    signature: "repel(a, b) -> Float",
    arity: Arity::Fixed(2),
    implementation: repel,
};

fn equal(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let x = args::val_float("equal", a, 0)?;
    let y = args::val_float("equal", a, 1)?;
    Ok((x - y).powi(2))
}

#[distributed_slice(OBJECTIVES)]
static EQUAL: EnergyDescriptor = EnergyDescriptor {
    name: "equal",
    signature: "equal(x, y) -> Float",
    arity: Arity::Fixed(2),
    implementation: equal,
};

const VERTICAL_SEP: f64 = 100.0;

fn above(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let (_, y_top) = args::center("above", args::gpi("above", a, 0)?, 0)?;
    let (_, y_bot) = args::center("above", args::gpi("above", a, 1)?, 1)?;
    Ok((y_bot - y_top - VERTICAL_SEP).powi(2))
}

#[distributed_slice(OBJECTIVES)]
static ABOVE: EnergyDescriptor = EnergyDescriptor {
    name: "above",
    signature: "above(top, bottom) -> Float",
    arity: Arity::Fixed(2),
    implementation: above,
};

fn below(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    let (_, y_bot) = args::center("below", args::gpi("below", a, 0)?, 0)?;
    let (_, y_top) = args::center("below", args::gpi("below", a, 1)?, 1)?;
    Ok((y_bot - y_top - VERTICAL_SEP).powi(2))
}

#[distributed_slice(OBJECTIVES)]
static BELOW: EnergyDescriptor = EnergyDescriptor {
    name: "below",
    signature: "below(bottom, top) -> Float",
    arity: Arity::Fixed(2),
    implementation: below,
};

fn minimal(a: &[ArgVal<f64>]) -> Result<f64, FnError> {
    args::val_float("minimal", a, 0)
}

#[distributed_slice(OBJECTIVES)]
static MINIMAL: EnergyDescriptor = EnergyDescriptor {
    name: "minimal",
    signature: "minimal(x) -> Float",
    arity: Arity::Fixed(1),
    implementation: minimal,
};

#[cfg(test)]
mod tests {
    use vellum_foundation::{ArgVal, Value};
    use vellum_registry::apply_objective;

    #[test]
    fn test_dist_is_euclidean() {
        let out = apply_objective(
            "dist",
            &[
                ArgVal::Val(Value::Tuple(3.0, 4.0)),
                ArgVal::Val(Value::Tuple(0.0, 0.0)),
            ],
        )
        .unwrap();
        assert_eq!(out, 5.0);
    }

    #[test]
    fn test_equal_is_squared_difference() {
        let out = apply_objective(
            "equal",
            &[
                ArgVal::Val(Value::Float(7.0)),
                ArgVal::Val(Value::Float(4.0)),
            ],
        )
        .unwrap();
        assert_eq!(out, 9.0);
    }

    #[test]
    fn test_gpi_objectives_reject_values() {
        let err = apply_objective(
            "near",
            &[
                ArgVal::Val(Value::Float(1.0)),
                ArgVal::Val(Value::Float(2.0)),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("graphical primitive"));
    }
}
