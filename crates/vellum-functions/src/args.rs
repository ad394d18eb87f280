//! Argument coercion helpers
//!
//! Registry functions receive untyped argument lists; these helpers project
//! them with uniform error reporting.

use vellum_foundation::{ArgVal, Shape, Value};
use vellum_registry::FnError;

fn arg_type(name: &'static str, index: usize, message: &str) -> FnError {
    FnError::ArgType {
        name,
        index,
        message: message.to_string(),
    }
}

pub fn float(name: &'static str, values: &[Value<f64>], index: usize) -> Result<f64, FnError> {
    values
        .get(index)
        .and_then(Value::as_float)
        .ok_or_else(|| arg_type(name, index, "expected Float"))
}

pub fn point(
    name: &'static str,
    values: &[Value<f64>],
    index: usize,
) -> Result<(f64, f64), FnError> {
    let v = values
        .get(index)
        .ok_or_else(|| arg_type(name, index, "missing argument"))?;
    match (v.component(0), v.component(1)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(arg_type(name, index, "expected a two-component point")),
    }
}

pub fn val_float(name: &'static str, args: &[ArgVal<f64>], index: usize) -> Result<f64, FnError> {
    args.get(index)
        .and_then(ArgVal::as_val)
        .and_then(Value::as_float)
        .ok_or_else(|| arg_type(name, index, "expected Float"))
}

pub fn val_point(
    name: &'static str,
    args: &[ArgVal<f64>],
    index: usize,
) -> Result<(f64, f64), FnError> {
    let v = args
        .get(index)
        .and_then(ArgVal::as_val)
        .ok_or_else(|| arg_type(name, index, "expected a value argument"))?;
    match (v.component(0), v.component(1)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(arg_type(name, index, "expected a two-component point")),
    }
}

pub fn gpi<'a>(
    name: &'static str,
    args: &'a [ArgVal<f64>],
    index: usize,
) -> Result<&'a Shape<f64>, FnError> {
    args.get(index)
        .and_then(ArgVal::as_gpi)
        .ok_or_else(|| arg_type(name, index, "expected a graphical primitive"))
}

/// Canvas-space center of a shape: its `(x, y)` when present, the segment
/// midpoint for line-like shapes.
pub fn center(name: &'static str, shape: &Shape<f64>, index: usize) -> Result<(f64, f64), FnError> {
    if let (Some(x), Some(y)) = (shape.float("x"), shape.float("y")) {
        return Ok((x, y));
    }
    if let (Some((x0, y0)), Some((x1, y1))) = (shape.point2("start"), shape.point2("end")) {
        return Ok(((x0 + x1) / 2.0, (y0 + y1) / 2.0));
    }
    Err(arg_type(name, index, "shape has no usable center"))
}

/// Characteristic diameter of a shape, used by size constraints.
pub fn size(name: &'static str, shape: &Shape<f64>, index: usize) -> Result<f64, FnError> {
    let s = match shape.shape_type.as_str() {
        "Circle" => shape.float("r").map(|r| 2.0 * r),
        "Ellipse" => match (shape.float("rx"), shape.float("ry")) {
            (Some(rx), Some(ry)) => Some(2.0 * rx.max(ry)),
            _ => None,
        },
        "Square" => shape.float("side"),
        "Rectangle" => match (shape.float("sizeX"), shape.float("sizeY")) {
            (Some(w), Some(h)) => Some(w.max(h)),
            _ => None,
        },
        _ => match (shape.float("w"), shape.float("h")) {
            (Some(w), Some(h)) => Some(w.max(h)),
            _ => None,
        },
    };
    s.ok_or_else(|| arg_type(name, index, "shape has no usable size"))
}

pub fn dist2((x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> f64 {
    (x1 - x0).powi(2) + (y1 - y0).powi(2)
}
