//! Computations
//!
//! Pure value-level functions dispatched by the evaluator through the
//! computation registry. `sampleColor` is the one stream consumer.

use linkme::distributed_slice;

use vellum_foundation::{Color, RngStream, Value};
use vellum_registry::{Arity, CompDescriptor, FnError, COMPUTATIONS};

use crate::args;

fn rgba(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Color(Color::Rgba(
        args::float("rgba", values, 0)?,
        args::float("rgba", values, 1)?,
        args::float("rgba", values, 2)?,
        args::float("rgba", values, 3)?,
    )))
}

#[distributed_slice(COMPUTATIONS)]
static RGBA: CompDescriptor = CompDescriptor {
    name: "rgba",
    signature: "rgba(r, g, b, a) -> Color",
    arity: Arity::Fixed(4),
    implementation: rgba,
};

fn hsva(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Color(Color::Hsva(
        args::float("hsva", values, 0)?,
        args::float("hsva", values, 1)?,
        args::float("hsva", values, 2)?,
        args::float("hsva", values, 3)?,
    )))
}

#[distributed_slice(COMPUTATIONS)]
static HSVA: CompDescriptor = CompDescriptor {
    name: "hsva",
    signature: "hsva(h, s, v, a) -> Color",
    arity: Arity::Fixed(4),
    implementation: hsva,
};

fn sample_color(values: &[Value<f64>], rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    let alpha = args::float("sampleColor", values, 0)?;
    let r = rng.uniform();
    let g = rng.uniform();
    let b = rng.uniform();
    Ok(Value::Color(Color::Rgba(r, g, b, alpha)))
}

#[distributed_slice(COMPUTATIONS)]
static SAMPLE_COLOR: CompDescriptor = CompDescriptor {
    name: "sampleColor",
    signature: "sampleColor(alpha) -> Color",
    arity: Arity::Fixed(1),
    implementation: sample_color,
};

fn midpoint(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    let (x0, y0) = args::point("midpoint", values, 0)?;
    let (x1, y1) = args::point("midpoint", values, 1)?;
    Ok(Value::Vector(vec![(x0 + x1) / 2.0, (y0 + y1) / 2.0]))
}

#[distributed_slice(COMPUTATIONS)]
static MIDPOINT: CompDescriptor = CompDescriptor {
    name: "midpoint",
    signature: "midpoint(p, q) -> Vector",
    arity: Arity::Fixed(2),
    implementation: midpoint,
};

fn average(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    if values.is_empty() {
        return Ok(Value::Float(0.0));
    }
    let mut sum = 0.0;
    for (i, _) in values.iter().enumerate() {
        sum += args::float("average", values, i)?;
    }
    Ok(Value::Float(sum / values.len() as f64))
}

#[distributed_slice(COMPUTATIONS)]
static AVERAGE: CompDescriptor = CompDescriptor {
    name: "average",
    signature: "average(xs...) -> Float",
    arity: Arity::Variadic,
    implementation: average,
};

fn abs(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Float(args::float("abs", values, 0)?.abs()))
}

#[distributed_slice(COMPUTATIONS)]
static ABS: CompDescriptor = CompDescriptor {
    name: "abs",
    signature: "abs(x) -> Float",
    arity: Arity::Fixed(1),
    implementation: abs,
};

fn sqrt(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Float(args::float("sqrt", values, 0)?.sqrt()))
}

#[distributed_slice(COMPUTATIONS)]
static SQRT: CompDescriptor = CompDescriptor {
    name: "sqrt",
    signature: "sqrt(x) -> Float",
    arity: Arity::Fixed(1),
    implementation: sqrt,
};

fn max(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Float(
        args::float("max", values, 0)?.max(args::float("max", values, 1)?),
    ))
}

#[distributed_slice(COMPUTATIONS)]
static MAX: CompDescriptor = CompDescriptor {
    name: "max",
    signature: "max(a, b) -> Float",
    arity: Arity::Fixed(2),
    implementation: max,
};

fn min(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    Ok(Value::Float(
        args::float("min", values, 0)?.min(args::float("min", values, 1)?),
    ))
}

#[distributed_slice(COMPUTATIONS)]
static MIN: CompDescriptor = CompDescriptor {
    name: "min",
    signature: "min(a, b) -> Float",
    arity: Arity::Fixed(2),
    implementation: min,
};

fn norm(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    let x = args::float("norm_", values, 0)?;
    let y = args::float("norm_", values, 1)?;
    Ok(Value::Float((x * x + y * y).sqrt()))
}

#[distributed_slice(COMPUTATIONS)]
static NORM: CompDescriptor = CompDescriptor {
    name: "norm_",
    signature: "norm_(x, y) -> Float",
    arity: Arity::Fixed(2),
    implementation: norm,
};

fn len(values: &[Value<f64>], _rng: &mut RngStream) -> Result<Value<f64>, FnError> {
    match values.first() {
        Some(Value::Vector(v)) | Some(Value::List(v)) => {
            Ok(Value::Float(v.iter().map(|x| x * x).sum::<f64>().sqrt()))
        }
        _ => Err(FnError::ArgType {
            name: "len",
            index: 0,
            message: "expected Vector".to_string(),
        }),
    }
}

#[distributed_slice(COMPUTATIONS)]
static LEN: CompDescriptor = CompDescriptor {
    name: "len",
    signature: "len(v) -> Float",
    arity: Arity::Fixed(1),
    implementation: len,
};
