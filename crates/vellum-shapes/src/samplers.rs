//! Property samplers
//!
//! Every sampler is a plain `fn` so it can live in a const shape descriptor.
//! Samplers draw from the threaded stream against the canvas dimensions;
//! constant samplers draw nothing.

use vellum_foundation::{Canvas, Color, RngStream, Value};

pub fn canvas_x(rng: &mut RngStream, canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(0.0, canvas.width))
}

pub fn canvas_y(rng: &mut RngStream, canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(0.0, canvas.height))
}

/// A random point on the canvas as a two-component vector.
pub fn canvas_point(rng: &mut RngStream, canvas: &Canvas) -> Value<f64> {
    let x = rng.uniform_range(0.0, canvas.width);
    let y = rng.uniform_range(0.0, canvas.height);
    Value::Vector(vec![x, y])
}

pub fn radius(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(3.0, 60.0))
}

pub fn side(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(20.0, 100.0))
}

pub fn stroke_width(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(0.5, 3.0))
}

pub fn thickness(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(1.0, 4.0))
}

pub fn arrowhead(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(4.0, 12.0))
}

pub fn label_dim(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(rng.uniform_range(10.0, 80.0))
}

/// Opaque random color at half alpha, the conventional fill default.
pub fn color(rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    let r = rng.uniform();
    let g = rng.uniform();
    let b = rng.uniform();
    Value::Color(Color::Rgba(r, g, b, 0.5))
}

pub fn black(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Color(Color::Rgba(0.0, 0.0, 0.0, 1.0))
}

pub fn zero(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(0.0)
}

pub fn full_opacity(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Float(1.0)
}

pub fn solid_style(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Str("solid".to_string())
}

pub fn empty_str(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Str(String::new())
}

pub fn default_font_size(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Str("12pt".to_string())
}

pub fn default_stretch(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::Str("normal".to_string())
}

pub fn empty_file(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::File(String::new())
}

pub fn empty_path_data(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::PathData(Vec::new())
}

pub fn empty_point_list(_rng: &mut RngStream, _canvas: &Canvas) -> Value<f64> {
    Value::PointList(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_samplers_in_range() {
        let canvas = Canvas::new(800.0, 700.0);
        let mut rng = RngStream::new(17);
        for _ in 0..100 {
            let Value::Float(x) = canvas_x(&mut rng, &canvas) else {
                panic!("canvas_x must sample a float");
            };
            assert!((0.0..800.0).contains(&x));
            let Value::Float(y) = canvas_y(&mut rng, &canvas) else {
                panic!("canvas_y must sample a float");
            };
            assert!((0.0..700.0).contains(&y));
        }
    }

    #[test]
    fn test_point_sampler_is_two_dimensional() {
        let canvas = Canvas::default();
        let mut rng = RngStream::new(17);
        let Value::Vector(v) = canvas_point(&mut rng, &canvas) else {
            panic!("canvas_point must sample a vector");
        };
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let canvas = Canvas::default();
        let mut a = RngStream::new(17);
        let mut b = RngStream::new(17);
        assert_eq!(color(&mut a, &canvas), color(&mut b, &canvas));
        assert_eq!(radius(&mut a, &canvas), radius(&mut b, &canvas));
    }
}
