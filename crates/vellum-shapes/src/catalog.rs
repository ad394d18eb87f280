//! Shape descriptors
//!
//! One registry entry per primitive. Schema order is the sampling order;
//! `name` is always last so the injected shape name lands after every
//! sampled property.

use linkme::distributed_slice;

use vellum_foundation::{Value, ValueType};
use vellum_registry::{
    ComputedProperty, FnError, PropertySpec, ShapeDescriptor, SHAPES,
};

use crate::samplers;

fn spec(name: &'static str, ty: ValueType, sampler: vellum_registry::SamplerFn) -> PropertySpec {
    PropertySpec { name, ty, sampler }
}

/// Euclidean length between the `start` and `end` properties.
fn segment_length(args: &[Value<f64>]) -> Result<Value<f64>, FnError> {
    let endpoint = |v: &Value<f64>, index: usize| -> Result<(f64, f64), FnError> {
        match (v.component(0), v.component(1)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(FnError::ArgType {
                name: "length",
                index,
                message: "expected a two-component point".to_string(),
            }),
        }
    };
    let (x0, y0) = endpoint(&args[0], 0)?;
    let (x1, y1) = endpoint(&args[1], 1)?;
    Ok(Value::Float(((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()))
}

const SEGMENT_COMPUTED: &[ComputedProperty] = &[ComputedProperty {
    name: "length",
    args: &["start", "end"],
    compute: segment_length,
}];

fn circle_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("r", ValueType::Float, samplers::radius),
        spec("strokeWidth", ValueType::Float, samplers::stroke_width),
        spec("strokeStyle", ValueType::Str, samplers::solid_style),
        spec("strokeColor", ValueType::Color, samplers::black),
        spec("color", ValueType::Color, samplers::color),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static CIRCLE: ShapeDescriptor = ShapeDescriptor {
    name: "Circle",
    schema: circle_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &["minSize", "maxSize"],
    computed: &[],
};

fn ellipse_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("rx", ValueType::Float, samplers::radius),
        spec("ry", ValueType::Float, samplers::radius),
        spec("strokeWidth", ValueType::Float, samplers::stroke_width),
        spec("strokeStyle", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::color),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static ELLIPSE: ShapeDescriptor = ShapeDescriptor {
    name: "Ellipse",
    schema: ellipse_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &["minSize", "maxSize"],
    computed: &[],
};

fn square_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("side", ValueType::Float, samplers::side),
        spec("rotation", ValueType::Float, samplers::zero),
        spec("strokeWidth", ValueType::Float, samplers::stroke_width),
        spec("strokeStyle", ValueType::Str, samplers::solid_style),
        spec("strokeColor", ValueType::Color, samplers::black),
        spec("color", ValueType::Color, samplers::color),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static SQUARE: ShapeDescriptor = ShapeDescriptor {
    name: "Square",
    schema: square_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &["minSize", "maxSize"],
    computed: &[],
};

fn rectangle_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("sizeX", ValueType::Float, samplers::side),
        spec("sizeY", ValueType::Float, samplers::side),
        spec("rotation", ValueType::Float, samplers::zero),
        spec("strokeWidth", ValueType::Float, samplers::stroke_width),
        spec("strokeStyle", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::color),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static RECTANGLE: ShapeDescriptor = ShapeDescriptor {
    name: "Rectangle",
    schema: rectangle_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &["minSize", "maxSize"],
    computed: &[],
};

fn line_schema() -> Vec<PropertySpec> {
    vec![
        spec("start", ValueType::Vector, samplers::canvas_point),
        spec("end", ValueType::Vector, samplers::canvas_point),
        spec("thickness", ValueType::Float, samplers::thickness),
        spec("style", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::black),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static LINE: ShapeDescriptor = ShapeDescriptor {
    name: "Line",
    schema: line_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &[],
    computed: SEGMENT_COMPUTED,
};

fn arrow_schema() -> Vec<PropertySpec> {
    vec![
        spec("start", ValueType::Vector, samplers::canvas_point),
        spec("end", ValueType::Vector, samplers::canvas_point),
        spec("thickness", ValueType::Float, samplers::thickness),
        spec("arrowheadSize", ValueType::Float, samplers::arrowhead),
        spec("style", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::black),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static ARROW: ShapeDescriptor = ShapeDescriptor {
    name: "Arrow",
    schema: arrow_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &[],
    computed: SEGMENT_COMPUTED,
};

fn curve_schema() -> Vec<PropertySpec> {
    vec![
        spec("path", ValueType::PathData, samplers::empty_path_data),
        spec("polyline", ValueType::PointList, samplers::empty_point_list),
        spec("strokeWidth", ValueType::Float, samplers::stroke_width),
        spec("style", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::black),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static CURVE: ShapeDescriptor = ShapeDescriptor {
    name: "Curve",
    schema: curve_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &[],
    computed: &[],
};

fn text_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("w", ValueType::Float, samplers::label_dim),
        spec("h", ValueType::Float, samplers::label_dim),
        spec("fontSize", ValueType::Str, samplers::default_font_size),
        spec("string", ValueType::Str, samplers::empty_str),
        spec("rotation", ValueType::Float, samplers::zero),
        spec("style", ValueType::Str, samplers::solid_style),
        spec("color", ValueType::Color, samplers::black),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static TEXT: ShapeDescriptor = ShapeDescriptor {
    name: "Text",
    // Label dimensions are measured externally after rendering.
    schema: text_schema,
    pending: &["w", "h"],
    default_objectives: &[],
    default_constraints: &[],
    computed: &[],
};

fn image_schema() -> Vec<PropertySpec> {
    vec![
        spec("x", ValueType::Float, samplers::canvas_x),
        spec("y", ValueType::Float, samplers::canvas_y),
        spec("w", ValueType::Float, samplers::side),
        spec("h", ValueType::Float, samplers::side),
        spec("opacity", ValueType::Float, samplers::full_opacity),
        spec("style", ValueType::Str, samplers::solid_style),
        spec("stretch", ValueType::Str, samplers::default_stretch),
        spec("path", ValueType::File, samplers::empty_file),
        spec("name", ValueType::Str, samplers::empty_str),
    ]
}

#[distributed_slice(SHAPES)]
static IMAGE: ShapeDescriptor = ShapeDescriptor {
    name: "Image",
    schema: image_schema,
    pending: &[],
    default_objectives: &[],
    default_constraints: &[],
    computed: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_registry as registry;

    #[test]
    fn test_catalog_registered() {
        for name in [
            "Circle",
            "Ellipse",
            "Square",
            "Rectangle",
            "Line",
            "Arrow",
            "Curve",
            "Text",
            "Image",
        ] {
            assert!(registry::shape(name).is_ok(), "{name} missing from catalog");
        }
        assert!(registry::shape("Triangle").is_err());
    }

    #[test]
    fn test_name_is_last_in_every_schema() {
        for desc in registry::SHAPES {
            let schema = (desc.schema)();
            assert_eq!(
                schema.last().map(|s| s.name),
                Some("name"),
                "{} schema must end with name",
                desc.name
            );
        }
    }

    #[test]
    fn test_text_label_metrics_are_pending() {
        assert!(registry::is_pending("Text", "w"));
        assert!(registry::is_pending("Text", "h"));
        assert!(!registry::is_pending("Text", "x"));
        assert!(!registry::is_pending("Circle", "r"));
    }

    #[test]
    fn test_segment_length_computed_property() {
        let computed = registry::computed_property("Line", "length").unwrap();
        assert_eq!(computed.args, &["start", "end"]);
        let out = (computed.compute)(&[
            Value::Vector(vec![0.0, 0.0]),
            Value::Vector(vec![3.0, 4.0]),
        ])
        .unwrap();
        assert_eq!(out, Value::Float(5.0));
    }
}
