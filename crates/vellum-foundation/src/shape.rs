//! Evaluated graphical primitives
//!
//! A [`Shape`] is the post-evaluation form of a graphical primitive: a type
//! name plus a flat, insertion-ordered dictionary of concrete property
//! values. This is what the renderer consumes and what objective and
//! constraint functions receive.

use indexmap::IndexMap;

use crate::scalar::Scalar;
use crate::value::Value;

/// A fully evaluated graphical primitive.
///
/// The synthetic `"name"` property is always present and equals
/// `"object.field"` for the path the shape was declared at.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape<N> {
    pub shape_type: String,
    pub properties: IndexMap<String, Value<N>>,
}

impl<N: Scalar> Shape<N> {
    pub fn new(shape_type: impl Into<String>) -> Self {
        Self {
            shape_type: shape_type.into(),
            properties: IndexMap::new(),
        }
    }

    /// The shape's `"object.field"` name.
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Read a property value.
    pub fn get(&self, property: &str) -> Option<&Value<N>> {
        self.properties.get(property)
    }

    /// Read a scalar property.
    pub fn float(&self, property: &str) -> Option<N> {
        self.properties.get(property).and_then(Value::as_float)
    }

    /// Read a two-component property (vector, point, or tuple).
    pub fn point2(&self, property: &str) -> Option<(N, N)> {
        let v = self.properties.get(property)?;
        Some((v.component(0)?, v.component(1)?))
    }

    /// Convert every scalar slot to another representation.
    pub fn cast<M: Scalar>(&self) -> Shape<M> {
        Shape {
            shape_type: self.shape_type.clone(),
            properties: self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.cast()))
                .collect(),
        }
    }
}

/// An evaluation result: either a plain value or a whole graphical
/// primitive (the result of evaluating a path that names a shape).
#[derive(Debug, Clone, PartialEq)]
pub enum ArgVal<N> {
    Val(Value<N>),
    Gpi(Shape<N>),
}

impl<N: Scalar> ArgVal<N> {
    pub fn as_val(&self) -> Option<&Value<N>> {
        match self {
            ArgVal::Val(v) => Some(v),
            ArgVal::Gpi(_) => None,
        }
    }

    pub fn as_gpi(&self) -> Option<&Shape<N>> {
        match self {
            ArgVal::Gpi(s) => Some(s),
            ArgVal::Val(_) => None,
        }
    }

    pub fn into_val(self) -> Option<Value<N>> {
        match self {
            ArgVal::Val(v) => Some(v),
            ArgVal::Gpi(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_accessors() {
        let mut shape: Shape<f64> = Shape::new("Circle");
        shape.properties.insert("r".into(), Value::Float(12.0));
        shape
            .properties
            .insert("center".into(), Value::Vector(vec![3.0, 4.0]));
        shape
            .properties
            .insert("name".into(), Value::Str("A.shape".into()));

        assert_eq!(shape.float("r"), Some(12.0));
        assert_eq!(shape.point2("center"), Some((3.0, 4.0)));
        assert_eq!(shape.name(), Some("A.shape"));
        assert_eq!(shape.float("missing"), None);
    }
}
