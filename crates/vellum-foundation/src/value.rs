//! Runtime value model
//!
//! `Value<N>` is the closed sum of every concrete value a translation field
//! or shape property can hold after evaluation. The scalar slots are generic
//! over [`Scalar`] so an entire value tree can be cast between scalar
//! representations without structural change.

use crate::scalar::{cast, Scalar};

/// A 2D point, the building block of path and polygon payloads.
pub type Pt2<N> = (N, N);

/// A color in either RGBA or HSVA space, four components each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color<N> {
    Rgba(N, N, N, N),
    Hsva(N, N, N, N),
}

impl<N: Scalar> Color<N> {
    pub fn cast<M: Scalar>(self) -> Color<M> {
        match self {
            Color::Rgba(r, g, b, a) => Color::Rgba(cast(r), cast(g), cast(b), cast(a)),
            Color::Hsva(h, s, v, a) => Color::Hsva(cast(h), cast(s), cast(v), cast(a)),
        }
    }
}

/// One element of a sub-path: a line segment or a Bézier segment, each
/// described by its control points and endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum PathElem<N> {
    Line(Pt2<N>),
    Quad { ctrl: Pt2<N>, end: Pt2<N> },
    Cubic { ctrl0: Pt2<N>, ctrl1: Pt2<N>, end: Pt2<N> },
}

impl<N: Scalar> PathElem<N> {
    fn cast<M: Scalar>(&self) -> PathElem<M> {
        let pt = |p: &Pt2<N>| (cast(p.0), cast(p.1));
        match self {
            PathElem::Line(p) => PathElem::Line(pt(p)),
            PathElem::Quad { ctrl, end } => PathElem::Quad {
                ctrl: pt(ctrl),
                end: pt(end),
            },
            PathElem::Cubic { ctrl0, ctrl1, end } => PathElem::Cubic {
                ctrl0: pt(ctrl0),
                ctrl1: pt(ctrl1),
                end: pt(end),
            },
        }
    }
}

/// A sub-path: an open or closed run of path elements.
#[derive(Debug, Clone, PartialEq)]
pub enum SubPath<N> {
    Open(Vec<PathElem<N>>),
    Closed(Vec<PathElem<N>>),
}

impl<N: Scalar> SubPath<N> {
    fn cast<M: Scalar>(&self) -> SubPath<M> {
        match self {
            SubPath::Open(es) => SubPath::Open(es.iter().map(PathElem::cast).collect()),
            SubPath::Closed(es) => SubPath::Closed(es.iter().map(PathElem::cast).collect()),
        }
    }
}

/// Six-component affine transform `[xx xy dx; yx yy dy]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HMatrix<N> {
    pub xx: N,
    pub xy: N,
    pub yx: N,
    pub yy: N,
    pub dx: N,
    pub dy: N,
}

impl<N: Scalar> HMatrix<N> {
    pub fn cast<M: Scalar>(self) -> HMatrix<M> {
        HMatrix {
            xx: cast(self.xx),
            xy: cast(self.xy),
            yx: cast(self.yx),
            yy: cast(self.yy),
            dx: cast(self.dx),
            dy: cast(self.dy),
        }
    }
}

/// A polygon with positive and negative regions, a bounding box, and a set
/// of boundary sample points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<N> {
    pub positive: Vec<Vec<Pt2<N>>>,
    pub negative: Vec<Vec<Pt2<N>>>,
    pub bbox: (Pt2<N>, Pt2<N>),
    pub samples: Vec<Pt2<N>>,
}

impl<N: Scalar> Polygon<N> {
    pub fn cast<M: Scalar>(&self) -> Polygon<M> {
        let pt = |p: &Pt2<N>| (cast(p.0), cast(p.1));
        let ring = |r: &Vec<Pt2<N>>| r.iter().map(pt).collect();
        Polygon {
            positive: self.positive.iter().map(ring).collect(),
            negative: self.negative.iter().map(ring).collect(),
            bbox: (pt(&self.bbox.0), pt(&self.bbox.1)),
            samples: self.samples.iter().map(pt).collect(),
        }
    }
}

/// A fully evaluated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    Float(N),
    Int(i64),
    Bool(bool),
    Str(String),
    Point(Pt2<N>),
    PointList(Vec<Pt2<N>>),
    PathData(Vec<SubPath<N>>),
    Palette(Vec<Color<N>>),
    Color(Color<N>),
    File(String),
    Style(String),
    List(Vec<N>),
    Tuple(N, N),
    Vector(Vec<N>),
    Matrix(Vec<Vec<N>>),
    ListOfLists(Vec<Vec<N>>),
    HMatrix(HMatrix<N>),
    Polygon(Polygon<N>),
}

/// Schema-level tag for a value's shape, used by the shape catalog to type
/// properties without holding a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Float,
    Int,
    Bool,
    Str,
    Point,
    PointList,
    PathData,
    Palette,
    Color,
    File,
    Style,
    List,
    Tuple,
    Vector,
    Matrix,
    ListOfLists,
    HMatrix,
    Polygon,
}

impl ValueType {
    /// A scalar slot is a single real number; only those participate in the
    /// varying state.
    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueType::Float)
    }
}

impl<N: Scalar> Value<N> {
    /// The schema tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::Str,
            Value::Point(_) => ValueType::Point,
            Value::PointList(_) => ValueType::PointList,
            Value::PathData(_) => ValueType::PathData,
            Value::Palette(_) => ValueType::Palette,
            Value::Color(_) => ValueType::Color,
            Value::File(_) => ValueType::File,
            Value::Style(_) => ValueType::Style,
            Value::List(_) => ValueType::List,
            Value::Tuple(_, _) => ValueType::Tuple,
            Value::Vector(_) => ValueType::Vector,
            Value::Matrix(_) => ValueType::Matrix,
            Value::ListOfLists(_) => ValueType::ListOfLists,
            Value::HMatrix(_) => ValueType::HMatrix,
            Value::Polygon(_) => ValueType::Polygon,
        }
    }

    /// Attempt to read the value as a single scalar.
    pub fn as_float(&self) -> Option<N> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempt to read the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempt to read the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read an indexed scalar component out of an indexable value.
    ///
    /// Points and tuples expose components 0 and 1; vectors and lists expose
    /// their element range.
    pub fn component(&self, index: usize) -> Option<N> {
        match (self, index) {
            (Value::Point((x, _)), 0) => Some(*x),
            (Value::Point((_, y)), 1) => Some(*y),
            (Value::Tuple(x, _), 0) => Some(*x),
            (Value::Tuple(_, y), 1) => Some(*y),
            (Value::Vector(v), i) => v.get(i).copied(),
            (Value::List(v), i) => v.get(i).copied(),
            _ => None,
        }
    }

    /// Write an indexed scalar component into an indexable value.
    ///
    /// Returns false when the value is not indexable or the index is out of
    /// range.
    pub fn set_component(&mut self, index: usize, value: N) -> bool {
        match (&mut *self, index) {
            (Value::Point((x, _)), 0) => *x = value,
            (Value::Point((_, y)), 1) => *y = value,
            (Value::Tuple(x, _), 0) => *x = value,
            (Value::Tuple(_, y), 1) => *y = value,
            (Value::Vector(v), i) | (Value::List(v), i) => match v.get_mut(i) {
                Some(slot) => *slot = value,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    /// Convert every scalar slot to another representation, preserving
    /// structure exactly.
    pub fn cast<M: Scalar>(&self) -> Value<M> {
        let pt = |p: &Pt2<N>| (cast(p.0), cast(p.1));
        match self {
            Value::Float(v) => Value::Float(cast(*v)),
            Value::Int(v) => Value::Int(*v),
            Value::Bool(v) => Value::Bool(*v),
            Value::Str(s) => Value::Str(s.clone()),
            Value::Point(p) => Value::Point(pt(p)),
            Value::PointList(ps) => Value::PointList(ps.iter().map(pt).collect()),
            Value::PathData(sps) => Value::PathData(sps.iter().map(SubPath::cast).collect()),
            Value::Palette(cs) => Value::Palette(cs.iter().map(|c| c.cast()).collect()),
            Value::Color(c) => Value::Color(c.cast()),
            Value::File(s) => Value::File(s.clone()),
            Value::Style(s) => Value::Style(s.clone()),
            Value::List(vs) => Value::List(vs.iter().map(|v| cast(*v)).collect()),
            Value::Tuple(a, b) => Value::Tuple(cast(*a), cast(*b)),
            Value::Vector(vs) => Value::Vector(vs.iter().map(|v| cast(*v)).collect()),
            Value::Matrix(rows) => {
                Value::Matrix(rows.iter().map(|r| r.iter().map(|v| cast(*v)).collect()).collect())
            }
            Value::ListOfLists(rows) => Value::ListOfLists(
                rows.iter().map(|r| r.iter().map(|v| cast(*v)).collect()).collect(),
            ),
            Value::HMatrix(m) => Value::HMatrix(m.cast()),
            Value::Polygon(p) => Value::Polygon(p.cast()),
        }
    }
}
