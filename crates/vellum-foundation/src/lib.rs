//! Vellum Foundation
//!
//! Leaf types shared by every layer of the diagram engine: the scalar
//! abstraction, the runtime value model, typed translation paths, canvas
//! geometry, the evaluated shape form, and deterministic random number
//! generation.

pub mod canvas;
pub mod path;
pub mod rng;
pub mod scalar;
pub mod shape;
pub mod value;

pub use canvas::Canvas;
pub use path::{BindingForm, Path};
pub use rng::RngStream;
pub use scalar::Scalar;
pub use shape::{ArgVal, Shape};
pub use value::{Color, HMatrix, PathElem, Polygon, SubPath, Value, ValueType};
