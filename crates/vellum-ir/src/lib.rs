//! Vellum IR
//!
//! The semantic store the upstream style/substance compiler hands to the
//! engine: expression trees, tagged storage forms, the two-level translation
//! map, and the pure analyses that enumerate varying paths, shapes, and
//! declared functions.

pub mod analyze;
pub mod error;
pub mod expr;
pub mod translation;

pub use analyze::FnSpec;
pub use error::Error;
pub use expr::{AnnoFloat, BinaryOp, Expr, FieldExpr, PropertyDict, TagExpr, UnaryOp};
pub use translation::Translation;
