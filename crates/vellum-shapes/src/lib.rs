//! Built-in shape catalog
//!
//! Registers the engine's graphical primitives into the shape registry. Each
//! entry carries an ordered property schema (name, value type, sampler), the
//! set of properties whose values arrive externally, the computed properties
//! derived from siblings, and the objective/constraint names attached to
//! every instance of the type.

mod catalog;
pub mod samplers;
