//! Built-in function library
//!
//! Registers the standard computations, objectives, and constraints into the
//! function registries. Objectives return the quantity to minimize;
//! constraints return their raw violation, non-positive when satisfied.

mod args;
mod comps;
mod constraints;
mod objectives;
