//! Engine errors
//!
//! Structural, type, domain, and registry failures are fatal within a
//! compile and surface at the boundary as [`CompilerError`]. Layering cycles
//! get their own variant so the embedder can report them separately.

use thiserror::Error;

use vellum_foundation::Path;
use vellum_registry::FnError;

/// Engine result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised during analysis, sampling, and evaluation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Ir(#[from] vellum_ir::Error),

    #[error(transparent)]
    Fn(#[from] FnError),

    #[error("evaluation exceeded depth {max}: unresolved cycle in the expression graph")]
    DepthExceeded { max: u32 },

    #[error("uninitialized varying value reached the evaluator")]
    UninitializedVary,

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("negative integer exponent")]
    NegativeExponent,

    #[error("inline graphical primitive used as an expression")]
    InlineGpi,

    #[error("{0} declarations cannot be evaluated")]
    DeclarationInEval(&'static str),

    #[error("layering endpoint {0} does not resolve to a shape")]
    NonShapeLayering(Path),

    #[error("varying path {0} did not read back as a scalar")]
    VaryingReadback(Path),
}

/// Errors surfaced at the compile boundary.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("style typecheck failed with {} error(s)", .0.len())]
    StyleTypecheck(Vec<Error>),

    #[error("layering error: {0}")]
    StyleLayering(String),
}

impl From<Error> for CompilerError {
    fn from(err: Error) -> Self {
        CompilerError::StyleTypecheck(vec![err])
    }
}
