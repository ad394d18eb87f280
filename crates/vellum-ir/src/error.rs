//! Translation-layer errors

use thiserror::Error;

use vellum_foundation::Path;
use vellum_registry::FnError;

/// Errors raised by the translation store and the analyzer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown path: {0}")]
    UnknownPath(Path),

    #[error("path already exists: {0}")]
    DuplicatePath(Path),

    #[error("field {0} aliases itself")]
    SelfAlias(Path),

    #[error("expected a graphical primitive at {0}")]
    ExpectedGpi(Path),

    #[error("found a graphical primitive at {0}, expected a scalar expression")]
    UnexpectedGpi(Path),

    #[error("cannot index into {path}: {message}")]
    BadAccess { path: Path, message: String },

    #[error("optimized vector property {path} must have exactly 2 components, found {len}")]
    VaryingVectorArity { path: Path, len: usize },

    #[error("local variable {0} escaped the style compiler")]
    LocalVar(String),

    #[error(transparent)]
    Fn(#[from] FnError),
}
