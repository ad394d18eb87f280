//! Sampling
//!
//! Populates the translation's free slots before optimization: shape
//! properties are drawn from their schema samplers, varying field values are
//! drawn uniformly over the canvas width, and any varying element that is
//! still unresolved after both passes is filled directly. The stream is
//! threaded left to right through every draw, so a fixed seed yields a
//! byte-identical translation.

use tracing::debug;

use vellum_foundation::{Canvas, Path, RngStream, Value};
use vellum_ir::{Expr, TagExpr, Translation};
use vellum_registry as registry;

use crate::error::{Error, Result};

/// Sample every varying field-level slot uniformly over `[0, width)`.
///
/// Property-level varying slots are handled by [`sample_shapes`]; this pass
/// covers plain fields and elements of field-level vector literals.
pub fn sample_varying_fields(
    trans: &mut Translation<f64>,
    varying_paths: &[Path],
    canvas: &Canvas,
    rng: &mut RngStream,
) -> Result<()> {
    for path in varying_paths {
        if !is_field_level(path) {
            continue;
        }
        let v = rng.uniform_range(0.0, canvas.width);
        trans
            .override_path(path, TagExpr::Done(Value::Float(v)))
            .map_err(Error::Ir)?;
    }
    Ok(())
}

fn is_field_level(path: &Path) -> bool {
    match path {
        Path::Field { .. } => true,
        Path::Access { base, .. } => matches!(**base, Path::Field { .. }),
        _ => false,
    }
}

/// Whether sampled entries from a previous pass may be redrawn.
///
/// In the state's translation, `Done` and `Pending` property entries are
/// exactly the sampler-produced ones (style-set properties stay deferred;
/// evaluation memoizes only into scratch copies), so a resample redraws
/// them while leaving style-set expressions alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Initial,
    Resample,
}

/// Sample shape properties from the catalog schemas.
///
/// For each property, in schema order:
/// - absent and pending: insert `Pending(sample)`
/// - absent otherwise: insert `Done(sample)`
/// - deferred `Vary`, or a vector literal of only `Vary`: insert
///   `Done(sample)` — an authored `Vary` is a one-time concrete draw even
///   on a pending property
/// - already sampled: redrawn only in [`SampleMode::Resample`], keeping the
///   entry's own tag kind
/// - anything else: leave untouched
///
/// The synthetic `name` property is always written last.
pub fn sample_shapes(
    trans: &mut Translation<f64>,
    shape_paths: &[Path],
    canvas: &Canvas,
    rng: &mut RngStream,
    mode: SampleMode,
) -> Result<()> {
    for shape_path in shape_paths {
        let Path::Field { object, field } = shape_path else {
            return Err(Error::Ir(vellum_ir::Error::ExpectedGpi(shape_path.clone())));
        };
        let (shape_type, _) = trans.gpi(object, field).map_err(Error::Ir)?;
        let desc = registry::shape(shape_type)?;
        debug!(shape = %shape_path, shape_type = desc.name, "sampling shape properties");

        for spec in (desc.schema)() {
            let prop_path = Path::property(object.clone(), field, spec.name);
            let pending = desc.pending.contains(&spec.name);

            // `Some(as_pending)` means draw now; the flag picks the tag.
            let action = match trans.gpi(object, field).map_err(Error::Ir)?.1.get(spec.name) {
                None => Some(pending),
                Some(TagExpr::OptEval(e)) if e.is_vary() => Some(false),
                Some(TagExpr::OptEval(Expr::Vector(elems)))
                    if !elems.is_empty() && elems.iter().all(Expr::is_vary) =>
                {
                    Some(false)
                }
                Some(TagExpr::Done(_)) if mode == SampleMode::Resample => Some(false),
                Some(TagExpr::Pending(_)) if mode == SampleMode::Resample => Some(true),
                Some(_) => None,
            };

            if let Some(as_pending) = action {
                let sample = (spec.sampler)(rng, canvas);
                let tag = if as_pending {
                    TagExpr::Pending(sample)
                } else {
                    TagExpr::Done(sample)
                };
                trans.override_path(&prop_path, tag).map_err(Error::Ir)?;
            }
        }

        let name_path = Path::property(object.clone(), field, "name");
        trans
            .override_path(
                &name_path,
                TagExpr::Done(Value::Str(format!("{object}.{field}"))),
            )
            .map_err(Error::Ir)?;
    }
    Ok(())
}

/// Fill any varying slot that is still unresolved after both sampling
/// passes (for example an element of a partially varying vector literal).
pub fn fill_unresolved_varying(
    trans: &mut Translation<f64>,
    varying_paths: &[Path],
    canvas: &Canvas,
    rng: &mut RngStream,
) -> Result<()> {
    for path in varying_paths {
        let resolved = matches!(
            trans.lookup(path),
            Ok(TagExpr::Done(Value::Float(_))) | Ok(TagExpr::Pending(Value::Float(_)))
        );
        if !resolved {
            let v = rng.uniform_range(0.0, canvas.width);
            trans
                .override_path(path, TagExpr::Done(Value::Float(v)))
                .map_err(Error::Ir)?;
        }
    }
    Ok(())
}

/// Read the current scalar value of every varying path, in order.
pub fn read_varying(trans: &Translation<f64>, varying_paths: &[Path]) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(varying_paths.len());
    for path in varying_paths {
        match trans.lookup(path).map_err(Error::Ir)? {
            TagExpr::Done(Value::Float(v)) | TagExpr::Pending(Value::Float(v)) => out.push(v),
            _ => return Err(Error::VaryingReadback(path.clone())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_foundation::BindingForm;
    use vellum_ir::analyze;

    fn obj(name: &str) -> BindingForm {
        BindingForm::sub(name)
    }

    #[test]
    fn test_field_sampling_respects_canvas_width() {
        let mut trans: Translation<f64> = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(&path, TagExpr::OptEval(Expr::vary()))
            .unwrap();

        let varying = analyze::varying_paths(&trans).unwrap();
        let canvas = Canvas::new(200.0, 100.0);
        let mut rng = RngStream::new(17);
        sample_varying_fields(&mut trans, &varying, &canvas, &mut rng).unwrap();

        let values = read_varying(&trans, &varying).unwrap();
        assert_eq!(values.len(), 1);
        assert!((0.0..200.0).contains(&values[0]));
    }

    #[test]
    fn test_field_sampling_is_deterministic() {
        let build = || {
            let mut trans: Translation<f64> = Translation::new();
            for name in ["a", "b", "c"] {
                trans
                    .insert_path(
                        &Path::field(obj(name), "val"),
                        TagExpr::OptEval(Expr::vary()),
                    )
                    .unwrap();
            }
            trans
        };
        let canvas = Canvas::default();

        let mut t1 = build();
        let varying = analyze::varying_paths(&t1).unwrap();
        let mut rng1 = RngStream::new(17);
        sample_varying_fields(&mut t1, &varying, &canvas, &mut rng1).unwrap();

        let mut t2 = build();
        let mut rng2 = RngStream::new(17);
        sample_varying_fields(&mut t2, &varying, &canvas, &mut rng2).unwrap();

        assert_eq!(t1, t2);
        assert_eq!(rng1, rng2);
    }

    #[test]
    fn test_vector_element_sampling() {
        let mut trans: Translation<f64> = Translation::new();
        let base = Path::field(obj("p"), "center");
        trans
            .insert_path(
                &base,
                TagExpr::OptEval(Expr::Vector(vec![Expr::vary(), Expr::fix(5.0)])),
            )
            .unwrap();

        let varying = analyze::varying_paths(&trans).unwrap();
        assert_eq!(varying, vec![Path::access(base.clone(), vec![0])]);

        let canvas = Canvas::default();
        let mut rng = RngStream::new(17);
        sample_varying_fields(&mut trans, &varying, &canvas, &mut rng).unwrap();

        // The fixed element is untouched, the varying one is now concrete.
        assert!(matches!(
            trans.lookup(&Path::access(base.clone(), vec![0])).unwrap(),
            TagExpr::Done(Value::Float(_))
        ));
        assert_eq!(
            trans.lookup(&Path::access(base, vec![1])).unwrap(),
            TagExpr::Done(Value::Float(5.0))
        );
    }
}
