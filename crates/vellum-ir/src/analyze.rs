//! Translation analysis
//!
//! Pure folds over the translation that enumerate the optimization problem:
//! which scalar slots are free, which properties still need sampling, which
//! values arrive externally, where the shapes are, and which objective and
//! constraint functions were declared. All outputs follow the store's
//! insertion order, which makes them deterministic for a fixed input.

use vellum_foundation::{Path, Scalar};
use vellum_registry as registry;

use crate::error::Error;
use crate::expr::{AnnoFloat, Expr, FieldExpr, TagExpr};
use crate::translation::Translation;

/// Scalar shape properties excluded from the varying set by policy.
pub const UNOPTIMIZED_PROPERTIES: &[&str] = &[
    "rotation",
    "strokeWidth",
    "thickness",
    "transform",
    "transformation",
    "opacity",
    "finalW",
    "finalH",
    "arrowheadSize",
];

/// Vector-valued shape properties expanded element-wise into the varying
/// set. Fixed to two components.
pub const OPTIMIZED_VECTOR_PROPERTIES: &[&str] = &["start", "end", "center"];

/// Component count for optimized vector properties.
pub const OPTIMIZED_VECTOR_COMPONENTS: usize = 2;

/// A harvested objective or constraint application.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSpec<N> {
    pub name: String,
    pub args: Vec<Expr<N>>,
}

/// Paths of every graphical primitive, in declaration order.
pub fn shape_paths<N: Scalar>(trans: &Translation<N>) -> Vec<Path> {
    trans
        .fields()
        .filter(|(_, _, expr)| matches!(expr, FieldExpr::Gpi(_, _)))
        .map(|(object, field, _)| Path::field(object.clone(), field))
        .collect()
}

/// `"object.field"` names of every graphical primitive, in declaration
/// order.
pub fn shape_names<N: Scalar>(trans: &Translation<N>) -> Vec<String> {
    trans
        .fields()
        .filter(|(_, _, expr)| matches!(expr, FieldExpr::Gpi(_, _)))
        .map(|(object, field, _)| format!("{object}.{field}"))
        .collect()
}

/// `(object, field, property)` triples for every shape property currently
/// present in a property dictionary.
pub fn shape_properties<N: Scalar>(trans: &Translation<N>) -> Vec<(String, String, String)> {
    let mut out = Vec::new();
    for (object, field, expr) in trans.fields() {
        if let FieldExpr::Gpi(_, dict) = expr {
            for property in dict.keys() {
                out.push((object.name().to_string(), field.to_string(), property.clone()));
            }
        }
    }
    out
}

/// Enumerate every free scalar slot in the translation.
///
/// Field-level slots vary when they are literally `Vary` or a vector literal
/// with `Vary` elements. Shape properties vary by schema: scalar properties
/// outside the unoptimized set and not pending, and the optimized vector
/// properties expanded to their two element paths (the pending exclusion
/// applies to scalar properties only).
pub fn varying_paths<N: Scalar>(trans: &Translation<N>) -> Result<Vec<Path>, Error> {
    let mut out = Vec::new();

    for (object, field, expr) in trans.fields() {
        let field_path = Path::field(object.clone(), field);
        match expr {
            FieldExpr::Tag(TagExpr::OptEval(e)) => match e {
                Expr::FloatLit(AnnoFloat::Vary) => out.push(field_path),
                Expr::Vector(elems) => {
                    for (i, elem) in elems.iter().enumerate() {
                        if elem.is_vary() {
                            out.push(Path::access(field_path.clone(), vec![i]));
                        }
                    }
                }
                _ => {}
            },
            FieldExpr::Tag(_) => {}
            FieldExpr::Gpi(shape_type, dict) => {
                let desc = registry::shape(shape_type)?;
                for spec in (desc.schema)() {
                    let prop_path = Path::property(object.clone(), field, spec.name);

                    if spec.ty.is_scalar()
                        && !UNOPTIMIZED_PROPERTIES.contains(&spec.name)
                        && !desc.pending.contains(&spec.name)
                    {
                        match dict.get(spec.name) {
                            None => out.push(prop_path),
                            Some(TagExpr::OptEval(e)) if e.is_vary() => out.push(prop_path),
                            Some(_) => {}
                        }
                    } else if OPTIMIZED_VECTOR_PROPERTIES.contains(&spec.name) {
                        match dict.get(spec.name) {
                            None => {
                                for i in 0..OPTIMIZED_VECTOR_COMPONENTS {
                                    out.push(Path::access(prop_path.clone(), vec![i]));
                                }
                            }
                            Some(TagExpr::OptEval(e)) if e.is_vary() => {
                                for i in 0..OPTIMIZED_VECTOR_COMPONENTS {
                                    out.push(Path::access(prop_path.clone(), vec![i]));
                                }
                            }
                            Some(TagExpr::OptEval(Expr::Vector(elems))) => {
                                if elems.len() != OPTIMIZED_VECTOR_COMPONENTS {
                                    return Err(Error::VaryingVectorArity {
                                        path: prop_path,
                                        len: elems.len(),
                                    });
                                }
                                for (i, elem) in elems.iter().enumerate() {
                                    if elem.is_vary() {
                                        out.push(Path::access(prop_path.clone(), vec![i]));
                                    }
                                }
                            }
                            Some(_) => {}
                        }
                    }
                }
            }
        }
    }
    Ok(out)
}

/// Non-scalar schema properties (excluding `name`) absent from their
/// dictionaries. These need re-substitution after a resample.
pub fn uninitialized_paths<N: Scalar>(trans: &Translation<N>) -> Result<Vec<Path>, Error> {
    let mut out = Vec::new();
    for (object, field, expr) in trans.fields() {
        if let FieldExpr::Gpi(shape_type, dict) = expr {
            let desc = registry::shape(shape_type)?;
            for spec in (desc.schema)() {
                if spec.name == "name" || spec.ty.is_scalar() {
                    continue;
                }
                if !dict.contains_key(spec.name) {
                    out.push(Path::property(object.clone(), field, spec.name));
                }
            }
        }
    }
    Ok(out)
}

/// Property paths whose current entry awaits external substitution.
pub fn pending_paths<N: Scalar>(trans: &Translation<N>) -> Vec<Path> {
    let mut out = Vec::new();
    for (object, field, expr) in trans.fields() {
        if let FieldExpr::Gpi(_, dict) = expr {
            for (property, tag) in dict {
                if matches!(tag, TagExpr::Pending(_)) {
                    out.push(Path::property(object.clone(), field, property));
                }
            }
        }
    }
    out
}

/// Harvest declared objective (left) and constraint (right) applications.
pub fn declared_fns<N: Scalar>(trans: &Translation<N>) -> (Vec<FnSpec<N>>, Vec<FnSpec<N>>) {
    let mut objectives = Vec::new();
    let mut constraints = Vec::new();
    for (_, _, expr) in trans.fields() {
        if let FieldExpr::Tag(TagExpr::OptEval(e)) = expr {
            match e {
                Expr::ObjFn(name, args) => objectives.push(FnSpec {
                    name: name.clone(),
                    args: args.clone(),
                }),
                Expr::ConstrFn(name, args) => constraints.push(FnSpec {
                    name: name.clone(),
                    args: args.clone(),
                }),
                _ => {}
            }
        }
    }
    (objectives, constraints)
}

/// The catalog's default objective and constraint applications: one per
/// registered default per primitive, each applied to the primitive's own
/// field path.
pub fn default_fns<N: Scalar>(
    trans: &Translation<N>,
) -> Result<(Vec<FnSpec<N>>, Vec<FnSpec<N>>), Error> {
    let mut objectives = Vec::new();
    let mut constraints = Vec::new();
    for (object, field, expr) in trans.fields() {
        if let FieldExpr::Gpi(shape_type, _) = expr {
            let desc = registry::shape(shape_type)?;
            let arg = Expr::Path(Path::field(object.clone(), field));
            for name in desc.default_objectives {
                objectives.push(FnSpec {
                    name: (*name).to_string(),
                    args: vec![arg.clone()],
                });
            }
            for name in desc.default_constraints {
                constraints.push(FnSpec {
                    name: (*name).to_string(),
                    args: vec![arg.clone()],
                });
            }
        }
    }
    Ok((objectives, constraints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::PropertyDict;
    use vellum_foundation::{BindingForm, Value};

    fn obj(name: &str) -> BindingForm {
        BindingForm::sub(name)
    }

    #[test]
    fn test_field_level_varying_paths() {
        let mut trans: Translation<f64> = Translation::new();
        trans
            .insert_path(&Path::field(obj("x"), "val"), TagExpr::OptEval(Expr::vary()))
            .unwrap();
        trans
            .insert_path(
                &Path::field(obj("p"), "center"),
                TagExpr::OptEval(Expr::Vector(vec![Expr::vary(), Expr::fix(0.0)])),
            )
            .unwrap();
        trans
            .insert_path(
                &Path::field(obj("k"), "fixed"),
                TagExpr::Done(Value::Float(4.0)),
            )
            .unwrap();

        let varying = varying_paths(&trans).unwrap();
        assert_eq!(
            varying,
            vec![
                Path::field(obj("x"), "val"),
                Path::access(Path::field(obj("p"), "center"), vec![0]),
            ]
        );
    }

    #[test]
    fn test_declared_fns_split() {
        let mut trans: Translation<f64> = Translation::new();
        trans
            .insert_path(
                &Path::field(obj("f"), "obj0"),
                TagExpr::OptEval(Expr::ObjFn("near".into(), vec![Expr::fix(1.0)])),
            )
            .unwrap();
        trans
            .insert_path(
                &Path::field(obj("f"), "constr0"),
                TagExpr::OptEval(Expr::ConstrFn("positive".into(), vec![Expr::fix(2.0)])),
            )
            .unwrap();

        let (objs, constrs) = declared_fns(&trans);
        assert_eq!(objs.len(), 1);
        assert_eq!(objs[0].name, "near");
        assert_eq!(constrs.len(), 1);
        assert_eq!(constrs[0].name, "positive");
    }

    #[test]
    fn test_pending_paths_fold() {
        let mut trans: Translation<f64> = Translation::new();
        let mut dict = PropertyDict::new();
        dict.insert("w".into(), TagExpr::Pending(Value::Float(0.0)));
        dict.insert("x".into(), TagExpr::Done(Value::Float(1.0)));
        trans.insert_gpi(obj("L"), "text", "Text", dict).unwrap();

        assert_eq!(
            pending_paths(&trans),
            vec![Path::property(obj("L"), "text", "w")]
        );
    }
}
