//! The translation store
//!
//! A two-level, insertion-ordered mapping `object → field → field-expression`
//! plus non-fatal warnings. The store is the source of truth for evaluation:
//! the evaluator reads through it, memoizes back into it, and the sampler
//! populates it. Iteration order is insertion order and is part of the
//! engine's determinism contract.

use indexmap::IndexMap;

use vellum_foundation::{BindingForm, Path, Scalar, Value};

use crate::error::Error;
use crate::expr::{AnnoFloat, Expr, FieldExpr, PropertyDict, TagExpr};

/// The semantic store produced by the upstream compiler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Translation<N> {
    map: IndexMap<BindingForm, IndexMap<String, FieldExpr<N>>>,
    warnings: Vec<String>,
}

impl<N: Scalar> Translation<N> {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Insert a field expression, creating the object entry on demand.
    ///
    /// Fails if the field already exists.
    pub fn insert_field(
        &mut self,
        object: BindingForm,
        field: impl Into<String>,
        expr: FieldExpr<N>,
    ) -> Result<(), Error> {
        let field = field.into();
        let fields = self.map.entry(object.clone()).or_default();
        if fields.contains_key(&field) {
            return Err(Error::DuplicatePath(Path::field(object, field)));
        }
        fields.insert(field, expr);
        Ok(())
    }

    /// Insert a graphical primitive at `object.field`.
    pub fn insert_gpi(
        &mut self,
        object: BindingForm,
        field: impl Into<String>,
        shape_type: impl Into<String>,
        properties: PropertyDict<N>,
    ) -> Result<(), Error> {
        self.insert_field(object, field, FieldExpr::Gpi(shape_type.into(), properties))
    }

    /// Look up a field, detecting the degenerate self-alias.
    pub fn field(&self, object: &BindingForm, field: &str) -> Result<&FieldExpr<N>, Error> {
        let expr = self
            .map
            .get(object)
            .and_then(|fields| fields.get(field))
            .ok_or_else(|| Error::UnknownPath(Path::field(object.clone(), field)))?;

        if let FieldExpr::Tag(TagExpr::OptEval(Expr::Path(Path::Field {
            object: o,
            field: f,
        }))) = expr
        {
            if o == object && f == field {
                return Err(Error::SelfAlias(Path::field(object.clone(), field)));
            }
        }
        Ok(expr)
    }

    /// Look up a graphical primitive, failing on plain fields.
    pub fn gpi(
        &self,
        object: &BindingForm,
        field: &str,
    ) -> Result<(&str, &PropertyDict<N>), Error> {
        match self.field(object, field)? {
            FieldExpr::Gpi(shape_type, dict) => Ok((shape_type, dict)),
            FieldExpr::Tag(_) => Err(Error::ExpectedGpi(Path::field(object.clone(), field))),
        }
    }

    /// Look up a property inside a graphical primitive.
    pub fn property(
        &self,
        object: &BindingForm,
        field: &str,
        property: &str,
    ) -> Result<&TagExpr<N>, Error> {
        let (_, dict) = self.gpi(object, field)?;
        let tag = dict.get(property).ok_or_else(|| {
            Error::UnknownPath(Path::property(object.clone(), field, property))
        })?;

        if let TagExpr::OptEval(Expr::Path(Path::Property {
            object: o,
            field: f,
            property: p,
        })) = tag
        {
            if o == object && f == field && p == property {
                return Err(Error::SelfAlias(Path::property(
                    object.clone(),
                    field,
                    property,
                )));
            }
        }
        Ok(tag)
    }

    /// Resolve a path to its current tagged expression.
    ///
    /// `Access` paths are expanded here: indexing into an evaluated value
    /// yields a scalar of the same tag kind, and indexing into a vector or
    /// matrix literal yields the (possibly unevaluated) element expression.
    /// Fields that are graphical primitives cannot be read through this
    /// entry point.
    pub fn lookup(&self, path: &Path) -> Result<TagExpr<N>, Error> {
        match path {
            Path::Field { object, field } => match self.field(object, field)? {
                FieldExpr::Tag(tag) => Ok(tag.clone()),
                FieldExpr::Gpi(_, _) => Err(Error::UnexpectedGpi(path.clone())),
            },
            Path::Property {
                object,
                field,
                property,
            } => Ok(self.property(object, field, property)?.clone()),
            Path::Access { base, indices } => self.lookup_access(path, base, indices),
            Path::LocalVar(name) => Err(Error::LocalVar(name.clone())),
        }
    }

    fn lookup_access(
        &self,
        path: &Path,
        base: &Path,
        indices: &[usize],
    ) -> Result<TagExpr<N>, Error> {
        match self.lookup(base)? {
            TagExpr::Done(v) => Ok(TagExpr::Done(Value::Float(index_value(
                path, &v, indices,
            )?))),
            TagExpr::Pending(v) => Ok(TagExpr::Pending(Value::Float(index_value(
                path, &v, indices,
            )?))),
            TagExpr::OptEval(Expr::Vector(elems)) => match indices {
                [i] => match elems.get(*i) {
                    Some(Expr::FloatLit(AnnoFloat::Fix(x))) => Ok(TagExpr::Done(Value::Float(*x))),
                    Some(e) => Ok(TagExpr::OptEval(e.clone())),
                    None => Err(bad_access(path, format!("index {i} out of bounds"))),
                },
                _ => Err(bad_access(path, "vector access takes one index".into())),
            },
            TagExpr::OptEval(Expr::Matrix(rows)) => match indices {
                [i, j] => match rows.get(*i).and_then(|r| r.get(*j)) {
                    Some(Expr::FloatLit(AnnoFloat::Fix(x))) => Ok(TagExpr::Done(Value::Float(*x))),
                    Some(e) => Ok(TagExpr::OptEval(e.clone())),
                    None => Err(bad_access(path, format!("index [{i}][{j}] out of bounds"))),
                },
                _ => Err(bad_access(path, "matrix access takes two indices".into())),
            },
            TagExpr::OptEval(_) => Err(bad_access(
                path,
                "cannot index an unevaluated expression".into(),
            )),
        }
    }

    /// Insert a tagged expression at a path, failing if the slot is taken.
    pub fn insert_path(&mut self, path: &Path, tag: TagExpr<N>) -> Result<(), Error> {
        self.insert(path, tag, false)
    }

    /// Insert a tagged expression at a path, replacing any existing entry.
    ///
    /// Memoization writes go through here so a cached result can never fail
    /// on a duplicate key.
    pub fn override_path(&mut self, path: &Path, tag: TagExpr<N>) -> Result<(), Error> {
        self.insert(path, tag, true)
    }

    fn insert(&mut self, path: &Path, tag: TagExpr<N>, overwrite: bool) -> Result<(), Error> {
        match path {
            Path::Field { object, field } => {
                let fields = self.map.entry(object.clone()).or_default();
                if !overwrite && fields.contains_key(field) {
                    return Err(Error::DuplicatePath(path.clone()));
                }
                fields.insert(field.clone(), FieldExpr::Tag(tag));
                Ok(())
            }
            Path::Property {
                object,
                field,
                property,
            } => {
                let dict = self.gpi_dict_mut(object, field)?;
                if !overwrite && dict.contains_key(property) {
                    return Err(Error::DuplicatePath(path.clone()));
                }
                dict.insert(property.clone(), tag);
                Ok(())
            }
            Path::Access { base, indices } => self.insert_access(path, base, indices, tag),
            Path::LocalVar(name) => Err(Error::LocalVar(name.clone())),
        }
    }

    /// Write a scalar into an element of a vector- or matrix-valued slot.
    fn insert_access(
        &mut self,
        path: &Path,
        base: &Path,
        indices: &[usize],
        tag: TagExpr<N>,
    ) -> Result<(), Error> {
        let Some(Value::Float(x)) = tag.value().cloned() else {
            return Err(bad_access(
                path,
                "only scalar values can be written at an indexed path".into(),
            ));
        };

        let container = match base {
            Path::Field { object, field } => {
                let object = object.clone();
                let field = field.clone();
                match self
                    .map
                    .get_mut(&object)
                    .and_then(|fields| fields.get_mut(&field))
                {
                    Some(FieldExpr::Tag(tag)) => tag,
                    Some(FieldExpr::Gpi(_, _)) => return Err(Error::UnexpectedGpi(base.clone())),
                    None => return Err(Error::UnknownPath(base.clone())),
                }
            }
            Path::Property {
                object,
                field,
                property,
            } => {
                let (object, field, property) = (object.clone(), field.clone(), property.clone());
                self.gpi_dict_mut(&object, &field)?
                    .get_mut(&property)
                    .ok_or_else(|| Error::UnknownPath(base.clone()))?
            }
            other => return Err(bad_access(path, format!("cannot index into {other}"))),
        };

        match container {
            TagExpr::Done(v) | TagExpr::Pending(v) => match indices {
                [i] => {
                    if v.set_component(*i, x) {
                        Ok(())
                    } else {
                        Err(bad_access(path, format!("index {i} out of bounds")))
                    }
                }
                [i, j] => match v {
                    Value::Matrix(rows) | Value::ListOfLists(rows) => rows
                        .get_mut(*i)
                        .and_then(|r| r.get_mut(*j))
                        .map(|slot| *slot = x)
                        .ok_or_else(|| bad_access(path, "index out of bounds".into())),
                    _ => Err(bad_access(path, "matrix access takes two indices".into())),
                },
                _ => Err(bad_access(path, "unsupported index depth".into())),
            },
            TagExpr::OptEval(Expr::Vector(elems)) => match indices {
                [i] => elems
                    .get_mut(*i)
                    .map(|slot| *slot = Expr::FloatLit(AnnoFloat::Fix(x)))
                    .ok_or_else(|| bad_access(path, format!("index {i} out of bounds"))),
                _ => Err(bad_access(path, "vector access takes one index".into())),
            },
            TagExpr::OptEval(Expr::Matrix(rows)) => match indices {
                [i, j] => rows
                    .get_mut(*i)
                    .and_then(|r| r.get_mut(*j))
                    .map(|slot| *slot = Expr::FloatLit(AnnoFloat::Fix(x)))
                    .ok_or_else(|| bad_access(path, "index out of bounds".into())),
                _ => Err(bad_access(path, "matrix access takes two indices".into())),
            },
            TagExpr::OptEval(_) => Err(bad_access(
                path,
                "cannot index an unevaluated expression".into(),
            )),
        }
    }

    fn gpi_dict_mut(
        &mut self,
        object: &BindingForm,
        field: &str,
    ) -> Result<&mut PropertyDict<N>, Error> {
        match self.map.get_mut(object).and_then(|fields| fields.get_mut(field)) {
            Some(FieldExpr::Gpi(_, dict)) => Ok(dict),
            Some(FieldExpr::Tag(_)) => Err(Error::ExpectedGpi(Path::field(object.clone(), field))),
            None => Err(Error::UnknownPath(Path::field(object.clone(), field))),
        }
    }

    /// Fold support: iterate all `(object, field, field-expression)` triples
    /// in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&BindingForm, &str, &FieldExpr<N>)> {
        self.map.iter().flat_map(|(object, fields)| {
            fields
                .iter()
                .map(move |(field, expr)| (object, field.as_str(), expr))
        })
    }

    /// All object names in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &BindingForm> {
        self.map.keys()
    }

    /// Record a non-fatal note on the translation.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    /// Total conversion to another scalar representation. Structure, order,
    /// and warnings are preserved exactly.
    pub fn cast<M: Scalar>(&self) -> Translation<M> {
        Translation {
            map: self
                .map
                .iter()
                .map(|(object, fields)| {
                    (
                        object.clone(),
                        fields
                            .iter()
                            .map(|(field, expr)| (field.clone(), expr.cast()))
                            .collect(),
                    )
                })
                .collect(),
            warnings: self.warnings.clone(),
        }
    }
}

fn bad_access(path: &Path, message: String) -> Error {
    Error::BadAccess {
        path: path.clone(),
        message,
    }
}

/// Index a concrete value with one or two indices.
fn index_value<N: Scalar>(path: &Path, v: &Value<N>, indices: &[usize]) -> Result<N, Error> {
    match indices {
        [i] => v
            .component(*i)
            .ok_or_else(|| bad_access(path, format!("index {i} out of bounds"))),
        [i, j] => match v {
            Value::Matrix(rows) | Value::ListOfLists(rows) => rows
                .get(*i)
                .and_then(|r| r.get(*j))
                .copied()
                .ok_or_else(|| bad_access(path, "index out of bounds".into())),
            _ => Err(bad_access(path, "matrix access takes two indices".into())),
        },
        _ => Err(bad_access(path, "unsupported index depth".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(name: &str) -> BindingForm {
        BindingForm::sub(name)
    }

    #[test]
    fn test_insert_and_lookup_field() {
        let mut trans: Translation<f64> = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(&path, TagExpr::Done(Value::Float(1.5)))
            .unwrap();
        assert_eq!(trans.lookup(&path).unwrap(), TagExpr::Done(Value::Float(1.5)));
    }

    #[test]
    fn test_duplicate_insert_fails_without_override() {
        let mut trans: Translation<f64> = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(&path, TagExpr::Done(Value::Float(1.0)))
            .unwrap();
        assert!(matches!(
            trans.insert_path(&path, TagExpr::Done(Value::Float(2.0))),
            Err(Error::DuplicatePath(_))
        ));
        trans
            .override_path(&path, TagExpr::Done(Value::Float(2.0)))
            .unwrap();
        assert_eq!(trans.lookup(&path).unwrap(), TagExpr::Done(Value::Float(2.0)));
    }

    #[test]
    fn test_self_alias_fails_loudly() {
        let mut trans: Translation<f64> = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(&path, TagExpr::OptEval(Expr::Path(path.clone())))
            .unwrap();
        assert!(matches!(trans.lookup(&path), Err(Error::SelfAlias(_))));
    }

    #[test]
    fn test_access_lookup_into_vector_literal() {
        let mut trans: Translation<f64> = Translation::new();
        let base = Path::field(obj("x"), "center");
        trans
            .insert_path(
                &base,
                TagExpr::OptEval(Expr::Vector(vec![Expr::fix(3.0), Expr::vary()])),
            )
            .unwrap();

        let first = Path::access(base.clone(), vec![0]);
        assert_eq!(
            trans.lookup(&first).unwrap(),
            TagExpr::Done(Value::Float(3.0))
        );

        let second = Path::access(base.clone(), vec![1]);
        assert_eq!(
            trans.lookup(&second).unwrap(),
            TagExpr::OptEval(Expr::vary())
        );
    }

    #[test]
    fn test_access_insert_replaces_vector_element() {
        let mut trans: Translation<f64> = Translation::new();
        let base = Path::field(obj("x"), "center");
        trans
            .insert_path(
                &base,
                TagExpr::OptEval(Expr::Vector(vec![Expr::vary(), Expr::vary()])),
            )
            .unwrap();

        let second = Path::access(base.clone(), vec![1]);
        trans
            .override_path(&second, TagExpr::Done(Value::Float(9.0)))
            .unwrap();
        assert_eq!(
            trans.lookup(&second).unwrap(),
            TagExpr::Done(Value::Float(9.0))
        );
        // The untouched element is still varying.
        let first = Path::access(base, vec![0]);
        assert_eq!(trans.lookup(&first).unwrap(), TagExpr::OptEval(Expr::vary()));
    }

    #[test]
    fn test_property_roundtrip() {
        let mut trans: Translation<f64> = Translation::new();
        trans
            .insert_gpi(obj("C"), "shape", "Circle", PropertyDict::new())
            .unwrap();
        let path = Path::property(obj("C"), "shape", "r");
        trans
            .insert_path(&path, TagExpr::Done(Value::Float(7.0)))
            .unwrap();
        assert_eq!(trans.lookup(&path).unwrap(), TagExpr::Done(Value::Float(7.0)));

        // Property insertion requires a primitive at the field.
        let mut plain: Translation<f64> = Translation::new();
        plain
            .insert_path(
                &Path::field(obj("C"), "shape"),
                TagExpr::Done(Value::Float(0.0)),
            )
            .unwrap();
        assert!(matches!(
            plain.insert_path(&path, TagExpr::Done(Value::Float(1.0))),
            Err(Error::ExpectedGpi(_))
        ));
    }

    #[test]
    fn test_gpi_cannot_be_read_as_scalar() {
        let mut trans: Translation<f64> = Translation::new();
        trans
            .insert_gpi(obj("C"), "shape", "Circle", PropertyDict::new())
            .unwrap();
        assert!(matches!(
            trans.lookup(&Path::field(obj("C"), "shape")),
            Err(Error::UnexpectedGpi(_))
        ));
    }

    #[test]
    fn test_warnings_lifecycle() {
        let mut trans: Translation<f64> = Translation::new();
        trans.warn("late binding of A.shape.r");
        assert_eq!(trans.warnings().len(), 1);
        trans.clear_warnings();
        assert!(trans.warnings().is_empty());
    }

    #[test]
    fn test_fields_iteration_order() {
        let mut trans: Translation<f64> = Translation::new();
        trans
            .insert_path(&Path::field(obj("b"), "y"), TagExpr::Done(Value::Float(1.0)))
            .unwrap();
        trans
            .insert_path(&Path::field(obj("a"), "x"), TagExpr::Done(Value::Float(2.0)))
            .unwrap();
        let order: Vec<String> = trans
            .fields()
            .map(|(o, f, _)| format!("{o}.{f}"))
            .collect();
        assert_eq!(order, vec!["b.y", "a.x"]);
    }
}
