//! Expression evaluation
//!
//! A depth-bounded recursive evaluator over the translation. Results of
//! deferred expressions are memoized back into the store by replacing the
//! slot with `Done`; the varying overlay is consulted before the store and
//! is immutable within one pass. Argument evaluation is strictly left to
//! right, with the translation and the stream threaded sequentially, so the
//! order of memoizations and draws is deterministic.

use indexmap::IndexMap;
use tracing::trace;

use vellum_foundation::{ArgVal, BindingForm, Path, RngStream, Shape, Value};
use vellum_ir::{AnnoFloat, BinaryOp, Expr, FieldExpr, PropertyDict, TagExpr, Translation, UnaryOp};
use vellum_registry as registry;

use crate::config::MAX_EVAL_DEPTH;
use crate::error::{Error, Result};

/// The varying-value overlay: authoritative scalar values keyed by path,
/// consulted before the translation.
pub type Overlay = IndexMap<Path, f64>;

/// Zip varying paths and values into an overlay.
///
/// The two slices are aligned by construction; extra entries on either side
/// are ignored.
pub fn make_overlay(paths: &[Path], values: &[f64]) -> Overlay {
    paths.iter().cloned().zip(values.iter().copied()).collect()
}

/// One evaluation pass over a translation.
pub struct Evaluator<'a> {
    overlay: &'a Overlay,
    max_depth: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(overlay: &'a Overlay) -> Self {
        Self {
            overlay,
            max_depth: MAX_EVAL_DEPTH,
        }
    }

    #[cfg(test)]
    pub fn with_max_depth(overlay: &'a Overlay, max_depth: u32) -> Self {
        Self { overlay, max_depth }
    }

    fn guard(&self, depth: u32) -> Result<()> {
        if depth >= self.max_depth {
            Err(Error::DepthExceeded {
                max: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    /// Evaluate one expression.
    pub fn eval_expr(
        &self,
        depth: u32,
        expr: &Expr<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<ArgVal<f64>> {
        self.guard(depth)?;
        match expr {
            Expr::IntLit(v) => Ok(ArgVal::Val(Value::Int(*v))),
            Expr::FloatLit(AnnoFloat::Fix(v)) => Ok(ArgVal::Val(Value::Float(*v))),
            Expr::FloatLit(AnnoFloat::Vary) => Err(Error::UninitializedVary),
            Expr::StrLit(s) => Ok(ArgVal::Val(Value::Str(s.clone()))),
            Expr::BoolLit(b) => Ok(ArgVal::Val(Value::Bool(*b))),

            Expr::Path(path) => self.eval_path(depth + 1, path, trans, rng),

            Expr::UnOp(op, inner) => {
                let v = self.eval_value(depth + 1, inner, trans, rng)?;
                match (op, v) {
                    (UnaryOp::Minus, Value::Float(x)) => Ok(ArgVal::Val(Value::Float(-x))),
                    (UnaryOp::Minus, Value::Int(x)) => Ok(ArgVal::Val(Value::Int(-x))),
                    (UnaryOp::Plus, v @ (Value::Float(_) | Value::Int(_))) => Ok(ArgVal::Val(v)),
                    (_, v) => Err(Error::TypeMismatch(format!(
                        "unary operator applied to {:?}",
                        v.value_type()
                    ))),
                }
            }

            Expr::BinOp(op, lhs, rhs) => {
                let l = self.eval_value(depth + 1, lhs, trans, rng)?;
                let r = self.eval_value(depth + 1, rhs, trans, rng)?;
                binary_op(*op, l, r).map(ArgVal::Val)
            }

            Expr::List(elems) => {
                let xs = self.eval_floats(depth, elems, trans, rng, "list")?;
                Ok(ArgVal::Val(Value::List(xs)))
            }
            Expr::Tuple(a, b) => {
                let x = self.eval_float(depth + 1, a, trans, rng, "tuple")?;
                let y = self.eval_float(depth + 1, b, trans, rng, "tuple")?;
                Ok(ArgVal::Val(Value::Tuple(x, y)))
            }
            Expr::Vector(elems) => {
                let xs = self.eval_floats(depth, elems, trans, rng, "vector")?;
                Ok(ArgVal::Val(Value::Vector(xs)))
            }
            Expr::Matrix(rows) => {
                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    out.push(self.eval_floats(depth, row, trans, rng, "matrix")?);
                }
                Ok(ArgVal::Val(Value::Matrix(out)))
            }

            Expr::ListAccess(path, index) => {
                let v = self.eval_container(depth, path, trans, rng)?;
                index_container(&v, &[*index]).map(ArgVal::Val)
            }
            Expr::VectorAccess(path, index_expr) => {
                let index = self.eval_index(depth, index_expr, trans, rng)?;
                let v = self.eval_container(depth, path, trans, rng)?;
                index_container(&v, &[index]).map(ArgVal::Val)
            }
            Expr::MatrixAccess(path, index_exprs) => {
                let mut indices = Vec::with_capacity(index_exprs.len());
                for e in index_exprs {
                    indices.push(self.eval_index(depth, e, trans, rng)?);
                }
                let v = self.eval_container(depth, path, trans, rng)?;
                index_container(&v, &indices).map(ArgVal::Val)
            }

            Expr::CompApp(name, arg_exprs) => {
                let mut values = Vec::with_capacity(arg_exprs.len());
                for arg in arg_exprs {
                    values.push(self.eval_value(depth + 1, arg, trans, rng)?);
                }
                let out = registry::apply_computation(name, &values, rng)?;
                Ok(ArgVal::Val(out))
            }

            Expr::Ctor(_) => Err(Error::InlineGpi),
            Expr::ObjFn(_, _) => Err(Error::DeclarationInEval("objective")),
            Expr::ConstrFn(_, _) => Err(Error::DeclarationInEval("constraint")),
            Expr::AvoidFn(_, _) => Err(Error::DeclarationInEval("avoid")),
            Expr::Layering(_, _) => Err(Error::DeclarationInEval("layering")),
            Expr::PluginAccess(_, _, _) => Err(Error::DeclarationInEval("plugin access")),
        }
    }

    /// Evaluate a list of expressions in input order.
    pub fn eval_exprs(
        &self,
        depth: u32,
        exprs: &[Expr<f64>],
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<Vec<ArgVal<f64>>> {
        let mut out = Vec::with_capacity(exprs.len());
        for expr in exprs {
            out.push(self.eval_expr(depth, expr, trans, rng)?);
        }
        Ok(out)
    }

    /// Resolve a path through the overlay and the translation.
    pub fn eval_path(
        &self,
        depth: u32,
        path: &Path,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<ArgVal<f64>> {
        self.guard(depth)?;
        if let Some(v) = self.overlay.get(path) {
            return Ok(ArgVal::Val(Value::Float(*v)));
        }

        match path {
            Path::Field { object, field } => {
                match trans.field(object, field).map_err(Error::Ir)?.clone() {
                    FieldExpr::Tag(TagExpr::Done(v)) | FieldExpr::Tag(TagExpr::Pending(v)) => {
                        Ok(ArgVal::Val(self.patch_components(path, v)))
                    }
                    FieldExpr::Tag(TagExpr::OptEval(e)) => {
                        let e = self.substitute_varying(path, e);
                        match self.eval_expr(depth + 1, &e, trans, rng)? {
                            ArgVal::Val(v) => {
                                trace!(path = %path, "memoizing field");
                                trans
                                    .override_path(path, TagExpr::Done(v.clone()))
                                    .map_err(Error::Ir)?;
                                Ok(ArgVal::Val(v))
                            }
                            // An alias resolved to a primitive; propagate
                            // without memoizing at this path.
                            ArgVal::Gpi(shape) => Ok(ArgVal::Gpi(shape)),
                        }
                    }
                    FieldExpr::Gpi(shape_type, dict) => {
                        self.eval_gpi(depth, object, field, &shape_type, dict, trans, rng)
                    }
                }
            }

            Path::Property {
                object,
                field,
                property,
            } => {
                let (shape_type, _) = trans.gpi(object, field).map_err(Error::Ir)?;
                if let Some(computed) = registry::computed_property(shape_type, property) {
                    return self.eval_computed(depth, object, field, computed, trans, rng);
                }
                let tag = trans.property(object, field, property).map_err(Error::Ir)?.clone();
                self.eval_property(depth, path, tag, trans, rng).map(ArgVal::Val)
            }

            Path::Access { base, indices } => {
                let container = match self.eval_path(depth + 1, base, trans, rng)? {
                    ArgVal::Val(v) => v,
                    ArgVal::Gpi(_) => {
                        return Err(Error::TypeMismatch(
                            "cannot index into a graphical primitive".to_string(),
                        ))
                    }
                };
                index_container(&container, indices).map(ArgVal::Val)
            }

            Path::LocalVar(name) => {
                Err(Error::Ir(vellum_ir::Error::LocalVar(name.clone())))
            }
        }
    }

    /// Evaluate one shape property to a concrete value, memoizing deferred
    /// results at the property path.
    fn eval_property(
        &self,
        depth: u32,
        prop_path: &Path,
        tag: TagExpr<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<Value<f64>> {
        if let Some(v) = self.overlay.get(prop_path) {
            return Ok(Value::Float(*v));
        }
        match tag {
            TagExpr::Done(v) | TagExpr::Pending(v) => Ok(self.patch_components(prop_path, v)),
            TagExpr::OptEval(e) => {
                let e = self.substitute_varying(prop_path, e);
                match self.eval_expr(depth + 1, &e, trans, rng)? {
                    ArgVal::Val(v) => {
                        trans
                            .override_path(prop_path, TagExpr::Done(v.clone()))
                            .map_err(Error::Ir)?;
                        Ok(v)
                    }
                    ArgVal::Gpi(_) => Err(Error::TypeMismatch(format!(
                        "property {prop_path} evaluated to a graphical primitive"
                    ))),
                }
            }
        }
    }

    /// Evaluate a whole primitive: every property in dictionary order, with
    /// the synthetic `name` injected last.
    fn eval_gpi(
        &self,
        depth: u32,
        object: &BindingForm,
        field: &str,
        shape_type: &str,
        dict: PropertyDict<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<ArgVal<f64>> {
        let mut shape = Shape::new(shape_type);
        for (property, tag) in dict {
            let prop_path = Path::property(object.clone(), field, property.clone());
            let v = self.eval_property(depth, &prop_path, tag, trans, rng)?;
            shape.properties.insert(property, v);
        }
        shape.properties.insert(
            "name".to_string(),
            Value::Str(format!("{object}.{field}")),
        );
        Ok(ArgVal::Gpi(shape))
    }

    /// Apply a computed property: evaluate its declared sibling properties
    /// left to right, then run the compute body.
    fn eval_computed(
        &self,
        depth: u32,
        object: &BindingForm,
        field: &str,
        computed: &registry::ComputedProperty,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<ArgVal<f64>> {
        let mut values = Vec::with_capacity(computed.args.len());
        for arg in computed.args {
            let arg_path = Path::property(object.clone(), field, *arg);
            match self.eval_path(depth + 1, &arg_path, trans, rng)? {
                ArgVal::Val(v) => values.push(v),
                ArgVal::Gpi(_) => {
                    return Err(Error::TypeMismatch(format!(
                        "computed property argument {arg_path} is a graphical primitive"
                    )))
                }
            }
        }
        Ok(ArgVal::Val((computed.compute)(&values)?))
    }

    /// Replace `Vary` elements of a vector literal with their overlay
    /// values, keyed by element path.
    fn substitute_varying(&self, path: &Path, expr: Expr<f64>) -> Expr<f64> {
        match expr {
            Expr::Vector(elems) => Expr::Vector(
                elems
                    .into_iter()
                    .enumerate()
                    .map(|(i, e)| {
                        if e.is_vary() {
                            let element = Path::access(path.clone(), vec![i]);
                            match self.overlay.get(&element) {
                                Some(v) => Expr::fix(*v),
                                None => e,
                            }
                        } else {
                            e
                        }
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Patch components of an evaluated container with overlay element
    /// values, so varying vector elements read through the overlay.
    fn patch_components(&self, path: &Path, mut v: Value<f64>) -> Value<f64> {
        let n = match &v {
            Value::Vector(xs) | Value::List(xs) => xs.len(),
            Value::Point(_) | Value::Tuple(_, _) => 2,
            _ => 0,
        };
        for i in 0..n {
            let element = Path::access(path.clone(), vec![i]);
            if let Some(x) = self.overlay.get(&element) {
                v.set_component(i, *x);
            }
        }
        v
    }

    fn eval_value(
        &self,
        depth: u32,
        expr: &Expr<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<Value<f64>> {
        match self.eval_expr(depth, expr, trans, rng)? {
            ArgVal::Val(v) => Ok(v),
            ArgVal::Gpi(_) => Err(Error::TypeMismatch(
                "graphical primitive in a value position".to_string(),
            )),
        }
    }

    fn eval_float(
        &self,
        depth: u32,
        expr: &Expr<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
        context: &str,
    ) -> Result<f64> {
        match self.eval_value(depth, expr, trans, rng)? {
            Value::Float(x) => Ok(x),
            v => Err(Error::TypeMismatch(format!(
                "{context} element must be Float, found {:?}",
                v.value_type()
            ))),
        }
    }

    fn eval_floats(
        &self,
        depth: u32,
        exprs: &[Expr<f64>],
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
        context: &str,
    ) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(exprs.len());
        for e in exprs {
            out.push(self.eval_float(depth + 1, e, trans, rng, context)?);
        }
        Ok(out)
    }

    fn eval_index(
        &self,
        depth: u32,
        expr: &Expr<f64>,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<usize> {
        match self.eval_value(depth + 1, expr, trans, rng)? {
            Value::Int(i) if i >= 0 => Ok(i as usize),
            v => Err(Error::TypeMismatch(format!(
                "index must be a non-negative Int, found {v:?}"
            ))),
        }
    }

    fn eval_container(
        &self,
        depth: u32,
        path: &Path,
        trans: &mut Translation<f64>,
        rng: &mut RngStream,
    ) -> Result<Value<f64>> {
        match self.eval_path(depth + 1, path, trans, rng)? {
            ArgVal::Val(v) => Ok(v),
            ArgVal::Gpi(_) => Err(Error::TypeMismatch(
                "cannot index into a graphical primitive".to_string(),
            )),
        }
    }
}

/// Binary operations are defined on operands of identical numeric type.
fn binary_op(op: BinaryOp, l: Value<f64>, r: Value<f64>) -> Result<Value<f64>> {
    match (l, r) {
        (Value::Float(a), Value::Float(b)) => {
            let out = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => {
                    if b == 0.0 {
                        return Err(Error::DivisionByZero);
                    }
                    a / b
                }
                BinaryOp::Pow => a.powf(b),
            };
            Ok(Value::Float(out))
        }
        (Value::Int(a), Value::Int(b)) => {
            let out = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => {
                    if b == 0 {
                        return Err(Error::DivisionByZero);
                    }
                    a / b
                }
                BinaryOp::Pow => {
                    if b < 0 {
                        return Err(Error::NegativeExponent);
                    }
                    a.pow(b as u32)
                }
            };
            Ok(Value::Int(out))
        }
        (l, r) => Err(Error::TypeMismatch(format!(
            "binary operator on {:?} and {:?}",
            l.value_type(),
            r.value_type()
        ))),
    }
}

/// Index a concrete container value.
fn index_container(v: &Value<f64>, indices: &[usize]) -> Result<Value<f64>> {
    match indices {
        [i] => v
            .component(*i)
            .map(Value::Float)
            .ok_or_else(|| Error::TypeMismatch(format!("cannot take element {i} of {:?}", v.value_type()))),
        [i, j] => match v {
            Value::Matrix(rows) | Value::ListOfLists(rows) => rows
                .get(*i)
                .and_then(|row| row.get(*j))
                .map(|x| Value::Float(*x))
                .ok_or_else(|| Error::TypeMismatch(format!("index [{i}][{j}] out of bounds"))),
            _ => Err(Error::TypeMismatch(format!(
                "cannot take element [{i}][{j}] of {:?}",
                v.value_type()
            ))),
        },
        _ => Err(Error::TypeMismatch("unsupported index depth".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_foundation::BindingForm;

    fn obj(name: &str) -> BindingForm {
        BindingForm::sub(name)
    }

    fn eval_one(
        trans: &mut Translation<f64>,
        overlay: &Overlay,
        expr: &Expr<f64>,
    ) -> Result<ArgVal<f64>> {
        let mut rng = RngStream::new(17);
        Evaluator::new(overlay).eval_expr(0, expr, trans, &mut rng)
    }

    #[test]
    fn test_literals_and_arithmetic() {
        let mut trans = Translation::new();
        let overlay = Overlay::new();
        let expr = Expr::BinOp(
            BinaryOp::Add,
            Box::new(Expr::fix(1.5)),
            Box::new(Expr::fix(2.5)),
        );
        assert_eq!(
            eval_one(&mut trans, &overlay, &expr).unwrap(),
            ArgVal::Val(Value::Float(4.0))
        );
    }

    #[test]
    fn test_mixed_operand_types_fail() {
        let mut trans = Translation::new();
        let overlay = Overlay::new();
        let expr = Expr::BinOp(
            BinaryOp::Add,
            Box::new(Expr::fix(1.0)),
            Box::new(Expr::IntLit(2)),
        );
        assert!(matches!(
            eval_one(&mut trans, &overlay, &expr),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_division_by_zero_is_a_domain_error() {
        let mut trans = Translation::new();
        let overlay = Overlay::new();
        let expr = Expr::BinOp(
            BinaryOp::Div,
            Box::new(Expr::fix(1.0)),
            Box::new(Expr::fix(0.0)),
        );
        assert!(matches!(
            eval_one(&mut trans, &overlay, &expr),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_path_memoization_is_a_fixed_point() {
        let mut trans = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(
                &path,
                TagExpr::OptEval(Expr::BinOp(
                    BinaryOp::Mul,
                    Box::new(Expr::fix(3.0)),
                    Box::new(Expr::fix(4.0)),
                )),
            )
            .unwrap();

        let overlay = Overlay::new();
        let expr = Expr::Path(path.clone());
        assert_eq!(
            eval_one(&mut trans, &overlay, &expr).unwrap(),
            ArgVal::Val(Value::Float(12.0))
        );
        // Memoized in place.
        assert_eq!(
            trans.lookup(&path).unwrap(),
            TagExpr::Done(Value::Float(12.0))
        );
        // Second evaluation returns the same value from the cache and the
        // translation is unchanged.
        let snapshot = trans.clone();
        assert_eq!(
            eval_one(&mut trans, &overlay, &expr).unwrap(),
            ArgVal::Val(Value::Float(12.0))
        );
        assert_eq!(trans, snapshot);
    }

    #[test]
    fn test_overlay_wins_over_translation() {
        let mut trans = Translation::new();
        let path = Path::field(obj("x"), "val");
        trans
            .insert_path(&path, TagExpr::Done(Value::Float(1.0)))
            .unwrap();

        let mut overlay = Overlay::new();
        overlay.insert(path.clone(), 42.0);
        assert_eq!(
            eval_one(&mut trans, &overlay, &Expr::Path(path)).unwrap(),
            ArgVal::Val(Value::Float(42.0))
        );
    }

    #[test]
    fn test_alias_chain_resolves_without_memoizing_gpi() {
        let mut trans = Translation::new();
        trans
            .insert_gpi(obj("A"), "shape", "Circle", {
                let mut dict = PropertyDict::new();
                dict.insert("r".to_string(), TagExpr::Done(Value::Float(5.0)));
                dict
            })
            .unwrap();
        trans
            .insert_path(
                &Path::field(obj("B"), "icon"),
                TagExpr::OptEval(Expr::Path(Path::field(obj("A"), "shape"))),
            )
            .unwrap();

        let overlay = Overlay::new();
        let out = eval_one(&mut trans, &overlay, &Expr::Path(Path::field(obj("B"), "icon")))
            .unwrap();
        let ArgVal::Gpi(shape) = out else {
            panic!("alias to a primitive must resolve to a Gpi");
        };
        assert_eq!(shape.shape_type, "Circle");
        assert_eq!(shape.name(), Some("A.shape"));
        // The alias slot is still deferred: Gpi results are not memoized.
        assert!(matches!(
            trans.field(&obj("B"), "icon").unwrap(),
            FieldExpr::Tag(TagExpr::OptEval(_))
        ));
    }

    #[test]
    fn test_cycle_hits_depth_bound() {
        let mut trans = Translation::new();
        let a = Path::field(obj("a"), "v");
        let b = Path::field(obj("b"), "v");
        trans
            .insert_path(&a, TagExpr::OptEval(Expr::Path(b.clone())))
            .unwrap();
        trans
            .insert_path(&b, TagExpr::OptEval(Expr::Path(a.clone())))
            .unwrap();

        let overlay = Overlay::new();
        let mut rng = RngStream::new(17);
        let ev = Evaluator::with_max_depth(&overlay, 50);
        assert!(matches!(
            ev.eval_expr(0, &Expr::Path(a), &mut trans, &mut rng),
            Err(Error::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_vector_literal_substitutes_overlay_elements() {
        let mut trans = Translation::new();
        let path = Path::field(obj("p"), "center");
        trans
            .insert_path(
                &path,
                TagExpr::OptEval(Expr::Vector(vec![Expr::vary(), Expr::fix(7.0)])),
            )
            .unwrap();

        let mut overlay = Overlay::new();
        overlay.insert(Path::access(path.clone(), vec![0]), 3.0);
        assert_eq!(
            eval_one(&mut trans, &overlay, &Expr::Path(path)).unwrap(),
            ArgVal::Val(Value::Vector(vec![3.0, 7.0]))
        );
    }

    #[test]
    fn test_declarations_are_not_evaluable() {
        let mut trans = Translation::new();
        let overlay = Overlay::new();
        let decl = Expr::ObjFn("near".to_string(), vec![]);
        assert!(matches!(
            eval_one(&mut trans, &overlay, &decl),
            Err(Error::DeclarationInEval("objective"))
        ));
        assert!(matches!(
            eval_one(&mut trans, &overlay, &Expr::Ctor("Circle".to_string())),
            Err(Error::InlineGpi)
        ));
    }
}
