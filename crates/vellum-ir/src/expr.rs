//! Expression trees and tagged storage forms
//!
//! Expressions are closed sums dispatched by exhaustive match. A field in
//! the translation stores either a [`TagExpr`] — a deferred, evaluated, or
//! externally-pending value — or a whole graphical primitive with its own
//! property dictionary.

use indexmap::IndexMap;

use vellum_foundation::scalar::cast;
use vellum_foundation::{Path, Scalar, Value};

/// A float literal that is either fixed or left to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnoFloat<N> {
    Fix(N),
    Vary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
}

/// An unevaluated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<N> {
    IntLit(i64),
    FloatLit(AnnoFloat<N>),
    StrLit(String),
    BoolLit(bool),
    /// Reference to another slot in the translation.
    Path(Path),
    /// Computation call dispatched through the computation registry.
    CompApp(String, Vec<Expr<N>>),
    /// Objective declaration; harvested, never evaluated.
    ObjFn(String, Vec<Expr<N>>),
    /// Constraint declaration; harvested, never evaluated.
    ConstrFn(String, Vec<Expr<N>>),
    /// Avoid declaration; declarative-only.
    AvoidFn(String, Vec<Expr<N>>),
    BinOp(BinaryOp, Box<Expr<N>>, Box<Expr<N>>),
    UnOp(UnaryOp, Box<Expr<N>>),
    List(Vec<Expr<N>>),
    Tuple(Box<Expr<N>>, Box<Expr<N>>),
    Vector(Vec<Expr<N>>),
    Matrix(Vec<Vec<Expr<N>>>),
    ListAccess(Path, usize),
    VectorAccess(Path, Box<Expr<N>>),
    MatrixAccess(Path, Vec<Expr<N>>),
    /// Inline shape constructor; forbidden as a sub-expression.
    Ctor(String),
    /// Partial-order declaration between two shapes.
    Layering(Path, Path),
    /// Access into plugin-supplied data; declarative-only.
    PluginAccess(String, Box<Expr<N>>, Box<Expr<N>>),
}

impl<N: Scalar> Expr<N> {
    /// Shorthand for a fixed float literal.
    pub fn fix(v: N) -> Self {
        Expr::FloatLit(AnnoFloat::Fix(v))
    }

    /// Shorthand for the varying marker.
    pub fn vary() -> Self {
        Expr::FloatLit(AnnoFloat::Vary)
    }

    pub fn is_vary(&self) -> bool {
        matches!(self, Expr::FloatLit(AnnoFloat::Vary))
    }

    /// Convert every scalar literal to another representation.
    pub fn cast<M: Scalar>(&self) -> Expr<M> {
        let go = |e: &Expr<N>| e.cast();
        let boxed = |e: &Expr<N>| Box::new(e.cast());
        match self {
            Expr::IntLit(v) => Expr::IntLit(*v),
            Expr::FloatLit(AnnoFloat::Fix(v)) => Expr::FloatLit(AnnoFloat::Fix(cast(*v))),
            Expr::FloatLit(AnnoFloat::Vary) => Expr::FloatLit(AnnoFloat::Vary),
            Expr::StrLit(s) => Expr::StrLit(s.clone()),
            Expr::BoolLit(b) => Expr::BoolLit(*b),
            Expr::Path(p) => Expr::Path(p.clone()),
            Expr::CompApp(name, args) => Expr::CompApp(name.clone(), args.iter().map(go).collect()),
            Expr::ObjFn(name, args) => Expr::ObjFn(name.clone(), args.iter().map(go).collect()),
            Expr::ConstrFn(name, args) => {
                Expr::ConstrFn(name.clone(), args.iter().map(go).collect())
            }
            Expr::AvoidFn(name, args) => Expr::AvoidFn(name.clone(), args.iter().map(go).collect()),
            Expr::BinOp(op, l, r) => Expr::BinOp(*op, boxed(l), boxed(r)),
            Expr::UnOp(op, e) => Expr::UnOp(*op, boxed(e)),
            Expr::List(es) => Expr::List(es.iter().map(go).collect()),
            Expr::Tuple(a, b) => Expr::Tuple(boxed(a), boxed(b)),
            Expr::Vector(es) => Expr::Vector(es.iter().map(go).collect()),
            Expr::Matrix(rows) => {
                Expr::Matrix(rows.iter().map(|r| r.iter().map(go).collect()).collect())
            }
            Expr::ListAccess(p, i) => Expr::ListAccess(p.clone(), *i),
            Expr::VectorAccess(p, e) => Expr::VectorAccess(p.clone(), boxed(e)),
            Expr::MatrixAccess(p, es) => {
                Expr::MatrixAccess(p.clone(), es.iter().map(go).collect())
            }
            Expr::Ctor(name) => Expr::Ctor(name.clone()),
            Expr::Layering(a, b) => Expr::Layering(a.clone(), b.clone()),
            Expr::PluginAccess(plugin, a, b) => {
                Expr::PluginAccess(plugin.clone(), boxed(a), boxed(b))
            }
        }
    }
}

/// The storage form of a value in the translation.
#[derive(Debug, Clone, PartialEq)]
pub enum TagExpr<N> {
    /// Evaluated and cacheable.
    Done(Value<N>),
    /// Evaluated but awaiting external substitution (label metrics).
    Pending(Value<N>),
    /// Not yet evaluated.
    OptEval(Expr<N>),
}

impl<N: Scalar> TagExpr<N> {
    /// The held value, when this entry is evaluated.
    pub fn value(&self) -> Option<&Value<N>> {
        match self {
            TagExpr::Done(v) | TagExpr::Pending(v) => Some(v),
            TagExpr::OptEval(_) => None,
        }
    }

    pub fn cast<M: Scalar>(&self) -> TagExpr<M> {
        match self {
            TagExpr::Done(v) => TagExpr::Done(v.cast()),
            TagExpr::Pending(v) => TagExpr::Pending(v.cast()),
            TagExpr::OptEval(e) => TagExpr::OptEval(e.cast()),
        }
    }
}

/// Insertion-ordered property dictionary of a graphical primitive.
pub type PropertyDict<N> = IndexMap<String, TagExpr<N>>;

/// A field in the translation: a plain tagged expression or a graphical
/// primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpr<N> {
    Tag(TagExpr<N>),
    Gpi(String, PropertyDict<N>),
}

impl<N: Scalar> FieldExpr<N> {
    pub fn cast<M: Scalar>(&self) -> FieldExpr<M> {
        match self {
            FieldExpr::Tag(t) => FieldExpr::Tag(t.cast()),
            FieldExpr::Gpi(ty, dict) => FieldExpr::Gpi(
                ty.clone(),
                dict.iter().map(|(k, v)| (k.clone(), v.cast())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_foundation::BindingForm;

    #[test]
    fn test_vary_marker() {
        assert!(Expr::<f64>::vary().is_vary());
        assert!(!Expr::fix(1.0).is_vary());
    }

    #[test]
    fn test_cast_is_structure_preserving() {
        let e: Expr<f64> = Expr::BinOp(
            BinaryOp::Add,
            Box::new(Expr::Path(vellum_foundation::Path::field(
                BindingForm::sub("A"),
                "x",
            ))),
            Box::new(Expr::fix(2.0)),
        );
        assert_eq!(e.cast::<f64>(), e);
    }

    #[test]
    fn test_tag_expr_value() {
        let done: TagExpr<f64> = TagExpr::Done(Value::Float(1.0));
        let pending: TagExpr<f64> = TagExpr::Pending(Value::Float(2.0));
        let deferred: TagExpr<f64> = TagExpr::OptEval(Expr::fix(3.0));
        assert_eq!(done.value(), Some(&Value::Float(1.0)));
        assert_eq!(pending.value(), Some(&Value::Float(2.0)));
        assert_eq!(deferred.value(), None);
    }
}
