//! Layering solver
//!
//! Collects `Layering(a, b)` declarations, resolves both endpoints to shape
//! names (following field aliases), and topologically orders the shape-name
//! graph with Kahn's algorithm. Any cycle, including a self-loop, means
//! there is no consistent order. Nodes are processed in first-declaration
//! order, which makes the tie-break deterministic.

use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::debug;

use vellum_foundation::Path;
use vellum_ir::{analyze, Expr, FieldExpr, TagExpr, Translation};

use crate::error::{Error, Result};

/// Compute a total layering order over all shape names.
///
/// Returns `Ok(None)` when the layering graph has a cycle. Resolution
/// failures (an endpoint that is not a shape, or an alias cycle) are fatal.
pub fn compute_layering(trans: &Translation<f64>) -> Result<Option<Vec<String>>> {
    let names = analyze::shape_names(trans);

    let mut edges = Vec::new();
    for (_, _, expr) in trans.fields() {
        if let FieldExpr::Tag(TagExpr::OptEval(Expr::Layering(below, above))) = expr {
            let a = resolve_shape_name(trans, below, &mut Vec::new())?;
            let b = resolve_shape_name(trans, above, &mut Vec::new())?;
            edges.push((a, b));
        }
    }
    debug!(shapes = names.len(), edges = edges.len(), "layering graph built");

    Ok(topological_order(&names, &edges))
}

/// Resolve a layering endpoint to the `"object.field"` name of a shape.
///
/// A field that is a primitive names itself; a field that aliases another
/// path recurses. Alias cycles and non-shape endpoints are fatal.
fn resolve_shape_name(
    trans: &Translation<f64>,
    path: &Path,
    seen: &mut Vec<Path>,
) -> Result<String> {
    let Path::Field { object, field } = path else {
        return Err(Error::NonShapeLayering(path.clone()));
    };
    if seen.contains(path) {
        return Err(Error::Ir(vellum_ir::Error::SelfAlias(path.clone())));
    }
    seen.push(path.clone());

    match trans.field(object, field)? {
        FieldExpr::Gpi(_, _) => Ok(format!("{object}.{field}")),
        FieldExpr::Tag(TagExpr::OptEval(Expr::Path(next))) => {
            resolve_shape_name(trans, next, seen)
        }
        FieldExpr::Tag(_) => Err(Error::NonShapeLayering(path.clone())),
    }
}

/// Kahn's algorithm over shape names. `None` on any cycle.
fn topological_order(names: &[String], edges: &[(String, String)]) -> Option<Vec<String>> {
    if edges.iter().any(|(a, b)| a == b) {
        return None;
    }

    let mut in_degree: IndexMap<&str, usize> = names.iter().map(|n| (n.as_str(), 0)).collect();
    let mut successors: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (a, b) in edges {
        *in_degree.get_mut(b.as_str())? += 1;
        successors.entry(a.as_str()).or_default().push(b.as_str());
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(n, _)| *n)
        .collect();

    let mut order = Vec::with_capacity(names.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        if let Some(next) = successors.get(node) {
            for succ in next {
                let d = in_degree.get_mut(succ).expect("edge endpoints are shape names");
                *d -= 1;
                if *d == 0 {
                    queue.push_back(succ);
                }
            }
        }
    }

    if order.len() == names.len() {
        Some(order)
    } else {
        None
    }
}
