//! Typed references into the translation
//!
//! A [`Path`] is the unique key for a slot in the translation store: a field
//! on an object, a property inside a graphical primitive, or an indexed
//! element of a vector- or matrix-valued slot. Paths appear in expressions,
//! in the varying-state vector, and in error messages, so they carry stable
//! `Display` forms.

use std::fmt;

/// How an object identifier was bound: to a substance-level entity or to a
/// style-local variable. Both carry the resolved object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingForm {
    /// Bound to a substance object.
    Sub(String),
    /// Bound to a style-local selector variable.
    Sty(String),
}

impl BindingForm {
    /// The resolved object name, independent of binding kind.
    pub fn name(&self) -> &str {
        match self {
            BindingForm::Sub(n) | BindingForm::Sty(n) => n,
        }
    }

    pub fn sub(name: impl Into<String>) -> Self {
        BindingForm::Sub(name.into())
    }

    pub fn sty(name: impl Into<String>) -> Self {
        BindingForm::Sty(name.into())
    }
}

impl fmt::Display for BindingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A typed reference into the translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Path {
    /// `object.field`
    Field { object: BindingForm, field: String },
    /// `object.field.property` inside a graphical primitive
    Property {
        object: BindingForm,
        field: String,
        property: String,
    },
    /// An indexed element inside a vector- or matrix-valued path
    Access { base: Box<Path>, indices: Vec<usize> },
    /// A style-compiler local; never survives into evaluation
    LocalVar(String),
}

impl Path {
    pub fn field(object: BindingForm, field: impl Into<String>) -> Self {
        Path::Field {
            object,
            field: field.into(),
        }
    }

    pub fn property(
        object: BindingForm,
        field: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Path::Property {
            object,
            field: field.into(),
            property: property.into(),
        }
    }

    pub fn access(base: Path, indices: Vec<usize>) -> Self {
        Path::Access {
            base: Box::new(base),
            indices,
        }
    }

    /// The `"object.field"` name a graphical primitive at this path goes by.
    ///
    /// Returns `None` for paths that cannot name a shape.
    pub fn shape_name(&self) -> Option<String> {
        match self {
            Path::Field { object, field } => Some(format!("{}.{}", object.name(), field)),
            _ => None,
        }
    }

    /// Strip one level of indexing, yielding the container path.
    pub fn base(&self) -> &Path {
        match self {
            Path::Access { base, .. } => base,
            other => other,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Field { object, field } => write!(f, "{object}.{field}"),
            Path::Property {
                object,
                field,
                property,
            } => write!(f, "{object}.{field}.{property}"),
            Path::Access { base, indices } => {
                write!(f, "{base}")?;
                for i in indices {
                    write!(f, "[{i}]")?;
                }
                Ok(())
            }
            Path::LocalVar(name) => write!(f, "${name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        let field = Path::field(BindingForm::sub("A"), "shape");
        assert_eq!(field.to_string(), "A.shape");

        let prop = Path::property(BindingForm::sub("A"), "shape", "r");
        assert_eq!(prop.to_string(), "A.shape.r");

        let access = Path::access(Path::field(BindingForm::sub("A"), "center"), vec![1]);
        assert_eq!(access.to_string(), "A.center[1]");
    }

    #[test]
    fn test_shape_name() {
        let field = Path::field(BindingForm::sty("x"), "icon");
        assert_eq!(field.shape_name(), Some("x.icon".to_string()));

        let prop = Path::property(BindingForm::sub("A"), "shape", "r");
        assert_eq!(prop.shape_name(), None);
    }

    #[test]
    fn test_paths_are_map_keys() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Path::field(BindingForm::sub("A"), "shape"));
        set.insert(Path::field(BindingForm::sub("A"), "shape"));
        assert_eq!(set.len(), 1);
    }
}
