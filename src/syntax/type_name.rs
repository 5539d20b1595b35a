//! Surface syntax for type references. Distinct from [`crate::scope::Type`]:
//! a `TypeName` is what a (hypothetical) parser hands in, before C1/C2 has
//! resolved it to a concrete symbol-backed [`crate::scope::Type`].

use crate::span::{GetPosition, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
    Literal {
        name: String,
        position: Span,
    },
    Generic {
        name: String,
        args: Vec<TypeName>,
        position: Span,
    },
    Reference(Box<TypeName>, Span),
    StrongPointer(Box<TypeName>, Span),
    WeakPointer(Box<TypeName>, Span),
    DynStrongPointer(Box<TypeName>, Span),
    Tuple(Vec<TypeName>, Span),
    Array(Box<TypeName>, Span),
    Fn {
        params: Vec<TypeName>,
        return_type: Box<TypeName>,
        position: Span,
    },
}

impl GetPosition for TypeName {
    fn position(&self) -> Span {
        match self {
            TypeName::Literal { position, .. } => position.clone(),
            TypeName::Generic { position, .. } => position.clone(),
            TypeName::Reference(_, p) => p.clone(),
            TypeName::StrongPointer(_, p) => p.clone(),
            TypeName::WeakPointer(_, p) => p.clone(),
            TypeName::DynStrongPointer(_, p) => p.clone(),
            TypeName::Tuple(_, p) => p.clone(),
            TypeName::Array(_, p) => p.clone(),
            TypeName::Fn { position, .. } => position.clone(),
        }
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Literal { name, .. } => write!(f, "{name}"),
            TypeName::Generic { name, args, .. } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeName::Reference(inner, _) => write!(f, "&{inner}"),
            TypeName::StrongPointer(inner, _) => write!(f, "box<{inner}>"),
            TypeName::WeakPointer(inner, _) => write!(f, "weak<{inner}>"),
            TypeName::DynStrongPointer(inner, _) => write!(f, "box<dyn {inner}>"),
            TypeName::Tuple(items, _) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            TypeName::Array(inner, _) => write!(f, "[{inner}]"),
            TypeName::Fn {
                params,
                return_type,
                ..
            } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {return_type}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_nested_modifiers_in_source_order() {
        let t = TypeName::Reference(
            Box::new(TypeName::StrongPointer(
                Box::new(TypeName::Literal {
                    name: "int".into(),
                    position: Span::default(),
                }),
                Span::default(),
            )),
            Span::default(),
        );
        assert_eq!(t.to_string(), "&box<int>");
    }
}
