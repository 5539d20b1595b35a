//! The type layer (spec §3.3): a base type symbol plus modifiers.

use super::symbol::SymbolId;

/// A type is a base (a struct, a trait-object target, a primitive, a
/// generic placeholder, or an error sentinel) with zero or more layered
/// modifiers. Modifiers nest, so they are represented recursively rather
/// than as a flat modifier stack — `&StrongBox<T>` is
/// `Reference(Box::new(StrongPointer(Box::new(T))))`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Integer,
    Float,
    Bool,
    Char,
    Str,
    Void,
    /// The error sentinel type. Absorbing: any operation touching it
    /// produces another `Error`, never a fresh diagnostic.
    Error,
    /// A not-yet-substituted generic parameter.
    TypeParam(SymbolId),
    Struct(SymbolId),
    /// A trait used as a `dyn` target (only valid inside `DynStrongPointer`).
    Trait(SymbolId),
    Reference(Box<Type>),
    StrongPointer(Box<Type>),
    WeakPointer(Box<Type>),
    DynStrongPointer(Box<Type>),
    Tuple(Vec<Type>),
    Array(Box<Type>),
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },
}

impl Type {
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference(_))
    }

    /// `T.GetWithRef()`: the canonical reference-wrapped variant. Does not
    /// stack references.
    pub fn get_with_ref(&self) -> Type {
        match self {
            Type::Reference(_) => self.clone(),
            other => Type::Reference(Box::new(other.clone())),
        }
    }

    /// `T.GetWithoutRef()`: strips one reference layer, if present.
    pub fn get_without_ref(&self) -> Type {
        match self {
            Type::Reference(inner) => (**inner).clone(),
            other => other.clone(),
        }
    }

    pub fn get_with_strong_pointer(&self) -> Type {
        match self {
            Type::StrongPointer(_) => self.clone(),
            other => Type::StrongPointer(Box::new(other.clone())),
        }
    }

    pub fn get_without_strong_pointer(&self) -> Option<Type> {
        match self {
            Type::StrongPointer(inner) => Some((**inner).clone()),
            _ => None,
        }
    }

    pub fn get_without_weak_pointer(&self) -> Option<Type> {
        match self {
            Type::WeakPointer(inner) => Some((**inner).clone()),
            _ => None,
        }
    }

    pub fn get_without_dyn_strong_pointer(&self) -> Option<Type> {
        match self {
            Type::DynStrongPointer(inner) => Some((**inner).clone()),
            _ => None,
        }
    }

    pub fn is_sized(&self) -> bool {
        !matches!(self, Type::Trait(_))
    }

    pub fn is_dyn_strong_pointer(&self) -> bool {
        matches!(self, Type::DynStrongPointer(_))
    }

    /// Unaliased structural equality with one level of reference
    /// collapsing: `&T` and `T` compare equal to `T`'s own comparison
    /// against the other side once one reference layer is stripped from
    /// whichever side has one. This does **not** recurse through nested
    /// references (`&&T` is not `T`).
    pub fn does_eq(&self, other: &Type) -> bool {
        if self.is_error() || other.is_error() {
            // Error is absorbing for comparison purposes: treat it as
            // compatible with anything so downstream checks don't cascade.
            return true;
        }

        let lhs = self.get_without_ref();
        let rhs = other.get_without_ref();

        match (&lhs, &rhs) {
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.does_eq(y))
            }
            (Type::Array(a), Type::Array(b)) => a.does_eq(b),
            (Type::StrongPointer(a), Type::StrongPointer(b)) => a.does_eq(b),
            (Type::WeakPointer(a), Type::WeakPointer(b)) => a.does_eq(b),
            (Type::DynStrongPointer(a), Type::DynStrongPointer(b)) => a.does_eq(b),
            (
                Type::Function {
                    params: pa,
                    return_type: ra,
                },
                Type::Function {
                    params: pb,
                    return_type: rb,
                },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(x, y)| x.does_eq(y))
                    && ra.does_eq(rb)
            }
            _ => lhs == rhs,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::Str => write!(f, "str"),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "<error>"),
            Type::TypeParam(id) => write!(f, "<param {id:?}>"),
            Type::Struct(id) => write!(f, "<struct {id:?}>"),
            Type::Trait(id) => write!(f, "<trait {id:?}>"),
            Type::Reference(t) => write!(f, "&{t}"),
            Type::StrongPointer(t) => write!(f, "box<{t}>"),
            Type::WeakPointer(t) => write!(f, "weak<{t}>"),
            Type::DynStrongPointer(t) => write!(f, "box<dyn {t}>"),
            Type::Tuple(ts) => {
                write!(f, "(")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Type::Array(t) => write!(f, "[{t}]"),
            Type::Function {
                params,
                return_type,
            } => {
                write!(f, "fn(")?;
                for (i, t) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ") -> {return_type}")
            }
        }
    }
}

/// Value kind (spec §3.3): `L` for assignable, `R` for rvalue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValueKind {
    L,
    R,
}

/// A type paired with a value kind.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeInfo {
    pub ty: Type,
    pub value_kind: ValueKind,
}

impl TypeInfo {
    pub fn new(ty: Type, value_kind: ValueKind) -> Self {
        TypeInfo { ty, value_kind }
    }

    pub fn rvalue(ty: Type) -> Self {
        TypeInfo::new(ty, ValueKind::R)
    }

    pub fn lvalue(ty: Type) -> Self {
        TypeInfo::new(ty, ValueKind::L)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_collapses_one_level() {
        let plain = Type::Integer;
        let referenced = Type::Reference(Box::new(Type::Integer));
        assert!(plain.does_eq(&referenced));
        assert!(referenced.does_eq(&plain));
    }

    #[test]
    fn double_reference_does_not_collapse_to_plain() {
        let plain = Type::Integer;
        let double_ref = Type::Reference(Box::new(Type::Reference(Box::new(Type::Integer))));
        assert!(!plain.does_eq(&double_ref));
    }

    #[test]
    fn error_is_absorbing_for_comparisons() {
        assert!(Type::Error.does_eq(&Type::Bool));
        assert!(Type::Bool.does_eq(&Type::Error));
    }

    #[test]
    fn get_with_ref_does_not_stack() {
        let t = Type::Integer.get_with_ref();
        assert_eq!(t.get_with_ref(), t);
    }

    #[test]
    fn tuples_compare_structurally() {
        let a = Type::Tuple(vec![Type::Integer, Type::Bool]);
        let b = Type::Tuple(vec![Type::Integer, Type::Bool]);
        let c = Type::Tuple(vec![Type::Bool, Type::Integer]);
        assert!(a.does_eq(&b));
        assert!(!a.does_eq(&c));
    }
}
