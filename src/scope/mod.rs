//! C1 — the scope and symbol table (spec §3.1, §3.2, §4.1).

pub mod error;
pub mod symbol;
pub mod table;
pub mod types;

pub use error::ScopeError;
pub use symbol::{
    AccessModifier, FieldDecl, OperatorKind, Parameter, ScopeId, Symbol, SymbolCategory, SymbolId,
    SymbolKind,
};
pub use table::{KindFilter, NameSection, QualifiedName, Scope, ScopeTable, SymbolBuilder};
pub use types::{Type, TypeInfo, ValueKind};

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built-in type name table, consulted when a syntax-level `TypeName`
/// (`int`, `bool`, ...) is bound to a [`Type`] during C2. Lazily built once
/// per process rather than reconstructed per lookup.
pub static BUILTIN_TYPE_NAMES: Lazy<HashMap<&'static str, Type>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("int", Type::Integer);
    m.insert("float", Type::Float);
    m.insert("bool", Type::Bool);
    m.insert("char", Type::Char);
    m.insert("str", Type::Str);
    m.insert("void", Type::Void);
    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_type_names_cover_primitives() {
        assert_eq!(BUILTIN_TYPE_NAMES.get("int"), Some(&Type::Integer));
        assert_eq!(BUILTIN_TYPE_NAMES.get("void"), Some(&Type::Void));
        assert!(BUILTIN_TYPE_NAMES.get("nonexistent").is_none());
    }
}
