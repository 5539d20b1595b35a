//! Symbols: the identity of named program entities (spec §3.2).

use crate::span::Span;

use super::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SymbolId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AccessModifier {
    Public,
    /// The default. Visible only within the owning scope's module subtree.
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SymbolCategory {
    Static,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Negate,
    Not,
    ImplicitConversion,
    ExplicitConversion,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub access: AccessModifier,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// The closed set of symbol variants (spec §3.2). Every symbol category
/// that can be generic carries `type_params` on [`Symbol`] directly rather
/// than here, so instantiation is uniform across kinds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SymbolKind {
    Struct {
        fields: Vec<FieldDecl>,
        scope: ScopeId,
    },
    Trait {
        supertraits: Vec<SymbolId>,
        methods: Vec<SymbolId>,
        scope: ScopeId,
    },
    Label,
    TypeParam,
    ReferenceOf(SymbolId),
    StrongPointerOf(SymbolId),
    WeakPointerOf(SymbolId),
    DynStrongPointerOf(SymbolId),
    /// A generic instantiation parameter aliased to a concrete argument
    /// symbol, or a plain `type X = Y` alias.
    Alias(SymbolId),
    Function {
        params: Vec<Parameter>,
        return_type: Type,
        self_param: Option<Type>,
        body_scope: ScopeId,
        dyn_dispatchable: bool,
    },
    /// A trait method signature with no body.
    Prototype {
        params: Vec<Parameter>,
        return_type: Type,
        self_param: Option<Type>,
    },
    Operator {
        op: OperatorKind,
        params: Vec<Parameter>,
        return_type: Type,
    },
    Local {
        ty: Type,
        mutable: bool,
    },
    Parameter(Type),
    SelfParameter(Type),
    Static {
        ty: Type,
    },
    Field(Type),
    Module,
    /// The kind-appropriate absorbing sentinel (spec §3.2).
    Error,
}

impl SymbolKind {
    pub fn is_error(&self) -> bool {
        matches!(self, SymbolKind::Error)
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Struct { .. }
                | SymbolKind::Trait { .. }
                | SymbolKind::Label
                | SymbolKind::TypeParam
                | SymbolKind::ReferenceOf(_)
                | SymbolKind::StrongPointerOf(_)
                | SymbolKind::WeakPointerOf(_)
                | SymbolKind::DynStrongPointerOf(_)
                | SymbolKind::Alias(_)
                | SymbolKind::Error
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Function { .. } | SymbolKind::Prototype { .. } | SymbolKind::Operator { .. }
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Local { .. }
                | SymbolKind::Parameter(_)
                | SymbolKind::SelfParameter(_)
                | SymbolKind::Static { .. }
                | SymbolKind::Field(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub position: Span,
    pub owning_scope: ScopeId,
    pub access: AccessModifier,
    pub category: SymbolCategory,
    pub kind: SymbolKind,
    /// Generic parameters, in declaration order. Empty for non-generic
    /// symbols.
    pub type_params: Vec<SymbolId>,
}

impl Symbol {
    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_visible_from(&self, requester_is_same_module_subtree: bool) -> bool {
        match self.access {
            AccessModifier::Public => true,
            AccessModifier::Private => requester_is_same_module_subtree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_symbol_kind_is_absorbing() {
        assert!(SymbolKind::Error.is_error());
        assert!(!SymbolKind::Local {
            ty: Type::Integer,
            mutable: false
        }
        .is_error());
    }

    #[test]
    fn private_symbol_is_not_visible_outside_its_module() {
        let symbol = Symbol {
            id: SymbolId(1),
            name: "x".into(),
            position: Span::default(),
            owning_scope: ScopeId(0),
            access: AccessModifier::Private,
            category: SymbolCategory::Instance,
            kind: SymbolKind::Field(Type::Integer),
            type_params: vec![],
        };
        assert!(!symbol.is_visible_from(false));
        assert!(symbol.is_visible_from(true));
    }
}
