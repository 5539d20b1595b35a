//! The annotation carried by every node after C3 (spec §4.3): a concrete,
//! already-pinned [`TypeInfo`] rather than [`crate::binder::BoundInfo`]'s
//! shared inference slot — by the end of type-checking there is nothing
//! left to infer.

use crate::scope::{SymbolId, Type, TypeInfo, ValueKind};

#[derive(Debug, Clone, PartialEq)]
pub struct CheckedInfo {
    pub symbol: Option<SymbolId>,
    pub type_info: TypeInfo,
}

impl CheckedInfo {
    pub fn new(symbol: Option<SymbolId>, type_info: TypeInfo) -> Self {
        CheckedInfo { symbol, type_info }
    }

    pub fn rvalue(symbol: Option<SymbolId>, ty: Type) -> Self {
        CheckedInfo::new(symbol, TypeInfo::rvalue(ty))
    }

    pub fn lvalue(symbol: Option<SymbolId>, ty: Type) -> Self {
        CheckedInfo::new(symbol, TypeInfo::lvalue(ty))
    }

    pub fn ty(&self) -> &Type {
        &self.type_info.ty
    }

    pub fn value_kind(&self) -> ValueKind {
        self.type_info.value_kind
    }
}

pub type CheckedExpr = crate::syntax::Expr<CheckedInfo>;
pub type CheckedStmt = crate::syntax::Stmt<CheckedInfo>;
pub type CheckedBlock = crate::syntax::Block<CheckedInfo>;
pub type CheckedFunction = crate::syntax::Function<CheckedInfo>;

/// Common projection over any stage info the checker can take as input:
/// both [`crate::binder::BoundInfo`] (C2 output) and [`CheckedInfo`]
/// itself (re-checking already-checked trees) implement it, which is what
/// lets `check_expr` double as the fixed-point re-check invariant #2
/// demands — feeding it `Expr<CheckedInfo>` is just as valid as feeding it
/// `Expr<BoundInfo>`.
pub trait StageInfo {
    fn resolved_type(&self) -> Type;
    fn resolved_symbol(&self) -> Option<SymbolId>;
}

impl StageInfo for crate::binder::BoundInfo {
    fn resolved_type(&self) -> Type {
        self.get_type().unwrap_or(Type::Error)
    }

    fn resolved_symbol(&self) -> Option<SymbolId> {
        self.symbol
    }
}

impl StageInfo for CheckedInfo {
    fn resolved_type(&self) -> Type {
        self.type_info.ty.clone()
    }

    fn resolved_symbol(&self) -> Option<SymbolId> {
        self.symbol
    }
}
