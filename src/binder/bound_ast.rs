//! The annotation carried by every node after C2 (spec §3.4: "every
//! expression node has a concrete TypeInfo" — here, a concrete *slot* for
//! one, since C2 resolves symbols but C3 is what pins down final types via
//! bidirectional inference).

use std::cell::RefCell;
use std::rc::Rc;

use crate::scope::{SymbolId, Type};

/// A shared, mutable type slot: several nodes (e.g. both sides of an
/// assignment) can point at the same inference variable before C3 commits
/// to a concrete type. Mirrors the teacher's `Rc<RefCell<Option<Type>>>`
/// inference-stage type representation.
#[derive(Debug, Clone)]
pub struct BoundInfo {
    pub symbol: Option<SymbolId>,
    pub type_slot: Rc<RefCell<Option<Type>>>,
}

impl BoundInfo {
    pub fn new(symbol: Option<SymbolId>) -> Self {
        BoundInfo {
            symbol,
            type_slot: Rc::new(RefCell::new(None)),
        }
    }

    pub fn with_type(symbol: Option<SymbolId>, ty: Type) -> Self {
        BoundInfo {
            symbol,
            type_slot: Rc::new(RefCell::new(Some(ty))),
        }
    }

    pub fn get_type(&self) -> Option<Type> {
        self.type_slot.borrow().clone()
    }

    pub fn set_type(&self, ty: Type) {
        *self.type_slot.borrow_mut() = Some(ty);
    }
}

/// Structural equality compares resolved symbols, not the shared slot's
/// current contents — two independently-bound nodes are never the same
/// `Rc`, and slot contents are transient inference state, not identity.
impl PartialEq for BoundInfo {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

pub type BoundExpr = crate::syntax::Expr<BoundInfo>;
pub type BoundStmt = crate::syntax::Stmt<BoundInfo>;
pub type BoundBlock = crate::syntax::Block<BoundInfo>;
pub type BoundFunction = crate::syntax::Function<BoundInfo>;
