//! The back-end collaborator interface (spec §6, "interface to the
//! back-end"). Every lowered node's eventual `Emit(emitter)` call targets
//! this trait; this crate defines the contract and stops there — no
//! concrete (e.g. LLVM) emitter ships here, only [`NullEmitter`], a test
//! double that records what it was asked to do.

use crate::lower::{LoweredExpr, LoweredStatement};
use crate::scope::SymbolId;

/// What emitting an expression hands back: its native value plus whatever
/// temporaries the caller is responsible for dropping afterward.
pub struct ExprEmitResult<V> {
    pub value: V,
    pub tmps: Vec<SymbolId>,
}

/// The capabilities a lowered tree needs from its back-end collaborator.
/// `NativeType`/`NativeValue`/`Block` are associated rather than trait
/// objects so a concrete emitter (LLVM, a bytecode VM, ...) can pick its own
/// representation without this crate depending on it.
pub trait Emitter {
    type NativeType;
    type NativeValue;
    type Block;

    fn get_type(&mut self, type_symbol: SymbolId) -> Self::NativeType;

    fn current_block(&mut self) -> &mut Self::Block;

    fn emit_expr(&mut self, expr: &LoweredExpr) -> ExprEmitResult<Self::NativeValue>;

    fn emit_stmt(&mut self, stmt: &LoweredStatement);

    /// Wraps the copy-glue call lowering already inserted as an explicit
    /// [`LoweredStatement::Copy`] statement; the back-end's job is purely
    /// to translate it.
    fn emit_copy(&mut self, dst: &LoweredExpr, src: &LoweredExpr, type_symbol: SymbolId);

    /// Wraps the drop-glue calls for the given temporaries.
    fn emit_drop_tmps(&mut self, tmps: &[SymbolId]);

    /// Emits drop glue for every local going out of scope at `stmt`
    /// (a [`LoweredStatement::BlockEnd`]).
    fn emit_drop_local_vars_before_stmt(&mut self, stmt: &LoweredStatement);

    fn label_block(&mut self, label: SymbolId) -> &mut Self::Block;

    /// Substitutes the back-end's current monomorphization environment for
    /// a still-generic symbol, handing back the symbol to actually emit.
    fn create_instantiated(&mut self, symbol: SymbolId) -> SymbolId;
}

#[cfg(test)]
pub struct NullEmitter {
    pub emitted_exprs: usize,
    pub emitted_stmts: usize,
    block: (),
}

#[cfg(test)]
impl NullEmitter {
    pub fn new() -> Self {
        NullEmitter {
            emitted_exprs: 0,
            emitted_stmts: 0,
            block: (),
        }
    }
}

#[cfg(test)]
impl Emitter for NullEmitter {
    type NativeType = ();
    type NativeValue = ();
    type Block = ();

    fn get_type(&mut self, _type_symbol: SymbolId) -> Self::NativeType {}

    fn current_block(&mut self) -> &mut Self::Block {
        &mut self.block
    }

    fn emit_expr(&mut self, _expr: &LoweredExpr) -> ExprEmitResult<Self::NativeValue> {
        self.emitted_exprs += 1;
        ExprEmitResult {
            value: (),
            tmps: Vec::new(),
        }
    }

    fn emit_stmt(&mut self, _stmt: &LoweredStatement) {
        self.emitted_stmts += 1;
    }

    fn emit_copy(&mut self, _dst: &LoweredExpr, _src: &LoweredExpr, _type_symbol: SymbolId) {}

    fn emit_drop_tmps(&mut self, _tmps: &[SymbolId]) {}

    fn emit_drop_local_vars_before_stmt(&mut self, _stmt: &LoweredStatement) {}

    fn label_block(&mut self, _label: SymbolId) -> &mut Self::Block {
        &mut self.block
    }

    fn create_instantiated(&mut self, symbol: SymbolId) -> SymbolId {
        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::typecheck::CheckedInfo;

    #[test]
    fn null_emitter_counts_what_it_was_asked_to_emit() {
        let mut emitter = NullEmitter::new();
        let expr = LoweredExpr::BoolLiteral {
            value: true,
            info: CheckedInfo::rvalue(None, crate::scope::Type::Bool),
            position: Span::default(),
        };
        emitter.emit_expr(&expr);
        emitter.emit_stmt(&LoweredStatement::Exit { position: Span::default() });

        assert_eq!(emitter.emitted_exprs, 1);
        assert_eq!(emitter.emitted_stmts, 1);
    }
}
