//! C5 — the control-flow analyzer (spec §4.5).
//!
//! Collapses a lowered function body into a flat [`node::ControlFlowGraph`]
//! and proves every path through a non-void function returns. Unlike
//! C1–C4, this stage never rewrites anything; it only validates.

pub mod analyze;
pub mod node;

pub use analyze::{diagnose_invalid_control_flow, NotAllControlPathsReturn};
pub use node::{build_graph, ControlFlowGraph, ControlFlowKind, ControlFlowNode};

use crate::binder::resolve_type_name;
use crate::diagnostics::{Diagnosed, DiagnosticBag};
use crate::lower::{LoweredFunction, LoweredModule, LoweredTopLevelItem};
use crate::scope::{ScopeTable, Type};

/// Runs C5 over a single lowered function. Void functions are exempt: a
/// lowered void function may fall off the end of its body implicitly, so
/// there is nothing to prove about its returns (spec §4.5's algorithm talks
/// about control paths returning "an expression", which a void function
/// never needs to).
pub fn analyze_function(function: &LoweredFunction, table: &ScopeTable) -> Diagnosed<()> {
    let scope = table.root();
    let return_type = function
        .return_type
        .as_ref()
        .and_then(|t| resolve_type_name(t, table, scope))
        .unwrap_or(Type::Void);
    if matches!(return_type, Type::Void) {
        return Diagnosed::ok(());
    }

    let graph = build_graph(&function.body);
    diagnose_invalid_control_flow(function.position.clone(), &graph)
}

/// Runs C5 over every function in a lowered module, including those nested
/// inside `impl` blocks.
pub fn analyze_module(module: &LoweredModule, table: &ScopeTable) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    for item in module {
        match item {
            LoweredTopLevelItem::Function(f) => {
                bag.collect(analyze_function(f, table));
            }
            LoweredTopLevelItem::Impl(impl_decl) => {
                for f in &impl_decl.functions {
                    bag.collect(analyze_function(f, table));
                }
            }
            LoweredTopLevelItem::Struct(_)
            | LoweredTopLevelItem::Trait(_)
            | LoweredTopLevelItem::Const { .. }
            | LoweredTopLevelItem::Comment(_) => {}
        }
    }
    Diagnosed::new((), bag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SymbolId;
    use crate::span::Span;
    use crate::syntax::TypeName;

    fn label(id: usize) -> SymbolId {
        SymbolId(id)
    }

    fn make_function(return_type: Option<TypeName>, body: Vec<crate::lower::LoweredStatement>) -> LoweredFunction {
        LoweredFunction {
            name: "f".into(),
            params: Vec::new(),
            return_type,
            body,
            position: Span::default(),
        }
    }

    fn int_return_type() -> TypeName {
        TypeName::Literal {
            name: "int".into(),
            position: Span::default(),
        }
    }

    #[test]
    fn a_function_ending_in_return_has_no_diagnostic() {
        use crate::lower::{LoweredExpr, LoweredStatement};
        use crate::typecheck::CheckedInfo;

        let body = vec![LoweredStatement::Return {
            value: Some(LoweredExpr::IntLiteral {
                value: 1,
                info: CheckedInfo::rvalue(None, Type::Integer),
                position: Span::default(),
            }),
            position: Span::default(),
        }];

        let table = ScopeTable::new();
        let result = analyze_function(&make_function(Some(int_return_type()), body), &table);
        assert!(!result.bag.has_errors());
    }

    #[test]
    fn a_function_falling_off_the_end_is_diagnosed() {
        // S7 — missing return path.
        use crate::lower::LoweredStatement;

        let body = vec![LoweredStatement::BlockEnd {
            locals: Vec::new(),
            position: Span::default(),
        }];

        let table = ScopeTable::new();
        let result = analyze_function(&make_function(Some(int_return_type()), body), &table);
        assert!(result.bag.has_errors());
    }

    #[test]
    fn an_infinite_loop_with_no_reachable_return_is_accepted() {
        use crate::lower::LoweredStatement;

        let l_begin = label(0);
        let body = vec![
            LoweredStatement::Label {
                label: l_begin,
                position: Span::default(),
            },
            LoweredStatement::Jump {
                label: l_begin,
                position: Span::default(),
            },
        ];

        let table = ScopeTable::new();
        let result = analyze_function(&make_function(Some(int_return_type()), body), &table);
        assert!(!result.bag.has_errors());
    }

    #[test]
    fn a_void_function_falling_off_the_end_is_never_diagnosed() {
        use crate::lower::LoweredStatement;

        let body = vec![LoweredStatement::BlockEnd {
            locals: Vec::new(),
            position: Span::default(),
        }];

        let table = ScopeTable::new();
        let result = analyze_function(&make_function(None, body), &table);
        assert!(!result.bag.has_errors());
    }

    #[test]
    fn an_if_without_an_else_can_fall_through_without_returning() {
        use crate::lower::{LoweredExpr, LoweredStatement};
        use crate::typecheck::CheckedInfo;

        // gotoif false Lend; return 1; Lend:
        let l_end = label(0);
        let body = vec![
            LoweredStatement::ConditionalJump {
                condition: LoweredExpr::BoolLiteral {
                    value: false,
                    info: CheckedInfo::rvalue(None, Type::Bool),
                    position: Span::default(),
                },
                label: l_end,
                position: Span::default(),
            },
            LoweredStatement::Return {
                value: Some(LoweredExpr::IntLiteral {
                    value: 1,
                    info: CheckedInfo::rvalue(None, Type::Integer),
                    position: Span::default(),
                }),
                position: Span::default(),
            },
            LoweredStatement::Label {
                label: l_end,
                position: Span::default(),
            },
        ];

        let table = ScopeTable::new();
        let result = analyze_function(&make_function(Some(int_return_type()), body), &table);
        assert!(result.bag.has_errors());
    }
}
