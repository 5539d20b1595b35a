//! The monomorphization walker (spec §4.4 "Monomorphization walker"):
//! `CollectMonos()` over a lowered body, reporting every still-generic
//! symbol it references so an external driver can instantiate further
//! generic bodies until fixpoint.

use std::collections::HashSet;

use crate::scope::{ScopeTable, SymbolId};

use super::lowered_ast::{LoweredExpr, LoweredStatement};

/// Collects every generic symbol referenced anywhere in `body`, deduplicated.
/// A symbol counts as "still parameterized by placeholders" (spec wording)
/// simply by being generic (`SymbolId::is_generic`) — this crate has no
/// separate notion of a partially-substituted instance distinct from the
/// generic template itself; the driver re-checks that before instantiating.
pub fn collect_monos(body: &[LoweredStatement], table: &ScopeTable) -> Vec<SymbolId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for stmt in body {
        walk_stmt(stmt, table, &mut seen, &mut out);
    }
    out
}

fn record(id: SymbolId, table: &ScopeTable, seen: &mut HashSet<SymbolId>, out: &mut Vec<SymbolId>) {
    if !seen.insert(id) {
        return;
    }
    if table.symbol(id).is_generic() {
        out.push(id);
    }
}

fn walk_stmt(
    stmt: &LoweredStatement,
    table: &ScopeTable,
    seen: &mut HashSet<SymbolId>,
    out: &mut Vec<SymbolId>,
) {
    match stmt {
        LoweredStatement::Expression(e) => walk_expr(e, table, seen, out),
        LoweredStatement::Var { symbol, value, .. } => {
            if let Some(id) = symbol {
                record(*id, table, seen, out);
            }
            walk_expr(value, table, seen, out);
        }
        LoweredStatement::SimpleAssignment { target, value, .. } => {
            walk_expr(target, table, seen, out);
            walk_expr(value, table, seen, out);
        }
        LoweredStatement::Copy { dst, src, .. } => {
            walk_expr(dst, table, seen, out);
            walk_expr(src, table, seen, out);
        }
        LoweredStatement::Drop { tmps, .. } => {
            for id in tmps {
                record(*id, table, seen, out);
            }
        }
        LoweredStatement::Label { .. }
        | LoweredStatement::Jump { .. }
        | LoweredStatement::Exit { .. }
        | LoweredStatement::BlockEnd { .. }
        | LoweredStatement::Comment(_) => {}
        LoweredStatement::ConditionalJump { condition, .. } => {
            walk_expr(condition, table, seen, out);
        }
        LoweredStatement::Return { value, .. } => {
            if let Some(v) = value {
                walk_expr(v, table, seen, out);
            }
        }
        LoweredStatement::Group(stmts) => {
            for s in stmts {
                walk_stmt(s, table, seen, out);
            }
        }
    }
}

fn walk_expr(expr: &LoweredExpr, table: &ScopeTable, seen: &mut HashSet<SymbolId>, out: &mut Vec<SymbolId>) {
    if let Some(id) = expr.info().symbol {
        record(id, table, seen, out);
    }
    match expr {
        LoweredExpr::IntLiteral { .. }
        | LoweredExpr::FloatLiteral { .. }
        | LoweredExpr::BoolLiteral { .. }
        | LoweredExpr::CharLiteral { .. }
        | LoweredExpr::StringLiteral { .. }
        | LoweredExpr::SymbolLiteral { .. }
        | LoweredExpr::SizeOf { .. } => {}
        LoweredExpr::FieldAccess { receiver, .. }
        | LoweredExpr::PrimitiveUnary { operand: receiver, .. }
        | LoweredExpr::LogicalNegation { operand: receiver, .. }
        | LoweredExpr::AddressOf { operand: receiver, .. }
        | LoweredExpr::ReferenceOf { operand: receiver, .. }
        | LoweredExpr::DerefAs { operand: receiver, .. }
        | LoweredExpr::ConversionCall { operand: receiver, .. }
        | LoweredExpr::PointerIntrinsic { operand: receiver, .. } => {
            walk_expr(receiver, table, seen, out);
        }
        LoweredExpr::StaticCall { args, .. } => {
            for a in args {
                walk_expr(a, table, seen, out);
            }
        }
        LoweredExpr::InstanceCall { receiver, args, .. } => {
            walk_expr(receiver, table, seen, out);
            for a in args {
                walk_expr(a, table, seen, out);
            }
        }
        LoweredExpr::PrimitiveBinary { lhs, rhs, .. } => {
            walk_expr(lhs, table, seen, out);
            walk_expr(rhs, table, seen, out);
        }
        LoweredExpr::StructInitialisation { fields, .. } => {
            for (_, v) in fields {
                walk_expr(v, table, seen, out);
            }
        }
        LoweredExpr::Array { elements, .. } | LoweredExpr::Tuple { elements, .. } => {
            for e in elements {
                walk_expr(e, table, seen, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{AccessModifier, SymbolBuilder, SymbolCategory, SymbolKind, Type};
    use crate::span::Span;
    use crate::typecheck::CheckedInfo;

    #[test]
    fn generic_function_reference_is_collected() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let body_scope = table.create_child(root, Some("f".into()));
        let type_param = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "T".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::TypeParam,
                    type_params: Vec::new(),
                },
            )
            .value;
        let generic_fn = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "identity".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Function {
                        params: Vec::new(),
                        return_type: Type::Void,
                        self_param: None,
                        body_scope,
                        dyn_dispatchable: false,
                    },
                    type_params: vec![type_param],
                },
            )
            .value;

        let call = LoweredExpr::StaticCall {
            args: Vec::new(),
            info: CheckedInfo::rvalue(Some(generic_fn), Type::Void),
            position: Span::default(),
        };
        let body = vec![LoweredStatement::Expression(call)];

        let monos = collect_monos(&body, &table);
        assert_eq!(monos, vec![generic_fn]);
    }

    #[test]
    fn non_generic_references_are_not_collected() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let local = table
            .declare_symbol(
                root,
                SymbolBuilder {
                    name: "x".into(),
                    position: Span::default(),
                    access: AccessModifier::Public,
                    category: SymbolCategory::Static,
                    kind: SymbolKind::Local {
                        ty: Type::Integer,
                        mutable: false,
                    },
                    type_params: Vec::new(),
                },
            )
            .value;
        let read = LoweredExpr::SymbolLiteral {
            info: CheckedInfo::lvalue(Some(local), Type::Integer),
            position: Span::default(),
        };
        let body = vec![LoweredStatement::Expression(read)];

        assert!(collect_monos(&body, &table).is_empty());
    }
}
