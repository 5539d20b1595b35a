//! `CreateLowered` (spec §4.4): rewrites a checked tree into the
//! restricted lowered family. Desugaring an expression can require
//! hoisting statements ahead of it (`and`/`or`'s short-circuit jumps), so
//! [`lower_expr`] returns both the rewritten expression and a `prelude` of
//! statements that must run immediately before it — [`LoweredStatement::Group`]
//! is how that prelude gets spliced back into the surrounding statement
//! stream without its own scope boundary.

use crate::scope::{ScopeId, ScopeTable, SymbolKind, Type, ValueKind};
use crate::span::Span;
use crate::syntax::{AssignmentOp, BinaryOp, Expr, TopLevelItem};
use crate::typecheck::{CheckedBlock, CheckedExpr, CheckedFunction, CheckedInfo, CheckedStmt};

use super::lowered_ast::{
    LoweredExpr, LoweredFunction, LoweredImpl, LoweredModule, LoweredStatement, LoweredTopLevelItem,
    PointerIntrinsicKind,
};

/// An expression's lowered form together with the statements (if any) that
/// must execute right before it — nonempty only for `and`/`or`, whose
/// short-circuit branch has to live in statement position no matter how
/// deep the original expression was nested.
pub struct LoweredExprResult {
    pub prelude: Vec<LoweredStatement>,
    pub expr: LoweredExpr,
}

fn plain(expr: LoweredExpr) -> LoweredExprResult {
    LoweredExprResult {
        prelude: Vec::new(),
        expr,
    }
}

pub fn lower_expr(expr: CheckedExpr, table: &mut ScopeTable, scope: ScopeId) -> LoweredExprResult {
    match expr {
        Expr::IntLiteral { value, info, position } => plain(LoweredExpr::IntLiteral { value, info, position }),
        Expr::FloatLiteral { value, info, position } => {
            plain(LoweredExpr::FloatLiteral { value, info, position })
        }
        Expr::BoolLiteral { value, info, position } => plain(LoweredExpr::BoolLiteral { value, info, position }),
        Expr::CharLiteral { value, info, position } => plain(LoweredExpr::CharLiteral { value, info, position }),
        Expr::StringLiteral { value, info, position } => {
            plain(LoweredExpr::StringLiteral { value, info, position })
        }
        Expr::SymbolLiteral { info, position, .. } => plain(LoweredExpr::SymbolLiteral { info, position }),
        Expr::FieldAccess {
            receiver,
            field,
            info,
            position,
        } => {
            let r = lower_expr(*receiver, table, scope);
            LoweredExprResult {
                prelude: r.prelude,
                expr: LoweredExpr::FieldAccess {
                    receiver: Box::new(r.expr),
                    field,
                    info,
                    position,
                },
            }
        }
        Expr::StaticCall { args, info, position, .. } => {
            let (prelude, args) = lower_args(args, table, scope);
            LoweredExprResult {
                prelude,
                expr: LoweredExpr::StaticCall { args, info, position },
            }
        }
        Expr::InstanceCall {
            receiver,
            method,
            args,
            info,
            position,
        } => {
            let mut r = lower_expr(*receiver, table, scope);
            let (arg_prelude, args) = lower_args(args, table, scope);
            r.prelude.extend(arg_prelude);
            LoweredExprResult {
                prelude: r.prelude,
                expr: LoweredExpr::InstanceCall {
                    receiver: Box::new(r.expr),
                    method,
                    args,
                    info,
                    position,
                },
            }
        }
        Expr::UserUnary {
            op,
            operand,
            info,
            position,
        } => {
            let operand = lower_expr(*operand, table, scope);
            let expr = if info.symbol.is_some() {
                LoweredExpr::StaticCall {
                    args: vec![operand.expr],
                    info,
                    position,
                }
            } else {
                LoweredExpr::PrimitiveUnary {
                    op,
                    operand: Box::new(operand.expr),
                    info,
                    position,
                }
            };
            LoweredExprResult {
                prelude: operand.prelude,
                expr,
            }
        }
        Expr::UserBinary {
            op,
            lhs,
            rhs,
            info,
            position,
        } => {
            let mut lhs = lower_expr(*lhs, table, scope);
            let rhs = lower_expr(*rhs, table, scope);
            lhs.prelude.extend(rhs.prelude);
            let expr = if info.symbol.is_some() {
                LoweredExpr::StaticCall {
                    args: vec![lhs.expr, rhs.expr],
                    info,
                    position,
                }
            } else {
                LoweredExpr::PrimitiveBinary {
                    op,
                    lhs: Box::new(lhs.expr),
                    rhs: Box::new(rhs.expr),
                    info,
                    position,
                }
            };
            LoweredExprResult {
                prelude: lhs.prelude,
                expr,
            }
        }
        Expr::And { lhs, rhs, position, .. } => lower_short_circuit(*lhs, *rhs, position, table, scope, false),
        Expr::Or { lhs, rhs, position, .. } => lower_short_circuit(*lhs, *rhs, position, table, scope, true),
        Expr::LogicalNegation { operand, info, position } => {
            let operand = lower_expr(*operand, table, scope);
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::LogicalNegation {
                    operand: Box::new(operand.expr),
                    info,
                    position,
                },
            }
        }
        Expr::AddressOf { operand, info, position } => {
            let operand = lower_expr(*operand, table, scope);
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::AddressOf {
                    operand: Box::new(operand.expr),
                    info,
                    position,
                },
            }
        }
        Expr::ReferenceOf { operand, info, position } => {
            let operand = lower_expr(*operand, table, scope);
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::ReferenceOf {
                    operand: Box::new(operand.expr),
                    info,
                    position,
                },
            }
        }
        // Both surface forms of checked reinterpret canonicalize to the
        // same lowered node (spec §4.6 "Dereference/DerefAs canonicalization").
        Expr::Dereference { operand, info, position } => {
            let operand = lower_expr(*operand, table, scope);
            let target = info.ty().clone();
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::DerefAs {
                    operand: Box::new(operand.expr),
                    target,
                    info,
                    position,
                },
            }
        }
        Expr::DerefAs { operand, info, position, .. } => {
            let operand = lower_expr(*operand, table, scope);
            let target = info.ty().clone();
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::DerefAs {
                    operand: Box::new(operand.expr),
                    target,
                    info,
                    position,
                },
            }
        }
        // The cast wrapper carries no runtime effect of its own; the
        // operand underneath has already been explicitly converted by C3.
        Expr::Cast { operand, .. } => lower_expr(*operand, table, scope),
        Expr::SizeOf { target, info, position } => {
            let target = crate::binder::resolve_type_name(&target, table, scope).unwrap_or(Type::Error);
            plain(LoweredExpr::SizeOf { target, info, position })
        }
        Expr::StructInitialisation {
            fields, info, position, ..
        } => {
            let mut prelude = Vec::new();
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let value = match field.value {
                    Some(v) => v,
                    None => unreachable!("construction shorthand is resolved to a value during binding"),
                };
                let lowered = lower_expr(value, table, scope);
                prelude.extend(lowered.prelude);
                out.push((field.name, lowered.expr));
            }
            LoweredExprResult {
                prelude,
                expr: LoweredExpr::StructInitialisation {
                    fields: out,
                    info,
                    position,
                },
            }
        }
        Expr::Boxed { operand, info, position } => lower_pointer_intrinsic(
            PointerIntrinsicKind::StrongNew,
            *operand,
            info,
            position,
            table,
            scope,
        ),
        Expr::Lock { operand, info, position } => lower_pointer_intrinsic(
            PointerIntrinsicKind::WeakLock,
            *operand,
            info,
            position,
            table,
            scope,
        ),
        Expr::Unbox { operand, info, position } => lower_pointer_intrinsic(
            PointerIntrinsicKind::StrongValue,
            *operand,
            info,
            position,
            table,
            scope,
        ),
        Expr::Array { elements, info, position } => {
            let (prelude, elements) = lower_args(elements, table, scope);
            LoweredExprResult {
                prelude,
                expr: LoweredExpr::Array { elements, info, position },
            }
        }
        Expr::Tuple { elements, info, position } => {
            let (prelude, elements) = lower_args(elements, table, scope);
            LoweredExprResult {
                prelude,
                expr: LoweredExpr::Tuple { elements, info, position },
            }
        }
        Expr::ConversionCall {
            operand, info, position, ..
        } => {
            let operand = lower_expr(*operand, table, scope);
            LoweredExprResult {
                prelude: operand.prelude,
                expr: LoweredExpr::ConversionCall {
                    operand: Box::new(operand.expr),
                    info,
                    position,
                },
            }
        }
    }
}

fn lower_args(args: Vec<CheckedExpr>, table: &mut ScopeTable, scope: ScopeId) -> (Vec<LoweredStatement>, Vec<LoweredExpr>) {
    let mut prelude = Vec::new();
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        let lowered = lower_expr(arg, table, scope);
        prelude.extend(lowered.prelude);
        out.push(lowered.expr);
    }
    (prelude, out)
}

fn lower_pointer_intrinsic(
    kind: PointerIntrinsicKind,
    operand: CheckedExpr,
    info: CheckedInfo,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
) -> LoweredExprResult {
    let operand = lower_expr(operand, table, scope);
    LoweredExprResult {
        prelude: operand.prelude,
        expr: LoweredExpr::PointerIntrinsic {
            kind,
            operand: Box::new(operand.expr),
            info,
            position,
        },
    }
}

/// `and`/`or` lower to explicit short-circuit jumps over a boolean scratch
/// slot (spec §4.4). `lhs` always runs; `rhs` runs only when it can still
/// change the result — i.e. when `lhs` was false for `and`, true for `or`.
fn lower_short_circuit(
    lhs: CheckedExpr,
    rhs: CheckedExpr,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
    is_or: bool,
) -> LoweredExprResult {
    let lhs = lower_expr(lhs, table, scope);
    let mut prelude = lhs.prelude;

    let scratch = table.declare_scratch(scope, Type::Bool, position.clone());
    prelude.push(LoweredStatement::Var {
        name: "$scratch".into(),
        mutable: true,
        symbol: Some(scratch),
        value: lhs.expr,
        position: position.clone(),
    });

    let read_scratch = |kind: ValueKind| LoweredExpr::SymbolLiteral {
        info: match kind {
            ValueKind::L => CheckedInfo::lvalue(Some(scratch), Type::Bool),
            ValueKind::R => CheckedInfo::rvalue(Some(scratch), Type::Bool),
        },
        position: position.clone(),
    };

    let l_end = table.declare_label(scope, position.clone());
    let skip_condition = if is_or {
        read_scratch(ValueKind::R)
    } else {
        LoweredExpr::LogicalNegation {
            operand: Box::new(read_scratch(ValueKind::R)),
            info: CheckedInfo::rvalue(None, Type::Bool),
            position: position.clone(),
        }
    };
    prelude.push(LoweredStatement::ConditionalJump {
        condition: skip_condition,
        label: l_end,
        position: position.clone(),
    });

    let rhs = lower_expr(rhs, table, scope);
    prelude.extend(rhs.prelude);
    prelude.push(LoweredStatement::SimpleAssignment {
        target: read_scratch(ValueKind::L),
        value: rhs.expr,
        position: position.clone(),
    });
    prelude.push(LoweredStatement::Label {
        label: l_end,
        position: position.clone(),
    });

    LoweredExprResult {
        prelude,
        expr: read_scratch(ValueKind::R),
    }
}

fn with_prelude(mut prelude: Vec<LoweredStatement>, stmt: LoweredStatement) -> LoweredStatement {
    if prelude.is_empty() {
        stmt
    } else {
        prelude.push(stmt);
        LoweredStatement::Group(prelude)
    }
}

fn compound_binary_op(op: &AssignmentOp) -> BinaryOp {
    match op {
        AssignmentOp::AddAssign => BinaryOp::Add,
        AssignmentOp::SubAssign => BinaryOp::Sub,
        AssignmentOp::MulAssign => BinaryOp::Mul,
        AssignmentOp::DivAssign => BinaryOp::Div,
        AssignmentOp::Simple => unreachable!("simple assignment has no compound operator"),
    }
}

/// Resolves `lhs op rhs` to a user operator's `StaticCall` when `lhs`'s
/// type has one, the `PrimitiveBinary` built-in otherwise (spec §4.4,
/// mirroring the split `UserBinary` already makes during normal lowering).
fn build_binary(op: BinaryOp, lhs: LoweredExpr, rhs: LoweredExpr, table: &ScopeTable, position: Span) -> LoweredExpr {
    use crate::scope::OperatorKind;

    let lhs_ty = lhs.info().ty().clone();
    let kind = match op {
        BinaryOp::Add => OperatorKind::Add,
        BinaryOp::Sub => OperatorKind::Sub,
        BinaryOp::Mul => OperatorKind::Mul,
        BinaryOp::Div => OperatorKind::Div,
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            return LoweredExpr::PrimitiveBinary {
                op,
                info: CheckedInfo::rvalue(None, Type::Bool),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            };
        }
    };

    match table.find_operator(&lhs_ty, kind, Some(rhs.info().ty())) {
        Some(op_id) => {
            let return_type = match &table.symbol(op_id).kind {
                SymbolKind::Operator { return_type, .. } => return_type.clone(),
                _ => lhs_ty,
            };
            LoweredExpr::StaticCall {
                args: vec![lhs, rhs],
                info: CheckedInfo::rvalue(Some(op_id), return_type),
                position,
            }
        }
        None => LoweredExpr::PrimitiveBinary {
            op,
            info: CheckedInfo::rvalue(None, lhs_ty),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            position,
        },
    }
}

pub fn lower_stmt(stmt: CheckedStmt, table: &mut ScopeTable, scope: ScopeId) -> (LoweredStatement, Vec<crate::scope::SymbolId>) {
    match stmt {
        CheckedStmt::Expression(e) => {
            let r = lower_expr(e, table, scope);
            (with_prelude(r.prelude, LoweredStatement::Expression(r.expr)), Vec::new())
        }
        CheckedStmt::Var {
            name, mutable, value, info, position, ..
        } => {
            let r = lower_expr(value, table, scope);
            let symbol = info.symbol;
            let stmt = LoweredStatement::Var {
                name,
                mutable,
                symbol,
                value: r.expr,
                position,
            };
            (with_prelude(r.prelude, stmt), symbol.into_iter().collect())
        }
        CheckedStmt::Const {
            name, value, info, position, ..
        } => {
            let r = lower_expr(value, table, scope);
            let symbol = info.symbol;
            let stmt = LoweredStatement::Var {
                name,
                mutable: false,
                symbol,
                value: r.expr,
                position,
            };
            (with_prelude(r.prelude, stmt), symbol.into_iter().collect())
        }
        CheckedStmt::Assignment { op, target, value, position } => lower_assignment(op, target, value, position, table, scope),
        CheckedStmt::If {
            conditions,
            branches,
            else_branch,
            position,
        } => lower_if(conditions, branches, else_branch, position, table, scope),
        CheckedStmt::While { condition, body, position } => lower_while(condition, body, position, table, scope),
        CheckedStmt::Assert { condition, position } => lower_assert(condition, position, table, scope),
        CheckedStmt::Return { value, position } => match value {
            Some(v) => {
                let r = lower_expr(v, table, scope);
                (
                    with_prelude(r.prelude, LoweredStatement::Return { value: Some(r.expr), position }),
                    Vec::new(),
                )
            }
            None => (LoweredStatement::Return { value: None, position }, Vec::new()),
        },
        CheckedStmt::Block(b) => (LoweredStatement::Group(lower_block(b, table, scope)), Vec::new()),
        CheckedStmt::Comment(s) => (LoweredStatement::Comment(s), Vec::new()),
    }
}

fn lower_assignment(
    op: AssignmentOp,
    target: CheckedExpr,
    value: CheckedExpr,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
) -> (LoweredStatement, Vec<crate::scope::SymbolId>) {
    if matches!(op, AssignmentOp::Simple) {
        let mut t = lower_expr(target, table, scope);
        let v = lower_expr(value, table, scope);
        t.prelude.extend(v.prelude);
        let stmt = LoweredStatement::SimpleAssignment {
            target: t.expr,
            value: v.expr,
            position,
        };
        return (with_prelude(t.prelude, stmt), Vec::new());
    }

    let bin_op = compound_binary_op(&op);

    match target {
        // Compound assignment into a field captures the receiver exactly
        // once through a fresh reference temporary (spec §4.4).
        Expr::FieldAccess {
            receiver,
            field,
            info: target_info,
            position: target_position,
        } => {
            let receiver_is_lvalue = matches!(receiver.info().value_kind(), ValueKind::L);
            let r = lower_expr(*receiver, table, scope);
            let mut prelude = r.prelude;
            let recv_ty = r.expr.info().ty().clone();
            let mut new_locals = Vec::new();

            let ref_operand = if receiver_is_lvalue {
                LoweredExpr::AddressOf {
                    operand: Box::new(r.expr),
                    info: CheckedInfo::rvalue(None, recv_ty.get_with_ref()),
                    position: target_position.clone(),
                }
            } else {
                let val_tmp = table.declare_scratch(scope, recv_ty.clone(), target_position.clone());
                new_locals.push(val_tmp);
                prelude.push(LoweredStatement::Var {
                    name: "$tmp".into(),
                    mutable: true,
                    symbol: Some(val_tmp),
                    value: r.expr,
                    position: target_position.clone(),
                });
                LoweredExpr::AddressOf {
                    operand: Box::new(LoweredExpr::SymbolLiteral {
                        info: CheckedInfo::lvalue(Some(val_tmp), recv_ty.clone()),
                        position: target_position.clone(),
                    }),
                    info: CheckedInfo::rvalue(None, recv_ty.get_with_ref()),
                    position: target_position.clone(),
                }
            };

            let ref_tmp = table.declare_scratch(scope, recv_ty.get_with_ref(), target_position.clone());
            new_locals.push(ref_tmp);
            prelude.push(LoweredStatement::Var {
                name: "$tmp_ref".into(),
                mutable: true,
                symbol: Some(ref_tmp),
                value: ref_operand,
                position: target_position.clone(),
            });

            let target_after = LoweredExpr::FieldAccess {
                receiver: Box::new(LoweredExpr::SymbolLiteral {
                    info: CheckedInfo::lvalue(Some(ref_tmp), recv_ty.get_with_ref()),
                    position: target_position.clone(),
                }),
                field,
                info: CheckedInfo::lvalue(None, target_info.ty().clone()),
                position: target_position.clone(),
            };

            let v = lower_expr(value, table, scope);
            prelude.extend(v.prelude);
            let bin = build_binary(bin_op, target_after.clone(), v.expr, table, position.clone());
            let stmt = LoweredStatement::SimpleAssignment {
                target: target_after,
                value: bin,
                position,
            };
            (with_prelude(prelude, stmt), new_locals)
        }
        // A bare (possibly dereferenced) variable reference is pure, so it
        // can be lowered once and reused on both sides of the rewrite.
        other => {
            let t = lower_expr(other, table, scope);
            let mut prelude = t.prelude;
            let v = lower_expr(value, table, scope);
            prelude.extend(v.prelude);
            let bin = build_binary(bin_op, t.expr.clone(), v.expr, table, position.clone());
            let stmt = LoweredStatement::SimpleAssignment {
                target: t.expr,
                value: bin,
                position,
            };
            (with_prelude(prelude, stmt), Vec::new())
        }
    }
}

/// `if c0 {b0} elif c1 {b1} ... else {be}` lowers to a chain of negated
/// conditional jumps over shared labels, one per non-first branch plus a
/// trailing end label (spec §4.4, grounded on the original compiler's
/// `IfStmtSema::CreateLowered`).
fn lower_if(
    conditions: Vec<CheckedExpr>,
    branches: Vec<CheckedBlock>,
    else_branch: Option<CheckedBlock>,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
) -> (LoweredStatement, Vec<crate::scope::SymbolId>) {
    let has_else = else_branch.is_some();
    let n_conditions = conditions.len();
    let label_count = if has_else { n_conditions + 1 } else { n_conditions };
    let labels: Vec<crate::scope::SymbolId> = (0..label_count).map(|_| table.declare_label(scope, position.clone())).collect();
    let last_label = *labels.last().expect("an if statement always has at least one condition");
    let total_blocks = branches.len() + usize::from(has_else);

    let mut stmts = Vec::new();
    for (i, (condition, branch)) in conditions.into_iter().zip(branches.into_iter()).enumerate() {
        if i != 0 {
            stmts.push(LoweredStatement::Label {
                label: labels[i - 1],
                position: position.clone(),
            });
        }

        let cond = lower_expr(condition, table, scope);
        stmts.extend(cond.prelude);
        let negated = LoweredExpr::LogicalNegation {
            info: CheckedInfo::rvalue(None, Type::Bool),
            position: cond.expr.position(),
            operand: Box::new(cond.expr),
        };
        stmts.push(LoweredStatement::ConditionalJump {
            condition: negated,
            label: labels[i],
            position: position.clone(),
        });

        stmts.extend(lower_block(branch, table, scope));

        if i != total_blocks - 1 {
            stmts.push(LoweredStatement::Jump {
                label: last_label,
                position: position.clone(),
            });
        }
    }

    if let Some(else_block) = else_branch {
        let else_label = labels[labels.len() - 2];
        stmts.push(LoweredStatement::Label {
            label: else_label,
            position: position.clone(),
        });
        stmts.extend(lower_block(else_block, table, scope));
    }

    stmts.push(LoweredStatement::Label {
        label: last_label,
        position,
    });

    (LoweredStatement::Group(stmts), Vec::new())
}

/// `while c { b }` → `goto Lcont; Lbegin: b; Lcont: gotoif c Lbegin`
/// (spec §4.4).
fn lower_while(
    condition: CheckedExpr,
    body: CheckedBlock,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
) -> (LoweredStatement, Vec<crate::scope::SymbolId>) {
    let l_begin = table.declare_label(scope, position.clone());
    let l_cont = table.declare_label(scope, position.clone());

    let mut stmts = vec![
        LoweredStatement::Jump { label: l_cont, position: position.clone() },
        LoweredStatement::Label { label: l_begin, position: position.clone() },
    ];
    stmts.extend(lower_block(body, table, scope));
    stmts.push(LoweredStatement::Label { label: l_cont, position: position.clone() });

    let cond = lower_expr(condition, table, scope);
    stmts.extend(cond.prelude);
    stmts.push(LoweredStatement::ConditionalJump {
        condition: cond.expr,
        label: l_begin,
        position,
    });

    (LoweredStatement::Group(stmts), Vec::new())
}

/// `assert e` → `gotoif e Lend; exit; Lend:` (spec §4.4: "assert e lowers
/// to if ¬e { exit }", expanded directly rather than through `lower_if`
/// since there is no else branch and no negation of the emitted jump).
fn lower_assert(
    condition: CheckedExpr,
    position: Span,
    table: &mut ScopeTable,
    scope: ScopeId,
) -> (LoweredStatement, Vec<crate::scope::SymbolId>) {
    let l_end = table.declare_label(scope, position.clone());
    let cond = lower_expr(condition, table, scope);
    let mut stmts = cond.prelude;
    stmts.push(LoweredStatement::ConditionalJump {
        condition: cond.expr,
        label: l_end,
        position: position.clone(),
    });
    stmts.push(LoweredStatement::Exit { position: position.clone() });
    stmts.push(LoweredStatement::Label { label: l_end, position });
    (LoweredStatement::Group(stmts), Vec::new())
}

/// Lowers a block's statements and appends a [`LoweredStatement::BlockEnd`]
/// naming exactly the locals this block declared directly — nested blocks
/// (from `if`/`while`) close themselves with their own marker first, so
/// their locals are never double-attributed here.
pub fn lower_block(block: CheckedBlock, table: &mut ScopeTable, scope: ScopeId) -> Vec<LoweredStatement> {
    let mut out = Vec::new();
    let mut locals = Vec::new();
    for stmt in block.statements {
        let (lowered, new_locals) = lower_stmt(stmt, table, scope);
        locals.extend(new_locals);
        flatten(lowered, &mut out);
    }
    out.push(LoweredStatement::BlockEnd {
        locals,
        position: block.position,
    });
    out
}

fn flatten(stmt: LoweredStatement, out: &mut Vec<LoweredStatement>) {
    match stmt {
        LoweredStatement::Group(stmts) => {
            for s in stmts {
                flatten(s, out);
            }
        }
        other => out.push(other),
    }
}

pub fn lower_function(function: CheckedFunction, table: &mut ScopeTable) -> LoweredFunction {
    log::debug!("lowering function `{}`", function.name);
    let scope = table.root();
    let body = lower_block(function.body, table, scope);
    LoweredFunction {
        name: function.name,
        params: function.params,
        return_type: function.return_type,
        body,
        position: function.position,
    }
}

pub fn lower_module(module: Vec<TopLevelItem<CheckedInfo>>, table: &mut ScopeTable) -> LoweredModule {
    module
        .into_iter()
        .map(|item| match item {
            TopLevelItem::Function(f) => LoweredTopLevelItem::Function(lower_function(f, table)),
            TopLevelItem::Struct(s) => LoweredTopLevelItem::Struct(s),
            TopLevelItem::Trait(t) => LoweredTopLevelItem::Trait(t),
            TopLevelItem::Impl(impl_decl) => LoweredTopLevelItem::Impl(LoweredImpl {
                target: impl_decl.target,
                trait_name: impl_decl.trait_name,
                functions: impl_decl.functions.into_iter().map(|f| lower_function(f, table)).collect(),
                position: impl_decl.position,
            }),
            TopLevelItem::Const { name, value, position, .. } => {
                let scope = table.root();
                let lowered = lower_expr(value, table, scope);
                LoweredTopLevelItem::Const {
                    name,
                    value: lowered.expr,
                    position,
                }
            }
            TopLevelItem::Comment(c) => LoweredTopLevelItem::Comment(c),
        })
        .collect()
}
