//! C3 statement checking (spec §4.3): `CreateTypeChecked` for [`Stmt`] and
//! [`Block`], plus the function-level return-type bookkeeping that expr
//! checking has no need for.

use crate::diagnostics::DiagnosticBag;
use crate::scope::{ScopeTable, Type, TypeInfo};
use crate::syntax::{Block, Stmt};

use super::checked_ast::{CheckedBlock, CheckedExpr, CheckedInfo, CheckedStmt, StageInfo};
use super::convert::convert_implicit;
use super::error::{MissingReturnExpression, ReturningFromVoidFunction, TypeCheckError, UnsizedReturnExpression};
use super::expr::check_expr;

/// Per-function context a return statement is checked against: its
/// declared return type, and whether it is declared void (distinguishing
/// "returns `void`" from "returns a unit-like struct").
pub struct ReturnContext<'a> {
    pub return_type: &'a Type,
    pub is_void: bool,
}

pub fn check_block<T: StageInfo + Clone>(
    block: Block<T>,
    table: &ScopeTable,
    ctx: &ReturnContext,
    bag: &mut DiagnosticBag,
) -> CheckedBlock {
    CheckedBlock {
        statements: block
            .statements
            .into_iter()
            .map(|s| check_stmt(s, table, ctx, bag))
            .collect(),
        position: block.position,
    }
}

fn to_bool(expr: CheckedExpr, table: &ScopeTable, position: crate::span::Span, bag: &mut DiagnosticBag) -> CheckedExpr {
    convert_implicit(expr, &TypeInfo::rvalue(Type::Bool), table, position, bag)
}

pub fn check_stmt<T: StageInfo + Clone>(
    stmt: Stmt<T>,
    table: &ScopeTable,
    ctx: &ReturnContext,
    bag: &mut DiagnosticBag,
) -> CheckedStmt {
    match stmt {
        Stmt::Expression(e) => Stmt::Expression(check_expr(e, table, bag)),
        Stmt::Var {
            name,
            mutable,
            type_name,
            value,
            info,
            position,
        } => {
            let ty = info.resolved_type();
            let symbol = info.resolved_symbol();
            let value = check_expr(value, table, bag);
            let value = convert_implicit(value, &TypeInfo::rvalue(ty.clone()), table, position.clone(), bag);
            Stmt::Var {
                name,
                mutable,
                type_name,
                value,
                info: CheckedInfo::lvalue(symbol, ty),
                position,
            }
        }
        Stmt::Const {
            name,
            type_name,
            value,
            info,
            position,
        } => {
            let ty = info.resolved_type();
            let symbol = info.resolved_symbol();
            let value = check_expr(value, table, bag);
            let value = convert_implicit(value, &TypeInfo::rvalue(ty.clone()), table, position.clone(), bag);
            Stmt::Const {
                name,
                type_name,
                value,
                info: CheckedInfo::lvalue(symbol, ty),
                position,
            }
        }
        Stmt::Assignment {
            op,
            target,
            value,
            position,
        } => {
            let target = check_expr(target, table, bag);
            let target_ty = target.info().ty().get_without_ref();
            let target = convert_implicit(
                target,
                &TypeInfo::lvalue(target_ty.clone()),
                table,
                position.clone(),
                bag,
            );
            let value = check_expr(value, table, bag);
            let value = convert_implicit(value, &TypeInfo::rvalue(target_ty), table, position.clone(), bag);
            Stmt::Assignment {
                op,
                target,
                value,
                position,
            }
        }
        Stmt::If {
            conditions,
            branches,
            else_branch,
            position,
        } => {
            let conditions = conditions
                .into_iter()
                .map(|c| {
                    let c = check_expr(c, table, bag);
                    to_bool(c, table, position.clone(), bag)
                })
                .collect();
            let branches = branches
                .into_iter()
                .map(|b| check_block(b, table, ctx, bag))
                .collect();
            let else_branch = else_branch.map(|b| check_block(b, table, ctx, bag));
            Stmt::If {
                conditions,
                branches,
                else_branch,
                position,
            }
        }
        Stmt::While {
            condition,
            body,
            position,
        } => {
            let condition = check_expr(condition, table, bag);
            let condition = to_bool(condition, table, position.clone(), bag);
            let body = check_block(body, table, ctx, bag);
            Stmt::While {
                condition,
                body,
                position,
            }
        }
        Stmt::Assert { condition, position } => {
            let condition = check_expr(condition, table, bag);
            let condition = to_bool(condition, table, position.clone(), bag);
            Stmt::Assert { condition, position }
        }
        Stmt::Return { value, position } => match value {
            Some(v) => {
                let v = check_expr(v, table, bag);
                if ctx.is_void {
                    bag.push(
                        TypeCheckError::ReturningFromVoidFunction(ReturningFromVoidFunction {
                            position: position.clone(),
                        })
                        .to_diagnostic_group(),
                    );
                    Stmt::Return {
                        value: Some(v),
                        position,
                    }
                } else {
                    let found_ty = v.info().ty().clone();
                    if !found_ty.is_error() && !found_ty.is_sized() {
                        bag.push(
                            TypeCheckError::UnsizedReturnExpression(UnsizedReturnExpression {
                                ty: found_ty,
                                position: position.clone(),
                            })
                            .to_diagnostic_group(),
                        );
                    }
                    let v = convert_implicit(
                        v,
                        &TypeInfo::rvalue(ctx.return_type.clone()),
                        table,
                        position.clone(),
                        bag,
                    );
                    Stmt::Return {
                        value: Some(v),
                        position,
                    }
                }
            }
            None => {
                if !ctx.is_void {
                    bag.push(
                        TypeCheckError::MissingReturnExpression(MissingReturnExpression {
                            position: position.clone(),
                        })
                        .to_diagnostic_group(),
                    );
                }
                Stmt::Return { value: None, position }
            }
        },
        Stmt::Block(b) => Stmt::Block(check_block(b, table, ctx, bag)),
        Stmt::Comment(s) => Stmt::Comment(s),
    }
}
