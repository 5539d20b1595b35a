//! C3 expression checking (spec §4.3): `CreateTypeChecked` for [`Expr`].
//!
//! Generic over the input annotation via [`StageInfo`] so the same
//! function both checks a freshly-bound tree (`Expr<BoundInfo>`) and
//! re-checks an already-checked one (`Expr<CheckedInfo>`) — the latter is
//! what makes the fixed-point invariant (`TypeCheck(TypeCheck(t)) ≡
//! TypeCheck(t)`) a property of this function rather than something a
//! caller has to arrange separately.

use crate::diagnostics::DiagnosticBag;
use crate::scope::{OperatorKind, ScopeTable, SymbolKind, Type, TypeInfo};
use crate::syntax::{BinaryOp, Expr, FieldInit, UnaryOp};

use super::checked_ast::{CheckedExpr, CheckedInfo, StageInfo};
use super::convert::{convert_explicit, convert_implicit};
use super::error::{
    ArgumentCountMismatch, ExpectedDereferencable, ExpectedSized, MismatchedSelfType,
    NotDynDispatchable, TypeCheckError, UndefinedOperator,
};

struct CallSignature {
    params: Vec<Type>,
    return_type: Type,
    self_param: Option<Type>,
    dyn_dispatchable: bool,
    declaration: crate::span::Span,
}

fn callable_signature(
    table: &ScopeTable,
    symbol_id: Option<crate::scope::SymbolId>,
) -> Option<CallSignature> {
    let id = symbol_id?;
    let sym = table.symbol(id);
    if sym.is_error() {
        return None;
    }
    match &sym.kind {
        SymbolKind::Function {
            params,
            return_type,
            self_param,
            dyn_dispatchable,
            ..
        } => Some(CallSignature {
            params: params.iter().map(|p| p.ty.clone()).collect(),
            return_type: return_type.clone(),
            self_param: self_param.clone(),
            dyn_dispatchable: *dyn_dispatchable,
            declaration: sym.position.clone(),
        }),
        SymbolKind::Prototype {
            params,
            return_type,
            self_param,
        } => Some(CallSignature {
            params: params.iter().map(|p| p.ty.clone()).collect(),
            return_type: return_type.clone(),
            self_param: self_param.clone(),
            dyn_dispatchable: false,
            declaration: sym.position.clone(),
        }),
        SymbolKind::Operator {
            params,
            return_type,
            ..
        } => Some(CallSignature {
            params: params.iter().map(|p| p.ty.clone()).collect(),
            return_type: return_type.clone(),
            self_param: None,
            dyn_dispatchable: false,
            declaration: sym.position.clone(),
        }),
        _ => None,
    }
}

fn check_call_args(
    args: Vec<CheckedExpr>,
    sig: &CallSignature,
    position: &crate::span::Span,
    table: &ScopeTable,
    bag: &mut DiagnosticBag,
) -> Vec<CheckedExpr> {
    if sig.params.len() != args.len() {
        bag.push(
            TypeCheckError::ArgumentCountMismatch(ArgumentCountMismatch {
                expected: sig.params.len(),
                actual: args.len(),
                position: position.clone(),
                declaration: sig.declaration.clone(),
            })
            .to_diagnostic_group(),
        );
        return args;
    }
    args.into_iter()
        .zip(sig.params.iter())
        .map(|(a, ty)| convert_implicit(a, &TypeInfo::rvalue(ty.clone()), table, position.clone(), bag))
        .collect()
}

fn binary_operator_kind(op: BinaryOp) -> Option<OperatorKind> {
    match op {
        BinaryOp::Add => Some(OperatorKind::Add),
        BinaryOp::Sub => Some(OperatorKind::Sub),
        BinaryOp::Mul => Some(OperatorKind::Mul),
        BinaryOp::Div => Some(OperatorKind::Div),
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            None
        }
    }
}

fn is_comparison(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
    )
}

fn describe_binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Lte => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Gte => ">=",
    }
}

/// `CreateTypeChecked` (spec §4.3), implemented as a free function
/// dispatching bottom-up over every [`Expr`] variant.
pub fn check_expr<T: StageInfo + Clone>(
    expr: Expr<T>,
    table: &ScopeTable,
    bag: &mut DiagnosticBag,
) -> CheckedExpr {
    match expr {
        Expr::IntLiteral { value, info, position } => Expr::IntLiteral {
            value,
            info: CheckedInfo::rvalue(info.resolved_symbol(), Type::Integer),
            position,
        },
        Expr::FloatLiteral { value, info, position } => Expr::FloatLiteral {
            value,
            info: CheckedInfo::rvalue(info.resolved_symbol(), Type::Float),
            position,
        },
        Expr::BoolLiteral { value, info, position } => Expr::BoolLiteral {
            value,
            info: CheckedInfo::rvalue(info.resolved_symbol(), Type::Bool),
            position,
        },
        Expr::CharLiteral { value, info, position } => Expr::CharLiteral {
            value,
            info: CheckedInfo::rvalue(info.resolved_symbol(), Type::Char),
            position,
        },
        Expr::StringLiteral { value, info, position } => Expr::StringLiteral {
            value,
            info: CheckedInfo::rvalue(info.resolved_symbol(), Type::Str),
            position,
        },
        Expr::SymbolLiteral { name, info, position } => {
            let symbol = info.resolved_symbol();
            let ty = info.resolved_type();
            Expr::SymbolLiteral {
                name,
                info: CheckedInfo::lvalue(symbol, ty),
                position,
            }
        }
        Expr::FieldAccess {
            receiver,
            field,
            info,
            position,
        } => {
            let receiver = Box::new(check_expr(*receiver, table, bag));
            let symbol = info.resolved_symbol();
            let ty = info.resolved_type();
            Expr::FieldAccess {
                receiver,
                field,
                info: CheckedInfo::lvalue(symbol, ty),
                position,
            }
        }
        Expr::StaticCall {
            callee,
            args,
            info,
            position,
        } => {
            let args: Vec<CheckedExpr> = args.into_iter().map(|a| check_expr(a, table, bag)).collect();
            let symbol = info.resolved_symbol();
            let (args, return_type) = match callable_signature(table, symbol) {
                Some(sig) => {
                    let return_type = sig.return_type.clone();
                    (check_call_args(args, &sig, &position, table, bag), return_type)
                }
                None => (args, Type::Error),
            };
            Expr::StaticCall {
                callee,
                args,
                info: CheckedInfo::rvalue(symbol, return_type),
                position,
            }
        }
        Expr::InstanceCall {
            receiver,
            method,
            args,
            info,
            position,
        } => {
            let mut receiver = check_expr(*receiver, table, bag);
            let args: Vec<CheckedExpr> = args.into_iter().map(|a| check_expr(a, table, bag)).collect();
            let symbol = info.resolved_symbol();

            let (args, return_type) = match callable_signature(table, symbol) {
                Some(sig) => {
                    if let Some(self_ty) = sig.self_param.clone() {
                        let is_strong_like =
                            matches!(self_ty, Type::StrongPointer(_) | Type::DynStrongPointer(_));
                        if is_strong_like {
                            let receiver_ty = receiver.info().ty().clone();
                            if !receiver_ty.does_eq(&self_ty) {
                                bag.push(
                                    TypeCheckError::MismatchedSelfType(MismatchedSelfType {
                                        expected: self_ty.clone(),
                                        actual: receiver_ty,
                                        position: position.clone(),
                                    })
                                    .to_diagnostic_group(),
                                );
                            }
                        } else {
                            receiver = convert_implicit(
                                receiver,
                                &TypeInfo::rvalue(self_ty),
                                table,
                                position.clone(),
                                bag,
                            );
                        }
                    }

                    if matches!(receiver.info().ty(), Type::DynStrongPointer(_)) && !sig.dyn_dispatchable
                    {
                        bag.push(
                            TypeCheckError::NotDynDispatchable(NotDynDispatchable {
                                name: method.ident.clone(),
                                position: position.clone(),
                                declaration: sig.declaration.clone(),
                            })
                            .to_diagnostic_group(),
                        );
                    }

                    let return_type = sig.return_type.clone();
                    (check_call_args(args, &sig, &position, table, bag), return_type)
                }
                None => (args, Type::Error),
            };

            Expr::InstanceCall {
                receiver: Box::new(receiver),
                method,
                args,
                info: CheckedInfo::rvalue(symbol, return_type),
                position,
            }
        }
        Expr::UserUnary {
            op,
            operand,
            position,
            ..
        } => {
            let operand = check_expr(*operand, table, bag);
            let operand_ty = operand.info().ty().clone();

            let (symbol, result_ty) = match (op, &operand_ty) {
                (UnaryOp::Negate, Type::Integer) | (UnaryOp::Negate, Type::Float) => {
                    (None, operand_ty.clone())
                }
                (UnaryOp::Not, Type::Bool) => (None, Type::Bool),
                _ => {
                    let kind = match op {
                        UnaryOp::Negate => OperatorKind::Negate,
                        UnaryOp::Not => OperatorKind::Not,
                    };
                    match table.find_operator(&operand_ty, kind, None) {
                        Some(op_id) => {
                            let sig = callable_signature(table, Some(op_id));
                            (Some(op_id), sig.map(|s| s.return_type).unwrap_or(Type::Error))
                        }
                        None => {
                            if !operand_ty.is_error() {
                                bag.push(
                                    TypeCheckError::UndefinedOperator(UndefinedOperator {
                                        description: format!(
                                            "unary `{}` on `{operand_ty}`",
                                            match op {
                                                UnaryOp::Negate => "-",
                                                UnaryOp::Not => "!",
                                            }
                                        ),
                                        position: position.clone(),
                                    })
                                    .to_diagnostic_group(),
                                );
                            }
                            (None, Type::Error)
                        }
                    }
                }
            };

            Expr::UserUnary {
                op,
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(symbol, result_ty),
                position,
            }
        }
        Expr::UserBinary {
            op,
            lhs,
            rhs,
            position,
            ..
        } => {
            let lhs = check_expr(*lhs, table, bag);
            let lhs_ty = lhs.info().ty().clone();
            let rhs = check_expr(*rhs, table, bag);

            if let Some(kind) = binary_operator_kind(op) {
                match table.find_operator(&lhs_ty, kind, Some(rhs.info().ty())) {
                    Some(op_id) => {
                        let sig = callable_signature(table, Some(op_id));
                        let return_type = sig
                            .as_ref()
                            .map(|s| s.return_type.clone())
                            .unwrap_or(Type::Error);
                        let rhs = match &sig {
                            Some(s) if !s.params.is_empty() => convert_implicit(
                                rhs,
                                &TypeInfo::rvalue(s.params[0].clone()),
                                table,
                                position.clone(),
                                bag,
                            ),
                            _ => rhs,
                        };
                        Expr::UserBinary {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                            info: CheckedInfo::rvalue(Some(op_id), return_type),
                            position,
                        }
                    }
                    None if matches!(
                        lhs_ty,
                        Type::Integer | Type::Float | Type::Bool | Type::Char | Type::Error
                    ) =>
                    {
                        let rhs = convert_implicit(rhs, &TypeInfo::rvalue(lhs_ty.clone()), table, position.clone(), bag);
                        let result_ty = if is_comparison(op) { Type::Bool } else { lhs_ty.clone() };
                        Expr::UserBinary {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                            info: CheckedInfo::rvalue(None, result_ty),
                            position,
                        }
                    }
                    None => {
                        bag.push(
                            TypeCheckError::UndefinedOperator(UndefinedOperator {
                                description: format!(
                                    "`{}` on `{lhs_ty}`",
                                    describe_binary_op(op)
                                ),
                                position: position.clone(),
                            })
                            .to_diagnostic_group(),
                        );
                        Expr::UserBinary {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                            info: CheckedInfo::rvalue(None, Type::Error),
                            position,
                        }
                    }
                }
            } else {
                // Comparison on primitives: no operator overloading surface.
                let rhs = convert_implicit(rhs, &TypeInfo::rvalue(lhs_ty.clone()), table, position.clone(), bag);
                Expr::UserBinary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    info: CheckedInfo::rvalue(None, Type::Bool),
                    position,
                }
            }
        }
        Expr::And { lhs, rhs, position, .. } => {
            let lhs = check_expr(*lhs, table, bag);
            let lhs = convert_implicit(lhs, &TypeInfo::rvalue(Type::Bool), table, position.clone(), bag);
            let rhs = check_expr(*rhs, table, bag);
            let rhs = convert_implicit(rhs, &TypeInfo::rvalue(Type::Bool), table, position.clone(), bag);
            Expr::And {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                info: CheckedInfo::rvalue(None, Type::Bool),
                position,
            }
        }
        Expr::Or { lhs, rhs, position, .. } => {
            let lhs = check_expr(*lhs, table, bag);
            let lhs = convert_implicit(lhs, &TypeInfo::rvalue(Type::Bool), table, position.clone(), bag);
            let rhs = check_expr(*rhs, table, bag);
            let rhs = convert_implicit(rhs, &TypeInfo::rvalue(Type::Bool), table, position.clone(), bag);
            Expr::Or {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                info: CheckedInfo::rvalue(None, Type::Bool),
                position,
            }
        }
        Expr::LogicalNegation { operand, position, .. } => {
            let operand = check_expr(*operand, table, bag);
            let operand =
                convert_implicit(operand, &TypeInfo::rvalue(Type::Bool), table, position.clone(), bag);
            Expr::LogicalNegation {
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(None, Type::Bool),
                position,
            }
        }
        Expr::AddressOf { operand, position, .. } => {
            let operand = check_expr(*operand, table, bag);
            let ty = operand.info().ty().get_with_ref();
            Expr::AddressOf {
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(None, ty),
                position,
            }
        }
        Expr::Dereference { operand, position, .. } => {
            let operand = check_expr(*operand, table, bag);
            let operand_ty = operand.info().ty().clone();
            let result_ty = match &operand_ty {
                Type::Reference(inner) => (**inner).clone(),
                Type::Error => Type::Error,
                other => {
                    bag.push(
                        TypeCheckError::ExpectedDereferencable(ExpectedDereferencable {
                            ty: other.clone(),
                            position: position.clone(),
                        })
                        .to_diagnostic_group(),
                    );
                    Type::Error
                }
            };
            Expr::Dereference {
                operand: Box::new(operand),
                info: CheckedInfo::lvalue(None, result_ty),
                position,
            }
        }
        Expr::DerefAs {
            operand,
            target,
            info,
            position,
        } => {
            let operand = check_expr(*operand, table, bag);
            let operand_ty = operand.info().ty().clone();
            let target_ty = info.resolved_type();
            if !operand_ty.is_error()
                && !matches!(
                    operand_ty,
                    Type::Reference(_) | Type::StrongPointer(_) | Type::WeakPointer(_)
                )
            {
                bag.push(
                    TypeCheckError::ExpectedDereferencable(ExpectedDereferencable {
                        ty: operand_ty,
                        position: position.clone(),
                    })
                    .to_diagnostic_group(),
                );
            }
            Expr::DerefAs {
                operand: Box::new(operand),
                target,
                info: CheckedInfo::lvalue(None, target_ty),
                position,
            }
        }
        Expr::Cast {
            operand,
            target,
            info,
            position,
        } => {
            let operand = check_expr(*operand, table, bag);
            let target_ty = info.resolved_type();
            let operand = convert_explicit(
                operand,
                &TypeInfo::rvalue(target_ty.clone()),
                table,
                position.clone(),
                bag,
            );
            Expr::Cast {
                operand: Box::new(operand),
                target,
                info: CheckedInfo::rvalue(None, target_ty),
                position,
            }
        }
        Expr::SizeOf { target, position, .. } => Expr::SizeOf {
            target,
            info: CheckedInfo::rvalue(None, Type::Integer),
            position,
        },
        Expr::StructInitialisation {
            name,
            fields,
            info,
            position,
        } => {
            let struct_ty = info.resolved_type();
            let field_types = struct_field_types(table, &struct_ty);
            let fields: Vec<FieldInit<CheckedInfo>> = fields
                .into_iter()
                .map(|f| {
                    let expected = field_types
                        .iter()
                        .find(|(n, _)| n == &f.name)
                        .map(|(_, t)| t.clone());
                    let value = f.value.map(|v| {
                        let checked = check_expr(v, table, bag);
                        match &expected {
                            Some(ty) => convert_implicit(
                                checked,
                                &TypeInfo::rvalue(ty.clone()),
                                table,
                                f.position.clone(),
                                bag,
                            ),
                            None => checked,
                        }
                    });
                    FieldInit {
                        name: f.name,
                        value,
                        position: f.position,
                    }
                })
                .collect();
            Expr::StructInitialisation {
                name,
                fields,
                info: CheckedInfo::rvalue(None, struct_ty),
                position,
            }
        }
        Expr::Boxed { operand, info, position } => {
            let operand = check_expr(*operand, table, bag);
            expect_sized(operand.info().ty(), position.clone(), bag);
            let ty = info.resolved_type();
            Expr::Boxed {
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(None, ty),
                position,
            }
        }
        Expr::Lock { operand, info, position } => {
            let operand = check_expr(*operand, table, bag);
            let operand_ty = operand.info().ty().clone();
            if !operand_ty.is_error() && !matches!(operand_ty, Type::WeakPointer(_)) {
                bag.push(
                    TypeCheckError::ExpectedPointer(super::error::ExpectedPointer {
                        ty: operand_ty,
                        position: position.clone(),
                    })
                    .to_diagnostic_group(),
                );
            }
            let ty = info.resolved_type();
            Expr::Lock {
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(None, ty),
                position,
            }
        }
        Expr::Unbox { operand, info, position } => {
            let operand = check_expr(*operand, table, bag);
            let operand_ty = operand.info().ty().clone();
            if !operand_ty.is_error() && !matches!(operand_ty, Type::StrongPointer(_)) {
                bag.push(
                    TypeCheckError::ExpectedStrongPointer(super::error::ExpectedStrongPointer {
                        ty: operand_ty,
                        position: position.clone(),
                    })
                    .to_diagnostic_group(),
                );
            }
            let ty = info.resolved_type();
            Expr::Unbox {
                operand: Box::new(operand),
                info: CheckedInfo::lvalue(None, ty),
                position,
            }
        }
        Expr::Array { elements, position, .. } => {
            let elements: Vec<CheckedExpr> = elements.into_iter().map(|e| check_expr(e, table, bag)).collect();
            let elem_ty = elements
                .first()
                .map(|e| e.info().ty().clone())
                .unwrap_or(Type::Error);
            let elements: Vec<CheckedExpr> = elements
                .into_iter()
                .map(|e| convert_implicit(e, &TypeInfo::rvalue(elem_ty.clone()), table, position.clone(), bag))
                .collect();
            Expr::Array {
                elements,
                info: CheckedInfo::rvalue(None, Type::Array(Box::new(elem_ty))),
                position,
            }
        }
        Expr::Tuple { elements, position, .. } => {
            let elements: Vec<CheckedExpr> = elements.into_iter().map(|e| check_expr(e, table, bag)).collect();
            let types: Vec<Type> = elements.iter().map(|e| e.info().ty().clone()).collect();
            Expr::Tuple {
                elements,
                info: CheckedInfo::rvalue(None, Type::Tuple(types)),
                position,
            }
        }
        Expr::ReferenceOf { operand, position, .. } => {
            let operand = check_expr(*operand, table, bag);
            let ty = operand.info().ty().get_with_ref();
            Expr::ReferenceOf {
                operand: Box::new(operand),
                info: CheckedInfo::rvalue(None, ty),
                position,
            }
        }
        Expr::ConversionCall {
            operand,
            operator,
            info,
            position,
        } => {
            let operand = check_expr(*operand, table, bag);
            let symbol = info.resolved_symbol();
            let ty = match symbol.and_then(|id| callable_signature(table, Some(id))) {
                Some(sig) => sig.return_type,
                None => info.resolved_type(),
            };
            Expr::ConversionCall {
                operand: Box::new(operand),
                operator,
                info: CheckedInfo::rvalue(symbol, ty),
                position,
            }
        }
    }
}

fn struct_field_types(table: &ScopeTable, ty: &Type) -> Vec<(String, Type)> {
    let Type::Struct(id) = ty.get_without_ref() else {
        return Vec::new();
    };
    let SymbolKind::Struct { fields, .. } = &table.symbol(id).kind else {
        return Vec::new();
    };
    fields.iter().map(|f| (f.name.clone(), f.ty.clone())).collect()
}

/// Checks a struct/tuple-returning expression is sized (spec §4.3 return
/// statement rule: "the returned expression must be sized").
pub fn expect_sized(ty: &Type, position: crate::span::Span, bag: &mut DiagnosticBag) {
    if !ty.is_error() && !ty.is_sized() {
        bag.push(
            TypeCheckError::ExpectedSized(ExpectedSized {
                ty: ty.clone(),
                position,
            })
            .to_diagnostic_group(),
        );
    }
}
