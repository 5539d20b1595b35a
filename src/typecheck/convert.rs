//! Implicit/explicit conversion (spec §4.3 "Implicit conversion, `S -> T`").

use crate::scope::{NameSection, QualifiedName, ScopeTable, Type, TypeInfo, ValueKind};
use crate::span::Span;
use crate::syntax::Expr;

use super::checked_ast::{CheckedExpr, CheckedInfo};
use super::error::{CannotConvert, ExpectedLValue, TypeCheckError};
use crate::diagnostics::DiagnosticBag;

/// `CreateImplicitlyConverted` (spec §4.3).
pub fn convert_implicit(
    source: CheckedExpr,
    target: &TypeInfo,
    table: &ScopeTable,
    position: Span,
    bag: &mut DiagnosticBag,
) -> CheckedExpr {
    convert(source, target, table, position, bag, false)
}

/// The `as` form: same steps, but the conversion-operator search also
/// considers explicit-only operators.
pub fn convert_explicit(
    source: CheckedExpr,
    target: &TypeInfo,
    table: &ScopeTable,
    position: Span,
    bag: &mut DiagnosticBag,
) -> CheckedExpr {
    convert(source, target, table, position, bag, true)
}

fn convert(
    source: CheckedExpr,
    target: &TypeInfo,
    table: &ScopeTable,
    position: Span,
    bag: &mut DiagnosticBag,
    explicit: bool,
) -> CheckedExpr {
    let source_info = source.info().clone();

    // Error is absorbing: do not cascade further diagnostics past it.
    if source_info.ty().is_error() || target.ty.is_error() {
        return source;
    }

    if target.value_kind == ValueKind::L && source_info.value_kind() != ValueKind::L {
        bag.push(
            TypeCheckError::ExpectedLValue(ExpectedLValue {
                position: position.clone(),
            })
            .to_diagnostic_group(),
        );
        return source;
    }

    if source_info.ty() == &target.ty {
        return source;
    }

    if let Type::Reference(inner) = source_info.ty() {
        if inner.as_ref() == &target.ty {
            return wrap_dereference(source, target.clone());
        }
    }

    if let Type::Reference(target_inner) = &target.ty {
        if source_info.ty() == target_inner.as_ref() {
            return wrap_reference_of(source, target.clone());
        }
    }

    if let Some(op_id) = table.find_conversion_operator(source_info.ty(), &target.ty, explicit) {
        return wrap_conversion_call(source, op_id, table, target.clone());
    }

    bag.push(
        TypeCheckError::CannotConvert(CannotConvert {
            from: source_info.ty().clone(),
            to: target.ty.clone(),
            position,
        })
        .to_diagnostic_group(),
    );
    source
}

fn wrap_dereference(source: CheckedExpr, target: TypeInfo) -> CheckedExpr {
    let position = crate::span::GetPosition::position(&source);
    Expr::Dereference {
        operand: Box::new(source),
        info: CheckedInfo::new(None, target),
        position,
    }
}

fn wrap_reference_of(source: CheckedExpr, target: TypeInfo) -> CheckedExpr {
    let position = crate::span::GetPosition::position(&source);
    Expr::ReferenceOf {
        operand: Box::new(source),
        info: CheckedInfo::new(None, target),
        position,
    }
}

fn wrap_conversion_call(
    source: CheckedExpr,
    op_id: crate::scope::SymbolId,
    table: &ScopeTable,
    target: TypeInfo,
) -> CheckedExpr {
    let position = crate::span::GetPosition::position(&source);
    let operator_name = table.symbol(op_id).name.clone();
    Expr::ConversionCall {
        operand: Box::new(source),
        operator: QualifiedName::single(NameSection::plain(operator_name, position.clone())),
        info: CheckedInfo::new(Some(op_id), target),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn leaf(ty: Type, value_kind: ValueKind) -> CheckedExpr {
        Expr::IntLiteral {
            value: 0,
            info: CheckedInfo::new(None, TypeInfo::new(ty, value_kind)),
            position: Span::default(),
        }
    }

    #[test]
    fn identical_types_pass_through_unchanged() {
        let table = ScopeTable::new();
        let mut bag = DiagnosticBag::new();
        let source = leaf(Type::Integer, ValueKind::R);
        let result = convert_implicit(
            source.clone(),
            &TypeInfo::rvalue(Type::Integer),
            &table,
            Span::default(),
            &mut bag,
        );
        assert_eq!(result, source);
        assert!(!bag.has_errors());
    }

    #[test]
    fn reference_to_value_inserts_dereference() {
        let table = ScopeTable::new();
        let mut bag = DiagnosticBag::new();
        let source = leaf(Type::Reference(Box::new(Type::Integer)), ValueKind::L);
        let result = convert_implicit(
            source,
            &TypeInfo::rvalue(Type::Integer),
            &table,
            Span::default(),
            &mut bag,
        );
        assert!(matches!(result, Expr::Dereference { .. }));
        assert!(!bag.has_errors());
    }

    #[test]
    fn value_to_reference_inserts_reference_of() {
        let table = ScopeTable::new();
        let mut bag = DiagnosticBag::new();
        let source = leaf(Type::Integer, ValueKind::L);
        let result = convert_implicit(
            source,
            &TypeInfo::rvalue(Type::Reference(Box::new(Type::Integer))),
            &table,
            Span::default(),
            &mut bag,
        );
        assert!(matches!(result, Expr::ReferenceOf { .. }));
        assert!(!bag.has_errors());
    }

    #[test]
    fn unrelated_types_with_no_operator_emit_cannot_convert() {
        let table = ScopeTable::new();
        let mut bag = DiagnosticBag::new();
        let source = leaf(Type::Integer, ValueKind::R);
        let result = convert_implicit(
            source.clone(),
            &TypeInfo::rvalue(Type::Bool),
            &table,
            Span::default(),
            &mut bag,
        );
        assert_eq!(result, source);
        assert!(bag.has_errors());
    }

    #[test]
    fn rvalue_target_rejects_when_lvalue_required_and_missing() {
        let table = ScopeTable::new();
        let mut bag = DiagnosticBag::new();
        let source = leaf(Type::Integer, ValueKind::R);
        let _ = convert_implicit(
            source,
            &TypeInfo::lvalue(Type::Integer),
            &table,
            Span::default(),
            &mut bag,
        );
        assert!(bag.has_errors());
    }
}
