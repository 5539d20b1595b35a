//! Type-checking-category errors (spec §7), in the same hand-rolled shape
//! as [`crate::scope::ScopeError`]: one struct per failure, manual
//! `Display`/`Error`, a `to_diagnostic_group` for rendering.

use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticGroup};
use crate::scope::Type;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct CannotConvert {
    pub from: Type,
    pub to: Type,
    pub position: Span,
}

impl fmt::Display for CannotConvert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to convert `{}` to `{}`", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedLValue {
    pub position: Span,
}

impl fmt::Display for ExpectedLValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected an assignable expression")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedSized {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for ExpectedSized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a sized expression, found `{}`", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedDereferencable {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for ExpectedDereferencable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` cannot be dereferenced", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedPointer {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for ExpectedPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a pointer type, found `{}`", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedStrongPointer {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for ExpectedStrongPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a strong pointer, found `{}`", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedNonDynStrongPointer {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for ExpectedNonDynStrongPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a non-`dyn` strong pointer, found `{}`", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentCountMismatch {
    pub expected: usize,
    pub actual: usize,
    pub position: Span,
    pub declaration: Span,
}

impl fmt::Display for ArgumentCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} argument(s), found {}",
            self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MismatchedSelfType {
    pub expected: Type,
    pub actual: Type,
    pub position: Span,
}

impl fmt::Display for MismatchedSelfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected `self` of type `{}`, found `{}`",
            self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotDynDispatchable {
    pub name: String,
    pub position: Span,
    pub declaration: Span,
}

impl fmt::Display for NotDynDispatchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function is not dynamically dispatchable")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturningFromVoidFunction {
    pub position: Span,
}

impl fmt::Display for ReturningFromVoidFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot return a value from a void function")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsizedReturnExpression {
    pub ty: Type,
    pub position: Span,
}

impl fmt::Display for UnsizedReturnExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot return unsized expression of type `{}`", self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingReturnExpression {
    pub position: Span,
}

impl fmt::Display for MissingReturnExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing return expression")
    }
}

/// Not part of spec.md's explicit Type-checking error list, but present in
/// `original_source/errors.cpp`'s reference wording; produced when a `+`,
/// `-`, unary `!`/`-`, etc. has no matching operator symbol for its operand
/// types (the counterpart of `CannotConvert` for operator sugar rather than
/// explicit conversions).
#[derive(Debug, Clone, PartialEq)]
pub struct UndefinedOperator {
    pub description: String,
    pub position: Span,
}

impl fmt::Display for UndefinedOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undefined reference to operator {}", self.description)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeCheckError {
    CannotConvert(CannotConvert),
    ExpectedLValue(ExpectedLValue),
    ExpectedSized(ExpectedSized),
    ExpectedDereferencable(ExpectedDereferencable),
    ExpectedPointer(ExpectedPointer),
    ExpectedStrongPointer(ExpectedStrongPointer),
    ExpectedNonDynStrongPointer(ExpectedNonDynStrongPointer),
    ArgumentCountMismatch(ArgumentCountMismatch),
    MismatchedSelfType(MismatchedSelfType),
    NotDynDispatchable(NotDynDispatchable),
    ReturningFromVoidFunction(ReturningFromVoidFunction),
    UnsizedReturnExpression(UnsizedReturnExpression),
    MissingReturnExpression(MissingReturnExpression),
    UndefinedOperator(UndefinedOperator),
}

impl fmt::Display for TypeCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCheckError::CannotConvert(e) => e.fmt(f),
            TypeCheckError::ExpectedLValue(e) => e.fmt(f),
            TypeCheckError::ExpectedSized(e) => e.fmt(f),
            TypeCheckError::UndefinedOperator(e) => e.fmt(f),
            TypeCheckError::ExpectedDereferencable(e) => e.fmt(f),
            TypeCheckError::ExpectedPointer(e) => e.fmt(f),
            TypeCheckError::ExpectedStrongPointer(e) => e.fmt(f),
            TypeCheckError::ExpectedNonDynStrongPointer(e) => e.fmt(f),
            TypeCheckError::ArgumentCountMismatch(e) => e.fmt(f),
            TypeCheckError::MismatchedSelfType(e) => e.fmt(f),
            TypeCheckError::NotDynDispatchable(e) => e.fmt(f),
            TypeCheckError::ReturningFromVoidFunction(e) => e.fmt(f),
            TypeCheckError::UnsizedReturnExpression(e) => e.fmt(f),
            TypeCheckError::MissingReturnExpression(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for TypeCheckError {}

impl TypeCheckError {
    pub fn to_diagnostic_group(&self) -> DiagnosticGroup {
        match self {
            TypeCheckError::CannotConvert(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedLValue(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedSized(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedDereferencable(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedPointer(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedStrongPointer(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ExpectedNonDynStrongPointer(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::ArgumentCountMismatch(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.declaration.clone(), "function declared here")),
            TypeCheckError::MismatchedSelfType(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::NotDynDispatchable(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.declaration.clone(), "function declared here")),
            TypeCheckError::ReturningFromVoidFunction(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::UnsizedReturnExpression(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::MissingReturnExpression(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            TypeCheckError::UndefinedOperator(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
        }
    }
}
