//! Resolution-category errors (spec §7), hand-rolled in the teacher's style
//! (see `why_lib::typechecker::error`): one struct per failure shape, each
//! carrying its own [`Span`], with manual `Display` and `Error` impls.

use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticGroup};
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redefinition {
    pub name: String,
    pub position: Span,
    pub previous: Span,
}

impl fmt::Display for Redefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redefinition of `{}`", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedSymbol {
    pub name: String,
    pub position: Span,
}

impl fmt::Display for UndefinedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undefined reference to `{}`", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousReference {
    pub name: String,
    pub position: Span,
    pub candidates: Vec<Span>,
}

impl fmt::Display for AmbiguousReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ambiguous symbol reference")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticInstanceMisuse {
    pub name: String,
    pub position: Span,
    pub declaration: Span,
    /// `true` when an instance symbol was used statically, `false` when a
    /// static symbol was scope-accessed as if it were an instance member.
    pub used_statically: bool,
}

impl fmt::Display for StaticInstanceMisuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.used_statically {
            write!(f, "not an instance symbol")
        } else {
            write!(f, "scope access of a local variable")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InaccessibleSymbol {
    pub name: String,
    pub position: Span,
    pub declaration: Span,
}

impl fmt::Display for InaccessibleSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inaccessible field")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupertraitCycle {
    pub trait_name: String,
    pub position: Span,
    pub cycle: Vec<String>,
}

impl fmt::Display for SupertraitCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "circular supertrait dependency involving `{}`",
            self.trait_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingStructFields {
    pub struct_name: String,
    pub position: Span,
    pub missing: Vec<String>,
    pub declaration: Span,
}

impl fmt::Display for MissingStructFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing fields {}", join_field_names(&self.missing))
    }
}

fn join_field_names(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
    match quoted.len() {
        0 => String::new(),
        1 => quoted[0].clone(),
        _ => {
            let (last, rest) = quoted.split_last().expect("len is at least 2 in this arm");
            format!("{} and {}", rest.join(", "), last)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateFieldInit {
    pub field_name: String,
    pub position: Span,
    pub first: Span,
}

impl fmt::Display for DuplicateFieldInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field initialized more than once")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStructField {
    pub struct_name: String,
    pub field_name: String,
    pub position: Span,
    pub declaration: Span,
}

impl fmt::Display for UnknownStructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` has no field named `{}`",
            self.struct_name, self.field_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAFunction {
    pub name: String,
    pub position: Span,
    pub declaration: Span,
}

impl fmt::Display for NotAFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol is not a function")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    Redefinition(Redefinition),
    UndefinedSymbol(UndefinedSymbol),
    AmbiguousReference(AmbiguousReference),
    StaticInstanceMisuse(StaticInstanceMisuse),
    InaccessibleSymbol(InaccessibleSymbol),
    SupertraitCycle(SupertraitCycle),
    MissingStructFields(MissingStructFields),
    DuplicateFieldInit(DuplicateFieldInit),
    UnknownStructField(UnknownStructField),
    NotAFunction(NotAFunction),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::Redefinition(e) => e.fmt(f),
            ScopeError::UndefinedSymbol(e) => e.fmt(f),
            ScopeError::AmbiguousReference(e) => e.fmt(f),
            ScopeError::StaticInstanceMisuse(e) => e.fmt(f),
            ScopeError::InaccessibleSymbol(e) => e.fmt(f),
            ScopeError::SupertraitCycle(e) => e.fmt(f),
            ScopeError::MissingStructFields(e) => e.fmt(f),
            ScopeError::DuplicateFieldInit(e) => e.fmt(f),
            ScopeError::UnknownStructField(e) => e.fmt(f),
            ScopeError::NotAFunction(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ScopeError {}

impl ScopeError {
    pub fn to_diagnostic_group(&self) -> DiagnosticGroup {
        match self {
            ScopeError::Redefinition(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.previous.clone(), "previous definition")),
            ScopeError::UndefinedSymbol(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            ScopeError::AmbiguousReference(e) => {
                let mut group =
                    DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()));
                for candidate in &e.candidates {
                    group = group.with_note(Diagnostic::note(
                        candidate.clone(),
                        "candidate symbol declaration",
                    ));
                }
                group
            }
            ScopeError::StaticInstanceMisuse(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(
                e.declaration.clone(),
                "local variable declaration",
            )),
            ScopeError::InaccessibleSymbol(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.declaration.clone(), "field declaration")),
            ScopeError::SupertraitCycle(e) => {
                DiagnosticGroup::single(Diagnostic::error(e.position.clone(), self.to_string()))
            }
            ScopeError::MissingStructFields(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.declaration.clone(), "struct declaration")),
            ScopeError::DuplicateFieldInit(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.first.clone(), "previous initialization")),
            ScopeError::UnknownStructField(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(
                e.declaration.clone(),
                format!("`{}` declaration", e.struct_name),
            )),
            ScopeError::NotAFunction(e) => DiagnosticGroup::single(Diagnostic::error(
                e.position.clone(),
                self.to_string(),
            ))
            .with_note(Diagnostic::note(e.declaration.clone(), "symbol declaration")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_joins_with_and() {
        let err = MissingStructFields {
            struct_name: "Vector2".into(),
            position: Span::default(),
            missing: vec!["x".into(), "y".into(), "z".into()],
            declaration: Span::default(),
        };
        assert_eq!(err.to_string(), "missing fields `x`, `y` and `z`");
    }

    #[test]
    fn unknown_field_message_matches_reference_wording() {
        let err = UnknownStructField {
            struct_name: "Vector2".into(),
            field_name: "z".into(),
            position: Span::default(),
            declaration: Span::default(),
        };
        assert_eq!(err.to_string(), "`Vector2` has no field named `z`");
    }
}
