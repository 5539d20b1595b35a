//! Diagnostic accumulation.
//!
//! No stage in this crate fails fast. Every fallible operation returns a
//! [`Diagnosed<T>`], pairing its best-effort result with whatever
//! [`DiagnosticGroup`]s it produced along the way; callers fold those groups
//! into their own bag via [`DiagnosticBag::collect`] and keep going.

use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub position: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(position: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            position,
            message: message.into(),
        }
    }

    pub fn note(position: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Note,
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.severity, self.message)
    }
}

/// A primary diagnostic plus whatever related notes explain it. Always
/// presented together by the (external) driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticGroup(pub Vec<Diagnostic>);

impl DiagnosticGroup {
    pub fn single(diagnostic: Diagnostic) -> Self {
        DiagnosticGroup(vec![diagnostic])
    }

    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.0.push(note);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Accumulates diagnostic groups across every stage of a compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    groups: Vec<DiagnosticGroup>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: DiagnosticGroup) {
        self.groups.push(group);
    }

    /// Extract the payload of a `Diagnosed<T>`, folding its groups into this
    /// bag. This is the only way a `Diagnosed<T>` is ever consumed.
    pub fn collect<T>(&mut self, diagnosed: Diagnosed<T>) -> T {
        let Diagnosed { value, bag } = diagnosed;
        self.groups.extend(bag.groups);
        value
    }

    pub fn groups(&self) -> &[DiagnosticGroup] {
        &self.groups
    }

    pub fn has_errors(&self) -> bool {
        self.groups.iter().any(DiagnosticGroup::has_errors)
    }

    pub fn into_groups(self) -> Vec<DiagnosticGroup> {
        self.groups
    }
}

/// A value paired with the diagnostics produced while computing it.
#[derive(Debug, Clone)]
pub struct Diagnosed<T> {
    pub value: T,
    pub bag: DiagnosticBag,
}

impl<T> Diagnosed<T> {
    pub fn ok(value: T) -> Self {
        Diagnosed {
            value,
            bag: DiagnosticBag::new(),
        }
    }

    pub fn new(value: T, bag: DiagnosticBag) -> Self {
        Diagnosed { value, bag }
    }

    pub fn with_group(value: T, group: DiagnosticGroup) -> Self {
        let mut bag = DiagnosticBag::new();
        bag.push(group);
        Diagnosed { value, bag }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Diagnosed<U> {
        Diagnosed {
            value: f(self.value),
            bag: self.bag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_folds_groups_into_the_bag() {
        let mut bag = DiagnosticBag::new();
        let diagnosed = Diagnosed::with_group(
            42,
            DiagnosticGroup::single(Diagnostic::error(Span::default(), "boom")),
        );

        let value = bag.collect(diagnosed);

        assert_eq!(value, 42);
        assert!(bag.has_errors());
        assert_eq!(bag.groups().len(), 1);
    }

    #[test]
    fn group_with_note_keeps_primary_first() {
        let group = DiagnosticGroup::single(Diagnostic::error(Span::default(), "primary"))
            .with_note(Diagnostic::note(Span::default(), "related"));

        assert_eq!(group.0[0].message, "primary");
        assert_eq!(group.0[1].message, "related");
        assert!(group.has_errors());
    }
}
