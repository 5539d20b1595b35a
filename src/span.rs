//! Source locations.
//!
//! `Span` is carried by every syntax, sema and lowered node so diagnostics can
//! point back at source text. Equality is deliberately degenerate (always
//! `true`): positions must not influence structural comparisons used to check
//! fixed points of type-checking and lowering (see the crate-level docs).

#[derive(Default, Debug, Clone, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub source: String,
}

impl Span {
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            source: self.source.clone(),
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, _other: &Span) -> bool {
        true
    }
}

impl std::hash::Hash for Span {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}

/// Implemented by anything that can report where it came from.
pub trait GetPosition {
    fn position(&self) -> Span;
}
