//! A semantic middle-end: name resolution, type checking, lowering, and
//! control-flow validation for an ahead-of-time compiled systems language.
//!
//! Five stages rebuild an input syntax tree bottom-up into successively
//! more refined trees (spec §2): [`scope`] underlies all of them; [`binder`]
//! (C2) resolves names, [`typecheck`] (C3) assigns and converts types,
//! [`lower`] (C4) rewrites to a restricted statement family, and [`cfg`]
//! (C5) validates that every path through a non-void function returns. No
//! stage parses source text or emits machine code — [`syntax::FromParser`]
//! and [`backend::Emitter`] are where those collaborators plug in.

pub mod backend;
pub mod binder;
pub mod cfg;
pub mod diagnostics;
pub mod lower;
pub mod scope;
pub mod span;
pub mod syntax;
pub mod typecheck;

use diagnostics::{Diagnosed, DiagnosticBag};
use scope::ScopeTable;

/// Whether a stage keeps rebuilding after it has already produced an error,
/// or stops as soon as one appears. Neither stage ever panics or aborts the
/// process either way; `StopAtFirstError` only short-circuits the
/// `Compilation` driver's own stage sequencing, useful for tests and
/// incremental/IDE callers that don't want a cascade of follow-on errors
/// from an already-broken tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorRecovery {
    #[default]
    Continue,
    StopAtFirstError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub error_recovery: ErrorRecovery,
}

/// Owns the scope/symbol table for one compilation and drives C2–C5 over a
/// module. The table is append-only after C1/C2 (spec §5), so `Compilation`
/// is not `Sync` and makes no attempt to be: everything here is
/// single-threaded per compilation.
pub struct Compilation {
    table: ScopeTable,
    options: Options,
}

impl Compilation {
    pub fn new(options: Options) -> Self {
        Compilation {
            table: ScopeTable::new(),
            options,
        }
    }

    pub fn table(&self) -> &ScopeTable {
        &self.table
    }

    /// Runs C2 (bind) → C3 (check) → C4 (lower) → C5 (validate) over a
    /// module, honoring [`Options::error_recovery`] between stages.
    pub fn compile_module(&mut self, module: syntax::Module<syntax::Syntax>) -> Diagnosed<lower::LoweredModule> {
        let mut bag = DiagnosticBag::new();
        let root = self.table.root();

        let mut binder = binder::Binder::new(&mut self.table, root);
        let bound = bag.collect(binder.bind_module(module));
        if self.should_stop(&bag) {
            return Diagnosed::new(Vec::new(), bag);
        }

        let checked = bag.collect(typecheck::check_module(bound, &self.table));
        if self.should_stop(&bag) {
            return Diagnosed::new(Vec::new(), bag);
        }

        let lowered = lower::lower_module(checked, &mut self.table);
        bag.collect(cfg::analyze_module(&lowered, &self.table));

        Diagnosed::new(lowered, bag)
    }

    fn should_stop(&self, bag: &DiagnosticBag) -> bool {
        matches!(self.options.error_recovery, ErrorRecovery::StopAtFirstError) && bag.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::syntax;

    fn returning_one() -> syntax::Function<syntax::Syntax> {
        syntax::Function {
            name: "f".into(),
            generics: Vec::new(),
            params: Vec::new(),
            return_type: Some(syntax::TypeName::Literal {
                name: "int".into(),
                position: Span::default(),
            }),
            body: syntax::Block {
                statements: vec![syntax::Stmt::Return {
                    value: Some(syntax::Expr::IntLiteral {
                        value: 1,
                        info: (),
                        position: Span::default(),
                    }),
                    position: Span::default(),
                }],
                position: Span::default(),
            },
            position: Span::default(),
        }
    }

    #[test]
    fn a_well_formed_module_lowers_cleanly() {
        let mut compilation = Compilation::new(Options::default());
        let module = vec![syntax::TopLevelItem::Function(returning_one())];

        let result = compilation.compile_module(module);
        assert!(!result.bag.has_errors());
        assert_eq!(result.value.len(), 1);
    }

    #[test]
    fn stop_at_first_error_skips_lowering_after_a_type_error() {
        let mut compilation = Compilation::new(Options {
            error_recovery: ErrorRecovery::StopAtFirstError,
        });
        // A `void` function returning a value is a genuine C3 error; with
        // `StopAtFirstError` the driver must not even attempt C4/C5
        // afterward.
        let mut broken = returning_one();
        broken.return_type = None;
        let module = vec![syntax::TopLevelItem::Function(broken)];

        let result = compilation.compile_module(module);
        assert!(result.bag.has_errors());
        assert!(result.value.is_empty());
    }
}
