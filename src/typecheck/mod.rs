//! C3 — the type checker (spec §4.3).
//!
//! Rebuilds a bound tree bottom-up into a fully typed one, the same way
//! [`crate::binder::Binder`] rebuilds raw syntax into a bound tree: every
//! node gets a concrete [`checked_ast::CheckedInfo`] in place of whatever
//! the input carried, with conversions (spec §4.3 "implicit conversion")
//! inserted wherever a declared type and an inferred one disagree.

pub mod checked_ast;
pub mod convert;
pub mod error;
pub mod expr;
pub mod stmt;

pub use checked_ast::{CheckedBlock, CheckedExpr, CheckedFunction, CheckedInfo, CheckedStmt, StageInfo};
pub use error::TypeCheckError;

use crate::binder::{resolve_type_name, BoundFunction, BoundModule};
use crate::diagnostics::{Diagnosed, DiagnosticBag};
use crate::scope::{ScopeTable, Type};
use crate::syntax::TopLevelItem;

use stmt::{check_block, ReturnContext};

/// Checks a single function body against its own declared signature.
/// `function.return_type` is resolved independently of the symbol table —
/// the same `TypeName` the binder already resolved once to declare the
/// function's symbol — so this does not need the function's `SymbolId`
/// threaded through the AST.
pub fn check_function(function: BoundFunction, table: &ScopeTable) -> Diagnosed<CheckedFunction> {
    let mut bag = DiagnosticBag::new();
    let scope = table.root();
    let return_type = function
        .return_type
        .as_ref()
        .and_then(|t| resolve_type_name(t, table, scope))
        .unwrap_or(Type::Void);
    let ctx = ReturnContext {
        return_type: &return_type,
        is_void: matches!(return_type, Type::Void),
    };
    let body = check_block(function.body, table, &ctx, &mut bag);
    let checked = CheckedFunction {
        name: function.name,
        generics: function.generics,
        params: function.params,
        return_type: function.return_type,
        body,
        position: function.position,
    };
    Diagnosed::new(checked, bag)
}

/// Checks every function in a bound module, threading declared struct
/// fields through for `StructInitialisation` conversion and leaving
/// declarations (`Struct`/`Trait`/`Const`) untouched — those are already
/// fully resolved coming out of C2.
pub fn check_module(
    module: BoundModule,
    table: &ScopeTable,
) -> Diagnosed<Vec<TopLevelItem<CheckedInfo>>> {
    let mut bag = DiagnosticBag::new();
    let mut items = Vec::with_capacity(module.len());

    for item in module {
        let checked = match item {
            TopLevelItem::Function(function) => {
                TopLevelItem::Function(bag.collect(check_function(function, table)))
            }
            TopLevelItem::Struct(decl) => TopLevelItem::Struct(decl),
            TopLevelItem::Trait(decl) => TopLevelItem::Trait(decl),
            TopLevelItem::Impl(impl_decl) => {
                let functions = impl_decl
                    .functions
                    .into_iter()
                    .map(|f| bag.collect(check_function(f, table)))
                    .collect();
                TopLevelItem::Impl(crate::syntax::ImplDecl {
                    target: impl_decl.target,
                    trait_name: impl_decl.trait_name,
                    functions,
                    position: impl_decl.position,
                })
            }
            TopLevelItem::Const {
                name,
                type_name,
                value,
                position,
            } => {
                let scope = table.root();
                let ty = type_name
                    .as_ref()
                    .and_then(|t| resolve_type_name(t, table, scope))
                    .unwrap_or(Type::Error);
                let checked_value = expr::check_expr(value, table, &mut bag);
                let checked_value = convert::convert_implicit(
                    checked_value,
                    &crate::scope::TypeInfo::rvalue(ty),
                    table,
                    position.clone(),
                    &mut bag,
                );
                TopLevelItem::Const {
                    name,
                    type_name,
                    value: checked_value,
                    position,
                }
            }
            TopLevelItem::Comment(c) => TopLevelItem::Comment(c),
        };
        items.push(checked);
    }

    Diagnosed::new(items, bag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use crate::scope::{AccessModifier, SymbolBuilder, SymbolCategory, SymbolKind};
    use crate::span::Span;
    use crate::syntax::{self, FunctionParam, TypeName};

    fn bound_function(
        binder: &mut Binder,
        return_type: Option<TypeName>,
        body: syntax::Block<()>,
    ) -> BoundFunction {
        let body = binder.bind_block(body).value;
        syntax::Function {
            name: "f".into(),
            generics: Vec::new(),
            params: Vec::<FunctionParam>::new(),
            return_type,
            body,
            position: Span::default(),
        }
    }

    #[test]
    fn missing_return_expression_is_reported_for_non_void_function() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let body = syntax::Block {
            statements: vec![syntax::Stmt::Return {
                value: None,
                position: Span::default(),
            }],
            position: Span::default(),
        };
        let bound = bound_function(
            &mut binder,
            Some(TypeName::Literal {
                name: "int".into(),
                position: Span::default(),
            }),
            body,
        );

        let checked = check_function(bound, &table);
        assert!(checked.bag.has_errors());
    }

    #[test]
    fn void_function_rejects_returned_value() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let body = syntax::Block {
            statements: vec![syntax::Stmt::Return {
                value: Some(syntax::Expr::IntLiteral {
                    value: 1,
                    info: (),
                    position: Span::default(),
                }),
                position: Span::default(),
            }],
            position: Span::default(),
        };
        let bound = bound_function(&mut binder, None, body);

        let checked = check_function(bound, &table);
        assert!(checked.bag.has_errors());
    }

    #[test]
    fn matching_return_value_is_accepted() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let body = syntax::Block {
            statements: vec![syntax::Stmt::Return {
                value: Some(syntax::Expr::IntLiteral {
                    value: 1,
                    info: (),
                    position: Span::default(),
                }),
                position: Span::default(),
            }],
            position: Span::default(),
        };
        let bound = bound_function(
            &mut binder,
            Some(TypeName::Literal {
                name: "int".into(),
                position: Span::default(),
            }),
            body,
        );

        let checked = check_function(bound, &table);
        assert!(!checked.bag.has_errors());
    }

    #[test]
    fn type_checking_an_already_checked_tree_changes_nothing() {
        // Invariant #2: `TypeCheck(TypeCheck(t)) ≡ TypeCheck(t)`.
        let mut table = ScopeTable::new();
        let root = table.root();
        let mut binder = Binder::new(&mut table, root);
        let body = syntax::Block {
            statements: vec![syntax::Stmt::Return {
                value: Some(syntax::Expr::IntLiteral {
                    value: 1,
                    info: (),
                    position: Span::default(),
                }),
                position: Span::default(),
            }],
            position: Span::default(),
        };
        let bound = bound_function(
            &mut binder,
            Some(TypeName::Literal {
                name: "int".into(),
                position: Span::default(),
            }),
            body,
        );

        let once = check_function(bound, &table);
        assert!(!once.bag.has_errors());

        let ctx = ReturnContext {
            return_type: &Type::Integer,
            is_void: false,
        };
        let mut bag = DiagnosticBag::new();
        let twice = check_block(once.value.body.clone(), &table, &ctx, &mut bag);
        assert!(!bag.has_errors());
        assert_eq!(twice, once.value.body);
    }

    #[test]
    fn assignment_converts_rhs_to_lhs_type() {
        let mut table = ScopeTable::new();
        let root = table.root();
        let declared = table.declare_symbol(
            root,
            SymbolBuilder {
                name: "x".into(),
                position: Span::default(),
                access: AccessModifier::Public,
                category: SymbolCategory::Static,
                kind: SymbolKind::Local {
                    ty: Type::Integer,
                    mutable: true,
                },
                type_params: Vec::new(),
            },
        );
        assert!(!declared.bag.has_errors());

        let mut binder = Binder::new(&mut table, root);
        let target = syntax::Expr::SymbolLiteral {
            name: crate::scope::QualifiedName::single(crate::scope::NameSection::plain(
                "x",
                Span::default(),
            )),
            info: (),
            position: Span::default(),
        };
        let value = syntax::Expr::IntLiteral {
            value: 2,
            info: (),
            position: Span::default(),
        };
        let bound_target = binder.bind_expr(target).value;
        let bound_value = binder.bind_expr(value).value;

        let mut bag = DiagnosticBag::new();
        let ctx = ReturnContext {
            return_type: &Type::Void,
            is_void: true,
        };
        let stmt = syntax::Stmt::Assignment {
            op: syntax::AssignmentOp::Simple,
            target: bound_target,
            value: bound_value,
            position: Span::default(),
        };
        let checked = stmt::check_stmt(stmt, &table, &ctx, &mut bag);
        assert!(!bag.has_errors());
        match checked {
            syntax::Stmt::Assignment { target, value, .. } => {
                assert_eq!(target.info().ty(), &Type::Integer);
                assert_eq!(value.info().ty(), &Type::Integer);
            }
            _ => panic!("expected assignment"),
        }
    }
}
