//! The syntax tree: this crate's input shape (spec §6, "interface to the
//! parser"). An external lexer/parser is expected to build these directly;
//! this crate carries no lexing or parsing code of its own.

pub mod expr;
pub mod stmt;
pub mod type_name;

pub use expr::{BinaryOp, Expr, FieldInit, UnaryOp};
pub use stmt::{
    AssignmentOp, Block, Function, FunctionParam, GenericParam, ImplDecl, MethodSignature, Module,
    Stmt, StructDecl, StructField, TopLevelItem, TraitDecl,
};
pub use type_name::TypeName;

/// Bare, untyped syntax: `Expr<()>` / `Stmt<()>`.
pub type Syntax = ();

/// What a parser implements to hand its tree to this crate (spec §6,
/// "interface to the parser"): a conversion into the bare [`Module`] shape
/// `Binder::bind_module` consumes. This crate has no lexer/parser of its
/// own, so no concrete implementation ships here.
pub trait FromParser {
    fn into_module(self) -> Module<Syntax>;
}
