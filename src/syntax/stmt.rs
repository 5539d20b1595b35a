//! Statement and top-level item nodes, generic over stage annotation.

use crate::span::{GetPosition, Span};

use super::expr::Expr;
use super::type_name::TypeName;

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOp {
    Simple,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block<T> {
    pub statements: Vec<Stmt<T>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<T> {
    Expression(Expr<T>),
    Var {
        name: String,
        mutable: bool,
        type_name: Option<TypeName>,
        value: Expr<T>,
        info: T,
        position: Span,
    },
    Const {
        name: String,
        type_name: Option<TypeName>,
        value: Expr<T>,
        info: T,
        position: Span,
    },
    Assignment {
        op: AssignmentOp,
        target: Expr<T>,
        value: Expr<T>,
        position: Span,
    },
    If {
        conditions: Vec<Expr<T>>,
        branches: Vec<Block<T>>,
        else_branch: Option<Block<T>>,
        position: Span,
    },
    While {
        condition: Expr<T>,
        body: Block<T>,
        position: Span,
    },
    Assert {
        condition: Expr<T>,
        position: Span,
    },
    Return {
        value: Option<Expr<T>>,
        position: Span,
    },
    Block(Block<T>),
    Comment(String),
}

impl<T> GetPosition for Stmt<T> {
    fn position(&self) -> Span {
        match self {
            Stmt::Expression(e) => e.position(),
            Stmt::Var { position, .. }
            | Stmt::Const { position, .. }
            | Stmt::Assignment { position, .. }
            | Stmt::If { position, .. }
            | Stmt::While { position, .. }
            | Stmt::Assert { position, .. }
            | Stmt::Return { position, .. } => position.clone(),
            Stmt::Block(b) => b.position.clone(),
            Stmt::Comment(_) => Span::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub type_name: TypeName,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function<T> {
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub params: Vec<FunctionParam>,
    pub return_type: Option<TypeName>,
    pub body: Block<T>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub type_name: TypeName,
    pub public: bool,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<StructField>,
    pub public: bool,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub return_type: Option<TypeName>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDecl {
    pub name: String,
    pub supertraits: Vec<TypeName>,
    pub methods: Vec<MethodSignature>,
    pub public: bool,
    pub position: Span,
}

/// An `impl` block (called `Instance` in the teacher's own AST).
#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl<T> {
    pub target: TypeName,
    pub trait_name: Option<TypeName>,
    pub functions: Vec<Function<T>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem<T> {
    Function(Function<T>),
    Struct(StructDecl),
    Trait(TraitDecl),
    Impl(ImplDecl<T>),
    Const {
        name: String,
        type_name: Option<TypeName>,
        value: Expr<T>,
        position: Span,
    },
    Comment(String),
}

pub type Module<T> = Vec<TopLevelItem<T>>;
