//! Expression nodes, generic over the annotation carried at each stage
//! (spec §3.4): `Expr<()>` for bare syntax, `Expr<Bound>` after C2,
//! `Expr<Checked>` after C3. Mirrors the teacher's `Expression<T>` pattern
//! of a single enum reused across stages rather than three parallel
//! hierarchies.

use crate::scope::{NameSection, QualifiedName};
use crate::span::{GetPosition, Span};

use super::type_name::TypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit<T> {
    pub name: String,
    /// `None` for struct-construction shorthand (`Vector2 { x, y }`), where
    /// the value is bound as a local-scope symbol literal named after the
    /// field (spec §4.2).
    pub value: Option<Expr<T>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<T> {
    IntLiteral {
        value: i64,
        info: T,
        position: Span,
    },
    FloatLiteral {
        value: f64,
        info: T,
        position: Span,
    },
    BoolLiteral {
        value: bool,
        info: T,
        position: Span,
    },
    CharLiteral {
        value: char,
        info: T,
        position: Span,
    },
    StringLiteral {
        value: String,
        info: T,
        position: Span,
    },
    /// A bare identifier (possibly qualified). Binds to a variable symbol
    /// (spec §4.2 "Symbol literal").
    SymbolLiteral {
        name: QualifiedName,
        info: T,
        position: Span,
    },
    FieldAccess {
        receiver: Box<Expr<T>>,
        field: NameSection,
        info: T,
        position: Span,
    },
    StaticCall {
        callee: QualifiedName,
        args: Vec<Expr<T>>,
        info: T,
        position: Span,
    },
    InstanceCall {
        receiver: Box<Expr<T>>,
        method: NameSection,
        args: Vec<Expr<T>>,
        info: T,
        position: Span,
    },
    UserUnary {
        op: UnaryOp,
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    UserBinary {
        op: BinaryOp,
        lhs: Box<Expr<T>>,
        rhs: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    And {
        lhs: Box<Expr<T>>,
        rhs: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    Or {
        lhs: Box<Expr<T>>,
        rhs: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    LogicalNegation {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    /// Explicit `&e` in source.
    AddressOf {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    Dereference {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    /// Checked reinterpret to an explicit target type.
    DerefAs {
        operand: Box<Expr<T>>,
        target: TypeName,
        info: T,
        position: Span,
    },
    Cast {
        operand: Box<Expr<T>>,
        target: TypeName,
        info: T,
        position: Span,
    },
    SizeOf {
        target: TypeName,
        info: T,
        position: Span,
    },
    StructInitialisation {
        name: TypeName,
        fields: Vec<FieldInit<T>>,
        info: T,
        position: Span,
    },
    Boxed {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    Lock {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    Unbox {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    Array {
        elements: Vec<Expr<T>>,
        info: T,
        position: Span,
    },
    Tuple {
        elements: Vec<Expr<T>>,
        info: T,
        position: Span,
    },
    /// Implicit auto-ref inserted by C3 (distinct from the surface
    /// `AddressOf`).
    ReferenceOf {
        operand: Box<Expr<T>>,
        info: T,
        position: Span,
    },
    /// A user-defined conversion operator invocation, inserted by C3 when
    /// bridging `S -> T` needs more than reference (un)wrapping.
    ConversionCall {
        operand: Box<Expr<T>>,
        operator: QualifiedName,
        info: T,
        position: Span,
    },
}

impl<T: Clone> Expr<T> {
    pub fn info(&self) -> &T {
        match self {
            Expr::IntLiteral { info, .. }
            | Expr::FloatLiteral { info, .. }
            | Expr::BoolLiteral { info, .. }
            | Expr::CharLiteral { info, .. }
            | Expr::StringLiteral { info, .. }
            | Expr::SymbolLiteral { info, .. }
            | Expr::FieldAccess { info, .. }
            | Expr::StaticCall { info, .. }
            | Expr::InstanceCall { info, .. }
            | Expr::UserUnary { info, .. }
            | Expr::UserBinary { info, .. }
            | Expr::And { info, .. }
            | Expr::Or { info, .. }
            | Expr::LogicalNegation { info, .. }
            | Expr::AddressOf { info, .. }
            | Expr::Dereference { info, .. }
            | Expr::DerefAs { info, .. }
            | Expr::Cast { info, .. }
            | Expr::SizeOf { info, .. }
            | Expr::StructInitialisation { info, .. }
            | Expr::Boxed { info, .. }
            | Expr::Lock { info, .. }
            | Expr::Unbox { info, .. }
            | Expr::Array { info, .. }
            | Expr::Tuple { info, .. }
            | Expr::ReferenceOf { info, .. }
            | Expr::ConversionCall { info, .. } => info,
        }
    }
}

impl<T> GetPosition for Expr<T> {
    fn position(&self) -> Span {
        match self {
            Expr::IntLiteral { position, .. }
            | Expr::FloatLiteral { position, .. }
            | Expr::BoolLiteral { position, .. }
            | Expr::CharLiteral { position, .. }
            | Expr::StringLiteral { position, .. }
            | Expr::SymbolLiteral { position, .. }
            | Expr::FieldAccess { position, .. }
            | Expr::StaticCall { position, .. }
            | Expr::InstanceCall { position, .. }
            | Expr::UserUnary { position, .. }
            | Expr::UserBinary { position, .. }
            | Expr::And { position, .. }
            | Expr::Or { position, .. }
            | Expr::LogicalNegation { position, .. }
            | Expr::AddressOf { position, .. }
            | Expr::Dereference { position, .. }
            | Expr::DerefAs { position, .. }
            | Expr::Cast { position, .. }
            | Expr::SizeOf { position, .. }
            | Expr::StructInitialisation { position, .. }
            | Expr::Boxed { position, .. }
            | Expr::Lock { position, .. }
            | Expr::Unbox { position, .. }
            | Expr::Array { position, .. }
            | Expr::Tuple { position, .. }
            | Expr::ReferenceOf { position, .. }
            | Expr::ConversionCall { position, .. } => position.clone(),
        }
    }
}
