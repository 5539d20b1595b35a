//! The restricted tree C4 rewrites a checked function body into (spec
//! §3.4, §4.4): a flat statement family with no `if`/`while`/compound
//! assignment/`and`/`or`/box/lock/unbox/cast/user-operator forms left, and
//! an expression family with no box/lock/unbox/cast/user-operator forms
//! left either. Everything here still carries a concrete
//! [`CheckedInfo`] — lowering rewrites shape, not typing.

use crate::scope::{NameSection, SymbolId, Type};
use crate::span::Span;
use crate::syntax::{BinaryOp, UnaryOp};
use crate::typecheck::CheckedInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum LoweredExpr {
    IntLiteral {
        value: i64,
        info: CheckedInfo,
        position: Span,
    },
    FloatLiteral {
        value: f64,
        info: CheckedInfo,
        position: Span,
    },
    BoolLiteral {
        value: bool,
        info: CheckedInfo,
        position: Span,
    },
    CharLiteral {
        value: char,
        info: CheckedInfo,
        position: Span,
    },
    StringLiteral {
        value: String,
        info: CheckedInfo,
        position: Span,
    },
    /// A resolved variable reference; `info.symbol` is always `Some` by
    /// this stage.
    SymbolLiteral {
        info: CheckedInfo,
        position: Span,
    },
    FieldAccess {
        receiver: Box<LoweredExpr>,
        field: NameSection,
        info: CheckedInfo,
        position: Span,
    },
    /// Call to a resolved function/operator/conversion symbol
    /// (`info.symbol`). Struct-operand `UserUnary`/`UserBinary` desugar
    /// here.
    StaticCall {
        args: Vec<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    InstanceCall {
        receiver: Box<LoweredExpr>,
        method: NameSection,
        args: Vec<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    /// Built-in (non-overloaded) unary op on a primitive operand —
    /// `UserUnary` desugars here when no operator symbol backs it.
    PrimitiveUnary {
        op: UnaryOp,
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    /// Built-in (non-overloaded) binary op on primitive operands,
    /// including comparisons — the `UserBinary` counterpart of
    /// [`LoweredExpr::PrimitiveUnary`].
    PrimitiveBinary {
        op: BinaryOp,
        lhs: Box<LoweredExpr>,
        rhs: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    LogicalNegation {
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    AddressOf {
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    ReferenceOf {
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    /// Canonical checked reinterpret: both the bare `Dereference` and the
    /// explicit-target `DerefAs` surface forms land here.
    DerefAs {
        operand: Box<LoweredExpr>,
        target: Type,
        info: CheckedInfo,
        position: Span,
    },
    SizeOf {
        target: Type,
        info: CheckedInfo,
        position: Span,
    },
    StructInitialisation {
        fields: Vec<(String, LoweredExpr)>,
        info: CheckedInfo,
        position: Span,
    },
    Array {
        elements: Vec<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    Tuple {
        elements: Vec<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    /// A user conversion-operator invocation; not excluded by the §3.4
    /// invariant list, so it survives lowering as its own node rather
    /// than folding into `StaticCall`.
    ConversionCall {
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
    /// What `Boxed`/`Lock`/`Unbox` desugar to (spec §4.4). These are
    /// intrinsic pointer operations with no backing function symbol in
    /// this crate's table, unlike a genuine operator overload, so they
    /// keep a dedicated lowered node instead of being forced into a
    /// `StaticCall` with nothing to call.
    PointerIntrinsic {
        kind: PointerIntrinsicKind,
        operand: Box<LoweredExpr>,
        info: CheckedInfo,
        position: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerIntrinsicKind {
    StrongNew,
    StrongValue,
    WeakLock,
}

impl LoweredExpr {
    pub fn info(&self) -> &CheckedInfo {
        match self {
            LoweredExpr::IntLiteral { info, .. }
            | LoweredExpr::FloatLiteral { info, .. }
            | LoweredExpr::BoolLiteral { info, .. }
            | LoweredExpr::CharLiteral { info, .. }
            | LoweredExpr::StringLiteral { info, .. }
            | LoweredExpr::SymbolLiteral { info, .. }
            | LoweredExpr::FieldAccess { info, .. }
            | LoweredExpr::StaticCall { info, .. }
            | LoweredExpr::InstanceCall { info, .. }
            | LoweredExpr::PrimitiveUnary { info, .. }
            | LoweredExpr::PrimitiveBinary { info, .. }
            | LoweredExpr::LogicalNegation { info, .. }
            | LoweredExpr::AddressOf { info, .. }
            | LoweredExpr::ReferenceOf { info, .. }
            | LoweredExpr::DerefAs { info, .. }
            | LoweredExpr::SizeOf { info, .. }
            | LoweredExpr::StructInitialisation { info, .. }
            | LoweredExpr::Array { info, .. }
            | LoweredExpr::Tuple { info, .. }
            | LoweredExpr::ConversionCall { info, .. }
            | LoweredExpr::PointerIntrinsic { info, .. } => info,
        }
    }

    pub fn position(&self) -> Span {
        match self {
            LoweredExpr::IntLiteral { position, .. }
            | LoweredExpr::FloatLiteral { position, .. }
            | LoweredExpr::BoolLiteral { position, .. }
            | LoweredExpr::CharLiteral { position, .. }
            | LoweredExpr::StringLiteral { position, .. }
            | LoweredExpr::SymbolLiteral { position, .. }
            | LoweredExpr::FieldAccess { position, .. }
            | LoweredExpr::StaticCall { position, .. }
            | LoweredExpr::InstanceCall { position, .. }
            | LoweredExpr::PrimitiveUnary { position, .. }
            | LoweredExpr::PrimitiveBinary { position, .. }
            | LoweredExpr::LogicalNegation { position, .. }
            | LoweredExpr::AddressOf { position, .. }
            | LoweredExpr::ReferenceOf { position, .. }
            | LoweredExpr::DerefAs { position, .. }
            | LoweredExpr::SizeOf { position, .. }
            | LoweredExpr::StructInitialisation { position, .. }
            | LoweredExpr::Array { position, .. }
            | LoweredExpr::Tuple { position, .. }
            | LoweredExpr::ConversionCall { position, .. }
            | LoweredExpr::PointerIntrinsic { position, .. } => position.clone(),
        }
    }
}

/// The restricted lowered statement family (spec §4.4): block-end markers,
/// labels, conditional/normal jumps, returns, exits, expression-statements,
/// var-statements, simple assignments, copy/drop glue — plus `Group`, a
/// lowering-only flattening construct with no scope boundary of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum LoweredStatement {
    Expression(LoweredExpr),
    /// A local variable or (already-desugared) local constant. `mutable`
    /// is `false` for what began life as a `Stmt::Const` — there is no
    /// separate lowered const-statement kind, per §4.4's restricted list.
    Var {
        name: String,
        mutable: bool,
        symbol: Option<SymbolId>,
        value: LoweredExpr,
        position: Span,
    },
    SimpleAssignment {
        target: LoweredExpr,
        value: LoweredExpr,
        position: Span,
    },
    /// Explicit copy-glue invocation for a value type crossing an
    /// assignment or block exit (§4.6 "Copy/drop glue as explicit lowered
    /// statements").
    Copy {
        dst: LoweredExpr,
        src: LoweredExpr,
        ty: Type,
        position: Span,
    },
    /// Explicit drop-glue invocation for temporaries or locals going out
    /// of scope.
    Drop {
        tmps: Vec<SymbolId>,
        position: Span,
    },
    Label {
        label: SymbolId,
        position: Span,
    },
    /// Unconditional jump (`goto`).
    Jump {
        label: SymbolId,
        position: Span,
    },
    /// `gotoif condition label` — jumps when `condition` evaluates true,
    /// falls through otherwise.
    ConditionalJump {
        condition: LoweredExpr,
        label: SymbolId,
        position: Span,
    },
    Return {
        value: Option<LoweredExpr>,
        position: Span,
    },
    /// Abnormal program termination — what `assert` lowers its failure
    /// branch to.
    Exit {
        position: Span,
    },
    /// Marks the end of a lexical block; the emitter runs drop glue for
    /// `locals` — exactly the symbols this block declared directly via a
    /// `Var` statement — here (§4.4, §6).
    BlockEnd {
        locals: Vec<SymbolId>,
        position: Span,
    },
    /// Lowering-only: flattens to its children. Exists so a single
    /// compound desugaring (e.g. compound assignment, `and`/`or`) can
    /// inject several statements where the source had one, without a
    /// scope boundary of its own.
    Group(Vec<LoweredStatement>),
    Comment(String),
}

pub type LoweredBody = Vec<LoweredStatement>;

#[derive(Debug, Clone, PartialEq)]
pub struct LoweredFunction {
    pub name: String,
    pub params: Vec<crate::syntax::FunctionParam>,
    pub return_type: Option<crate::syntax::TypeName>,
    pub body: LoweredBody,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoweredImpl {
    pub target: crate::syntax::TypeName,
    pub trait_name: Option<crate::syntax::TypeName>,
    pub functions: Vec<LoweredFunction>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoweredTopLevelItem {
    Function(LoweredFunction),
    Struct(crate::syntax::StructDecl),
    Trait(crate::syntax::TraitDecl),
    Impl(LoweredImpl),
    Const {
        name: String,
        value: LoweredExpr,
        position: Span,
    },
    Comment(String),
}

pub type LoweredModule = Vec<LoweredTopLevelItem>;
