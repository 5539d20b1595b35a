//! Control-flow nodes (spec §4.5): the flat list a lowered function body
//! collapses into before [`super::analyze`] walks it. Grounded on
//! `original_source/include/ControlFlow.hpp`'s `ControlFlowKind`/
//! `ControlFlowNode`.

use crate::lower::LoweredStatement;
use crate::scope::SymbolId;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlowKind {
    Label,
    Jump,
    ConditionalJump,
    Return,
    Exit,
}

/// `label` is the jump/conditional-jump target or the label being declared;
/// `None` for `Return`/`Exit`, which carry no symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowNode {
    pub kind: ControlFlowKind,
    pub label: Option<SymbolId>,
    pub position: Span,
}

pub type ControlFlowGraph = Vec<ControlFlowNode>;

/// `CreateControlFlowNodes()` over a lowered function body. Every statement
/// kind contributes nodes independently, the same per-statement dispatch
/// the original compiler's `IStmtSema::CreateControlFlowNodes` uses —
/// `Group`/block-shaped statements just flatten their children's nodes in
/// order, everything else (`Var`, assignments, expression-statements,
/// `Copy`/`Drop` glue, `BlockEnd`, comments) contributes nothing.
pub fn build_graph(body: &[LoweredStatement]) -> ControlFlowGraph {
    let mut nodes = Vec::new();
    for stmt in body {
        collect_stmt(stmt, &mut nodes);
    }
    log::trace!("built control-flow graph with {} node(s)", nodes.len());
    nodes
}

fn collect_stmt(stmt: &LoweredStatement, nodes: &mut ControlFlowGraph) {
    match stmt {
        LoweredStatement::Label { label, position } => nodes.push(ControlFlowNode {
            kind: ControlFlowKind::Label,
            label: Some(*label),
            position: position.clone(),
        }),
        LoweredStatement::Jump { label, position } => nodes.push(ControlFlowNode {
            kind: ControlFlowKind::Jump,
            label: Some(*label),
            position: position.clone(),
        }),
        LoweredStatement::ConditionalJump { label, position, .. } => nodes.push(ControlFlowNode {
            kind: ControlFlowKind::ConditionalJump,
            label: Some(*label),
            position: position.clone(),
        }),
        LoweredStatement::Return { position, .. } => nodes.push(ControlFlowNode {
            kind: ControlFlowKind::Return,
            label: None,
            position: position.clone(),
        }),
        LoweredStatement::Exit { position } => nodes.push(ControlFlowNode {
            kind: ControlFlowKind::Exit,
            label: None,
            position: position.clone(),
        }),
        LoweredStatement::Group(stmts) => {
            for s in stmts {
                collect_stmt(s, nodes);
            }
        }
        LoweredStatement::Expression(_)
        | LoweredStatement::Var { .. }
        | LoweredStatement::SimpleAssignment { .. }
        | LoweredStatement::Copy { .. }
        | LoweredStatement::Drop { .. }
        | LoweredStatement::BlockEnd { .. }
        | LoweredStatement::Comment(_) => {}
    }
}
