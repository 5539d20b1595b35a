//! `EndReachableWithoutReturn` (spec §4.5), grounded on
//! `original_source/src/Diagnoses/InvalidControlFlowDiagnosis.cpp`'s
//! `IsEndReachableWithoutRet`.

use std::fmt;

use crate::diagnostics::{Diagnosed, Diagnostic, DiagnosticBag, DiagnosticGroup};
use crate::span::Span;

use super::node::{ControlFlowGraph, ControlFlowKind};

#[derive(Debug, Clone, PartialEq)]
pub struct NotAllControlPathsReturn {
    pub position: Span,
}

impl fmt::Display for NotAllControlPathsReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not all control paths return an expression")
    }
}

impl std::error::Error for NotAllControlPathsReturn {}

impl NotAllControlPathsReturn {
    pub fn to_diagnostic_group(&self) -> DiagnosticGroup {
        DiagnosticGroup::single(Diagnostic::error(self.position.clone(), self.to_string()))
    }
}

fn find_label_node(graph: &ControlFlowGraph, label: crate::scope::SymbolId) -> usize {
    graph
        .iter()
        .position(|node| node.kind == ControlFlowKind::Label && node.label == Some(label))
        .expect("a jump always targets a label the binder already resolved")
}

/// Walks `graph` from `from`, returning whether some path reaches the end of
/// the node list without passing through a `Return`/`Exit`. `ends` holds
/// jump-node positions already explored on this path, so a cycle (a loop
/// with no reachable return) terminates the recursion instead of looping
/// forever.
fn end_reachable_without_return(graph: &ControlFlowGraph, from: usize, ends: &[usize]) -> bool {
    let mut pos = from;
    while pos < graph.len() {
        if ends.contains(&pos) {
            return false;
        }

        let node = &graph[pos];
        match node.kind {
            ControlFlowKind::Label => {
                pos += 1;
                continue;
            }
            ControlFlowKind::Jump => {
                let target = find_label_node(graph, node.label.expect("jump node always carries a label"));
                let mut new_ends = ends.to_vec();
                new_ends.push(pos);
                return end_reachable_without_return(graph, target, &new_ends);
            }
            ControlFlowKind::ConditionalJump => {
                let target = find_label_node(graph, node.label.expect("conditional jump always carries a label"));
                let mut when_true_ends = ends.to_vec();
                when_true_ends.push(pos);
                let when_true = end_reachable_without_return(graph, target, &when_true_ends);
                let when_false = end_reachable_without_return(graph, pos + 1, ends);
                return when_true || when_false;
            }
            ControlFlowKind::Return | ControlFlowKind::Exit => return false,
        }
    }

    true
}

/// Validates that `graph` (a non-void function's control-flow graph) returns
/// on every path. Void functions are allowed to fall off the end implicitly
/// and never call this.
pub fn diagnose_invalid_control_flow(position: Span, graph: &ControlFlowGraph) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    if end_reachable_without_return(graph, 0, &[]) {
        bag.push(NotAllControlPathsReturn { position }.to_diagnostic_group());
    }
    Diagnosed::new((), bag)
}
