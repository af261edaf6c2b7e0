// Control-flow summary - what a loop body does besides computing values

use crate::utils::{IneligibleReason, Verdict};
use sm_core::ast::{ExprKind, NodeId, StmtKind, Tree, VarId};
use sm_core::semantics::{AnalysisResult, ExitKind, Host};
use std::collections::{BTreeMap, BTreeSet};

/// Facts about one loop body, computed once and never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowSummary {
    pub exits: Vec<(NodeId, ExitKind)>,
    pub read_vars: BTreeSet<VarId>,
    pub written_vars: BTreeSet<VarId>,
    /// Captured variables only: the loop parameter and anything declared
    /// outside the body.
    pub effectively_final: BTreeMap<VarId, bool>,
    /// Checked exception classes that may leave the body, by name.
    pub escaping_checked: BTreeSet<String>,
    /// Calls whose target the host could not resolve.
    pub unresolved_calls: Vec<NodeId>,
}

impl ControlFlowSummary {
    pub fn summarize(host: &dyn Host, tree: &Tree, body: NodeId) -> AnalysisResult<Self> {
        let exits = host.exit_points(tree, body)?;
        let read_vars = host.used_variables(tree, body)?;
        let written_vars = host.written_variables(tree, body)?;

        let mut effectively_final = BTreeMap::new();
        for var in &read_vars {
            let declared_inside = tree
                .declaration_of(*var)
                .is_some_and(|decl| tree.is_ancestor(body, decl, false));
            if !declared_inside {
                effectively_final.insert(*var, host.is_effectively_final(tree, *var, body)?);
            }
        }

        let mut escaping_checked = BTreeSet::new();
        let mut unresolved_calls = Vec::new();
        for id in tree.descendants_outside_closures(body) {
            if !tree.expr(id).is_some_and(ExprKind::is_call_like) {
                continue;
            }
            let Some(sig) = host.resolve_method(tree, id) else {
                unresolved_calls.push(id);
                continue;
            };
            for thrown in &sig.throws {
                if !host.is_unchecked_exception(&thrown.name)
                    && !is_caught_within(host, tree, id, body, &thrown.name)
                {
                    escaping_checked.insert(thrown.name.clone());
                }
            }
        }

        Ok(Self {
            exits,
            read_vars,
            written_vars,
            effectively_final,
            escaping_checked,
            unresolved_calls,
        })
    }

    /// Whether a function literal may stand in for the body.
    pub fn verdict(&self, tree: &Tree) -> Verdict {
        if let Some((_, kind)) = self.exits.first() {
            return Verdict::Unsafe(IneligibleReason::AbnormalExit(*kind));
        }
        if let Some((var, _)) = self.effectively_final.iter().find(|(_, is_final)| !**is_final) {
            return Verdict::Unsafe(IneligibleReason::NonFinalCapture(tree.var(*var).name.clone()));
        }
        if let Some(class) = self.escaping_checked.iter().next() {
            return Verdict::Unsafe(IneligibleReason::CheckedException(class.clone()));
        }
        if let Some(call) = self.unresolved_calls.first() {
            return Verdict::Unknown(IneligibleReason::UnresolvedCall(tree.text(*call)));
        }
        Verdict::Safe
    }
}

/// A `try` between `site` and `body` whose protected block holds `site` and
/// which catches `class` or a supertype of it.
fn is_caught_within(host: &dyn Host, tree: &Tree, site: NodeId, body: NodeId, class: &str) -> bool {
    let mut child = site;
    let mut current = tree.parent(site);
    while let Some(id) = current {
        if let Some(StmtKind::Try(stmt_try)) = tree.stmt(id) {
            let catches = stmt_try.body == child
                && stmt_try
                    .catches
                    .iter()
                    .flat_map(|catch| catch.types.iter())
                    .any(|caught| host.is_subtype(class, &caught.name));
            if catches {
                return true;
            }
        }
        if id == body {
            return false;
        }
        child = id;
        current = tree.parent(id);
    }
    false
}
