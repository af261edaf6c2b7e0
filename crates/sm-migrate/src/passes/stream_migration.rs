use crate::passes::{emit, synthesize};
use crate::queries::*;
use crate::utils::*;
use crate::MigrationOptions;
use sm_core::ast::{NodeId, StmtKind, Tree, VarId};
use sm_core::error::{Error, Result};
use sm_core::semantics::Host;
use std::sync::Arc;

/// Everything known about a loop that passed every eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopCandidate {
    pub loop_stmt: NodeId,
    pub source: NodeId,
    pub param: VarId,
    pub body: NodeId,
    pub chain: GuardChain,
    pub action: ActionClassification,
}

impl LoopCandidate {
    pub fn kind(&self) -> FindingKind {
        if self.action.is_accumulation() {
            FindingKind::Accumulation
        } else {
            FindingKind::GeneralAction
        }
    }
}

/// Rewrites foreach loops over collections into stream pipelines.
pub struct StreamMigrationPass {
    host: Arc<dyn Host>,
    options: MigrationOptions,
}

impl StreamMigrationPass {
    pub fn new(host: Arc<dyn Host>, options: MigrationOptions) -> Self {
        Self { host, options }
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Run every eligibility check on `loop_stmt`, in order.
    pub fn candidate(
        &self,
        tree: &Tree,
        loop_stmt: NodeId,
    ) -> std::result::Result<LoopCandidate, IneligibleReason> {
        let host = self.host.as_ref();
        let for_each = tree
            .stmt(loop_stmt)
            .and_then(StmtKind::as_for_each)
            .ok_or(IneligibleReason::NotForEach)?;
        if tree.context().language_level < 8 {
            return Err(IneligibleReason::LanguageLevel);
        }
        let (Some(source), Some(body)) = (for_each.iterated, for_each.body) else {
            return Err(IneligibleReason::IncompleteLoop);
        };
        let is_collection = host
            .type_of(tree, source)
            .is_some_and(|ty| host.is_subtype(&ty.name, "Collection"));
        if !is_collection {
            return Err(IneligibleReason::NotACollection);
        }

        let summary = ControlFlowSummary::summarize(host, tree, body)?;
        summary.verdict(tree).into_result()?;

        let chain = GuardChain::extract(tree, body);
        let action = ActionClassification::classify(host, tree, &chain);
        if chain.is_empty() && !action.is_accumulation() {
            let reducible = action_expression(tree, chain.action)
                .and_then(|expr| reduce_to_method_ref(host, tree, expr, for_each.var))
                .is_some();
            if reducible {
                return Err(IneligibleReason::TrivialBody);
            }
        }

        Ok(LoopCandidate {
            loop_stmt,
            source,
            param: for_each.var,
            body,
            chain,
            action,
        })
    }
}

impl LoopInspection for StreamMigrationPass {
    fn name(&self) -> &str {
        INSPECTION_SHORT_NAME
    }

    fn inspect(&self, tree: &Tree, loop_stmt: NodeId) -> Result<Inspection> {
        match self.candidate(tree, loop_stmt) {
            Ok(candidate) => {
                let finding = Finding::new(candidate.kind(), tree, loop_stmt, candidate.source);
                tracing::debug!("{}: {}", loop_stmt, finding.message);
                Ok(Inspection::Finding(finding))
            }
            Err(reason) => {
                tracing::trace!("{} skipped: {}", loop_stmt, reason);
                Ok(Inspection::NoIssue(reason))
            }
        }
    }

    fn apply(&self, tree: &mut Tree, finding: &Finding) -> Result<RewriteOutcome> {
        if finding.revision != tree.revision() {
            tracing::warn!("discarding stale finding for {}", finding.loop_stmt);
            return Err(Error::StaleFinding {
                expected: finding.revision,
                actual: tree.revision(),
            });
        }
        let candidate = self.candidate(tree, finding.loop_stmt).map_err(|reason| {
            crate::error::synthesis_error(format!(
                "{} is no longer eligible: {}",
                finding.loop_stmt, reason
            ))
        })?;
        if candidate.kind() != finding.kind {
            crate::synth_bail!(format!(
                "{} was reported as {} but classifies as {}",
                finding.loop_stmt,
                finding.kind,
                candidate.kind()
            ));
        }
        let plan = synthesize(self.host.as_ref(), tree, &candidate, &self.options)?;
        emit(self.host.as_ref(), tree, &plan, &self.options)
    }
}
