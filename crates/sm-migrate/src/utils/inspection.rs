// LoopInspection trait - interface for loop inspections and their fixes

use crate::utils::IneligibleReason;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use sm_core::ast::{NodeId, Tree};
use sm_core::diagnostics::Diagnostic;
use sm_core::error::Result;
use sm_core::span::Span;

pub const INSPECTION_SHORT_NAME: &str = "Convert2streamapi";
pub const INSPECTION_DISPLAY_NAME: &str = "foreach loop can be collapsed with stream api";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    Accumulation,
    GeneralAction,
}

impl FindingKind {
    pub fn message(self) -> &'static str {
        match self {
            FindingKind::Accumulation => "Can be replaced with collect call",
            FindingKind::GeneralAction => "Can be replaced with foreach call",
        }
    }

    pub fn fix_name(self) -> &'static str {
        match self {
            FindingKind::Accumulation => "Replace with collect",
            FindingKind::GeneralAction => "Replace with forEach",
        }
    }
}

/// A loop that can be rewritten, tied to the tree revision it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// The iterated expression, where the problem is reported.
    pub anchor: NodeId,
    pub loop_stmt: NodeId,
    pub revision: u64,
    pub span: Span,
    pub message: String,
    pub fix_name: String,
}

impl Finding {
    pub fn new(kind: FindingKind, tree: &Tree, loop_stmt: NodeId, anchor: NodeId) -> Self {
        Self {
            kind,
            anchor,
            loop_stmt,
            revision: tree.revision(),
            span: tree.span(anchor),
            message: kind.message().to_string(),
            fix_name: kind.fix_name().to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(self.message.clone())
            .with_span(self.span)
            .with_code(INSPECTION_SHORT_NAME)
            .with_source_context(INSPECTION_DISPLAY_NAME)
            .with_suggestion(self.fix_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    NoIssue(IneligibleReason),
    Finding(Finding),
}

impl Inspection {
    pub fn finding(&self) -> Option<&Finding> {
        match self {
            Inspection::Finding(finding) => Some(finding),
            Inspection::NoIssue(_) => None,
        }
    }
}

/// What applying a fix did to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    /// The statement holding the pipeline: the replacement statement, or
    /// the declaration the loop was folded into.
    pub replacement: NodeId,
    pub folded: bool,
    /// The terminal function was re-emitted with a typed parameter.
    pub explicit_lambda: bool,
    pub revision: u64,
}

pub trait LoopInspection {
    fn name(&self) -> &str;

    /// Classify one loop statement without touching the tree.
    fn inspect(&self, tree: &Tree, loop_stmt: NodeId) -> Result<Inspection>;

    /// Apply the fix of a finding produced by [`Self::inspect`] on the same
    /// tree revision.
    fn apply(&self, tree: &mut Tree, finding: &Finding) -> Result<RewriteOutcome>;
}
