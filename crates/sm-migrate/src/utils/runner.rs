use crate::utils::{Finding, Inspection, LoopInspection, RewriteOutcome};
use serde::{Deserialize, Serialize};
use sm_core::ast::Tree;
use sm_core::diagnostics::{Diagnostic, DiagnosticManager};
use sm_core::error::Result;

/// Findings of one run over a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub inspection: String,
    pub findings: Vec<Finding>,
    /// Loops left unvisited because the run was canceled.
    pub canceled: bool,
}

impl InspectionReport {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.findings.iter().map(Finding::to_diagnostic).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives a [`LoopInspection`] over every foreach loop of a tree.
pub struct InspectionRunner {
    inspection: Box<dyn LoopInspection>,
    cancel: Option<Box<dyn Fn() -> bool>>,
    diagnostics: Option<DiagnosticManager>,
}

impl InspectionRunner {
    pub fn new(inspection: Box<dyn LoopInspection>) -> Self {
        Self {
            inspection,
            cancel: None,
            diagnostics: None,
        }
    }

    /// Checked between loops; returning `true` stops the run.
    pub fn with_cancel(mut self, cancel: impl Fn() -> bool + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Also report every finding to `manager`.
    pub fn with_diagnostics(mut self, manager: DiagnosticManager) -> Self {
        self.diagnostics = Some(manager);
        self
    }

    fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|cancel| cancel())
    }

    pub fn run(&self, tree: &Tree) -> Result<InspectionReport> {
        let mut report = InspectionReport {
            inspection: self.inspection.name().to_string(),
            ..InspectionReport::default()
        };
        for loop_stmt in tree.for_each_loops() {
            if self.is_canceled() {
                tracing::debug!("inspection run canceled before {}", loop_stmt);
                report.canceled = true;
                break;
            }
            match self.inspection.inspect(tree, loop_stmt)? {
                Inspection::Finding(finding) => {
                    if let Some(manager) = &self.diagnostics {
                        manager.add_diagnostic(finding.to_diagnostic());
                    }
                    report.findings.push(finding);
                }
                Inspection::NoIssue(reason) => {
                    tracing::trace!("{}: {}", loop_stmt, reason);
                }
            }
        }
        Ok(report)
    }

    /// Apply fixes until no finding is left. Every applied fix invalidates
    /// the other findings, so the tree is re-inspected after each one.
    pub fn run_and_apply(&self, tree: &mut Tree) -> Result<Vec<RewriteOutcome>> {
        let mut outcomes = Vec::new();
        loop {
            let report = self.run(tree)?;
            let Some(finding) = report.findings.into_iter().next() else {
                break;
            };
            outcomes.push(self.inspection.apply(tree, &finding)?);
            if report.canceled {
                break;
            }
        }
        sm_core::info!("{}: applied {} fixes", self.inspection.name(), outcomes.len());
        Ok(outcomes)
    }
}
