use derive_more::Display;
use serde::{Deserialize, Serialize};
use sm_core::error::AnalysisError;
use sm_core::semantics::ExitKind;

/// Why a loop, or one way of rewriting it, was turned down.
#[derive(Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibleReason {
    #[display("statement is not a foreach loop")]
    NotForEach,
    #[display("language level below 8")]
    LanguageLevel,
    #[display("loop has no iterated value or body")]
    IncompleteLoop,
    #[display("iterated value is not a collection")]
    NotACollection,
    #[display("body contains a {_0} leaving the loop")]
    AbnormalExit(ExitKind),
    #[display("`{_0}` is not effectively final")]
    NonFinalCapture(String),
    #[display("checked exception {_0} may escape")]
    CheckedException(String),
    #[display("call `{_0}` could not be resolved")]
    UnresolvedCall(String),
    #[display("action is not a single-argument add call")]
    NotAnAppendCall,
    #[display("accumulation target cannot be identified")]
    UnresolvedTarget,
    #[display("accumulation target is not a collection")]
    TargetNotCollection,
    #[display("accumulated value comes from a generic method")]
    GenericValueCall,
    #[display("a guard condition observes the accumulation target")]
    GuardHazard,
    #[display("body is already a single method reference call")]
    TrivialBody,
    #[display("analysis canceled")]
    AnalysisCanceled,
    #[display("analysis timed out")]
    AnalysisTimeout,
}

impl From<AnalysisError> for IneligibleReason {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Canceled => IneligibleReason::AnalysisCanceled,
            AnalysisError::Timeout => IneligibleReason::AnalysisTimeout,
        }
    }
}

/// Outcome of one eligibility check. `Unknown` is never read as safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Unsafe(IneligibleReason),
    Unknown(IneligibleReason),
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }

    /// Run `next` only when this check passed.
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Safe => next(),
            other => other,
        }
    }

    /// Collapse to a pass/fail answer, treating `Unknown` as a failure.
    pub fn into_result(self) -> Result<(), IneligibleReason> {
        match self {
            Verdict::Safe => Ok(()),
            Verdict::Unsafe(reason) | Verdict::Unknown(reason) => Err(reason),
        }
    }
}
