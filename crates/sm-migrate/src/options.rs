use serde::{Deserialize, Serialize};
use sm_core::config;
use sm_core::semantics::FlowAnalysis;

/// How collector factories are spelled in emitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectorStyle {
    /// `Collectors.toList()`
    #[default]
    Qualified,
    /// `toList()`, relying on a static import.
    StaticImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Reduce forwarding function literals to method references.
    pub prefer_method_refs: bool,
    pub collector_style: CollectorStyle,
    /// Node visits allowed per flow query; `None` is unlimited.
    pub analysis_budget: Option<usize>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            prefer_method_refs: true,
            collector_style: CollectorStyle::Qualified,
            analysis_budget: None,
        }
    }
}

impl MigrationOptions {
    /// Options taken from the `STREAM_MIGRATE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            prefer_method_refs: !config::method_refs_disabled(),
            collector_style: if config::static_collectors() {
                CollectorStyle::StaticImport
            } else {
                CollectorStyle::Qualified
            },
            analysis_budget: config::analysis_budget(),
        }
    }

    /// A flow analysis honouring [`Self::analysis_budget`].
    pub fn flow_analysis(&self) -> FlowAnalysis {
        match self.analysis_budget {
            Some(budget) => FlowAnalysis::new().with_budget(budget),
            None => FlowAnalysis::new(),
        }
    }
}
