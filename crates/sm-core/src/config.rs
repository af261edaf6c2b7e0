use std::sync::OnceLock;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

fn bool_from_env(key: &str) -> bool {
    env_true(key).unwrap_or(false)
}

fn usize_from_env(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// Method references are never synthesized; function literals are always used.
pub fn method_refs_disabled() -> bool {
    static NO_REFS: OnceLock<bool> = OnceLock::new();
    *NO_REFS.get_or_init(|| bool_from_env("STREAM_MIGRATE_NO_METHOD_REFS"))
}

/// Collectors are spelled as statically imported calls (`toList()`).
pub fn static_collectors() -> bool {
    static STATIC: OnceLock<bool> = OnceLock::new();
    *STATIC.get_or_init(|| bool_from_env("STREAM_MIGRATE_STATIC_COLLECTORS"))
}

/// Upper bound on nodes visited by a single flow analysis, if configured.
pub fn analysis_budget() -> Option<usize> {
    static BUDGET: OnceLock<Option<usize>> = OnceLock::new();
    *BUDGET.get_or_init(|| usize_from_env("STREAM_MIGRATE_ANALYSIS_BUDGET"))
}
