//! Structured log events for key pipeline operations.

/// Log a degradation (recoverable fallback) event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log a validator outcome.
pub fn validator_finished(check_name: &str, status: &str, findings: usize, duration_ms: u64) {
    tracing::info!(
        event = "validator_finished",
        check_name = %check_name,
        status = %status,
        findings = findings,
        duration_ms = duration_ms,
        "validator finished"
    );
}

/// Log the end of a run.
pub fn run_finished(run_id: &str, terminal_status: &str, citations: usize) {
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        terminal_status = %terminal_status,
        citations = citations,
        "run finished"
    );
}
