//! Access audit trail.
//!
//! One event per query on the `clearance::audit` target: `info` when it is
//! answered, `warn` when it is rejected or fails. The trail can be routed or
//! filtered independently:
//! `RUST_LOG=clearance::audit=info`.

use crate::access::Role;
use clearance_core::AppError;

pub const AUDIT_TARGET: &str = "clearance::audit";

/// Record who asked what and how much evidence they were shown.
pub fn record_query(
    principal: Option<&str>,
    role: &Role,
    query: &str,
    results: usize,
    confidence: f32,
) {
    tracing::info!(
        target: AUDIT_TARGET,
        principal = principal.unwrap_or("anonymous"),
        role = %role,
        query,
        results,
        confidence,
        "query answered"
    );
}

/// Record a query refused because the role is unknown.
pub fn record_rejected(principal: Option<&str>, role: &str, query: &str) {
    tracing::warn!(
        target: AUDIT_TARGET,
        principal = principal.unwrap_or("anonymous"),
        role,
        query,
        "query rejected: unknown role"
    );
}

/// Record a query from a known role that failed before an answer was produced.
pub fn record_failed(principal: Option<&str>, role: &Role, query: &str, error: &AppError) {
    tracing::warn!(
        target: AUDIT_TARGET,
        principal = principal.unwrap_or("anonymous"),
        role = %role,
        query,
        error = %error,
        "query failed"
    );
}
