//! Content-derived instance identity.
//!
//! The same block id can be registered with different field sets or themes;
//! the instance id tells those configurations apart and namespaces each
//! one's submitted form data. Callables never reach the hash — they
//! serialize as empty strings (see `callback`) or are skipped outright.

use tracing::warn;

use crate::types::BlockSpec;

/// Length of the instance token. Seven hex chars are plenty for a handful of
/// block configurations per process and keep form names short.
const INSTANCE_ID_LEN: usize = 7;

/// Compute the stable instance id for a block spec.
///
/// Hashes the canonical JSON of the spec's structural parts with md5 and
/// keeps the first seven hex characters. Deterministic across processes:
/// field and option maps serialize in insertion order.
pub fn instance_id(spec: &BlockSpec) -> String {
    let canonical = match serde_json::to_string(spec) {
        Ok(json) => json,
        Err(err) => {
            // Spec types serialize infallibly in practice; degrade to the
            // block id rather than abort registration.
            warn!(block = %spec.id, %err, "failed to canonicalize block spec");
            spec.id.clone()
        }
    };
    let digest = md5::compute(canonical.as_bytes());
    let hex = format!("{digest:x}");
    hex[..INSTANCE_ID_LEN].to_string()
}
