use crate::errors::AuditError;
use crate::models::AuditRecord;

/// Append-only destination for audit records.
pub trait IAuditSink: Send + Sync {
    /// Durably append one record. A record is either fully visible to
    /// readers afterwards or not at all.
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}
