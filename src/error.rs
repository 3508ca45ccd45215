use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// The session was requested outside of a provisioning scope. This is a
    /// wiring bug in the consuming application, not a runtime condition to
    /// recover from.
    #[error("session requested before a SessionStore was installed on the provider")]
    NotProvisioned,
}
