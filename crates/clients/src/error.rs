use thiserror::Error;

/// Errors raised by collaborator service clients.
///
/// A failed stock adjustment means "assume nothing was adjusted" — the
/// collaborators signal no partial success.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure reaching the collaborator.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered with a non-success status.
    #[error("unexpected status {status} from {service} service")]
    UnexpectedStatus { service: &'static str, status: u16 },

    /// The product is unknown to the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The collaborator rejected the request (e.g. insufficient stock).
    #[error("{0}")]
    Rejected(String),
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, ClientError>;
