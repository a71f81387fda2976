//! Registry client error types.

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from registry operations.
///
/// Each variant names the operation and, where there is one, the wallet or
/// hash it targeted. Underlying causes are reachable through `source()`.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No usable session token. The request never reached the network.
    #[error("{operation}: not signed in")]
    AuthMissing {
        operation: &'static str,
        source: BoxError,
    },
    /// The local wallet address could not be resolved.
    #[error("{operation}: cannot resolve local wallet")]
    Wallet {
        operation: &'static str,
        source: BoxError,
    },
    /// The metahash could not be derived from the content hash.
    #[error("{operation} {target}: unable to hash asset")]
    Hash {
        operation: &'static str,
        target: String,
        source: BoxError,
    },
    /// Connection, TLS or timeout failure.
    #[error("{operation} {target}: request could not be sent")]
    Transport {
        operation: &'static str,
        target: String,
        source: reqwest::Error,
    },
    /// The registry answered with an unexpected status.
    #[error("{operation} {target}: request failed: {message} ({status})")]
    Rejected {
        operation: &'static str,
        target: String,
        message: String,
        status: i64,
        http_status: u16,
    },
    /// A success response whose body did not decode.
    #[error("{operation} {target}: malformed response")]
    Decode {
        operation: &'static str,
        target: String,
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

impl RegistryError {
    pub fn is_auth_missing(&self) -> bool {
        matches!(self, RegistryError::AuthMissing { .. })
    }
}
