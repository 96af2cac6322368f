use ledger_tools::LedgerApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Could not access the credential store. {0}")]
    Storage(String),
    #[error("The credential bundle is malformed. {0}")]
    Malformed(String),
    #[error(
        "Credential version conflict: expected {expected}, found {actual}. Another run has rotated the refresh \
         token in the meantime."
    )]
    VersionConflict { expected: u64, actual: u64 },
}

#[derive(Debug, Error)]
pub enum RowSourceError {
    #[error("Could not read the export. {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed export data. {0}")]
    Malformed(String),
}

impl From<csv::Error> for RowSourceError {
    fn from(e: csv::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("The ledger API rejected the metadata query. {0}")]
    Api(#[from] LedgerApiError),
    #[error("No {kind} named '{name}' exists in this ledger account. Posting with a guessed id is not allowed.")]
    NameNotFound { kind: &'static str, name: String },
}

/// Fatal, run-level failures. Everything here aborts the run before (or instead of) any further ledger mutation;
/// per-order posting failures are *not* errors of this type, they are recorded in the run summary instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not load credentials. {0}")]
    CredentialLoad(CredentialStoreError),
    #[error("Token refresh failed. {0}")]
    TokenRefresh(LedgerApiError),
    #[error("The rotated refresh token could not be persisted. {0}")]
    TokenPersist(CredentialStoreError),
    #[error("Could not resolve ledger metadata. {0}")]
    Metadata(#[from] MetadataError),
    #[error("Could not read the export rows. {0}")]
    RowSource(#[from] RowSourceError),
}
