//! The pipeline's I/O seams.
//!
//! Each external collaborator is defined by a trait so that the pipeline logic stays testable and the adapters stay
//! swappable:
//! * [`RowSource`] yields the raw export rows.
//! * [`CredentialStore`] holds the OAuth credential bundle, with versioned writes.
//! * [`LedgerClient`] is the bookkeeping API surface the pipeline actually touches.
mod credential_store;
mod ledger_client;
mod row_source;

pub use credential_store::CredentialStore;
pub use ledger_client::LedgerClient;
pub use row_source::RowSource;
