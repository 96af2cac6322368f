//! Order Reconciliation & Ledger Posting Engine
//!
//! This library turns a line-item-granular e-commerce order export into double-entry ledger entries, posted to an
//! external bookkeeping API. The export has one row per product line, not per order, so the heart of the engine is
//! the [`aggregator`]: a pure, single-pass grouping of raw rows into per-order aggregates, followed by validation.
//!
//! Around that core sit the I/O seams, each defined as a trait in [`traits`]:
//! 1. [`traits::RowSource`] supplies the raw export rows (a CSV file adapter lives in [`sources`]).
//! 2. [`traits::CredentialStore`] holds the OAuth credential bundle. The ledger provider rotates refresh tokens on
//!    every use, so the store write is a versioned compare-and-swap (a JSON file adapter lives in [`stores`]).
//! 3. [`traits::LedgerClient`] is the bookkeeping API itself, implemented by [`ledger_tools::LedgerApi`].
//!
//! [`ReconPipeline`] sequences one run: refresh the token (persisting the rotated refresh token first), resolve the
//! account/tax category ids by name, aggregate the rows, then post each validated order with per-order failure
//! isolation. A failure posting one order never prevents the remaining orders in the batch from being recorded.
pub mod aggregator;
pub mod credentials;
mod errors;
pub mod export;
mod metadata;
mod pipeline;
mod poster;
pub mod sources;
pub mod stores;
mod token_manager;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use errors::{CredentialStoreError, MetadataError, PipelineError, RowSourceError};
pub use metadata::{resolve_ledger_ids, LedgerIds};
pub use pipeline::{PostFailure, ReconPipeline, RunSummary};
pub use poster::{build_ledger_entry, post_order};
pub use token_manager::rotate_and_refresh;
