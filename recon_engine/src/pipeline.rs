use log::*;
use serde::Serialize;

use crate::{
    aggregator::aggregate,
    errors::PipelineError,
    metadata::resolve_ledger_ids,
    poster::post_order,
    token_manager::rotate_and_refresh,
    traits::{CredentialStore, LedgerClient, RowSource},
};

/// One order that could not be posted. The order stays in the export; recovery is a manual reprocess after the
/// underlying data or credential issue is fixed.
#[derive(Debug, Clone, Serialize)]
pub struct PostFailure {
    pub order_id: String,
    pub error: String,
}

/// The outcome of one pipeline run. A run that reaches the posting stage reports success even when individual
/// orders failed; those are listed in `failed`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub posted: usize,
    pub skipped: usize,
    pub dropped_rows: usize,
    pub failed: Vec<PostFailure>,
}

/// The pipeline controller: one linear run over one export file.
///
/// Stages: load credentials → refresh token (persisting the rotation) → resolve metadata → fetch rows → aggregate →
/// post each validated order. Any failure before posting starts is fatal and aborts the run with no ledger mutation.
/// From aggregation onward each order is posted independently: one rejected order never blocks the rest of the
/// batch. Orders are posted sequentially, in the aggregator's insertion order; there is no retry anywhere.
pub struct ReconPipeline<L, S, R> {
    ledger: L,
    store: S,
    source: R,
}

impl<L, S, R> ReconPipeline<L, S, R>
where
    L: LedgerClient,
    S: CredentialStore,
    R: RowSource,
{
    pub fn new(ledger: L, store: S, source: R) -> Self {
        Self { ledger, store, source }
    }

    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let creds = self.store.read().await.map_err(PipelineError::CredentialLoad)?;
        debug!("Credentials loaded at version {}", creds.version);
        let (access_token, bundle) = rotate_and_refresh(&self.ledger, &self.store, creds).await?;
        let ids = resolve_ledger_ids(&self.ledger, &access_token, &bundle).await?;
        let rows = self.source.fetch_rows().await?;
        info!("Fetched {} export rows", rows.len());
        let outcome = aggregate(rows);
        let mut summary = RunSummary {
            skipped: outcome.skipped.len(),
            dropped_rows: outcome.dropped_rows,
            ..Default::default()
        };
        for order in &outcome.orders {
            match post_order(&self.ledger, &access_token, order, &ids, bundle.company_id, bundle.wallet_id).await {
                Ok(_) => summary.posted += 1,
                Err(e) => {
                    error!("Posting order {} failed. {e}", order.order_id);
                    summary.failed.push(PostFailure { order_id: order.order_id.clone(), error: e.to_string() });
                },
            }
        }
        info!(
            "Run complete: {} posted, {} skipped, {} failed, {} rows dropped",
            summary.posted,
            summary.skipped,
            summary.failed.len(),
            summary.dropped_rows
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        export::RawLineItemRow,
        test_utils::{item_row, prepare_env, sample_bundle, FlakyLedger, MemoryCredentialStore, StaticRowSource},
        traits::CredentialStore,
    };

    use super::*;

    fn rows() -> Vec<RawLineItemRow> {
        vec![
            item_row("A", "2024/01/10", "X", "1,000", "-100"),
            item_row("A", "", "Y", "500", ""),
            item_row("B", "2024/01/11", "Z", "2,000", "-200"),
            // No date anywhere in this order: validation skips it.
            item_row("C", "", "W", "300", "-30"),
        ]
    }

    #[test]
    fn summaries_serialize_for_the_caller() {
        let summary = RunSummary {
            posted: 1,
            skipped: 0,
            dropped_rows: 0,
            failed: vec![PostFailure { order_id: "A".to_string(), error: "boom".to_string() }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["posted"], 1);
        assert_eq!(json["failed"][0]["order_id"], "A");
    }

    #[tokio::test]
    async fn happy_path_posts_every_validated_order() {
        prepare_env();
        let ledger = FlakyLedger::default();
        let pipeline = ReconPipeline::new(ledger.clone(), MemoryCredentialStore::new(sample_bundle()), StaticRowSource::new(rows()));
        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.posted, 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.failed.is_empty());
        let entries = ledger.created_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].details[0].amount, 1500);
        assert_eq!(entries[1].details[0].amount, 2000);
    }

    #[tokio::test]
    async fn one_rejected_order_does_not_block_the_rest() {
        prepare_env();
        let ledger = FlakyLedger::default().failing_first_post();
        let pipeline = ReconPipeline::new(ledger.clone(), MemoryCredentialStore::new(sample_bundle()), StaticRowSource::new(rows()));
        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.posted, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].order_id, "A");
        // Order B still made it through.
        assert_eq!(ledger.created_entries().len(), 1);
    }

    #[tokio::test]
    async fn fatal_refresh_failure_attempts_no_posting() {
        prepare_env();
        let ledger = FlakyLedger::default().failing_refresh();
        let pipeline = ReconPipeline::new(ledger.clone(), MemoryCredentialStore::new(sample_bundle()), StaticRowSource::new(rows()));
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::TokenRefresh(_)));
        assert!(ledger.created_entries().is_empty());
    }

    #[tokio::test]
    async fn a_run_rotates_the_stored_refresh_token() {
        prepare_env();
        let store = MemoryCredentialStore::new(sample_bundle());
        let pipeline = ReconPipeline::new(FlakyLedger::default(), store.clone(), StaticRowSource::new(rows()));
        pipeline.run().await.unwrap();
        let stored = store.read().await.unwrap();
        assert_eq!(stored.bundle.refresh_token.reveal(), "refresh-1");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn unresolvable_metadata_aborts_before_any_ledger_mutation() {
        prepare_env();
        let mut bundle = sample_bundle();
        bundle.income_account_name = "Nonexistent".to_string();
        let ledger = FlakyLedger::default();
        let pipeline = ReconPipeline::new(ledger.clone(), MemoryCredentialStore::new(bundle), StaticRowSource::new(rows()));
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Metadata(_)));
        assert!(ledger.created_entries().is_empty());
    }
}
