use crate::{errors::RowSourceError, export::RawLineItemRow};

/// A source of raw export rows, in file order. One fetch per pipeline run.
#[allow(async_fn_in_trait)]
pub trait RowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawLineItemRow>, RowSourceError>;
}
