use std::path::PathBuf;

use log::*;

use crate::{errors::RowSourceError, export::RawLineItemRow, traits::RowSource};

/// Reads one export file from local disk. The first row is the header; a UTF-8 byte-order mark, which the export
/// tool prepends, is stripped by the reader before the header is parsed.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl RowSource for CsvFileSource {
    async fn fetch_rows(&self) -> Result<Vec<RawLineItemRow>, RowSourceError> {
        debug!("Reading export file {}", self.path.display());
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: RawLineItemRow =
                headers.iter().zip(record.iter()).map(|(h, v)| (h.to_string(), v.to_string())).collect();
            rows.push(row);
        }
        info!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use crate::{
        export::{COL_ITEM_SUBTOTAL, COL_ORDER_ID, FEE_COLUMN_ALIASES},
        test_utils::prepare_env,
    };

    use super::*;

    #[tokio::test]
    async fn reads_a_bom_prefixed_export() {
        prepare_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "\u{feff}order_id,ordered_at,item_name,item_variation,item_subtotal,fee\r\nA,2024/01/10,X,,\"1,000\",-100\r\nA,,Y,,500,\r\n"
        )
        .unwrap();
        let source = CsvFileSource::new(file.path());
        let rows = source.fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(COL_ORDER_ID), Some("A"));
        assert_eq!(rows[0].get(COL_ITEM_SUBTOTAL), Some("1,000"));
        assert_eq!(rows[0].first_of(&FEE_COLUMN_ALIASES), Some("-100"));
        assert_eq!(rows[1].get(COL_ORDER_ID), Some("A"));
        assert_eq!(rows[1].first_of(&FEE_COLUMN_ALIASES), None);
    }

    #[tokio::test]
    async fn a_missing_file_is_an_io_error() {
        prepare_env();
        let source = CsvFileSource::new("/definitely/not/here.csv");
        let err = source.fetch_rows().await.unwrap_err();
        assert!(matches!(err, RowSourceError::Malformed(_) | RowSourceError::Io(_)));
    }
}
