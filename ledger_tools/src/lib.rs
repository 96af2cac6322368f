mod api;
mod config;
mod error;

mod data_objects;

pub use api::LedgerApi;
pub use config::LedgerConfig;
pub use data_objects::{
    AccountCategory,
    EntryDetail,
    EntryPayment,
    EntryType,
    NewLedgerEntry,
    TaxCategory,
    TokenPair,
};
pub use error::LedgerApiError;
