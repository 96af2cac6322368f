mod amounts;
mod money;
mod secret;

pub use amounts::{parse_amount, parse_fee, AmountParseError};
pub use money::Money;
pub use secret::Secret;
