//! Wire <-> domain conversion.
//!
//! Every monetary field passes through [`MoneyService`] here: wire values are
//! minor-unit integers, domain values are decimals in the entity's currency.
//!
//! [`MoneyService`]: crate::backend::domain::money::MoneyService

pub mod budget_mapper;
pub mod category_mapper;
pub mod objective_mapper;
pub mod recurring_mapper;
pub mod transaction_mapper;

use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::domain::month::MonthKey;

/// Parse a month coming from the store; a malformed one is a decode failure
pub(crate) fn decode_month(value: &str, field: &str) -> LedgerResult<MonthKey> {
    MonthKey::parse(value)
        .map_err(|_| LedgerError::Decode(format!("{} has invalid month '{}'", field, value)))
}
