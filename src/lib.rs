//! Denomination graphs and discrete multi-currency arithmetic.
//!
//! Currencies are registered in a [Currencies] registry, which links them into
//! families of denominations (cents and dollars, copper/silver/gold, etc).
//! A [CurrencyCollection] holds amounts of those currencies and keeps them
//! discrete: every entry stays within its currency's capacity, with carries and
//! borrows handled by the [CurrencyCalculator].
//!
//! [Currencies]: registry/struct.Currencies.html
//! [CurrencyCollection]: models/collection/struct.CurrencyCollection.html
//! [CurrencyCalculator]: system/struct.CurrencyCalculator.html

#[macro_use]
mod util;
pub mod error;
pub mod models;
pub mod registry;
pub mod system;
pub mod listener;
pub mod persist;

pub use error::{Error, Result};
pub use models::{
    amount::CurrencyAmount,
    collection::CurrencyCollection,
    currency::{Currency, CurrencyExchangeRate, CurrencyID, CurrencyOptions, CurrencyOptionsBuilder},
};
pub use registry::{Currencies, IdSource, SequentialIds};
pub use system::CurrencyCalculator;
pub use listener::{CurrencyListener, ListenerId};
pub use persist::{CollectionData, CurrenciesData, CurrencyData};
