//! The main error enum for the project lives here, and documents the various
//! conditions that can arise while building denomination graphs and doing
//! currency arithmetic.
//!
//! Note that arithmetic never fails because of insufficient funds. Errors are
//! only raised for structural problems (bad links, unknown currencies, negative
//! inputs) and are always raised *before* anything is mutated.

use crate::models::currency::CurrencyID;
use rust_decimal::Decimal;
use thiserror::Error;

/// This is our error enum. It contains an entry for any part of the system in
/// which an expectation is not met or a problem occurs.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// An error while using a builder (probably a missing field)
    #[error("error building object {0}")]
    BuilderFailed(String),
    /// The currency ID does not exist in the registry
    #[error("currency {0} does not exist")]
    UnknownCurrency(CurrencyID),
    /// The ID source handed out an ID that is already taken
    #[error("currency id {0} is already registered")]
    DuplicateCurrencyId(CurrencyID),
    /// Currency names must be unique within a registry
    #[error("a currency named {0:?} is already registered")]
    DuplicateCurrencyName(String),
    /// Currency names cannot be blank
    #[error("currency name cannot be empty")]
    EmptyName,
    /// A currency cannot be its own parent
    #[error("a currency cannot be its own parent")]
    SelfReference,
    /// The requested parent is a descendant of the currency
    #[error("setting this parent would create a cycle")]
    ParentCycle,
    /// A currency's exchange rate to its parent must be > 1
    #[error("exchange rate to parent must be greater than 1 (got {0})")]
    InvalidExchangeRate(Decimal),
    /// Max amounts must be >= 1
    #[error("max amount must be at least 1 (got {0})")]
    InvalidMaxAmount(i64),
    /// Overflow/fraction links must stay within one root family
    #[error("currencies {0} and {1} do not share a root currency")]
    CrossFamilyLink(CurrencyID, CurrencyID),
    /// The overflow currency is not more valuable than the currency
    #[error("overflow currency {0} must be more valuable")]
    InvalidOverflowCurrency(CurrencyID),
    /// The fraction currency is not less valuable than the currency
    #[error("fraction currency {0} must be less valuable")]
    InvalidFractionCurrency(CurrencyID),
    /// A saved collection entry holds more than its currency allows
    #[error("amount {1} of currency {0} is over its max amount")]
    ExceedsMaxAmount(CurrencyID, i64),
    /// Amounts handed to a collection cannot be negative
    #[error("currency amounts cannot be negative")]
    NegativeAmount,
    /// Multipliers cannot be negative
    #[error("multipliers cannot be negative")]
    NegativeMultiplier,
    /// Loaded currency data disagrees with itself
    #[error("inconsistent currency hierarchy: {0}")]
    InconsistentHierarchy(String),
}

/// Wraps `std::result::Result` around our `Error` enum
pub type Result<T> = std::result::Result<T, Error>;
