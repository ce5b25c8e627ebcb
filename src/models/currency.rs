//! The currency module holds the Currency model: a single denomination that
//! lives in a forest of denominations.
//!
//! Each currency may point to a parent (which is always the *less* valuable
//! unit) along with the rate needed to convert one unit of the currency into
//! units of its parent. Following parents up until none remain lands on the
//! root currency, which is the base unit the whole family is measured in.
//!
//! Currencies are owned by the [registry], which is the only place links are
//! allowed to change (so they can be validated against the rest of the graph).
//!
//! [registry]: ../../registry/index.html

use getset::{CopyGetters, Getters, MutGetters, Setters};
use rust_decimal::prelude::*;
#[cfg(feature = "with_serde")]
use serde_derive::{Serialize, Deserialize};
use std::fmt;

/// A process-unique currency identifier, handed out by an
/// [IdSource](../../registry/trait.IdSource.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with_serde", serde(transparent))]
pub struct CurrencyID(u32);

impl CurrencyID {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Return the raw id value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CurrencyID {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for CurrencyID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A denomination. Links to other currencies are stored as IDs and resolved
/// through the registry that owns this record.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters, MutGetters, Setters)]
pub struct Currency {
    /// This currency's ID
    #[getset(get_copy = "pub")]
    id: CurrencyID,
    /// The currency's name, unique within its registry
    #[getset(get = "pub")]
    name: String,
    /// The less valuable currency this one is measured against
    #[getset(get_copy = "pub", set = "pub(crate)")]
    parent: Option<CurrencyID>,
    /// One unit of this currency equals this many units of the parent
    #[getset(get_copy = "pub", set = "pub(crate)")]
    exchange_rate_to_parent: Decimal,
    /// Every currency whose parent is this one, in link order
    #[getset(get = "pub", get_mut = "pub(crate)")]
    children: Vec<CurrencyID>,
    /// The most of this currency a collection will hold in one entry
    #[getset(get_copy = "pub", set = "pub(crate)")]
    max_amount: i64,
    /// Amounts above `max_amount` carry into this (more valuable) currency
    #[getset(get_copy = "pub", set = "pub(crate)")]
    overflow_currency: Option<CurrencyID>,
    /// Fractional amounts are broken down into this (less valuable) currency
    #[getset(get_copy = "pub", set = "pub(crate)")]
    fraction_currency: Option<CurrencyID>,
}

impl Currency {
    /// Create a bare currency record. Links are validated by the registry, not
    /// here.
    pub(crate) fn new<T: Into<String>>(id: CurrencyID, name: T, exchange_rate_to_parent: Decimal, max_amount: i64) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            exchange_rate_to_parent,
            children: Vec::new(),
            max_amount,
            overflow_currency: None,
            fraction_currency: None,
        }
    }

    /// Whether or not this currency is the root of its family
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An immutable (currency, rate) pair. Produced when resolving a currency to
/// its root: "one unit of the source currency equals `exchange_rate` units of
/// `currency`".
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[getset(get_copy = "pub")]
pub struct CurrencyExchangeRate {
    currency: CurrencyID,
    exchange_rate: Decimal,
}

impl CurrencyExchangeRate {
    pub fn new(currency: CurrencyID, exchange_rate: Decimal) -> Self {
        Self {
            currency,
            exchange_rate,
        }
    }
}

/// Options used to create a new currency via
/// [Currencies::create_with](../../registry/struct.Currencies.html#method.create_with).
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters, derive_builder::Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct CurrencyOptions {
    /// The currency's (unique) name
    #[getset(get = "pub")]
    name: String,
    /// The parent currency, if any
    #[builder(setter(strip_option), default)]
    #[getset(get_copy = "pub")]
    parent: Option<CurrencyID>,
    /// The rate to the parent. Must be > 1 when a parent is given.
    #[builder(default = "Decimal::one()")]
    #[getset(get_copy = "pub")]
    exchange_rate_to_parent: Decimal,
    /// Per-entry capacity
    #[builder(default = "i64::MAX")]
    #[getset(get_copy = "pub")]
    max_amount: i64,
    #[builder(setter(strip_option), default)]
    #[getset(get_copy = "pub")]
    overflow_currency: Option<CurrencyID>,
    #[builder(setter(strip_option), default)]
    #[getset(get_copy = "pub")]
    fraction_currency: Option<CurrencyID>,
}

impl CurrencyOptions {
    pub fn builder() -> CurrencyOptionsBuilder {
        CurrencyOptionsBuilder::default()
    }
}
