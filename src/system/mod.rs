//! The system module holds the currency calculator: the engine that turns
//! arbitrary amounts into discrete bundles and does arithmetic on those bundles
//! while respecting each denomination's capacity.
//!
//! A discrete bundle is a list of [CurrencyAmount] entries with at most one
//! entry per currency, each within its currency's max amount. The calculator
//! never fails on insufficient funds: amounts that can't be carried saturate,
//! and debts that can't be borrowed against are resolved by liquidating the
//! rest of the family.
//!
//! [CurrencyAmount]: ../models/amount/struct.CurrencyAmount.html

use crate::{
    error::{Error, Result},
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    registry::Currencies,
};
use rust_decimal::prelude::*;

pub mod addition;
pub mod discretize;
pub mod quotient;
pub mod subtraction;

/// How deep a chain of carries can go before we stop and saturate.
pub(crate) const MAX_CARRY_DEPTH: usize = 32;

/// Runs discrete arithmetic against the currencies in a registry.
#[derive(Clone, Copy, Debug)]
pub struct CurrencyCalculator<'a> {
    currencies: &'a Currencies,
}

impl<'a> CurrencyCalculator<'a> {
    pub fn new(currencies: &'a Currencies) -> Self {
        Self { currencies }
    }

    /// Grab the registry this calculator runs against
    pub fn currencies(&self) -> &'a Currencies {
        self.currencies
    }

    /// Make sure every amount refers to a known currency and none are negative.
    pub fn check_amounts(&self, amounts: &[CurrencyAmount]) -> Result<()> {
        for amount in amounts {
            self.currencies.lookup(amount.currency())?;
            if amount.amount() < 0 {
                Err(Error::NegativeAmount)?;
            }
        }
        Ok(())
    }

    fn max_amount(&self, currency: CurrencyID) -> i64 {
        self.currencies.get(currency)
            .map(|c| c.max_amount())
            .unwrap_or(i64::MAX)
    }

    /// The root rate of a currency, or zero if it isn't registered.
    fn root_rate(&self, currency: CurrencyID) -> Decimal {
        self.currencies.root_exchange_rate(currency)
            .map(|r| r.exchange_rate())
            .unwrap_or_else(|_| Decimal::zero())
    }

    /// Order a bundle from most to least valuable.
    fn sort_by_value(&self, amounts: &mut Vec<CurrencyAmount>) {
        amounts.sort_by(|a, b| self.root_rate(b.currency()).cmp(&self.root_rate(a.currency())));
    }
}

/// Find the index of a currency's entry in a bundle.
pub(crate) fn find_index(amounts: &[CurrencyAmount], currency: CurrencyID) -> Option<usize> {
    amounts.iter().position(|a| a.currency() == currency)
}

/// Find the index of a currency's entry in a bundle, adding an empty entry if
/// the currency is missing.
pub(crate) fn find_or_create(amounts: &mut Vec<CurrencyAmount>, currency: CurrencyID) -> usize {
    match find_index(amounts, currency) {
        Some(idx) => idx,
        None => {
            amounts.push(CurrencyAmount::new(currency, 0));
            amounts.len() - 1
        }
    }
}

/// Remove any zero entries from a bundle.
pub(crate) fn dezero(amounts: &mut Vec<CurrencyAmount>) {
    amounts.retain(|a| !a.is_zero());
}
