//! Discretization turns an arbitrary (non-negative) decimal amount of a
//! currency into a discrete bundle.
//!
//! The whole part of the amount is folded into the currency's capacity, with
//! anything above the max carried into the overflow currency (and so on up the
//! overflow chain). The fractional part is broken down through the fraction
//! chain. If the whole part can't be carried anywhere the amount saturates: the
//! currency and its fraction chain are all set to their max amounts.

use crate::{
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    system::{self, CurrencyCalculator},
    util::number,
};
use rust_decimal::prelude::*;
use tracing::debug;

/// The result of walking an amount up the overflow chain.
struct OverflowPass {
    /// Entries emitted, least valuable first
    amounts: Vec<CurrencyAmount>,
    /// Fractional leftovers from converting into an overflow currency
    spill: Vec<(CurrencyID, Decimal)>,
    saturated: bool,
}

impl<'a> CurrencyCalculator<'a> {
    /// Convert an amount of a currency into a discrete bundle, most valuable
    /// entries first. Unknown currencies and non-positive amounts produce an
    /// empty bundle.
    pub fn discretize(&self, currency: CurrencyID, amount: Decimal) -> Vec<CurrencyAmount> {
        if amount <= Decimal::zero() || self.currencies.get(currency).is_none() {
            return Vec::new();
        }
        let pass = self.overflow_pass(currency, amount);
        let mut raw = pass.amounts;
        if !pass.saturated {
            self.fraction_pass(currency, amount.fract(), &mut raw);
            for (spilled, fraction) in pass.spill {
                self.fraction_pass(spilled, fraction, &mut raw);
            }
        }
        let mut result = self.discrete_addition(&[], &raw);
        system::dezero(&mut result);
        self.sort_by_value(&mut result);
        result
    }

    /// Discretize every entry of a bundle (times a multiplier) and merge the
    /// results into one bundle.
    pub fn discretize_amounts(&self, amounts: &[CurrencyAmount], multiplier: Decimal) -> Vec<CurrencyAmount> {
        let mut result = Vec::new();
        for amount in amounts {
            let scaled = number::saturating_mul(Decimal::from(amount.amount()), multiplier);
            let discrete = self.discretize(amount.currency(), scaled);
            result = self.discrete_addition(&result, &discrete);
        }
        system::dezero(&mut result);
        result
    }

    /// Fold the whole part of an amount into the currency's capacity, carrying
    /// the rest up the overflow chain. Most valuable entries first.
    pub fn overflow_amounts(&self, currency: CurrencyID, amount: Decimal) -> Vec<CurrencyAmount> {
        if amount <= Decimal::zero() {
            return Vec::new();
        }
        let mut amounts = self.overflow_pass(currency, amount).amounts;
        amounts.reverse();
        amounts
    }

    /// Break a fractional amount of a currency down through its fraction chain.
    /// The currency itself is never part of the result.
    pub fn fraction_amounts(&self, currency: CurrencyID, fraction: Decimal) -> Vec<CurrencyAmount> {
        let mut amounts = Vec::new();
        if fraction > Decimal::zero() {
            self.fraction_pass(currency, fraction, &mut amounts);
        }
        amounts
    }

    /// Force a currency and everything along its fraction chain to max.
    pub(crate) fn saturate(&self, amounts: &mut Vec<CurrencyAmount>, currency: CurrencyID) {
        for id in self.currencies.fraction_chain(currency) {
            let idx = system::find_or_create(amounts, id);
            amounts[idx] = CurrencyAmount::new(id, self.max_amount(id));
        }
    }

    pub(crate) fn fraction_pass(&self, currency: CurrencyID, fraction: Decimal, out: &mut Vec<CurrencyAmount>) {
        let mut remainder = fraction;
        let mut current = currency;
        for _ in 0..self.currencies.len() {
            if remainder <= Decimal::zero() {
                break;
            }
            let next = match self.currencies.get(current).and_then(|c| c.fraction_currency()) {
                Some(next) => next,
                None => break,
            };
            remainder = match self.currencies.convert(remainder, current, next) {
                Some(converted) => converted,
                None => break,
            };
            let whole = remainder.trunc();
            if whole > Decimal::zero() {
                out.push(CurrencyAmount::new(next, number::to_i64_saturating(whole)));
            }
            remainder -= whole;
            current = next;
        }
    }

    fn overflow_pass(&self, currency: CurrencyID, amount: Decimal) -> OverflowPass {
        let mut pass = OverflowPass {
            amounts: Vec::new(),
            spill: Vec::new(),
            saturated: false,
        };
        let mut current = currency;
        let mut remaining = amount.trunc();
        for _ in 0..=self.currencies.len() {
            let record = match self.currencies.get(current) {
                Some(record) => record,
                None => break,
            };
            let held = remaining % number::capacity_modulus(record.max_amount());
            if held > Decimal::zero() {
                pass.amounts.push(CurrencyAmount::new(current, number::to_i64_saturating(held)));
            }
            let rest = remaining - held;
            if rest <= Decimal::zero() {
                break;
            }
            let converted = record.overflow_currency()
                .and_then(|overflow| self.currencies.convert(rest, current, overflow).map(|val| (overflow, val)));
            match converted {
                Some((overflow, val)) => {
                    let whole = val.trunc();
                    if val > whole {
                        pass.spill.push((overflow, val - whole));
                    }
                    current = overflow;
                    remaining = whole;
                }
                None => {
                    debug!("CurrencyCalculator::overflow_pass() -- saturating {}", current);
                    self.saturate(&mut pass.amounts, current);
                    pass.saturated = true;
                    break;
                }
            }
        }
        pass
    }
}
