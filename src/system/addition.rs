//! Discrete addition merges one bundle into another, carrying any amount that
//! goes over a currency's max into its overflow currency.

use crate::{
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    system::{self, CurrencyCalculator, MAX_CARRY_DEPTH},
    util::number,
};
use rust_decimal::prelude::*;
use tracing::{debug, warn};

impl<'a> CurrencyCalculator<'a> {
    /// Add `rhs` into `lhs` one entry at a time. Both sides are expected to be
    /// discrete. Entries that carry down to zero are kept, so adding an empty
    /// bundle returns `lhs` untouched.
    pub fn discrete_addition(&self, lhs: &[CurrencyAmount], rhs: &[CurrencyAmount]) -> Vec<CurrencyAmount> {
        let mut result = lhs.to_vec();
        for amount in rhs {
            if amount.amount() > 0 {
                self.add_single(&mut result, amount.currency(), amount.amount(), 0);
            }
        }
        result
    }

    /// `lhs * lm + rhs * rm`, with both sides discretized first.
    pub fn addition(&self, lhs: &[CurrencyAmount], lm: Decimal, rhs: &[CurrencyAmount], rm: Decimal) -> Vec<CurrencyAmount> {
        let lhs = self.discretize_amounts(lhs, lm);
        let rhs = self.discretize_amounts(rhs, rm);
        let mut result = self.discrete_addition(&lhs, &rhs);
        system::dezero(&mut result);
        result
    }

    pub(crate) fn add_single(&self, result: &mut Vec<CurrencyAmount>, currency: CurrencyID, amount: i64, depth: usize) {
        let idx = system::find_or_create(result, currency);
        let sum = Decimal::from(result[idx].amount()) + Decimal::from(amount);
        let held = sum % number::capacity_modulus(self.max_amount(currency));
        result[idx] = CurrencyAmount::new(currency, number::to_i64_saturating(held));
        let carry = sum - held;
        if carry <= Decimal::zero() {
            return;
        }
        if depth >= MAX_CARRY_DEPTH {
            warn!("CurrencyCalculator::add_single() -- carry depth exceeded at {}, saturating", currency);
            self.saturate(result, currency);
            return;
        }
        let converted = self.currencies.get(currency)
            .and_then(|c| c.overflow_currency())
            .and_then(|overflow| self.currencies.convert(carry, currency, overflow).map(|val| (overflow, val)));
        match converted {
            Some((overflow, val)) if val.trunc() > Decimal::zero() => {
                let whole = val.trunc();
                let mut fractions = Vec::new();
                self.fraction_pass(overflow, val - whole, &mut fractions);
                self.add_single(result, overflow, number::to_i64_saturating(whole), depth + 1);
                for fraction in fractions {
                    self.add_single(result, fraction.currency(), fraction.amount(), depth + 1);
                }
            }
            _ => {
                debug!("CurrencyCalculator::add_single() -- no room to carry {}, saturating", currency);
                self.saturate(result, currency);
            }
        }
    }
}
