//! Discrete subtraction takes one bundle out of another.
//!
//! When a currency runs short, one of the currencies that breaks down into it
//! lends enough units to cover the deficit: either its overflow currency or a
//! held currency whose fraction chain reaches it. Any change from the loan goes
//! back to the borrowing currency before the lender is debited.
//!
//! If nothing can lend, the rest of the family is liquidated from the least
//! valuable currency up until the debt (in root units) is covered. A family
//! that can't cover the debt ends up empty. Nothing ever goes negative.

use crate::{
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    system::{self, CurrencyCalculator},
    util::number,
};
use rust_decimal::prelude::*;
use tracing::{debug, warn};

impl<'a> CurrencyCalculator<'a> {
    /// Take `rhs` out of `lhs` one entry at a time. Both sides are expected to
    /// be discrete. Zero entries are dropped from the result.
    pub fn discrete_subtraction(&self, lhs: &[CurrencyAmount], rhs: &[CurrencyAmount]) -> Vec<CurrencyAmount> {
        let mut result = lhs.to_vec();
        for amount in rhs {
            if amount.amount() > 0 {
                self.subtract_single(&mut result, amount.currency(), amount.amount());
            }
        }
        system::dezero(&mut result);
        result
    }

    /// `lhs * lm - rhs * rm`, with both sides discretized first.
    pub fn subtraction(&self, lhs: &[CurrencyAmount], lm: Decimal, rhs: &[CurrencyAmount], rm: Decimal) -> Vec<CurrencyAmount> {
        let lhs = self.discretize_amounts(lhs, lm);
        let rhs = self.discretize_amounts(rhs, rm);
        self.discrete_subtraction(&lhs, &rhs)
    }

    fn subtract_single(&self, result: &mut Vec<CurrencyAmount>, currency: CurrencyID, amount: i64) {
        let mut currency = currency;
        let mut amount = amount;
        // every loan moves to a more valuable currency, so this always ends
        for _ in 0..=self.currencies.len() {
            let idx = system::find_or_create(result, currency);
            let held = result[idx].amount();
            if held >= amount {
                result[idx] = CurrencyAmount::new(currency, held - amount);
                return;
            }
            let deficit = amount.saturating_sub(held.max(0));
            let loan = self.find_lender(result, currency)
                .and_then(|lender| self.currencies.exchange_rate_to(lender, currency).map(|rate| (lender, rate)));
            let (lender, rate) = match loan {
                Some(loan) => loan,
                None => {
                    self.liquidate(result, currency, deficit);
                    return;
                }
            };
            let deficit_dec = Decimal::from(deficit);
            let borrow = number::saturating_div(deficit_dec, rate)
                .unwrap_or_else(|| Decimal::zero())
                .ceil();
            let change = number::saturating_mul(borrow, rate) - deficit_dec;
            result[idx] = CurrencyAmount::new(currency, 0);
            if change > Decimal::zero() {
                for credit in self.discretize(currency, change) {
                    self.add_single(result, credit.currency(), credit.amount(), 0);
                }
            }
            currency = lender;
            amount = number::to_i64_saturating(borrow);
        }
        warn!("CurrencyCalculator::subtract_single() -- borrow chain too long at {}, liquidating", currency);
        let idx = system::find_or_create(result, currency);
        let deficit = amount.saturating_sub(result[idx].amount().max(0));
        self.liquidate(result, currency, deficit);
    }

    /// Find a currency that can lend units to the given currency: its overflow
    /// currency, or the currency that fractions directly into it along the
    /// fraction chain of something we hold.
    fn find_lender(&self, result: &[CurrencyAmount], currency: CurrencyID) -> Option<CurrencyID> {
        let record = self.currencies.get(currency)?;
        if let Some(overflow) = record.overflow_currency() {
            return Some(overflow);
        }
        let root = self.currencies.root_of(currency).ok()?;
        for entry in result {
            if entry.amount() <= 0 || entry.currency() == currency {
                continue;
            }
            if self.currencies.root_of(entry.currency()).ok() != Some(root) {
                continue;
            }
            let chain = self.currencies.fraction_chain(entry.currency());
            if let Some(pos) = chain.iter().position(|c| *c == currency) {
                if pos > 0 {
                    return Some(chain[pos - 1]);
                }
            }
        }
        None
    }

    /// Cover a deficit of `currency` by liquidating the rest of its family, least
    /// valuable first.
    fn liquidate(&self, result: &mut Vec<CurrencyAmount>, currency: CurrencyID, deficit: i64) {
        let idx = system::find_or_create(result, currency);
        result[idx] = CurrencyAmount::new(currency, 0);
        let rate = self.root_rate(currency);
        let root = match self.currencies.root_of(currency) {
            Ok(root) => root,
            Err(_) => return,
        };
        let mut need = number::saturating_mul(Decimal::from(deficit), rate);
        debug!("CurrencyCalculator::liquidate() -- covering {} root units for {}", need, currency);

        let mut candidates = result.iter()
            .enumerate()
            .filter(|(_, entry)| entry.amount() > 0 && self.currencies.root_of(entry.currency()).ok() == Some(root))
            .map(|(i, entry)| (i, self.root_rate(entry.currency())))
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| a.1.cmp(&b.1));

        let mut last = None;
        for (i, entry_rate) in candidates {
            if need <= Decimal::zero() {
                break;
            }
            let value = number::saturating_mul(Decimal::from(result[i].amount()), entry_rate);
            result[i] = result[i].with_amount(0);
            need -= value;
            last = Some((i, entry_rate));
        }

        if need > Decimal::zero() {
            debug!("CurrencyCalculator::liquidate() -- family of {} is exhausted", currency);
            return;
        }
        let change = -need;
        if let Some((i, entry_rate)) = last {
            if change > Decimal::zero() {
                let units = number::saturating_div(change, entry_rate)
                    .unwrap_or_else(|| Decimal::zero())
                    .trunc();
                result[i] = result[i].with_amount(number::to_i64_saturating(units));
                // whatever doesn't make a whole unit goes back as root units
                let residual = change - number::saturating_mul(units, entry_rate);
                if residual > Decimal::zero() {
                    for credit in self.discretize(root, residual) {
                        self.add_single(result, credit.currency(), credit.amount(), 0);
                    }
                }
            }
        }
    }
}
