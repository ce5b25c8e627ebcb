//! Comparisons between bundles happen in root units: every entry is converted
//! into its family's root currency and the totals are compared family by
//! family.

use crate::{
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    system::CurrencyCalculator,
    util::number,
};
use rust_decimal::prelude::*;

impl<'a> CurrencyCalculator<'a> {
    /// The total value of every entry in the given currency's family, in root
    /// units.
    pub fn full_amount_as_root(&self, amounts: &[CurrencyAmount], currency: CurrencyID) -> u64 {
        let root = match self.currencies.root_of(currency) {
            Ok(root) => root,
            Err(_) => return 0,
        };
        total_for(&self.root_totals(amounts), root)
    }

    /// Root-unit totals for each family in a bundle, in order of first
    /// appearance. Entries of unknown currencies are ignored.
    pub fn root_totals(&self, amounts: &[CurrencyAmount]) -> Vec<(CurrencyID, u64)> {
        let mut totals: Vec<(CurrencyID, u64)> = Vec::new();
        for amount in amounts {
            let rate = match self.currencies.root_exchange_rate(amount.currency()) {
                Ok(rate) => rate,
                Err(_) => continue,
            };
            let value = number::to_u64_saturating(number::saturating_mul(Decimal::from(amount.amount()), rate.exchange_rate()));
            match totals.iter_mut().find(|(root, _)| *root == rate.currency()) {
                Some((_, total)) => *total = total.saturating_add(value),
                None => totals.push((rate.currency(), value)),
            }
        }
        totals
    }

    /// How many times `rhs` fits into `lhs`. Each family `rhs` needs is checked
    /// separately and the scarcest one wins. If `rhs` needs nothing, it fits
    /// `u64::MAX` times.
    pub fn quotient(&self, lhs: &[CurrencyAmount], rhs: &[CurrencyAmount]) -> u64 {
        let have = self.root_totals(lhs);
        let mut quotient = u64::MAX;
        for (root, need) in self.root_totals(rhs) {
            if need == 0 {
                continue;
            }
            quotient = quotient.min(total_for(&have, root) / need);
        }
        quotient
    }

    /// Whether two bundles hold the same value in every family either of them
    /// touches.
    pub fn are_equivalent(&self, lhs: &[CurrencyAmount], rhs: &[CurrencyAmount]) -> bool {
        let lhs_totals = self.root_totals(lhs);
        let rhs_totals = self.root_totals(rhs);
        lhs_totals.iter()
            .chain(rhs_totals.iter())
            .all(|(root, _)| total_for(&lhs_totals, *root) == total_for(&rhs_totals, *root))
    }

    /// Divide `lhs * lm` by `rhs * rm`, returning the quotient and whatever is
    /// left of the left side afterwards.
    pub fn division(&self, lhs: &[CurrencyAmount], lm: Decimal, rhs: &[CurrencyAmount], rm: Decimal) -> (u64, Vec<CurrencyAmount>) {
        let lhs = self.discretize_amounts(lhs, lm);
        let rhs = self.discretize_amounts(rhs, rm);
        let quotient = self.quotient(&lhs, &rhs);
        if quotient == u64::MAX {
            return (quotient, lhs);
        }
        let remainder = self.subtraction(&lhs, Decimal::one(), &rhs, Decimal::from(quotient));
        (quotient, remainder)
    }

    /// Whether `lhs * lm` can cover `rhs * rm` at least once.
    pub fn greater_than_or_equal_to(&self, lhs: &[CurrencyAmount], lm: Decimal, rhs: &[CurrencyAmount], rm: Decimal) -> bool {
        let lhs = self.discretize_amounts(lhs, lm);
        let rhs = self.discretize_amounts(rhs, rm);
        self.quotient(&lhs, &rhs) >= 1
    }

    /// Whether `lhs * lm` and `rhs * rm` are worth the same.
    pub fn equivalent_with(&self, lhs: &[CurrencyAmount], lm: Decimal, rhs: &[CurrencyAmount], rm: Decimal) -> bool {
        let lhs = self.discretize_amounts(lhs, lm);
        let rhs = self.discretize_amounts(rhs, rm);
        self.are_equivalent(&lhs, &rhs)
    }
}

/// Look up one family's total, zero if the family is absent.
fn total_for(totals: &[(CurrencyID, u64)], root: CurrencyID) -> u64 {
    totals.iter()
        .find(|(r, _)| *r == root)
        .map(|(_, total)| *total)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::*;
    use proptest::prelude::*;

    #[test]
    fn root_amounts() {
        let coins = make_coins();
        let calc = CurrencyCalculator::new(&coins.currencies);
        let bundle = amounts(&[(coins.gold, 2), (coins.gem, 5), (coins.copper, 7), (coins.silver, 1)]);
        assert_eq!(calc.full_amount_as_root(&bundle, coins.silver), 20107);
        assert_eq!(calc.full_amount_as_root(&bundle, coins.gem), 5);
        assert_eq!(calc.full_amount_as_root(&bundle, CurrencyID::new(999)), 0);
        assert_eq!(calc.root_totals(&bundle), vec![(coins.copper, 20107), (coins.gem, 5)]);
    }

    #[test]
    fn quotient_uses_scarcest_family() {
        let coins = make_coins();
        let calc = CurrencyCalculator::new(&coins.currencies);
        let wallet = amounts(&[(coins.gold, 1), (coins.gem, 5)]);
        assert_eq!(calc.quotient(&wallet, &amounts(&[(coins.silver, 30)])), 3);
        assert_eq!(calc.quotient(&wallet, &amounts(&[(coins.silver, 30), (coins.gem, 2)])), 2);
        assert_eq!(calc.quotient(&wallet, &amounts(&[(coins.silver, 30), (coins.gem, 6)])), 0);
        assert_eq!(calc.quotient(&wallet, &[]), u64::MAX);
        assert_eq!(calc.quotient(&[], &amounts(&[(coins.copper, 1)])), 0);
    }

    #[test]
    fn equivalence() {
        let coins = make_coins();
        let calc = CurrencyCalculator::new(&coins.currencies);
        let a = amounts(&[(coins.gold, 1), (coins.gem, 5)]);
        let b = amounts(&[(coins.gem, 5), (coins.silver, 100)]);
        let c = amounts(&[(coins.silver, 100)]);
        assert!(calc.are_equivalent(&a, &b));
        assert!(calc.are_equivalent(&b, &a));
        assert!(!calc.are_equivalent(&a, &c));
        assert!(!calc.are_equivalent(&c, &a));
        assert!(calc.are_equivalent(&[], &[]));
        assert!(calc.equivalent_with(&amounts(&[(coins.silver, 50)]), num!(2), &c, num!(1)));
    }

    #[test]
    fn division_and_comparison() {
        let dollars = make_dollars();
        let calc = CurrencyCalculator::new(&dollars.currencies);
        let wallet = amounts(&[(dollars.dollar, 10), (dollars.cent, 50)]);
        let price = amounts(&[(dollars.dollar, 3)]);
        let (quotient, remainder) = calc.division(&wallet, num!(1), &price, num!(1));
        assert_eq!(quotient, 3);
        assert_eq!(remainder, amounts(&[(dollars.dollar, 1), (dollars.cent, 50)]));
        let (quotient, remainder) = calc.division(&wallet, num!(1), &[], num!(1));
        assert_eq!(quotient, u64::MAX);
        assert_eq!(remainder, wallet);

        assert!(calc.greater_than_or_equal_to(&wallet, num!(1), &price, num!(3.5)));
        assert!(!calc.greater_than_or_equal_to(&wallet, num!(1), &price, num!(3.6)));
    }

    proptest! {
        #[test]
        fn equivalence_is_symmetric(a in 0u64..1_000_000, b in 0u64..1_000_000, gems in 0i64..10) {
            let coins = make_coins();
            let calc = CurrencyCalculator::new(&coins.currencies);
            let mut lhs = calc.discretize(coins.copper, Decimal::from(a));
            lhs.push(CurrencyAmount::new(coins.gem, gems));
            let rhs = calc.discretize(coins.copper, Decimal::from(b));
            prop_assert_eq!(calc.are_equivalent(&lhs, &rhs), calc.are_equivalent(&rhs, &lhs));
            prop_assert_eq!(calc.are_equivalent(&lhs, &rhs), a == b && gems == 0);
        }

        #[test]
        fn covering_matches_quotient(a in 0u64..1_000_000, b in 1u64..1_000_000) {
            let coins = make_coins();
            let calc = CurrencyCalculator::new(&coins.currencies);
            let lhs = calc.discretize(coins.copper, Decimal::from(a));
            let rhs = calc.discretize(coins.copper, Decimal::from(b));
            prop_assert_eq!(calc.quotient(&lhs, &rhs), a / b);
            prop_assert_eq!(calc.greater_than_or_equal_to(&lhs, num!(1), &rhs, num!(1)), a >= b);
        }
    }
}
