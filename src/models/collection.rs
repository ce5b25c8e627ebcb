//! A currency collection is a wallet: a canonical bundle of currency amounts
//! with at most one entry per currency.
//!
//! Every mutation discretizes its input against the [registry], applies it
//! with carries/borrows, and then tells any subscribed listeners what was
//! actually added or removed. Mutations validate their input before touching
//! anything, and never fail because of insufficient funds (use
//! [has_currency](struct.CurrencyCollection.html#method.has_currency) and
//! friends to check first).
//!
//! [registry]: ../../registry/index.html

use crate::{
    error::{Error, Result},
    listener::{CurrencyListener, ListenerId},
    models::{
        amount::CurrencyAmount,
        currency::CurrencyID,
    },
    registry::Currencies,
    system::{self, CurrencyCalculator},
};
use rust_decimal::prelude::*;
use std::fmt;

/// A bundle of currency amounts that notifies listeners when it changes.
pub struct CurrencyCollection {
    amounts: Vec<CurrencyAmount>,
    initialized: bool,
    listeners: Vec<(ListenerId, Box<dyn CurrencyListener>)>,
    next_listener: usize,
}

impl CurrencyCollection {
    /// Create an empty, uninitialized collection
    pub fn new() -> Self {
        Self {
            amounts: Vec::new(),
            initialized: false,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Create a collection holding the given amounts (discretized).
    pub fn with_amounts(currencies: &Currencies, start: &[CurrencyAmount]) -> Result<Self> {
        let mut collection = Self::new();
        collection.initialize(currencies, start, true)?;
        Ok(collection)
    }

    /// Build a collection from entries that are already known to be valid.
    pub(crate) fn from_raw(amounts: Vec<CurrencyAmount>) -> Self {
        let mut collection = Self::new();
        collection.amounts = amounts;
        collection.initialized = true;
        collection
    }

    /// Load the starting amounts. Does nothing if the collection was already
    /// initialized, unless `force` is set. No listeners are notified.
    pub fn initialize(&mut self, currencies: &Currencies, start: &[CurrencyAmount], force: bool) -> Result<()> {
        if self.initialized && !force {
            return Ok(());
        }
        let calc = CurrencyCalculator::new(currencies);
        calc.check_amounts(start)?;
        self.amounts = calc.discretize_amounts(start, Decimal::one());
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register a listener for add/remove notifications.
    pub fn subscribe(&mut self, listener: Box<dyn CurrencyListener>) -> ListenerId {
        let id = ListenerId::new(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener, handing it back if it was subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> Option<Box<dyn CurrencyListener>> {
        let idx = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(idx).1)
    }

    /// Add an amount of a single currency. Returns the discrete amounts that
    /// were added.
    pub fn add_currency(&mut self, currencies: &Currencies, currency: CurrencyID, amount: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked(currencies, currency, amount)?;
        let delta = calc.discretize(currency, amount);
        self.apply_add(&calc, delta)
    }

    /// Add a bundle of amounts, times a multiplier.
    pub fn add_currency_amounts(&mut self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked_bundle(currencies, amounts, multiplier)?;
        let delta = calc.discretize_amounts(amounts, multiplier);
        self.apply_add(&calc, delta)
    }

    /// Add the contents of another collection, times a multiplier.
    pub fn add_collection(&mut self, currencies: &Currencies, other: &CurrencyCollection, multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        self.add_currency_amounts(currencies, &other.amounts, multiplier)
    }

    /// Remove an amount of a single currency. Returns what was actually taken,
    /// which is less than requested when a family runs dry.
    pub fn remove_currency(&mut self, currencies: &Currencies, currency: CurrencyID, amount: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked(currencies, currency, amount)?;
        let delta = calc.discretize(currency, amount);
        self.apply_remove(&calc, delta)
    }

    pub fn remove_currency_amounts(&mut self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked_bundle(currencies, amounts, multiplier)?;
        let delta = calc.discretize_amounts(amounts, multiplier);
        self.apply_remove(&calc, delta)
    }

    pub fn remove_collection(&mut self, currencies: &Currencies, other: &CurrencyCollection, multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        self.remove_currency_amounts(currencies, &other.amounts, multiplier)
    }

    /// Replace everything in the collection with an amount of one currency.
    /// Returns the new holdings.
    pub fn set_currency(&mut self, currencies: &Currencies, currency: CurrencyID, amount: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked(currencies, currency, amount)?;
        let holdings = calc.discretize(currency, amount);
        Ok(self.replace(holdings))
    }

    pub fn set_currency_amounts(&mut self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        let calc = Self::checked_bundle(currencies, amounts, multiplier)?;
        let holdings = calc.discretize_amounts(amounts, multiplier);
        Ok(self.replace(holdings))
    }

    pub fn set_collection(&mut self, currencies: &Currencies, other: &CurrencyCollection, multiplier: Decimal) -> Result<Vec<CurrencyAmount>> {
        self.set_currency_amounts(currencies, &other.amounts, multiplier)
    }

    /// Empty the collection, returning what it held.
    pub fn remove_all(&mut self) -> Vec<CurrencyAmount> {
        let previous = std::mem::replace(&mut self.amounts, Vec::new());
        self.notify_remove(&previous);
        previous
    }

    /// How much of a currency this collection holds in its own entry
    pub fn amount_of(&self, currency: CurrencyID) -> i64 {
        system::find_index(&self.amounts, currency)
            .map(|idx| self.amounts[idx].amount())
            .unwrap_or(0)
    }

    pub fn currency_amounts(&self) -> &[CurrencyAmount] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CurrencyAmount> {
        self.amounts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyAmount> {
        self.amounts.iter()
    }

    /// The value of everything held in the given currency's family, in root
    /// units.
    pub fn full_amount_as_root(&self, currencies: &Currencies, currency: CurrencyID) -> u64 {
        CurrencyCalculator::new(currencies).full_amount_as_root(&self.amounts, currency)
    }

    /// How many times the given bundle fits into this collection.
    pub fn potential_quotient_for(&self, currencies: &Currencies, amounts: &[CurrencyAmount]) -> u64 {
        CurrencyCalculator::new(currencies).quotient(&self.amounts, amounts)
    }

    pub fn potential_quotient_for_collection(&self, currencies: &Currencies, other: &CurrencyCollection) -> u64 {
        self.potential_quotient_for(currencies, &other.amounts)
    }

    /// Whether the collection can cover an amount of a currency. Unknown
    /// currencies and negative amounts are never covered.
    pub fn has_currency(&self, currencies: &Currencies, currency: CurrencyID, amount: Decimal) -> bool {
        let calc = match Self::checked(currencies, currency, amount) {
            Ok(calc) => calc,
            Err(_) => return false,
        };
        let wanted = calc.discretize(currency, amount);
        calc.quotient(&self.amounts, &wanted) >= 1
    }

    pub fn has_currency_amounts(&self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> bool {
        self.greater_than_or_equal_to(currencies, amounts, multiplier)
    }

    pub fn has_collection(&self, currencies: &Currencies, other: &CurrencyCollection, multiplier: Decimal) -> bool {
        self.has_currency_amounts(currencies, &other.amounts, multiplier)
    }

    /// Whether this collection is worth the same as a bundle (times a
    /// multiplier) in every family either side holds.
    pub fn equivalent_to(&self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> bool {
        match Self::checked_bundle(currencies, amounts, multiplier) {
            Ok(calc) => calc.equivalent_with(&self.amounts, Decimal::one(), amounts, multiplier),
            Err(_) => false,
        }
    }

    pub fn equivalent_to_collection(&self, currencies: &Currencies, other: &CurrencyCollection, multiplier: Decimal) -> bool {
        self.equivalent_to(currencies, &other.amounts, multiplier)
    }

    /// Whether the collection covers a bundle (times a multiplier). A bundle
    /// with unknown currencies or negative amounts is never covered.
    pub fn greater_than_or_equal_to(&self, currencies: &Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> bool {
        match Self::checked_bundle(currencies, amounts, multiplier) {
            Ok(calc) => calc.greater_than_or_equal_to(&self.amounts, Decimal::one(), amounts, multiplier),
            Err(_) => false,
        }
    }

    fn checked(currencies: &Currencies, currency: CurrencyID, amount: Decimal) -> Result<CurrencyCalculator<'_>> {
        currencies.lookup(currency)?;
        if amount < Decimal::zero() {
            Err(Error::NegativeAmount)?;
        }
        Ok(CurrencyCalculator::new(currencies))
    }

    fn checked_bundle<'a>(currencies: &'a Currencies, amounts: &[CurrencyAmount], multiplier: Decimal) -> Result<CurrencyCalculator<'a>> {
        let calc = CurrencyCalculator::new(currencies);
        calc.check_amounts(amounts)?;
        if multiplier < Decimal::zero() {
            Err(Error::NegativeMultiplier)?;
        }
        Ok(calc)
    }

    fn apply_add(&mut self, calc: &CurrencyCalculator, delta: Vec<CurrencyAmount>) -> Result<Vec<CurrencyAmount>> {
        let mut amounts = calc.discrete_addition(&self.amounts, &delta);
        system::dezero(&mut amounts);
        self.amounts = amounts;
        self.notify_add(&delta);
        Ok(delta)
    }

    fn apply_remove(&mut self, calc: &CurrencyCalculator, requested: Vec<CurrencyAmount>) -> Result<Vec<CurrencyAmount>> {
        let delta = Self::clip_removal(calc, &self.amounts, &requested);
        self.amounts = calc.discrete_subtraction(&self.amounts, &requested);
        self.notify_remove(&delta);
        Ok(delta)
    }

    /// Families that can't cover their part of a removal are emptied, so what
    /// they actually lose is everything they held.
    fn clip_removal(calc: &CurrencyCalculator, before: &[CurrencyAmount], requested: &[CurrencyAmount]) -> Vec<CurrencyAmount> {
        let currencies = calc.currencies();
        let mut delta = Vec::new();
        for (root, need) in calc.root_totals(requested) {
            let source = if calc.full_amount_as_root(before, root) < need { before } else { requested };
            delta.extend(
                source.iter()
                    .filter(|a| a.amount() > 0 && currencies.root_of(a.currency()).ok() == Some(root))
            );
        }
        delta
    }

    fn replace(&mut self, holdings: Vec<CurrencyAmount>) -> Vec<CurrencyAmount> {
        let previous = std::mem::replace(&mut self.amounts, holdings.clone());
        self.notify_remove(&previous);
        self.notify_add(&holdings);
        holdings
    }

    fn notify_add(&mut self, delta: &[CurrencyAmount]) {
        if delta.is_empty() {
            return;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_add(delta);
        }
    }

    fn notify_remove(&mut self, delta: &[CurrencyAmount]) {
        if delta.is_empty() {
            return;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_remove(delta);
        }
    }
}

impl Default for CurrencyCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CurrencyCollection {
    fn clone(&self) -> Self {
        Self {
            amounts: self.amounts.clone(),
            initialized: self.initialized,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }
}

impl PartialEq for CurrencyCollection {
    fn eq(&self, other: &Self) -> bool {
        self.amounts == other.amounts
    }
}

impl fmt::Debug for CurrencyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyCollection")
            .field("amounts", &self.amounts)
            .field("initialized", &self.initialized)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl fmt::Display for CurrencyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.amounts.iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", entries.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::*;
    use proptest::prelude::*;

    #[test]
    fn can_initialize() {
        let dollars = make_dollars();
        let mut collection = CurrencyCollection::new();
        assert!(!collection.is_initialized());
        collection.initialize(&dollars.currencies, &amounts(&[(dollars.cent, 150)]), false).unwrap();
        assert!(collection.is_initialized());
        assert_eq!(collection.currency_amounts(), &amounts(&[(dollars.dollar, 1), (dollars.cent, 50)])[..]);

        // already initialized, so nothing happens
        collection.initialize(&dollars.currencies, &amounts(&[(dollars.cent, 5)]), false).unwrap();
        assert_eq!(collection.amount_of(dollars.cent), 50);
        collection.initialize(&dollars.currencies, &amounts(&[(dollars.cent, 5)]), true).unwrap();
        assert_eq!(collection.currency_amounts(), &amounts(&[(dollars.cent, 5)])[..]);

        let res = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.cent, -5)]));
        assert_eq!(res, Err(Error::NegativeAmount));
    }

    #[test]
    fn add_carries_and_notifies() {
        let dollars = make_dollars();
        let mut collection = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.cent, 50)])).unwrap();
        let (listener, notices) = make_recorder();
        collection.subscribe(listener);

        let delta = collection.add_currency(&dollars.currencies, dollars.cent, num!(60)).unwrap();
        assert_eq!(delta, amounts(&[(dollars.cent, 60)]));
        assert_eq!(collection.amount_of(dollars.dollar), 1);
        assert_eq!(collection.amount_of(dollars.cent), 10);
        assert_eq!(collection.len(), 2);
        assert_eq!(notices.borrow().clone(), vec![Notice::Added(amounts(&[(dollars.cent, 60)]))]);

        // carrying down to zero cents drops the entry
        collection.add_currency(&dollars.currencies, dollars.dollar, num!(0.9)).unwrap();
        assert_eq!(collection.currency_amounts(), &amounts(&[(dollars.dollar, 2)])[..]);

        // nothing to add, nothing to tell
        let delta = collection.add_currency(&dollars.currencies, dollars.cent, num!(0)).unwrap();
        assert_eq!(delta, Vec::<CurrencyAmount>::new());
        assert_eq!(notices.borrow().len(), 2);
    }

    #[test]
    fn rejects_bad_input_without_changes() {
        let dollars = make_dollars();
        let mut collection = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.dollar, 2)])).unwrap();
        let (listener, notices) = make_recorder();
        collection.subscribe(listener);
        let missing = CurrencyID::new(999);

        assert_eq!(collection.add_currency(&dollars.currencies, dollars.cent, num!(-1)), Err(Error::NegativeAmount));
        assert_eq!(collection.add_currency(&dollars.currencies, missing, num!(1)), Err(Error::UnknownCurrency(missing)));
        assert_eq!(collection.remove_currency(&dollars.currencies, dollars.cent, num!(-1)), Err(Error::NegativeAmount));
        assert_eq!(collection.set_currency(&dollars.currencies, missing, num!(1)), Err(Error::UnknownCurrency(missing)));
        let bundle = amounts(&[(dollars.cent, 5)]);
        assert_eq!(collection.add_currency_amounts(&dollars.currencies, &bundle, num!(-1)), Err(Error::NegativeMultiplier));
        assert_eq!(collection.remove_currency_amounts(&dollars.currencies, &amounts(&[(dollars.cent, -5)]), num!(1)), Err(Error::NegativeAmount));
        assert_eq!(collection.set_currency_amounts(&dollars.currencies, &amounts(&[(missing, 5)]), num!(1)), Err(Error::UnknownCurrency(missing)));

        assert_eq!(collection.currency_amounts(), &amounts(&[(dollars.dollar, 2)])[..]);
        assert_eq!(notices.borrow().len(), 0);
    }

    #[test]
    fn bad_queries_are_never_covered() {
        let dollars = make_dollars();
        let empty = CurrencyCollection::new();
        let missing = CurrencyID::new(999);
        assert!(!empty.has_currency(&dollars.currencies, missing, num!(5)));
        assert!(!empty.has_currency(&dollars.currencies, dollars.dollar, num!(-5)));
        assert!(empty.has_currency(&dollars.currencies, dollars.dollar, num!(0)));
        assert!(!empty.has_currency_amounts(&dollars.currencies, &amounts(&[(missing, 5)]), num!(1)));
        assert!(!empty.has_currency_amounts(&dollars.currencies, &amounts(&[(dollars.cent, 5)]), num!(-1)));
        assert!(!empty.equivalent_to(&dollars.currencies, &amounts(&[(missing, 5)]), num!(1)));
        assert!(empty.equivalent_to(&dollars.currencies, &[], num!(1)));
    }

    #[test]
    fn remove_reports_what_was_taken() {
        let dollars = make_dollars();
        let mut collection = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.dollar, 3)])).unwrap();
        let (listener, notices) = make_recorder();
        collection.subscribe(listener);

        let delta = collection.remove_currency(&dollars.currencies, dollars.cent, num!(60)).unwrap();
        assert_eq!(delta, amounts(&[(dollars.cent, 60)]));
        assert_eq!(collection.amount_of(dollars.dollar), 2);
        assert_eq!(collection.amount_of(dollars.cent), 40);

        let delta = collection.remove_currency(&dollars.currencies, dollars.dollar, num!(5)).unwrap();
        assert_eq!(delta, amounts(&[(dollars.dollar, 2), (dollars.cent, 40)]));
        assert!(collection.is_empty());
        assert_eq!(notices.borrow().clone(), vec![
            Notice::Removed(amounts(&[(dollars.cent, 60)])),
            Notice::Removed(amounts(&[(dollars.dollar, 2), (dollars.cent, 40)])),
        ]);
    }

    #[test]
    fn remove_borrows_from_fraction_owner() {
        let coins = make_silver_gold();
        let start = amounts(&[(coins.gold, 1), (coins.silver, 0)]);
        let mut collection = CurrencyCollection::with_amounts(&coins.currencies, &start).unwrap();
        let delta = collection.remove_currency(&coins.currencies, coins.silver, num!(150)).unwrap();
        assert_eq!(collection.amount_of(coins.gold), 0);
        assert_eq!(collection.amount_of(coins.silver), 0);
        assert!(collection.iter().all(|a| a.amount() >= 0));
        assert_eq!(delta, amounts(&[(coins.gold, 1)]));

        let mut collection = CurrencyCollection::with_amounts(&coins.currencies, &amounts(&[(coins.gold, 3)])).unwrap();
        collection.remove_currency(&coins.currencies, coins.silver, num!(150)).unwrap();
        assert_eq!(collection.amount_of(coins.gold), 1);
        assert_eq!(collection.amount_of(coins.silver), 50);
    }

    #[test]
    fn remove_leaves_other_families_alone() {
        let coins = make_coins();
        let start = amounts(&[(coins.gem, 4), (coins.silver, 20)]);
        let mut collection = CurrencyCollection::with_amounts(&coins.currencies, &start).unwrap();
        let delta = collection.remove_currency_amounts(&coins.currencies, &amounts(&[(coins.gem, 1), (coins.gold, 1)]), num!(1)).unwrap();
        // gems cover the request, the copper family can't and is emptied
        assert_eq!(delta, amounts(&[(coins.gem, 1), (coins.silver, 20)]));
        assert_eq!(collection.currency_amounts(), &amounts(&[(coins.gem, 3)])[..]);
    }

    #[test]
    fn liquidation_keeps_the_change() {
        let mut currencies = Currencies::new();
        let a = currencies.create("a", None, num!(1)).unwrap();
        let b = currencies.create("b", Some(a), num!(3)).unwrap();
        let c = currencies.create("c", Some(a), num!(2)).unwrap();
        let mut collection = CurrencyCollection::with_amounts(&currencies, &amounts(&[(b, 1)])).unwrap();
        let delta = collection.remove_currency(&currencies, c, num!(1)).unwrap();
        assert_eq!(delta, amounts(&[(c, 1)]));
        assert_eq!(collection.currency_amounts(), &amounts(&[(a, 1)])[..]);
        assert_eq!(collection.full_amount_as_root(&currencies, a), 1);
    }

    #[test]
    fn set_replaces_everything() {
        let coins = make_coins();
        let mut collection = CurrencyCollection::with_amounts(&coins.currencies, &amounts(&[(coins.gem, 4)])).unwrap();
        let (listener, notices) = make_recorder();
        let id = collection.subscribe(listener);

        let added = collection.set_currency(&coins.currencies, coins.silver, num!(1.5)).unwrap();
        assert_eq!(added, amounts(&[(coins.silver, 1), (coins.copper, 50)]));
        assert_eq!(collection.currency_amounts(), &added[..]);
        assert_eq!(notices.borrow().clone(), vec![
            Notice::Removed(amounts(&[(coins.gem, 4)])),
            Notice::Added(amounts(&[(coins.silver, 1), (coins.copper, 50)])),
        ]);

        let other = CurrencyCollection::with_amounts(&coins.currencies, &amounts(&[(coins.gold, 2)])).unwrap();
        collection.set_collection(&coins.currencies, &other, num!(2)).unwrap();
        assert_eq!(collection.currency_amounts(), &amounts(&[(coins.gold, 4)])[..]);
        assert_eq!(notices.borrow().len(), 4);

        assert!(collection.unsubscribe(id).is_some());
        assert!(collection.unsubscribe(id).is_none());
        assert_eq!(collection.remove_all(), amounts(&[(coins.gold, 4)]));
        assert!(collection.is_empty());
        assert_eq!(notices.borrow().len(), 4);
    }

    #[test]
    fn collections_combine() {
        let dollars = make_dollars();
        let mut wallet = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.dollar, 1)])).unwrap();
        let price = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.cent, 30)])).unwrap();
        wallet.add_collection(&dollars.currencies, &price, num!(4)).unwrap();
        assert_eq!(wallet.amount_of(dollars.dollar), 2);
        assert_eq!(wallet.amount_of(dollars.cent), 20);
        assert_eq!(wallet.potential_quotient_for_collection(&dollars.currencies, &price), 7);
        assert!(wallet.has_collection(&dollars.currencies, &price, num!(7)));
        assert!(!wallet.has_collection(&dollars.currencies, &price, num!(8)));
        wallet.remove_collection(&dollars.currencies, &price, num!(2)).unwrap();
        assert_eq!(wallet.full_amount_as_root(&dollars.currencies, dollars.dollar), 160);
        assert!(wallet.equivalent_to(&dollars.currencies, &amounts(&[(dollars.cent, 80)]), num!(2)));
        assert!(!wallet.equivalent_to_collection(&dollars.currencies, &price, num!(5.333333333)));
        assert!(wallet.has_currency(&dollars.currencies, dollars.dollar, num!(1.6)));
        assert!(!wallet.has_currency(&dollars.currencies, dollars.dollar, num!(1.61)));
        assert!(wallet.has_currency_amounts(&dollars.currencies, &amounts(&[(dollars.cent, 40)]), num!(4)));
        assert_eq!(wallet.get(0), Some(&CurrencyAmount::new(dollars.dollar, 1)));
        assert_eq!(wallet.get(5), None);
    }

    #[test]
    fn clones_without_listeners() {
        let dollars = make_dollars();
        let mut collection = CurrencyCollection::with_amounts(&dollars.currencies, &amounts(&[(dollars.dollar, 1)])).unwrap();
        let (listener, notices) = make_recorder();
        collection.subscribe(listener);
        let mut copy = collection.clone();
        assert_eq!(copy, collection);
        copy.add_currency(&dollars.currencies, dollars.cent, num!(5)).unwrap();
        assert!(copy != collection);
        assert_eq!(notices.borrow().len(), 0);
        assert_eq!(format!("{}", copy), format!("1 {} 5 {}", dollars.dollar, dollars.cent));
    }

    proptest! {
        #[test]
        fn has_currency_matches_quotient(held in 0u64..2_000_000, wanted in 0u64..2_000_000) {
            let coins = make_coins();
            let currencies = &coins.currencies;
            let collection = CurrencyCollection::with_amounts(currencies, &amounts(&[(coins.copper, held as i64)])).unwrap();
            let calc = CurrencyCalculator::new(currencies);
            let bundle = calc.discretize(coins.copper, Decimal::from(wanted));
            let has = collection.has_currency(currencies, coins.copper, Decimal::from(wanted));
            prop_assert_eq!(has, collection.potential_quotient_for(currencies, &bundle) >= 1);
            prop_assert_eq!(has, held >= wanted);
        }

        #[test]
        fn collections_agree_on_equivalence(a in 0u64..2_000_000, b in 0u64..2_000_000) {
            let coins = make_coins();
            let currencies = &coins.currencies;
            let lhs = CurrencyCollection::with_amounts(currencies, &amounts(&[(coins.copper, a as i64)])).unwrap();
            let rhs = CurrencyCollection::with_amounts(currencies, &amounts(&[(coins.silver, (b / 100) as i64), (coins.copper, (b % 100) as i64)])).unwrap();
            let there = lhs.equivalent_to_collection(currencies, &rhs, num!(1));
            let back = rhs.equivalent_to_collection(currencies, &lhs, num!(1));
            prop_assert_eq!(there, back);
            prop_assert_eq!(there, a == b);
        }
    }
}
