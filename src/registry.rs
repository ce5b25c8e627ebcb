//! The registry is the arena that owns every currency record.
//!
//! Currencies link to each other by [CurrencyID] only, so all link changes go
//! through the registry where they can be validated against the rest of the
//! forest. Any setter that fails leaves the registry exactly as it was.
//!
//! [CurrencyID]: ../models/currency/struct.CurrencyID.html

use crate::{
    error::{Error, Result},
    models::{
        amount::CurrencyAmount,
        currency::{Currency, CurrencyExchangeRate, CurrencyID, CurrencyOptions},
    },
    util::number,
};
use rust_decimal::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Hands out IDs for newly-created currencies.
pub trait IdSource {
    /// Grab the next available ID
    fn next_id(&mut self) -> CurrencyID;
}

/// The default ID source, which counts upward.
#[derive(Clone, Debug, PartialEq)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> CurrencyID {
        let id = CurrencyID::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Owns all currency records, plus the name index used to resolve them.
pub struct Currencies {
    records: Vec<Currency>,
    index: HashMap<CurrencyID, usize>,
    names: HashMap<String, CurrencyID>,
    ids: Box<dyn IdSource>,
}

impl fmt::Debug for Currencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Currencies")
            .field("records", &self.records)
            .finish()
    }
}

impl Default for Currencies {
    fn default() -> Self {
        Self::new()
    }
}

impl Currencies {
    /// Create an empty registry using sequential IDs.
    pub fn new() -> Self {
        Self::with_id_source(Box::new(SequentialIds::new()))
    }

    /// Create an empty registry that pulls IDs from the given source.
    pub fn with_id_source(ids: Box<dyn IdSource>) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            names: HashMap::new(),
            ids,
        }
    }

    /// Build a registry from records that have already been validated.
    pub(crate) fn from_records(records: Vec<Currency>, ids: Box<dyn IdSource>) -> Self {
        let index = records.iter().enumerate().map(|(i, c)| (c.id(), i)).collect::<HashMap<_, _>>();
        let names = records.iter().map(|c| (c.name().clone(), c.id())).collect::<HashMap<_, _>>();
        Self { records, index, names, ids }
    }

    /// Create a currency with the given name, optionally linked to a parent.
    pub fn create<T: Into<String>>(&mut self, name: T, parent: Option<CurrencyID>, exchange_rate_to_parent: Decimal) -> Result<CurrencyID> {
        let mut builder = CurrencyOptions::builder()
            .name(name.into())
            .exchange_rate_to_parent(exchange_rate_to_parent);
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }
        let options = builder.build()
            .map_err(|e| Error::BuilderFailed(e))?;
        self.create_with(options)
    }

    /// Create a currency from a full set of options. Nothing is registered
    /// unless every option is valid.
    pub fn create_with(&mut self, options: CurrencyOptions) -> Result<CurrencyID> {
        let name = options.name().clone();
        if name.trim().is_empty() {
            Err(Error::EmptyName)?;
        }
        if self.names.contains_key(&name) {
            return Err(Error::DuplicateCurrencyName(name));
        }
        Self::check_max(options.max_amount())?;
        let rate = match options.parent() {
            Some(parent) => {
                self.lookup(parent)?;
                Self::check_rate(Some(parent), options.exchange_rate_to_parent())?;
                options.exchange_rate_to_parent()
            }
            None => {
                Self::check_rate(None, options.exchange_rate_to_parent())?;
                Decimal::one()
            }
        };

        let id = self.ids.next_id();
        if self.index.contains_key(&id) {
            Err(Error::DuplicateCurrencyId(id))?;
        }
        // where the new currency would sit in the forest
        let projected = match options.parent() {
            Some(parent) => {
                let parent_rate = self.root_exchange_rate(parent)?;
                CurrencyExchangeRate::new(parent_rate.currency(), number::saturating_mul(rate, parent_rate.exchange_rate()))
            }
            None => CurrencyExchangeRate::new(id, Decimal::one()),
        };
        if let Some(overflow) = options.overflow_currency() {
            self.check_link(id, &projected, overflow, true)?;
        }
        if let Some(fraction) = options.fraction_currency() {
            self.check_link(id, &projected, fraction, false)?;
        }

        let mut currency = Currency::new(id, name.clone(), rate, options.max_amount());
        currency.set_parent(options.parent());
        currency.set_overflow_currency(options.overflow_currency());
        currency.set_fraction_currency(options.fraction_currency());
        if let Some(parent) = options.parent() {
            self.lookup_mut(parent)?.children_mut().push(id);
        }
        self.index.insert(id, self.records.len());
        self.names.insert(name, id);
        self.records.push(currency);
        Ok(id)
    }

    /// Get a currency by ID
    pub fn get(&self, id: CurrencyID) -> Option<&Currency> {
        self.index.get(&id).and_then(|idx| self.records.get(*idx))
    }

    /// Find a currency's ID by its name
    pub fn resolve(&self, name: &str) -> Option<CurrencyID> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all currencies in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.records.iter()
    }

    pub(crate) fn lookup(&self, id: CurrencyID) -> Result<&Currency> {
        self.get(id).ok_or(Error::UnknownCurrency(id))
    }

    fn lookup_mut(&mut self, id: CurrencyID) -> Result<&mut Currency> {
        let idx = *self.index.get(&id).ok_or(Error::UnknownCurrency(id))?;
        self.records.get_mut(idx).ok_or(Error::UnknownCurrency(id))
    }

    /// Find the root of the given currency's family
    pub fn root_of(&self, id: CurrencyID) -> Result<CurrencyID> {
        Ok(self.root_exchange_rate(id)?.currency())
    }

    /// Resolve a currency against its root: one unit of `id` is worth the
    /// returned number of root units.
    pub fn root_exchange_rate(&self, id: CurrencyID) -> Result<CurrencyExchangeRate> {
        let mut current = self.lookup(id)?;
        let mut rate = Decimal::one();
        let mut steps = 0;
        while let Some(parent) = current.parent() {
            rate = number::saturating_mul(rate, current.exchange_rate_to_parent());
            current = self.lookup(parent)?;
            steps += 1;
            if steps > self.records.len() {
                Err(Error::ParentCycle)?;
            }
        }
        Ok(CurrencyExchangeRate::new(current.id(), rate))
    }

    /// How many units of `to` one unit of `from` is worth. Returns `None` if
    /// either currency is missing or the two live in different families.
    pub fn exchange_rate_to(&self, from: CurrencyID, to: CurrencyID) -> Option<Decimal> {
        self.get(from)?;
        self.get(to)?;
        self.convert(Decimal::one(), from, to)
    }

    /// Whether or not two currencies share a root
    pub fn is_part_of_family(&self, id: CurrencyID, other: CurrencyID) -> bool {
        match (self.root_of(id), self.root_of(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Every ancestor of a currency, nearest first
    pub fn all_parents(&self, id: CurrencyID, include_self: bool) -> Result<Vec<CurrencyID>> {
        let mut current = self.lookup(id)?;
        let mut parents = Vec::new();
        if include_self {
            parents.push(id);
        }
        while let Some(parent) = current.parent() {
            if parents.len() > self.records.len() {
                Err(Error::ParentCycle)?;
            }
            parents.push(parent);
            current = self.lookup(parent)?;
        }
        Ok(parents)
    }

    /// Every descendant of a currency, depth first
    pub fn all_children(&self, id: CurrencyID, include_self: bool) -> Result<Vec<CurrencyID>> {
        self.lookup(id)?;
        let mut children = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if next != id || include_self {
                children.push(next);
            }
            stack.extend(self.lookup(next)?.children().iter().rev());
        }
        Ok(children)
    }

    /// The root of a currency's family and everything beneath it
    pub fn all_family(&self, id: CurrencyID) -> Result<Vec<CurrencyID>> {
        self.all_children(self.root_of(id)?, true)
    }

    pub fn children_count(&self, id: CurrencyID) -> Result<usize> {
        Ok(self.lookup(id)?.children().len())
    }

    pub fn child_at(&self, id: CurrencyID, index: usize) -> Result<Option<CurrencyID>> {
        Ok(self.lookup(id)?.children().get(index).copied())
    }

    pub fn first_child(&self, id: CurrencyID) -> Result<Option<CurrencyID>> {
        self.child_at(id, 0)
    }

    /// Make sure a parent link is valid without changing anything.
    pub fn check_parent(&self, id: CurrencyID, parent: Option<CurrencyID>) -> Result<()> {
        let currency = self.lookup(id)?;
        self.check_parent_link(id, parent)?;
        let rate = if parent.is_some() { currency.exchange_rate_to_parent() } else { Decimal::one() };
        Self::check_rate(parent, rate)
    }

    /// Move a currency under a new parent (or make it a root with `None`),
    /// keeping its current exchange rate.
    pub fn set_parent(&mut self, id: CurrencyID, parent: Option<CurrencyID>) -> Result<()> {
        self.check_parent(id, parent)?;
        let rate = match parent {
            Some(_) => self.lookup(id)?.exchange_rate_to_parent(),
            None => Decimal::one(),
        };
        self.relink(id, parent, rate)
    }

    pub fn check_parent_with_rate(&self, id: CurrencyID, parent: Option<CurrencyID>, rate: Decimal) -> Result<()> {
        self.lookup(id)?;
        self.check_parent_link(id, parent)?;
        Self::check_rate(parent, rate)
    }

    /// Move a currency under a new parent with a new exchange rate.
    pub fn set_parent_with_rate(&mut self, id: CurrencyID, parent: Option<CurrencyID>, rate: Decimal) -> Result<()> {
        self.check_parent_with_rate(id, parent, rate)?;
        let rate = if parent.is_some() { rate } else { Decimal::one() };
        self.relink(id, parent, rate)
    }

    pub fn check_exchange_rate_to_parent(&self, id: CurrencyID, rate: Decimal) -> Result<()> {
        Self::check_rate(self.lookup(id)?.parent(), rate)
    }

    pub fn set_exchange_rate_to_parent(&mut self, id: CurrencyID, rate: Decimal) -> Result<()> {
        self.check_exchange_rate_to_parent(id, rate)?;
        let parent = self.lookup(id)?.parent();
        self.relink(id, parent, rate)
    }

    pub fn check_overflow_currency(&self, id: CurrencyID, overflow: Option<CurrencyID>) -> Result<()> {
        let rate = self.root_exchange_rate(id)?;
        match overflow {
            Some(overflow) => self.check_link(id, &rate, overflow, true),
            None => Ok(()),
        }
    }

    /// Set the currency that absorbs amounts over this currency's max. `None`
    /// always succeeds and clears the link.
    pub fn set_overflow_currency(&mut self, id: CurrencyID, overflow: Option<CurrencyID>) -> Result<()> {
        self.check_overflow_currency(id, overflow)?;
        self.lookup_mut(id)?.set_overflow_currency(overflow);
        Ok(())
    }

    pub fn check_fraction_currency(&self, id: CurrencyID, fraction: Option<CurrencyID>) -> Result<()> {
        let rate = self.root_exchange_rate(id)?;
        match fraction {
            Some(fraction) => self.check_link(id, &rate, fraction, false),
            None => Ok(()),
        }
    }

    /// Set the currency that absorbs fractional amounts of this currency.
    /// `None` always succeeds and clears the link.
    pub fn set_fraction_currency(&mut self, id: CurrencyID, fraction: Option<CurrencyID>) -> Result<()> {
        self.check_fraction_currency(id, fraction)?;
        self.lookup_mut(id)?.set_fraction_currency(fraction);
        Ok(())
    }

    pub fn check_max_amount(&self, id: CurrencyID, max_amount: i64) -> Result<()> {
        self.lookup(id)?;
        Self::check_max(max_amount)
    }

    pub fn set_max_amount(&mut self, id: CurrencyID, max_amount: i64) -> Result<()> {
        self.check_max_amount(id, max_amount)?;
        self.lookup_mut(id)?.set_max_amount(max_amount);
        Ok(())
    }

    /// Render a bundle of amounts as `"<amount> <name>"` pairs.
    pub fn format_amounts(&self, amounts: &[CurrencyAmount]) -> String {
        amounts.iter()
            .map(|a| {
                match self.get(a.currency()) {
                    Some(currency) => format!("{} {}", a.amount(), currency.name()),
                    None => a.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Convert an amount of one currency into another within the same family,
    /// multiplying before dividing.
    pub(crate) fn convert(&self, amount: Decimal, from: CurrencyID, to: CurrencyID) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.root_exchange_rate(from).ok()?;
        let to_rate = self.root_exchange_rate(to).ok()?;
        if from_rate.currency() != to_rate.currency() {
            return None;
        }
        number::saturating_div(number::saturating_mul(amount, from_rate.exchange_rate()), to_rate.exchange_rate())
    }

    /// A currency followed by its fraction currency, that currency's fraction
    /// currency, and so on.
    pub(crate) fn fraction_chain(&self, id: CurrencyID) -> Vec<CurrencyID> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if chain.contains(&current) {
                break;
            }
            match self.get(current) {
                Some(currency) => {
                    chain.push(current);
                    next = currency.fraction_currency();
                }
                None => break,
            }
        }
        chain
    }

    fn check_rate(parent: Option<CurrencyID>, rate: Decimal) -> Result<()> {
        match parent {
            Some(_) if rate <= Decimal::one() => Err(Error::InvalidExchangeRate(rate)),
            None if rate != Decimal::one() => Err(Error::InvalidExchangeRate(rate)),
            _ => Ok(()),
        }
    }

    fn check_max(max_amount: i64) -> Result<()> {
        if max_amount < 1 {
            Err(Error::InvalidMaxAmount(max_amount))?;
        }
        Ok(())
    }

    fn check_parent_link(&self, id: CurrencyID, parent: Option<CurrencyID>) -> Result<()> {
        let parent = match parent {
            Some(x) => x,
            None => return Ok(()),
        };
        if parent == id {
            Err(Error::SelfReference)?;
        }
        if self.all_parents(parent, true)?.contains(&id) {
            Err(Error::ParentCycle)?;
        }
        Ok(())
    }

    /// Check an overflow (`more_valuable`) or fraction link from a currency
    /// sitting at `subject_rate` to `target`.
    fn check_link(&self, subject: CurrencyID, subject_rate: &CurrencyExchangeRate, target: CurrencyID, more_valuable: bool) -> Result<()> {
        let invalid = |target| {
            if more_valuable {
                Error::InvalidOverflowCurrency(target)
            } else {
                Error::InvalidFractionCurrency(target)
            }
        };
        if target == subject {
            Err(invalid(target))?;
        }
        let target_rate = self.root_exchange_rate(target)?;
        if target_rate.currency() != subject_rate.currency() {
            Err(Error::CrossFamilyLink(subject, target))?;
        }
        let wanted = if more_valuable { Ordering::Greater } else { Ordering::Less };
        if target_rate.exchange_rate().cmp(&subject_rate.exchange_rate()) != wanted {
            Err(invalid(target))?;
        }
        Ok(())
    }

    /// Apply an already-validated parent/rate change, then drop any links in
    /// the affected families that no longer hold.
    fn relink(&mut self, id: CurrencyID, parent: Option<CurrencyID>, rate: Decimal) -> Result<()> {
        let old_root = self.root_of(id)?;
        let old_parent = self.lookup(id)?.parent();
        if old_parent != parent {
            if let Some(old_parent) = old_parent {
                self.lookup_mut(old_parent)?.children_mut().retain(|c| *c != id);
            }
            if let Some(parent) = parent {
                self.lookup_mut(parent)?.children_mut().push(id);
            }
        }
        self.lookup_mut(id)?
            .set_parent(parent)
            .set_exchange_rate_to_parent(rate);
        let new_root = self.root_of(id)?;
        self.revalidate_family(old_root)?;
        if new_root != old_root {
            self.revalidate_family(new_root)?;
        }
        Ok(())
    }

    fn revalidate_family(&mut self, root: CurrencyID) -> Result<()> {
        for id in self.all_children(root, true)? {
            let (overflow, fraction) = {
                let currency = self.lookup(id)?;
                (currency.overflow_currency(), currency.fraction_currency())
            };
            if overflow.is_some() && self.check_overflow_currency(id, overflow).is_err() {
                debug!("Currencies::revalidate_family() -- clearing overflow currency of {}", id);
                self.lookup_mut(id)?.set_overflow_currency(None);
            }
            if fraction.is_some() && self.check_fraction_currency(id, fraction).is_err() {
                debug!("Currencies::revalidate_family() -- clearing fraction currency of {}", id);
                self.lookup_mut(id)?.set_fraction_currency(None);
            }
        }
        Ok(())
    }
}
