//! Snapshots of registries and collections.
//!
//! These are plain data: every field is public and (with the `with_serde`
//! feature) serializable, so the caller picks the storage format. Loading a
//! snapshot validates it, so a registry can never be rebuilt into a state the
//! setters would have refused.

use crate::{
    error::{Error, Result},
    models::{
        amount::CurrencyAmount,
        collection::CurrencyCollection,
        currency::{Currency, CurrencyID},
    },
    registry::{Currencies, IdSource, SequentialIds},
    system::CurrencyCalculator,
};
use rust_decimal::prelude::*;
#[cfg(feature = "with_serde")]
use serde_derive::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};

/// A single currency record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct CurrencyData {
    pub id: CurrencyID,
    pub name: String,
    pub parent: Option<CurrencyID>,
    pub exchange_rate_to_parent: Decimal,
    pub children: Vec<CurrencyID>,
    pub max_amount: i64,
    pub overflow_currency: Option<CurrencyID>,
    pub fraction_currency: Option<CurrencyID>,
}

/// Every currency in a registry, in creation order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct CurrenciesData {
    pub currencies: Vec<CurrencyData>,
}

/// The entries of a collection.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct CollectionData {
    pub amounts: Vec<CurrencyAmount>,
}

impl From<&Currency> for CurrencyData {
    fn from(currency: &Currency) -> Self {
        Self {
            id: currency.id(),
            name: currency.name().clone(),
            parent: currency.parent(),
            exchange_rate_to_parent: currency.exchange_rate_to_parent(),
            children: currency.children().clone(),
            max_amount: currency.max_amount(),
            overflow_currency: currency.overflow_currency(),
            fraction_currency: currency.fraction_currency(),
        }
    }
}

impl Currencies {
    /// Snapshot every currency record.
    pub fn serialize(&self) -> CurrenciesData {
        CurrenciesData {
            currencies: self.iter().map(CurrencyData::from).collect(),
        }
    }

    /// Rebuild a registry from a snapshot. New IDs continue after the highest
    /// ID in the snapshot.
    pub fn deserialize(data: CurrenciesData) -> Result<Self> {
        let next = data.currencies.iter()
            .map(|c| c.id.value())
            .max()
            .map(|max| max.saturating_add(1))
            .unwrap_or(1);
        Self::deserialize_with_id_source(data, Box::new(SequentialIds::starting_at(next)))
    }

    /// Rebuild a registry from a snapshot, pulling new IDs from the given
    /// source.
    pub fn deserialize_with_id_source(data: CurrenciesData, ids: Box<dyn IdSource>) -> Result<Self> {
        let mut by_id: HashMap<CurrencyID, &CurrencyData> = HashMap::new();
        let mut names = HashSet::new();
        for record in &data.currencies {
            if by_id.insert(record.id, record).is_some() {
                Err(Error::DuplicateCurrencyId(record.id))?;
            }
            if record.name.trim().is_empty() {
                Err(Error::EmptyName)?;
            }
            if !names.insert(record.name.clone()) {
                Err(Error::DuplicateCurrencyName(record.name.clone()))?;
            }
            if record.max_amount < 1 {
                Err(Error::InvalidMaxAmount(record.max_amount))?;
            }
            let rate = record.exchange_rate_to_parent;
            if (record.parent.is_some() && rate <= Decimal::one()) || (record.parent.is_none() && rate != Decimal::one()) {
                Err(Error::InvalidExchangeRate(rate))?;
            }
        }

        // every link has to resolve before any chain gets walked
        for record in &data.currencies {
            for link in [record.parent, record.overflow_currency, record.fraction_currency].iter().flatten() {
                if !by_id.contains_key(link) {
                    Err(Error::InconsistentHierarchy(format!("{} links to missing currency {}", record.id, link)))?;
                }
            }
        }

        let record_of = |id: CurrencyID| {
            by_id.get(&id)
                .copied()
                .ok_or_else(|| Error::InconsistentHierarchy(format!("missing currency {}", id)))
        };
        for record in &data.currencies {
            if let Some(parent) = record.parent {
                if !record_of(parent)?.children.contains(&record.id) {
                    Err(Error::InconsistentHierarchy(format!("{} is missing from the children of {}", record.id, parent)))?;
                }
            }
            let mut seen = HashSet::new();
            for child in &record.children {
                if !seen.insert(*child) {
                    Err(Error::InconsistentHierarchy(format!("{} lists child {} twice", record.id, child)))?;
                }
                match by_id.get(child) {
                    Some(c) if c.parent == Some(record.id) => {}
                    _ => Err(Error::InconsistentHierarchy(format!("{} lists {} as a child, but is not its parent", record.id, child)))?,
                }
            }
            // walking up from any record has to end within the number of records
            let mut current = record.parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if parent == record.id || steps > data.currencies.len() {
                    Err(Error::InconsistentHierarchy(format!("{} is its own ancestor", record.id)))?;
                }
                current = record_of(parent)?.parent;
            }
        }

        let records = data.currencies.iter()
            .map(|record| {
                let mut currency = Currency::new(record.id, record.name.clone(), record.exchange_rate_to_parent, record.max_amount);
                currency
                    .set_parent(record.parent)
                    .set_overflow_currency(record.overflow_currency)
                    .set_fraction_currency(record.fraction_currency);
                currency.children_mut().extend(record.children.iter());
                currency
            })
            .collect::<Vec<_>>();
        let currencies = Self::from_records(records, ids);
        for record in &data.currencies {
            currencies.check_overflow_currency(record.id, record.overflow_currency)?;
            currencies.check_fraction_currency(record.id, record.fraction_currency)?;
        }
        Ok(currencies)
    }
}

impl CurrencyCollection {
    /// Snapshot the collection's entries.
    pub fn serialize(&self) -> CollectionData {
        CollectionData {
            amounts: self.currency_amounts().to_vec(),
        }
    }

    /// Rebuild a collection from a snapshot. Entries are kept exactly as they
    /// were saved (minus empty ones), no discretization happens, so every
    /// entry has to fit within its currency's max amount.
    pub fn deserialize(currencies: &Currencies, data: CollectionData) -> Result<Self> {
        CurrencyCalculator::new(currencies).check_amounts(&data.amounts)?;
        let mut seen = HashSet::new();
        for amount in &data.amounts {
            if !seen.insert(amount.currency()) {
                Err(Error::InconsistentHierarchy(format!("collection holds {} more than once", amount.currency())))?;
            }
            if amount.amount() > currencies.lookup(amount.currency())?.max_amount() {
                Err(Error::ExceedsMaxAmount(amount.currency(), amount.amount()))?;
            }
        }
        let amounts = data.amounts.into_iter()
            .filter(|a| !a.is_zero())
            .collect::<Vec<_>>();
        Ok(Self::from_raw(amounts))
    }
}
