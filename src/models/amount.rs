//! A currency amount is an immutable pairing of a currency and a whole number
//! of units of that currency.

use crate::models::currency::CurrencyID;
use getset::CopyGetters;
#[cfg(feature = "with_serde")]
use serde_derive::{Serialize, Deserialize};
use std::fmt;

/// A (currency, amount) pair. Equality is value equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, CopyGetters)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[getset(get_copy = "pub")]
pub struct CurrencyAmount {
    /// The currency being counted
    currency: CurrencyID,
    /// How many units of the currency
    amount: i64,
}

impl CurrencyAmount {
    pub fn new(currency: CurrencyID, amount: i64) -> Self {
        Self { currency, amount }
    }

    /// Return a copy of this amount with a different count
    pub fn with_amount(&self, amount: i64) -> Self {
        Self::new(self.currency, amount)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl From<(CurrencyID, i64)> for CurrencyAmount {
    fn from(pair: (CurrencyID, i64)) -> Self {
        Self::new(pair.0, pair.1)
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_equality() {
        let id = CurrencyID::new(3);
        let amount1 = CurrencyAmount::new(id, 50);
        let amount2: CurrencyAmount = (id, 50).into();
        assert_eq!(amount1, amount2);
        assert!(amount1 != amount1.with_amount(51));
        assert!(amount1.with_amount(0).is_zero());
        assert_eq!(format!("{}", amount1), "50 #3");
    }
}
