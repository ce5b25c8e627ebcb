//! Listeners get told about every change a collection actually applies.
//!
//! The amounts passed to a listener are the discrete delta: what was really
//! added or taken, not what the caller asked for.

use crate::models::amount::CurrencyAmount;

/// Identifies a listener subscribed to a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }
}

/// Receives add/remove notifications from a collection. Both methods default
/// to doing nothing.
pub trait CurrencyListener {
    /// Called after amounts were added to a collection
    fn on_add(&mut self, _amounts: &[CurrencyAmount]) {}

    /// Called after amounts were removed from a collection
    fn on_remove(&mut self, _amounts: &[CurrencyAmount]) {}
}
