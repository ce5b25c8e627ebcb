//! Models are the data structures the engine works on: currencies, the amounts
//! counted in them, and the collections that hold those amounts.

pub mod currency;
pub mod amount;
pub mod collection;
