//! A set of utility functions used by the currency engine.

#[macro_use]
pub mod number;
