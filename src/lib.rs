//! Loan, debt, growth, tax and Social Security calculators with a JSON HTTP
//! front end.

pub mod api;
pub mod core;
pub mod error;
pub mod logging;
