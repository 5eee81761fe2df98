//! Helper functions shared across the crate

pub mod date;
pub mod url;
