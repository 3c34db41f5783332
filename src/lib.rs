//! proforma: price list search and proforma invoice builder
//!
//! Loads a price list, finds rows by fuzzy description or identifier
//! substring, collects them into an order list and fills a spreadsheet
//! invoice template with the lines and totals.

pub mod cli;
pub mod core;
