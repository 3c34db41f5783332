//! CLI command implementations

pub mod utils;

pub mod cart;
pub mod catalog;
pub mod completions;
pub mod config;
pub mod export;
pub mod init;
pub mod search;
pub mod template;
