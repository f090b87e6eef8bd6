pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod store;
pub mod telegram;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
