//! personabot: replies to Reddit mentions with a personality summary.
//!
//! The bot polls its mention inbox, fetches the mentioned user's recent
//! comments, sends them to a personality-analysis service and answers with a
//! narrative built from static phrase tables.

pub mod analysis;
pub mod config;
pub mod error;
pub mod narrative;
pub mod platform;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{Error, Result};
