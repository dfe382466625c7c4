//! Tooling around the species lookup service
//!
//! - [`generate`]: random seed files for the store
//! - [`load`]: concurrent clients that record every response to a log
//! - [`summary`]: aggregate statistics over such a log

pub mod error;
pub mod generate;
pub mod load;
pub mod log;
pub mod summary;

pub use error::{LoadgenError, Result};
