//! Species Lookup Service Library
//!
//! Request pipeline for the species lookup service: per-instance admission
//! control in front of a cache-aside read path over Redis and SQLite.

pub mod admission;
pub mod config;
pub mod error;
pub mod lookup;
pub mod pipeline;
pub mod server;
pub mod types;

pub use admission::{Admission, AdmissionController};
pub use config::Config;
pub use error::{Result, ServiceError};
pub use lookup::{LookupError, LookupResult, SpeciesLookup};
pub use pipeline::{Outcome, Pipeline, PipelineResponse};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::*;
