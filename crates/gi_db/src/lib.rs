//! Postgres pool construction, schema migration, and the claim/update
//! queries shared by the Evaluation Service and the Sandbox Service —
//! both entities live in one relational store (spec §3).

pub mod analyses;
pub mod candidates;
pub mod error;
pub mod models;
pub mod pool;
pub mod samples;
pub mod schema;
pub mod tags;

pub use error::{DbError, Result};
pub use models::{Analysis, Candidate, Sample};
pub use pool::{init_pool, DbPool};
