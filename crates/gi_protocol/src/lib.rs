//! Shared wire types for the GI evaluation pipeline: the JSON config
//! schema, the Candidate/Analysis status enums, the fitness formulas,
//! the HTTP header name constants, and the structured error taxonomy.
//!
//! Every binary (`gi_eval_service`, `gi_sandbox_service`, `gi_classifier`)
//! depends on this crate instead of redefining these contracts.

pub mod config;
pub mod dto;
pub mod error;
pub mod fitness;
pub mod headers;
pub mod status;

pub use config::{Config, ConfigError, VmConfig, VmProvider};
pub use error::ApiError;
pub use fitness::FitnessWeights;
pub use status::{AnalysisStatus, CandidateStatus, InvalidStatus};
