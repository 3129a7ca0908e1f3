//! Classification Scheduler (spec §4.4): polls matured Analyses,
//! tokenizes their reports with the tokenizer ported from
//! `genetic_improvement/monitor.py`, and fuses F3 through the narrow
//! `Classifier` contract (spec §9) whose trained-model implementation
//! is external to this crate.

pub mod app;
pub mod classifier;
pub mod scheduler;
pub mod tokenizer;

pub use app::router;
pub use classifier::{load_classifier, ClassifyError, Classifier, SignatureClassifier, WeightedKeywordClassifier};
pub use scheduler::Scheduler;
pub use tokenizer::{mal_tokenizer, preprocess_report, ReportError};
