//! Résumé analyses: the kind catalog, prompt building, the run pipeline and
//! its HTTP handlers.

pub mod catalog;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use catalog::AnalysisKind;
