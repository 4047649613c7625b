//! Core pipeline orchestration and stage logic for Inkflow.
//!
//! This crate ties the hosted model, the research agent, and the artifact
//! store together into the three stages (ideas → research → article) and the
//! end-to-end `run_pipeline` workflow.

pub mod ideas;
pub mod pipeline;
pub mod research;
pub mod tone;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;
