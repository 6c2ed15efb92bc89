//! Discrete constraint models over bounded integer and boolean variables.
//!
//! A [`CpModel`] accumulates variables, linear relations, all-different
//! groups and an optional objective. [`CpModel::solve`] compiles a snapshot
//! of the builder and runs the pumpkin-core solver on it, returning an independent
//! [`CpSolution`]. The builder stays usable and may be solved again.
//!
//! # Module Organization
//!
//! - [`model`]: The builder and its validation
//! - [`solution`]: Read-only solve result
//! - `engine`: Compilation to engine integers and dispatch to pumpkin-core
//! - `status`: Engine status normalization

mod engine;
pub mod model;
pub mod solution;
mod status;

pub use engine::CompiledModel;
pub use model::CpModel;
pub use solution::CpSolution;
