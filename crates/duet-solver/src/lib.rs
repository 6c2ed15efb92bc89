//! Shared solver abstractions for duet models.
//!
//! Both the discrete and the linear engines report through the types in
//! this crate so callers see one result contract.
//!
//! # Overview
//!
//! - [`Status`]: Normalized outcome of a solve attempt
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`ModelError`]: Rejected model-building and query inputs
//! - [`Sense`]: Objective direction
//! - [`Solve`]: Trait for solvable models
//! - [`SolutionView`]: Trait for accessing solution data

mod config;
mod error;
mod sense;
mod status;
mod traits;

pub use config::SolverConfig;
pub use error::ModelError;
pub use sense::Sense;
pub use status::Status;
pub use traits::{SolutionView, Solve};
