//! Linear and mixed-integer models over selectable backends.
//!
//! A [`LinearModel`] is built row by row: rows are created with their bounds
//! and receive coefficients afterwards, and every setter overwrites. Solving
//! stores an [`LpSolution`] snapshot on the model, which is discarded by the
//! next mutation.
//!
//! # Backends
//!
//! - [`LinearBackend::ContinuousA`] / [`LinearBackend::MixedIntegerA`]: `microlp`
//! - [`LinearBackend::ContinuousB`] / [`LinearBackend::MixedIntegerB`]: HiGHS,
//!   compiled in with the `highs` feature
//!
//! Continuous backends relax integer and boolean variables to their bounds.

mod backend;
pub mod model;
pub mod solution;
mod status;

pub use backend::LinearBackend;
pub use model::{LinearModel, VarKind};
pub use solution::LpSolution;
