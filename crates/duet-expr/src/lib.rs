//! Handles and linear expressions shared by duet model builders.
//!
//! - [`ids`]: model-tagged variable and constraint handles
//! - [`expr`]: linear expression assembly and comparison senses

pub mod expr;
pub mod ids;

pub use expr::{ComparisonSense, LinearExpr, LinearExprError};
pub use ids::{ConstraintId, ModelTag, VarId};
