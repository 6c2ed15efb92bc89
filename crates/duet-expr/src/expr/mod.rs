//! Linear expression types for model building.
//!
//! - `core`:       LinearExpr: weighted sum of variables
//! - `constraint`: ComparisonSense for linear relations
//! - `error`:      Expression construction errors

pub mod constraint;
pub mod core;
pub mod error;

pub use constraint::ComparisonSense;
pub use core::LinearExpr;
pub use error::LinearExprError;
