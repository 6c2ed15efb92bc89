//! Normalized solve status.

/// Outcome of a solve attempt, independent of the engine that produced it.
///
/// The discriminants are the integer codes used across the C interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(i32)]
pub enum Status {
    /// The engine stopped without a conclusion.
    #[default]
    Unknown = 0,
    /// A provably optimal solution was found.
    Optimal = 1,
    /// A solution was found but optimality was not proven.
    Feasible = 2,
    /// The problem has no solution.
    Infeasible = 3,
    /// The objective can be improved without limit.
    Unbounded = 4,
    /// The problem as posed could not be evaluated.
    ModelInvalid = 5,
    /// The engine failed.
    Error = 6,
}

impl Status {
    /// Check if a solution is available (optimal or feasible).
    pub fn is_success(self) -> bool {
        matches!(self, Status::Optimal | Status::Feasible)
    }

    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, Status::Infeasible)
    }

    /// Check if the status indicates unboundedness.
    pub fn is_unbounded(self) -> bool {
        matches!(self, Status::Unbounded)
    }

    /// Integer code for the flat interface.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Status for an integer code, if it names one.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Status::Unknown),
            1 => Some(Status::Optimal),
            2 => Some(Status::Feasible),
            3 => Some(Status::Infeasible),
            4 => Some(Status::Unbounded),
            5 => Some(Status::ModelInvalid),
            6 => Some(Status::Error),
            _ => None,
        }
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Optimal => "OPTIMAL",
            Status::Feasible => "FEASIBLE",
            Status::Infeasible => "INFEASIBLE",
            Status::Unbounded => "UNBOUNDED",
            Status::ModelInvalid => "MODEL_INVALID",
            Status::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
