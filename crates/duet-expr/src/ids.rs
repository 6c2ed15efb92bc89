use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MODEL_TAG: AtomicU32 = AtomicU32::new(1);

/// Identity of the model that issued a handle.
///
/// Every builder draws a fresh tag at construction, so a handle presented to
/// a model other than its issuer can be detected instead of silently indexing
/// into the wrong variable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ModelTag(u32);

impl ModelTag {
    /// Allocate a tag that no other model in this process holds.
    pub fn fresh() -> Self {
        Self(NEXT_MODEL_TAG.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the inner u32 value.
    pub fn inner(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ModelTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

macro_rules! define_handle_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            model: ModelTag,
            index: u32,
        }

        impl $name {
            /// Create a handle for slot `index` of the model tagged `model`.
            pub fn new(model: ModelTag, index: u32) -> Self {
                Self { model, index }
            }

            /// Tag of the issuing model.
            pub fn model(self) -> ModelTag {
                self.model
            }

            /// Get the sequential index within the issuing model.
            pub fn inner(self) -> u32 {
                self.index
            }

            /// Index as a `usize`, for slicing the model's tables.
            pub fn index(self) -> usize {
                self.index as usize
            }
        }
    };
}

define_handle_type!(VarId);
define_handle_type!(ConstraintId);
