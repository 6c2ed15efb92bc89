//! # Duet FFI
//!
//! Flat C interface over the discrete ([`duet_cp`]) and linear ([`duet_lp`])
//! model builders.
//!
//! ## Conventions
//!
//! 1.  **Opaque Handles**: models and discrete results are returned as raw
//!     pointers and must be passed back to the accessor functions. Each
//!     `_new` or `_solve` call that returns a pointer has a matching `_free`.
//! 2.  **Integer Indices**: variables and linear constraints are identified by
//!     the non-negative index returned when they were created, scoped to the
//!     model that created them.
//! 3.  **Parallel Arrays**: multi-variable operations take an index array and
//!     a coefficient array of the same caller-declared length. A length of
//!     zero accepts null pointers.
//! 4.  **Fail-Fast Safety**: null model pointers, negative or out-of-range
//!     indices, and invalid bounds abort the process with a message naming
//!     the offending call. Infeasible or unbounded problems are not errors;
//!     they are reported through the status code.
//!
//! ## Status Codes
//!
//! | Code | Status          |
//! |------|-----------------|
//! | 0    | `UNKNOWN`       |
//! | 1    | `OPTIMAL`       |
//! | 2    | `FEASIBLE`      |
//! | 3    | `INFEASIBLE`    |
//! | 4    | `UNBOUNDED`     |
//! | 5    | `MODEL_INVALID` |
//! | 6    | `ERROR`         |

use duet_solver::{ModelError, Status};
use std::ffi::{CStr, c_char};

pub mod cp;
pub mod logging;
pub mod lp;

/// Returns a static, NUL-terminated name for a status code.
///
/// Unrecognized codes are named `"UNKNOWN"`.
#[unsafe(no_mangle)]
pub extern "C" fn duet_status_name(code: i32) -> *const c_char {
    let name: &'static CStr = match Status::from_code(code) {
        Some(Status::Optimal) => c"OPTIMAL",
        Some(Status::Feasible) => c"FEASIBLE",
        Some(Status::Infeasible) => c"INFEASIBLE",
        Some(Status::Unbounded) => c"UNBOUNDED",
        Some(Status::ModelInvalid) => c"MODEL_INVALID",
        Some(Status::Error) => c"ERROR",
        Some(Status::Unknown) | None => c"UNKNOWN",
    };
    name.as_ptr()
}

/// Returns `true` if the given status code carries a solution.
#[unsafe(no_mangle)]
pub extern "C" fn duet_status_is_success(code: i32) -> bool {
    Status::from_code(code).is_some_and(Status::is_success)
}

/// Reads an optional name. Null pointers and empty strings yield `None`.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_name(name: *const c_char) -> Option<String> {
    if name.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(name) }.to_string_lossy();
    if text.is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Views a caller-provided array of `len` elements.
///
/// # Safety
///
/// When `len > 0`, `ptr` must point to `len` initialized elements that stay
/// valid for the returned lifetime.
pub(crate) unsafe fn read_array<'a, T>(ptr: *const T, len: usize, caller: &str) -> &'a [T] {
    if len == 0 {
        return &[];
    }
    assert!(
        !ptr.is_null(),
        "called `{}` with null array pointer and length {}",
        caller,
        len
    );
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Converts a caller index to the `u32` used by handles.
pub(crate) fn checked_index(index: i32, caller: &str) -> u32 {
    assert!(
        index >= 0,
        "called `{}` with negative index {}",
        caller,
        index
    );
    index as u32
}

/// Converts a handle index to the `i32` returned to callers.
pub(crate) fn returned_index(index: u32, caller: &str) -> i32 {
    match i32::try_from(index) {
        Ok(index) => index,
        Err(_) => panic!(
            "called `{}` past the last representable index {}",
            caller,
            i32::MAX
        ),
    }
}

/// Unwraps a builder result, aborting with the error message on failure.
pub(crate) fn or_abort<T>(result: Result<T, ModelError>, caller: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("called `{}` with invalid input: {}", caller, err),
    }
}
