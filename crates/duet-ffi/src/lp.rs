//! # Linear Model FFI
//!
//! A `LinearModel` pointer serves as both builder and result: after
//! `duet_lp_model_solve`, the objective and variable values are read from
//! the same pointer. Any later mutation discards those values, and reading
//! them before a solve aborts.
//!
//! ## Backend Codes
//!
//! | Code | Backend          |
//! |------|------------------|
//! | 0    | `ContinuousA`    |
//! | 1    | `ContinuousB`    |
//! | 2    | `MixedIntegerA`  |
//! | 3    | `MixedIntegerB`  |
//!
//! Any other code selects `ContinuousA`.

use crate::{checked_index, or_abort, read_name, returned_index};
use duet_expr::{ConstraintId, VarId};
use duet_lp::{LinearBackend, LinearModel};
use std::ffi::c_char;

/// Creates an empty linear model. A null name is stored as the empty string.
///
/// # Safety
///
/// `name` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_new(name: *const c_char, backend: i32) -> *mut LinearModel {
    let name = unsafe { read_name(name) }.unwrap_or_default();
    Box::into_raw(Box::new(LinearModel::from_backend_code(&name, backend)))
}

/// Frees a linear model. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by `duet_lp_model_new` that has
/// not been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_free(ptr: *mut LinearModel) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

/// Returns `true` if the backend for `code` was compiled into this library.
#[unsafe(no_mangle)]
pub extern "C" fn duet_lp_backend_available(code: i32) -> bool {
    LinearBackend::from_code(code).is_available()
}

unsafe fn model_mut<'a>(ptr: *mut LinearModel, caller: &str) -> &'a mut LinearModel {
    assert!(!ptr.is_null(), "called `{}` with null pointer", caller);
    unsafe { &mut *ptr }
}

unsafe fn model_ref<'a>(ptr: *const LinearModel, caller: &str) -> &'a LinearModel {
    assert!(!ptr.is_null(), "called `{}` with null pointer", caller);
    unsafe { &*ptr }
}

fn var_id(model: &LinearModel, index: i32, caller: &str) -> VarId {
    VarId::new(model.tag(), checked_index(index, caller))
}

fn constraint_id(model: &LinearModel, index: i32, caller: &str) -> ConstraintId {
    ConstraintId::new(model.tag(), checked_index(index, caller))
}

/// Returns the backend code the model was created with.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_backend(ptr: *const LinearModel) -> i32 {
    unsafe { model_ref(ptr, "duet_lp_model_backend") }
        .backend()
        .code()
}

/// Adds a continuous variable with bounds `[lower, upper]` and returns its index.
///
/// # Panics
///
/// Panics if `lower > upper` or either bound is NaN.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_num_var(
    ptr: *mut LinearModel,
    lower: f64,
    upper: f64,
    name: *const c_char,
) -> i32 {
    const CALLER: &str = "duet_lp_model_num_var";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    let id = or_abort(model.num_var(lower, upper, name.as_deref()), CALLER);
    returned_index(id.inner(), CALLER)
}

/// Adds an integer variable with bounds `[lower, upper]` and returns its index.
///
/// # Panics
///
/// Panics if `lower > upper` or either bound is NaN.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_int_var(
    ptr: *mut LinearModel,
    lower: f64,
    upper: f64,
    name: *const c_char,
) -> i32 {
    const CALLER: &str = "duet_lp_model_int_var";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    let id = or_abort(model.int_var(lower, upper, name.as_deref()), CALLER);
    returned_index(id.inner(), CALLER)
}

/// Adds a boolean variable and returns its index.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_bool_var(ptr: *mut LinearModel, name: *const c_char) -> i32 {
    const CALLER: &str = "duet_lp_model_bool_var";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    returned_index(model.bool_var(name.as_deref()).inner(), CALLER)
}

/// Adds an empty row `lower <= ... <= upper` and returns its index.
///
/// # Panics
///
/// Panics if `lower > upper` or either bound is NaN.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_add_constraint(
    ptr: *mut LinearModel,
    lower: f64,
    upper: f64,
    name: *const c_char,
) -> i32 {
    const CALLER: &str = "duet_lp_model_add_constraint";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    let id = or_abort(model.add_constraint(lower, upper, name.as_deref()), CALLER);
    returned_index(id.inner(), CALLER)
}

/// Sets the coefficient of a variable in a row, overwriting any previous value.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_set_constraint_coeff(
    ptr: *mut LinearModel,
    constraint: i32,
    var: i32,
    coeff: f64,
) {
    const CALLER: &str = "duet_lp_model_set_constraint_coeff";
    let model = unsafe { model_mut(ptr, CALLER) };
    let row = constraint_id(model, constraint, CALLER);
    let col = var_id(model, var, CALLER);
    or_abort(model.set_constraint_coeff(row, col, coeff), CALLER);
}

/// Sets the objective coefficient of a variable, overwriting any previous value.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_set_objective_coeff(
    ptr: *mut LinearModel,
    var: i32,
    coeff: f64,
) {
    const CALLER: &str = "duet_lp_model_set_objective_coeff";
    let model = unsafe { model_mut(ptr, CALLER) };
    let col = var_id(model, var, CALLER);
    or_abort(model.set_objective_coeff(col, coeff), CALLER);
}

/// Sets the objective direction to minimization.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_minimize(ptr: *mut LinearModel) {
    unsafe { model_mut(ptr, "duet_lp_model_minimize") }.minimize();
}

/// Sets the objective direction to maximization.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_maximize(ptr: *mut LinearModel) {
    unsafe { model_mut(ptr, "duet_lp_model_maximize") }.maximize();
}

/// Sets the wall-clock limit for backends that support one.
///
/// Zero or negative limits mean unlimited.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_set_time_limit(ptr: *mut LinearModel, seconds: f64) {
    let model = unsafe { model_mut(ptr, "duet_lp_model_set_time_limit") };
    let config = model.config().clone().with_time_limit(seconds);
    model.set_config(config);
}

/// Solves the model in place and returns the status code.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_solve(ptr: *mut LinearModel) -> i32 {
    unsafe { model_mut(ptr, "duet_lp_model_solve") }
        .solve()
        .code()
}

/// Returns the objective value of the last solve, or zero without a solution.
///
/// # Panics
///
/// Panics if the model was not solved since its last change.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_objective_value(ptr: *const LinearModel) -> f64 {
    const CALLER: &str = "duet_lp_model_objective_value";
    or_abort(unsafe { model_ref(ptr, CALLER) }.objective_value(), CALLER)
}

/// Returns the value of a variable in the last solve, or zero without a solution.
///
/// # Panics
///
/// Panics if the model was not solved since its last change or the index
/// is out of range.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_lp_model_var_value(ptr: *const LinearModel, var: i32) -> f64 {
    const CALLER: &str = "duet_lp_model_var_value";
    let model = unsafe { model_ref(ptr, CALLER) };
    or_abort(model.var_value(var_id(model, var, CALLER)), CALLER)
}
