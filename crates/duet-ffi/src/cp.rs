//! # Discrete Model FFI
//!
//! Builder functions operate on a `CpModel` pointer from
//! `duet_cp_model_new`. `duet_cp_model_solve` returns a separate result
//! pointer that stays valid after the model is changed, solved again, or
//! freed, and must be released with `duet_cp_response_free`.
//!
//! ## Exported API
//!
//! ### Lifecycle
//! * `duet_cp_model_new`
//! * `duet_cp_model_free`
//! * `duet_cp_response_free`
//!
//! ### Building
//! * `duet_cp_model_new_int_var`
//! * `duet_cp_model_new_bool_var`
//! * `duet_cp_model_add_linear_le`
//! * `duet_cp_model_add_linear_ge`
//! * `duet_cp_model_add_linear_eq`
//! * `duet_cp_model_add_all_different`
//! * `duet_cp_model_minimize`
//! * `duet_cp_model_maximize`
//!
//! ### Solving and Inspection
//! * `duet_cp_model_solve`
//! * `duet_cp_model_solve_with_node_limit`
//! * `duet_cp_response_status`
//! * `duet_cp_response_objective_value`
//! * `duet_cp_response_value`
//! * `duet_cp_response_wall_time`
//! * `duet_cp_response_num_branches`
//! * `duet_cp_response_num_solutions`

use crate::{checked_index, or_abort, read_array, read_name, returned_index};
use duet_cp::{CpModel, CpSolution};
use duet_expr::VarId;
use duet_solver::SolverConfig;
use std::ffi::c_char;

/// Creates an empty discrete model.
#[unsafe(no_mangle)]
pub extern "C" fn duet_cp_model_new() -> *mut CpModel {
    Box::into_raw(Box::new(CpModel::new()))
}

/// Frees a discrete model. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by `duet_cp_model_new` that has
/// not been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_free(ptr: *mut CpModel) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

unsafe fn model_mut<'a>(ptr: *mut CpModel, caller: &str) -> &'a mut CpModel {
    assert!(!ptr.is_null(), "called `{}` with null pointer", caller);
    unsafe { &mut *ptr }
}

unsafe fn response_ref<'a>(ptr: *const CpSolution, caller: &str) -> &'a CpSolution {
    assert!(!ptr.is_null(), "called `{}` with null pointer", caller);
    unsafe { &*ptr }
}

unsafe fn read_vars(model: &CpModel, vars: *const i32, len: usize, caller: &str) -> Vec<VarId> {
    unsafe { read_array(vars, len, caller) }
        .iter()
        .map(|index| VarId::new(model.tag(), checked_index(*index, caller)))
        .collect()
}

/// Adds an integer variable with domain `[lower, upper]` and returns its index.
///
/// # Panics
///
/// Panics if `lower > upper`.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_new_int_var(
    ptr: *mut CpModel,
    lower: i64,
    upper: i64,
    name: *const c_char,
) -> i32 {
    const CALLER: &str = "duet_cp_model_new_int_var";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    let id = or_abort(model.new_int_var(lower, upper, name.as_deref()), CALLER);
    returned_index(id.inner(), CALLER)
}

/// Adds a boolean variable and returns its index.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_new_bool_var(ptr: *mut CpModel, name: *const c_char) -> i32 {
    const CALLER: &str = "duet_cp_model_new_bool_var";
    let model = unsafe { model_mut(ptr, CALLER) };
    let name = unsafe { read_name(name) };
    returned_index(model.new_bool_var(name.as_deref()).inner(), CALLER)
}

/// Adds `Σ coeffs[i] * vars[i] <= rhs`.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` and `coeffs` must each hold
/// `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_add_linear_le(
    ptr: *mut CpModel,
    vars: *const i32,
    coeffs: *const i64,
    len: usize,
    rhs: i64,
) {
    const CALLER: &str = "duet_cp_model_add_linear_le";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    let coeffs = unsafe { read_array(coeffs, len, CALLER) };
    or_abort(model.add_linear_le(&vars, coeffs, rhs), CALLER);
}

/// Adds `Σ coeffs[i] * vars[i] >= rhs`.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` and `coeffs` must each hold
/// `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_add_linear_ge(
    ptr: *mut CpModel,
    vars: *const i32,
    coeffs: *const i64,
    len: usize,
    rhs: i64,
) {
    const CALLER: &str = "duet_cp_model_add_linear_ge";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    let coeffs = unsafe { read_array(coeffs, len, CALLER) };
    or_abort(model.add_linear_ge(&vars, coeffs, rhs), CALLER);
}

/// Adds `Σ coeffs[i] * vars[i] == rhs`.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` and `coeffs` must each hold
/// `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_add_linear_eq(
    ptr: *mut CpModel,
    vars: *const i32,
    coeffs: *const i64,
    len: usize,
    rhs: i64,
) {
    const CALLER: &str = "duet_cp_model_add_linear_eq";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    let coeffs = unsafe { read_array(coeffs, len, CALLER) };
    or_abort(model.add_linear_eq(&vars, coeffs, rhs), CALLER);
}

/// Requires the listed variables to take pairwise distinct values.
///
/// # Panics
///
/// Panics if `len` is zero.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` must hold `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_add_all_different(
    ptr: *mut CpModel,
    vars: *const i32,
    len: usize,
) {
    const CALLER: &str = "duet_cp_model_add_all_different";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    or_abort(model.add_all_different(&vars), CALLER);
}

/// Minimizes `Σ coeffs[i] * vars[i]`, replacing any previous objective.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` and `coeffs` must each hold
/// `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_minimize(
    ptr: *mut CpModel,
    vars: *const i32,
    coeffs: *const i64,
    len: usize,
) {
    const CALLER: &str = "duet_cp_model_minimize";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    let coeffs = unsafe { read_array(coeffs, len, CALLER) };
    or_abort(model.minimize(&vars, coeffs), CALLER);
}

/// Maximizes `Σ coeffs[i] * vars[i]`, replacing any previous objective.
///
/// # Safety
///
/// `ptr` must be a live model pointer. `vars` and `coeffs` must each hold
/// `len` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_maximize(
    ptr: *mut CpModel,
    vars: *const i32,
    coeffs: *const i64,
    len: usize,
) {
    const CALLER: &str = "duet_cp_model_maximize";
    let model = unsafe { model_mut(ptr, CALLER) };
    let vars = unsafe { read_vars(model, vars, len, CALLER) };
    let coeffs = unsafe { read_array(coeffs, len, CALLER) };
    or_abort(model.maximize(&vars, coeffs), CALLER);
}

/// Solves the model with a wall-clock limit in seconds and returns a new result.
///
/// Zero or negative limits mean unlimited.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_solve(
    ptr: *mut CpModel,
    time_limit: f64,
) -> *mut CpSolution {
    let model = unsafe { model_mut(ptr, "duet_cp_model_solve") };
    Box::into_raw(Box::new(model.solve(time_limit)))
}

/// Solves the model with a wall-clock limit and a search node limit.
///
/// A node limit of zero means unlimited.
///
/// # Safety
///
/// `ptr` must be a live model pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_model_solve_with_node_limit(
    ptr: *mut CpModel,
    time_limit: f64,
    node_limit: u64,
) -> *mut CpSolution {
    let model = unsafe { model_mut(ptr, "duet_cp_model_solve_with_node_limit") };
    let mut config = SolverConfig::new().with_time_limit(time_limit);
    if node_limit > 0 {
        config = config.with_node_limit(node_limit);
    }
    Box::into_raw(Box::new(model.solve_with_config(&config)))
}

/// Frees a discrete result. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by a solve call that has not
/// been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_free(ptr: *mut CpSolution) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

/// Returns the status code of a discrete result.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_status(ptr: *const CpSolution) -> i32 {
    unsafe { response_ref(ptr, "duet_cp_response_status") }
        .status()
        .code()
}

/// Returns the objective value, or zero without a solution or objective.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_objective_value(ptr: *const CpSolution) -> i64 {
    unsafe { response_ref(ptr, "duet_cp_response_objective_value") }.objective_value()
}

/// Returns the value of variable `index`, or zero without a solution.
///
/// # Panics
///
/// Panics if `index` does not name a variable of the solved model.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_value(ptr: *const CpSolution, index: i32) -> i64 {
    const CALLER: &str = "duet_cp_response_value";
    let response = unsafe { response_ref(ptr, CALLER) };
    let id = VarId::new(response.model().tag(), checked_index(index, CALLER));
    or_abort(response.value(id), CALLER)
}

/// Returns the elapsed solve time in seconds.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_wall_time(ptr: *const CpSolution) -> f64 {
    unsafe { response_ref(ptr, "duet_cp_response_wall_time") }.wall_time()
}

/// Returns the number of search branches explored.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_num_branches(ptr: *const CpSolution) -> u64 {
    unsafe { response_ref(ptr, "duet_cp_response_num_branches") }.num_branches()
}

/// Returns the number of improving solutions found.
///
/// # Safety
///
/// `ptr` must be a live result pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duet_cp_response_num_solutions(ptr: *const CpSolution) -> u64 {
    unsafe { response_ref(ptr, "duet_cp_response_num_solutions") }.num_solutions()
}
