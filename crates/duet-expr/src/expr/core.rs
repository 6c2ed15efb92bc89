//! Core expression type: a weighted sum of model variables.
//!
//! The coefficient type is generic so discrete models assemble with `i64`
//! and linear models with `f64` through the same routine. Repeated variables
//! are kept as separate terms until [`LinearExpr::normalized_terms`] merges
//! them additively.

use crate::expr::error::LinearExprError;
use crate::ids::VarId;
use num_traits::{CheckedAdd, Num};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpr<C> {
    terms: Vec<(VarId, C)>,
}

impl<C> Default for LinearExpr<C> {
    fn default() -> Self {
        Self { terms: Vec::new() }
    }
}

impl<C> LinearExpr<C>
where
    C: Num + Copy,
{
    // ── Constructors ────────────────────────────────────────

    /// Empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single term: coeff * var.
    pub fn term(var_id: VarId, coeff: C) -> Self {
        Self {
            terms: vec![(var_id, coeff)],
        }
    }

    /// Zip two parallel sequences into an expression.
    ///
    /// Returns an error if the sequences differ in length.
    pub fn from_parallel(variables: &[VarId], coefficients: &[C]) -> Result<Self, LinearExprError> {
        if variables.len() != coefficients.len() {
            return Err(LinearExprError::MismatchedLengths {
                variables: variables.len(),
                coefficients: coefficients.len(),
            });
        }
        Ok(Self {
            terms: variables
                .iter()
                .copied()
                .zip(coefficients.iter().copied())
                .collect(),
        })
    }

    /// From raw terms.
    pub fn from_terms(terms: Vec<(VarId, C)>) -> Self {
        Self { terms }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn terms(&self) -> &[(VarId, C)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Consume and return the raw terms.
    pub fn into_terms(self) -> Vec<(VarId, C)> {
        self.terms
    }

    /// Iterate over the variable of every term, in term order.
    ///
    /// A variable that appears in several terms is yielded once per term.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|(var_id, _)| *var_id)
    }

    // ── Operations ──────────────────────────────────────────

    /// Append one term.
    pub fn push(&mut self, var_id: VarId, coeff: C) {
        self.terms.push((var_id, coeff));
    }

    /// Concatenate the terms of another expression.
    pub fn add(&self, other: &LinearExpr<C>) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        terms.extend_from_slice(&self.terms);
        terms.extend_from_slice(&other.terms);
        Self { terms }
    }

    /// Scale all coefficients by a factor.
    pub fn scale(&self, by: C) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| !c.is_zero())
                .collect(),
        }
    }

    /// Merged terms with duplicates combined and zeros dropped, ordered by handle.
    pub fn normalized_terms(&self) -> Vec<(VarId, C)> {
        let mut merged: BTreeMap<VarId, C> = BTreeMap::new();
        for (var_id, coeff) in &self.terms {
            if coeff.is_zero() {
                continue;
            }
            let slot = merged.entry(*var_id).or_insert_with(C::zero);
            *slot = *slot + *coeff;
        }
        merged.into_iter().filter(|(_, c)| !c.is_zero()).collect()
    }
}

impl<C> LinearExpr<C>
where
    C: Num + Copy + CheckedAdd,
{
    /// Like [`normalized_terms`](Self::normalized_terms) but returns `None`
    /// when merging duplicates overflows the coefficient type.
    pub fn try_normalized_terms(&self) -> Option<Vec<(VarId, C)>> {
        let mut merged: BTreeMap<VarId, C> = BTreeMap::new();
        for (var_id, coeff) in &self.terms {
            if coeff.is_zero() {
                continue;
            }
            let slot = merged.entry(*var_id).or_insert_with(C::zero);
            *slot = slot.checked_add(coeff)?;
        }
        Some(merged.into_iter().filter(|(_, c)| !c.is_zero()).collect())
    }
}

impl<C> FromIterator<(VarId, C)> for LinearExpr<C> {
    fn from_iter<T: IntoIterator<Item = (VarId, C)>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl<C> std::ops::Add for LinearExpr<C>
where
    C: Num + Copy,
{
    type Output = LinearExpr<C>;

    fn add(self, rhs: LinearExpr<C>) -> Self::Output {
        LinearExpr::add(&self, &rhs)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::expr::{LinearExpr, LinearExprError};
    use crate::ids::{ModelTag, VarId};
    use proptest::prelude::*;

    fn vars(n: u32) -> Vec<VarId> {
        let tag = ModelTag::fresh();
        (0..n).map(|i| VarId::new(tag, i)).collect()
    }

    #[test]
    fn from_parallel_zips_in_order() {
        let v = vars(2);
        let expr = LinearExpr::from_parallel(&v, &[3_i64, -1]).unwrap();
        assert_eq!(expr.terms(), &[(v[0], 3), (v[1], -1)]);
    }

    #[test]
    fn from_parallel_rejects_mismatched_lengths() {
        let v = vars(2);
        let result = LinearExpr::from_parallel(&v, &[1.0]);
        assert_eq!(
            result.unwrap_err(),
            LinearExprError::MismatchedLengths {
                variables: 2,
                coefficients: 1
            }
        );
    }

    #[test]
    fn normalized_terms_accumulates_repeated_handles() {
        let v = vars(2);
        let expr = LinearExpr::from_parallel(&[v[1], v[0], v[1]], &[2_i64, 5, 3]).unwrap();
        assert_eq!(expr.normalized_terms(), vec![(v[0], 5), (v[1], 5)]);
    }

    #[test]
    fn variables_repeats_handles_per_term() {
        let v = vars(2);
        let expr = LinearExpr::from_parallel(&[v[1], v[0], v[1]], &[2_i64, 5, 3]).unwrap();
        assert_eq!(expr.variables().collect::<Vec<_>>(), vec![v[1], v[0], v[1]]);
    }

    #[test]
    fn normalized_terms_drops_cancelled_terms() {
        let v = vars(2);
        let expr = LinearExpr::term(v[0], 2.0)
            .add(&LinearExpr::term(v[0], -2.0))
            .add(&LinearExpr::term(v[1], 4.0));
        assert_eq!(expr.normalized_terms(), vec![(v[1], 4.0)]);
    }

    #[test]
    fn try_normalized_terms_detects_overflow() {
        let v = vars(1);
        let expr = LinearExpr::from_parallel(&[v[0], v[0]], &[i64::MAX, 1]).unwrap();
        assert!(expr.try_normalized_terms().is_none());
    }

    #[test]
    fn scale_drops_zero_terms() {
        let v = vars(2);
        let expr = LinearExpr::from_parallel(&v, &[2_i64, 3]).unwrap();
        assert_eq!(expr.scale(-1).terms(), &[(v[0], -2), (v[1], -3)]);
        assert!(expr.scale(0).is_empty());
    }

    #[test]
    fn collect_from_iterator() {
        let v = vars(3);
        let expr: LinearExpr<f64> = v.iter().map(|id| (*id, 1.0)).collect();
        assert_eq!(expr.len(), 3);
        assert_eq!(expr.variables().collect::<Vec<_>>(), v);
    }

    proptest! {
        #[test]
        fn normalized_sum_matches_raw_sum(
            coeffs in proptest::collection::vec(-1000_i64..1000, 0..20)
        ) {
            let v = vars(3);
            let handles: Vec<VarId> = (0..coeffs.len()).map(|i| v[i % 3]).collect();
            let expr = LinearExpr::from_parallel(&handles, &coeffs).unwrap();
            let raw: i64 = coeffs.iter().sum();
            let merged: i64 = expr.normalized_terms().iter().map(|(_, c)| *c).sum();
            prop_assert_eq!(raw, merged);
        }
    }
}
