//! Symmetric orthogonalization of a non-orthogonal orbital basis.

use matrix::{Dot, Matrix};
use std::fmt;
use types::c64;

#[derive(Debug, Clone, PartialEq)]
pub enum OrthoError {
    NegativeEigenvalue { index: usize, value: f64 },
}

impl fmt::Display for OrthoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrthoError::NegativeEigenvalue { index, value } => {
                write!(
                    f,
                    "overlap matrix has negative eigenvalue {:E} at index {}",
                    value, index
                )
            }
        }
    }
}

impl std::error::Error for OrthoError {}

/// Principal square root of a Hermitian overlap matrix.
///
/// Eigenvalues below -tol mean the overlap is not a Gram matrix and
/// are reported as an error; small negative values within tol are
/// clamped to zero.
pub fn overlap_sqrt(ovlp: &Matrix<c64>, tol: f64) -> Result<Matrix<c64>, OrthoError> {
    let n = ovlp.nrow();

    assert_eq!(n, ovlp.ncol(), "overlap_sqrt requires a square matrix");

    let (evals, evecs) = linalg::eigh(ovlp);

    for (i, &ev) in evals.iter().enumerate() {
        if ev < -tol {
            return Err(OrthoError::NegativeEigenvalue {
                index: i,
                value: ev,
            });
        }
    }

    // V diag(sqrt(lambda)) V^H
    let mut scaled = Matrix::<c64>::new(n, n);

    for j in 0..n {
        let w = evals[j].max(0.0).sqrt();

        for i in 0..n {
            scaled[[i, j]] = evecs[[i, j]] * w;
        }
    }

    let mut s_half = scaled.dot(&evecs.adjoint());
    s_half.hermitize();

    Ok(s_half)
}

/// Transform a Hamiltonian into the orthogonal basis.
pub fn orthogonalize(ham: &Matrix<c64>, s_half: &Matrix<c64>) -> Matrix<c64> {
    let mut h = s_half.dot(ham).dot(&s_half.adjoint());
    h.hermitize();

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use paoconsts::*;

    fn sample_overlap() -> Matrix<c64> {
        let mut s = Matrix::<c64>::identity(3);

        s[[0, 1]] = c64::new(0.2, 0.1);
        s[[1, 0]] = c64::new(0.2, -0.1);
        s[[1, 2]] = c64::new(-0.15, 0.05);
        s[[2, 1]] = c64::new(-0.15, -0.05);

        s
    }

    #[test]
    fn test_sqrt_round_trip() {
        let s = sample_overlap();
        let s_half = overlap_sqrt(&s, EPS10).unwrap();

        let s_back = s_half.dot(&s_half);

        assert!(s_back.max_abs_diff(&s) < EPS10);
    }

    #[test]
    fn test_sqrt_is_hermitian() {
        let s = sample_overlap();
        let s_half = overlap_sqrt(&s, EPS10).unwrap();

        assert!(s_half.max_abs_diff(&s_half.adjoint()) < EPS12);
    }

    #[test]
    fn test_identity_overlap() {
        let s = Matrix::<c64>::identity(4);
        let s_half = overlap_sqrt(&s, EPS10).unwrap();

        assert!(s_half.max_abs_diff(&s) < EPS12);
    }

    #[test]
    fn test_negative_eigenvalue_rejected() {
        let mut s = Matrix::<c64>::identity(2);
        s[[1, 1]] = c64::new(-0.5, 0.0);

        let err = overlap_sqrt(&s, EPS10).unwrap_err();

        match err {
            OrthoError::NegativeEigenvalue { index, value } => {
                assert_eq!(index, 0);
                assert!((value + 0.5).abs() < EPS12);
            }
        }
    }

    #[test]
    fn test_orthogonalize_keeps_hermiticity() {
        let s = sample_overlap();
        let s_half = overlap_sqrt(&s, EPS10).unwrap();

        let mut h = Matrix::<c64>::new(3, 3);
        h[[0, 0]] = c64::new(1.0, 0.0);
        h[[0, 2]] = c64::new(0.4, -0.3);
        h[[2, 0]] = c64::new(0.4, 0.3);
        h[[1, 1]] = c64::new(-2.0, 0.0);

        let ho = orthogonalize(&h, &s_half);

        assert!(ho.max_abs_diff(&ho.adjoint()) < EPS12);
    }
}
