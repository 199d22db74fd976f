//! Reduced Hamiltonian from band projections.
//!
//! Bands with enough weight inside the orbital subspace, and below the
//! shift energy, are kept; the rest of the spectrum is pushed up by
//! eta through a complement projector so the discarded states cannot
//! leak into the interpolated bands.

use matrix::{Dot, Matrix};
use std::fmt;
use types::c64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    /// eta * (I - V V^H)
    Projector,
    /// eta * (I - V (V^H V)^{-1} V^H)
    Normalized,
    /// no correction
    None,
}

impl ShiftKind {
    pub fn from_index(i: i32) -> Result<ShiftKind, BuildError> {
        match i {
            0 => Ok(ShiftKind::Projector),
            1 => Ok(ShiftKind::Normalized),
            2 => Ok(ShiftKind::None),
            _ => Err(BuildError::UnknownShiftKind(i)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    UnknownShiftKind(i32),
    NoBandsSelected { kpoint: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::UnknownShiftKind(i) => {
                write!(f, "unknown shift kind index {}", i)
            }

            BuildError::NoBandsSelected { kpoint } => {
                write!(
                    f,
                    "no bands passed the projectability filter at k point {}",
                    kpoint
                )
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Weight of each band inside the orbital subspace: the squared norm
/// of its projection column.
pub fn projectability(proj: &Matrix<c64>) -> Vec<f64> {
    (0..proj.ncol())
        .map(|j| proj.get_col(j).iter().map(|v| v.norm_sqr()).sum())
        .collect()
}

/// Reduced Hamiltonian at one k point.
///
/// proj is nawf x nbnd; column j holds the projection of band j onto
/// the orbital basis. ik only enters error reporting.
pub fn build_hk(
    evals: &[f64],
    proj: &Matrix<c64>,
    pthr: f64,
    eshift: f64,
    eta: f64,
    kind: ShiftKind,
    ik: usize,
) -> Result<Matrix<c64>, BuildError> {
    let nawf = proj.nrow();
    let nbnd = proj.ncol();

    assert_eq!(evals.len(), nbnd, "one eigenvalue per projection column");

    let pnorm = projectability(proj);

    let selected: Vec<usize> = (0..nbnd)
        .filter(|&j| pnorm[j] > pthr && evals[j] < eshift)
        .collect();

    if selected.is_empty() {
        return Err(BuildError::NoBandsSelected { kpoint: ik });
    }

    // columns normalized by their projected norm
    let mut v = Matrix::<c64>::new(nawf, selected.len());

    for (jc, &j) in selected.iter().enumerate() {
        let w = 1.0 / pnorm[j].sqrt();

        for i in 0..nawf {
            v[[i, jc]] = proj[[i, j]] * w;
        }
    }

    // H = V diag(e) V^H over the selected bands
    let mut ham = Matrix::<c64>::new(nawf, nawf);

    for (jc, &j) in selected.iter().enumerate() {
        let e = evals[j];
        let col = v.get_col(jc).to_vec();

        for n in 0..nawf {
            let w = col[n].conj() * e;

            for m in 0..nawf {
                ham[[m, n]] += col[m] * w;
            }
        }
    }

    match kind {
        ShiftKind::Projector => {
            let p = v.dot(&v.adjoint());
            add_complement_shift(&mut ham, &p, eta);
        }

        ShiftKind::Normalized => {
            let mut gram = v.adjoint().dot(&v);
            gram.inv();

            let p = v.dot(&gram).dot(&v.adjoint());
            add_complement_shift(&mut ham, &p, eta);
        }

        ShiftKind::None => {}
    }

    ham.hermitize();

    Ok(ham)
}

fn add_complement_shift(ham: &mut Matrix<c64>, p: &Matrix<c64>, eta: f64) {
    let n = ham.nrow();

    for j in 0..n {
        for i in 0..n {
            ham[[i, j]] -= p[[i, j]] * eta;
        }

        ham[[j, j]] += c64::new(eta, 0.0);
    }
}

/// Reduced Hamiltonian on a whole k mesh.
pub fn build_hks(
    evals: &[Vec<f64>],
    projs: &[Matrix<c64>],
    pthr: f64,
    eshift: f64,
    eta: f64,
    kind: ShiftKind,
) -> Result<Vec<Matrix<c64>>, BuildError> {
    assert_eq!(evals.len(), projs.len());

    let mut hks = Vec::with_capacity(projs.len());

    for ik in 0..projs.len() {
        hks.push(build_hk(&evals[ik], &projs[ik], pthr, eshift, eta, kind, ik)?);
    }

    Ok(hks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paoconsts::*;

    #[test]
    fn test_shift_kind_from_index() {
        assert_eq!(ShiftKind::from_index(0).unwrap(), ShiftKind::Projector);
        assert_eq!(ShiftKind::from_index(1).unwrap(), ShiftKind::Normalized);
        assert_eq!(ShiftKind::from_index(2).unwrap(), ShiftKind::None);

        assert_eq!(
            ShiftKind::from_index(7).unwrap_err(),
            BuildError::UnknownShiftKind(7)
        );
    }

    #[test]
    fn test_projectability() {
        let mut proj = Matrix::<c64>::new(2, 2);
        proj[[0, 0]] = c64::new(1.0, 0.0);
        proj[[0, 1]] = c64::new(0.0, 0.6);
        proj[[1, 1]] = c64::new(0.8, 0.0);

        let p = projectability(&proj);

        assert!((p[0] - 1.0).abs() < EPS12);
        assert!((p[1] - 1.0).abs() < EPS12);
    }

    #[test]
    fn test_selection_and_projector_shift() {
        // band 0 kept, band 1 filtered out by the energy window
        let proj = Matrix::<c64>::identity(2);
        let evals = [-1.0, 10.0];
        let eta = 3.0;

        let ham = build_hk(&evals, &proj, 0.9, 0.5, eta, ShiftKind::Projector, 0).unwrap();

        assert!((ham[[0, 0]] - c64::new(-1.0, 0.0)).norm() < EPS12);
        assert!((ham[[1, 1]] - c64::new(eta, 0.0)).norm() < EPS12);
        assert!(ham[[0, 1]].norm() < EPS12);
        assert!(ham[[1, 0]].norm() < EPS12);
    }

    #[test]
    fn test_normalized_matches_projector_for_orthonormal_columns() {
        let proj = Matrix::<c64>::identity(3);
        let evals = [-2.0, -1.0, 20.0];

        let h0 = build_hk(&evals, &proj, 0.9, 0.0, 1.5, ShiftKind::Projector, 0).unwrap();
        let h1 = build_hk(&evals, &proj, 0.9, 0.0, 1.5, ShiftKind::Normalized, 0).unwrap();

        assert!(h0.max_abs_diff(&h1) < EPS10);
    }

    #[test]
    fn test_no_shift_leaves_complement_empty() {
        let proj = Matrix::<c64>::identity(2);
        let evals = [-1.0, 10.0];

        let ham = build_hk(&evals, &proj, 0.9, 0.5, 3.0, ShiftKind::None, 0).unwrap();

        assert!(ham[[1, 1]].norm() < EPS12);
    }

    #[test]
    fn test_no_bands_selected() {
        let proj = Matrix::<c64>::identity(2);
        let evals = [-1.0, -2.0];

        let err = build_hk(&evals, &proj, 1.1, 0.5, 3.0, ShiftKind::None, 4).unwrap_err();

        assert_eq!(err, BuildError::NoBandsSelected { kpoint: 4 });
    }

    #[test]
    fn test_hermiticity_with_complex_projections() {
        let sq = SQRT_HALF;

        let mut proj = Matrix::<c64>::new(2, 2);
        proj[[0, 0]] = c64::new(sq, 0.0);
        proj[[1, 0]] = c64::new(0.0, sq);
        proj[[0, 1]] = c64::new(0.0, -sq);
        proj[[1, 1]] = c64::new(sq, 0.0);

        let evals = [-1.0, 0.5];

        let ham = build_hk(&evals, &proj, 0.9, 1.0, 2.0, ShiftKind::Normalized, 0).unwrap();

        assert!(ham.max_abs_diff(&ham.adjoint()) < EPS12);
    }

    #[test]
    fn test_build_hks_propagates_error() {
        let projs = vec![Matrix::<c64>::identity(2), Matrix::<c64>::identity(2)];
        let evals = vec![vec![-1.0, -2.0], vec![10.0, 10.0]];

        let err = build_hks(&evals, &projs, 0.9, 0.5, 1.0, ShiftKind::None).unwrap_err();

        assert_eq!(err, BuildError::NoBandsSelected { kpoint: 1 });
    }
}
