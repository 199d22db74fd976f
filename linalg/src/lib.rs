use matrix::{Dot, Matrix};
use nalgebra::DMatrix;
use paoconsts::*;
use types::c64;

/// Eigenvalues and eigenvectors of a Hermitian matrix.
///
/// Eigenvalues are returned in ascending order; eigenvectors are stored
/// in the matching columns of the returned matrix.
pub fn eigh(mat: &Matrix<c64>) -> (Vec<f64>, Matrix<c64>) {
    let n = mat.nrow();

    assert_eq!(n, mat.ncol(), "eigh requires a square matrix");

    let m = DMatrix::<c64>::from_column_slice(n, n, mat.as_slice());
    let se = m.symmetric_eigen();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| se.eigenvalues[a].total_cmp(&se.eigenvalues[b]));

    let mut evals = vec![0.0; n];
    let mut evecs = Matrix::<c64>::new(n, n);

    for (j, &o) in order.iter().enumerate() {
        evals[j] = se.eigenvalues[o];

        for i in 0..n {
            evecs[[i, j]] = se.eigenvectors[(i, o)];
        }
    }

    (evals, evecs)
}

/// Eigenvalues only, ascending.
pub fn eigvalsh(mat: &Matrix<c64>) -> Vec<f64> {
    let n = mat.nrow();

    assert_eq!(n, mat.ncol(), "eigvalsh requires a square matrix");

    let m = DMatrix::<c64>::from_column_slice(n, n, mat.as_slice());
    let mut evals: Vec<f64> = m.symmetric_eigenvalues().iter().cloned().collect();

    evals.sort_by(|a, b| a.total_cmp(b));

    evals
}

/// Generalized Hermitian eigenproblem H x = e S x, solved by reducing
/// with S^{-1/2} to a standard one.
pub fn eigh_gen(ham: &Matrix<c64>, ovlp: &Matrix<c64>) -> (Vec<f64>, Matrix<c64>) {
    assert_eq!(ham.shape(), ovlp.shape());

    let n = ovlp.nrow();

    let (sevals, sevecs) = eigh(ovlp);

    for (i, &ev) in sevals.iter().enumerate() {
        if ev < EPS10 {
            panic!(
                "eigh_gen: overlap matrix is not positive definite, eigenvalue {} = {:E}",
                i, ev
            );
        }
    }

    let mut s_inv_half = Matrix::<c64>::new(n, n);

    for j in 0..n {
        let w = 1.0 / sevals[j].sqrt();

        for i in 0..n {
            s_inv_half[[i, j]] = sevecs[[i, j]] * w;
        }
    }

    let s_inv_half = s_inv_half.dot(&sevecs.adjoint());

    let mut a = s_inv_half.dot(ham).dot(&s_inv_half);
    a.hermitize();

    let (evals, y) = eigh(&a);
    let evecs = s_inv_half.dot(&y);

    (evals, evecs)
}
