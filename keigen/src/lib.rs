//! Band energies and eigenvectors on the k grid.
//!
//! The k points are split over the pool; every rank diagonalizes its
//! own block and the results are gathered back on all ranks.

use linalg::{eigh, eigh_gen};
use matrix::Matrix;
use paoconsts::*;
use paopool::Pool;
use paotypes::{KEigenValue, KEigenVector, KHamiltonian};
use types::c64;

pub trait KEigenSolver {
    /// Eigenvalues and eigenvectors of one spin component, k by k.
    fn compute_component(
        &self,
        hks: &[Matrix<c64>],
        sks: Option<&[Matrix<c64>]>,
        pool: &dyn Pool,
    ) -> (Vec<Vec<f64>>, Vec<Matrix<c64>>);

    fn compute(
        &self,
        vkham: &KHamiltonian,
        vksov: Option<&KHamiltonian>,
        pool: &dyn Pool,
    ) -> (KEigenValue, KEigenVector) {
        match vkham {
            KHamiltonian::NonSpin(hks) => {
                let sks = vksov.map(|s| s.as_non_spin().unwrap().as_slice());

                let (evals, evecs) = self.compute_component(hks, sks, pool);

                (KEigenValue::NonSpin(evals), KEigenVector::NonSpin(evecs))
            }

            KHamiltonian::Spin(hks_up, hks_dn) => {
                let sks_up = vksov.map(|s| s.as_spin().unwrap().0.as_slice());
                let sks_dn = vksov.map(|s| s.as_spin().unwrap().1.as_slice());

                let (evals_up, evecs_up) = self.compute_component(hks_up, sks_up, pool);
                let (evals_dn, evecs_dn) = self.compute_component(hks_dn, sks_dn, pool);

                (
                    KEigenValue::Spin(evals_up, evals_dn),
                    KEigenVector::Spin(evecs_up, evecs_dn),
                )
            }
        }
    }
}

/// Standard problem H x = e x for an orthogonal basis.
pub struct StandardSolver;

impl KEigenSolver for StandardSolver {
    fn compute_component(
        &self,
        hks: &[Matrix<c64>],
        _sks: Option<&[Matrix<c64>]>,
        pool: &dyn Pool,
    ) -> (Vec<Vec<f64>>, Vec<Matrix<c64>>) {
        distribute(hks, pool, |ik| eigh(&hks[ik]))
    }
}

/// Generalized problem H x = e S x for a nonorthogonal basis.
pub struct GeneralizedSolver;

impl KEigenSolver for GeneralizedSolver {
    fn compute_component(
        &self,
        hks: &[Matrix<c64>],
        sks: Option<&[Matrix<c64>]>,
        pool: &dyn Pool,
    ) -> (Vec<Vec<f64>>, Vec<Matrix<c64>>) {
        let sks = sks.expect("generalized solver requires overlap matrices");

        assert_eq!(hks.len(), sks.len());

        distribute(hks, pool, |ik| eigh_gen(&hks[ik], &sks[ik]))
    }
}

pub fn new(scheme: &str) -> Box<dyn KEigenSolver> {
    match scheme {
        "standard" => Box::new(StandardSolver),

        "generalized" => Box::new(GeneralizedSolver),

        _ => {
            panic!("eigen_solver scheme '{}' not implemented", scheme);
        }
    }
}

fn distribute<F>(
    hks: &[Matrix<c64>],
    pool: &dyn Pool,
    solve: F,
) -> (Vec<Vec<f64>>, Vec<Matrix<c64>>)
where
    F: Fn(usize) -> (Vec<f64>, Matrix<c64>),
{
    let nkpt = hks.len();
    let nbnd = hks[0].nrow();
    let nn = nbnd * nbnd;

    let range = pool.own_range(nkpt);

    let mut local_e = vec![0.0; range.len() * nbnd];
    let mut local_v = vec![ZERO_C64; range.len() * nn];

    for (li, ik) in range.enumerate() {
        let (evals, evecs) = solve(ik);

        local_e[li * nbnd..(li + 1) * nbnd].copy_from_slice(&evals);
        local_v[li * nn..(li + 1) * nn].copy_from_slice(evecs.as_slice());
    }

    let mut full_e = vec![0.0; nkpt * nbnd];
    let mut full_v = vec![ZERO_C64; nkpt * nn];

    pool.allgather_f64(&local_e, &mut full_e);
    pool.allgather_c64(&local_v, &mut full_v);

    let evals = full_e.chunks(nbnd).map(|c| c.to_vec()).collect();

    let evecs = full_v
        .chunks(nn)
        .map(|c| Matrix::from_column_slice(nbnd, nbnd, c))
        .collect();

    (evals, evecs)
}
