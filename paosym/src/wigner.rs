//! Wigner rotation matrices for the orbital blocks.
//!
//! Angular momenta are carried as twice their value (l2 = 2l) so the
//! same code serves integer l and the half-integer j of the
//! spin-orbit basis.

use crate::SymmetryError;
use matrix::{Dot, Matrix};
use paoconsts::*;
use types::c64;
use utility::{correct_roundoff_hex, eul2mat, factorial, mat2eul, round_euler};

/// Wigner D matrix d^l_{m'm}(alpha, beta, gamma), ZYZ convention,
/// from the closed-form factorial sum.
pub fn d_mat_l2(alpha: f64, beta: f64, gamma: f64, l2: i64) -> Matrix<c64> {
    let dim = (l2 + 1) as usize;

    let mut d = Matrix::<c64>::new(dim, dim);

    let cb = (beta / 2.0).cos();
    let sb = (beta / 2.0).sin();

    for mp_i in 0..dim {
        let mp2 = -l2 + 2 * mp_i as i64;

        for m_i in 0..dim {
            let m2 = -l2 + 2 * m_i as i64;

            let lpm = ((l2 + m2) / 2) as usize;
            let lmm = ((l2 - m2) / 2) as usize;
            let lpmp = ((l2 + mp2) / 2) as usize;
            let lmmp = ((l2 - mp2) / 2) as usize;

            let out_sum =
                (factorial(lpm) * factorial(lmm) * factorial(lpmp) * factorial(lmmp)).sqrt();

            let w_max = (l2 + mp2) / 2 + 1;
            let mut dmm = 0.0;

            for w in 0..w_max {
                // factorial arguments must stay non-negative
                let df1 = (l2 + mp2) / 2 - w;
                let df2 = (l2 - m2) / 2 - w;
                let df4 = w + (m2 - mp2) / 2;

                if df1 < 0 || df2 < 0 || df4 < 0 {
                    continue;
                }

                let sign = if w % 2 == 0 { 1.0 } else { -1.0 };

                let denom = factorial(df1 as usize)
                    * factorial(df2 as usize)
                    * factorial(w as usize)
                    * factorial(df4 as usize);

                let pc = (l2 - (m2 - mp2) / 2 - 2 * w) as i32;
                let ps = (2 * w + (m2 - mp2) / 2) as i32;

                dmm += sign / denom * cb.powi(pc) * sb.powi(ps);
            }

            let mp = mp2 as f64 / 2.0;
            let m = m2 as f64 / 2.0;

            let phase = c64::from_polar(1.0, -alpha * mp) * c64::from_polar(1.0, -gamma * m);

            d[[mp_i, m_i]] = phase * (dmm * out_sum);
        }
    }

    d
}

/// Unitaries taking the |l m> basis to the real chemistry orbitals,
/// for l = 0..3.
pub fn chemistry_trans() -> [Matrix<c64>; 4] {
    let rsh = c64::new(SQRT_HALF, 0.0);
    let ish = c64::new(0.0, SQRT_HALF);
    let one = ONE_C64;

    let mut t0 = Matrix::<c64>::new(1, 1);
    t0[[0, 0]] = one;

    // m = [-1, 0, 1] -> pz, px, py
    let mut t1 = Matrix::<c64>::new(3, 3);
    t1[[0, 1]] = one;
    t1[[1, 0]] = -rsh;
    t1[[1, 2]] = rsh;
    t1[[2, 0]] = ish;
    t1[[2, 2]] = ish;

    // m = [-2..2] -> dz2, dzx, dzy, dx2-y2, dxy
    let mut t2 = Matrix::<c64>::new(5, 5);
    t2[[0, 2]] = one;
    t2[[1, 1]] = -rsh;
    t2[[1, 3]] = rsh;
    t2[[2, 1]] = ish;
    t2[[2, 3]] = ish;
    t2[[3, 0]] = rsh;
    t2[[3, 4]] = rsh;
    t2[[4, 0]] = -ish;
    t2[[4, 4]] = ish;

    // m = [-3..3] -> real f combinations
    let mut t3 = Matrix::<c64>::new(7, 7);
    t3[[0, 3]] = one;
    t3[[1, 2]] = -rsh;
    t3[[1, 4]] = rsh;
    t3[[2, 2]] = ish;
    t3[[2, 4]] = ish;
    t3[[3, 1]] = rsh;
    t3[[3, 5]] = rsh;
    t3[[4, 1]] = -ish;
    t3[[4, 5]] = ish;
    t3[[5, 0]] = -rsh;
    t3[[5, 6]] = rsh;
    t3[[6, 0]] = ish;
    t3[[6, 6]] = ish;

    [t0, t1, t2, t3]
}

fn negate(mat: &Matrix<f64>) -> Matrix<f64> {
    mat.clone() * -1.0
}

fn close_to(a: &Matrix<f64>, b: &Matrix<f64>, atol: f64) -> bool {
    let mut snapped = a.clone();
    correct_roundoff_hex(snapped.as_mut_slice(), EPS6);

    snapped.max_abs_diff(b) < atol
}

/// Euler angles of a Cartesian symmetry operation, snapped to whole
/// degrees, plus whether the operation carries an inversion.
pub fn euler_of_symop(rot_cart: &Matrix<f64>, iop: usize) -> Result<([f64; 3], bool), SymmetryError> {
    let eul = round_euler(mat2eul(rot_cart));

    if close_to(&eul2mat(eul[0], eul[1], eul[2]), rot_cart, EPS3) {
        return Ok((eul, false));
    }

    // improper rotation, factor out the inversion
    let proper = negate(rot_cart);
    let eul = round_euler(mat2eul(&proper));

    if close_to(&eul2mat(eul[0], eul[1], eul[2]), &proper, EPS3) {
        return Ok((eul, true));
    }

    Err(SymmetryError::EulerReconstruction { op_index: iop })
}

/// Wigner blocks of one operation for the four orbital (or spinor)
/// channels. l2_set is [0, 2, 4, 6] for the scalar basis and
/// [1, 3, 5, 7] for the spin-orbit one.
pub fn wigner_blocks(
    rot_cart: &Matrix<f64>,
    iop: usize,
    l2_set: [i64; 4],
) -> Result<([Matrix<c64>; 4], bool), SymmetryError> {
    let (eul, inversion) = euler_of_symop(rot_cart, iop)?;

    let blocks = [
        d_mat_l2(eul[0], eul[1], eul[2], l2_set[0]),
        d_mat_l2(eul[0], eul[1], eul[2], l2_set[1]),
        d_mat_l2(eul[0], eul[1], eul[2], l2_set[2]),
        d_mat_l2(eul[0], eul[1], eul[2], l2_set[3]),
    ];

    Ok((blocks, inversion))
}

/// Rotate the scalar Wigner blocks into the chemistry basis:
/// T d T^H per channel.
pub fn to_chemistry_basis(blocks: &[Matrix<c64>; 4]) -> [Matrix<c64>; 4] {
    let trans = chemistry_trans();

    [
        trans[0].dot(&blocks[0]).dot(&trans[0].adjoint()),
        trans[1].dot(&blocks[1]).dot(&trans[1].adjoint()),
        trans[2].dot(&blocks[2]).dot(&trans[2].adjoint()),
        trans[3].dot(&blocks[3]).dot(&trans[3].adjoint()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(u: &Matrix<c64>) -> bool {
        let id = Matrix::<c64>::identity(u.nrow());

        u.dot(&u.adjoint()).max_abs_diff(&id) < EPS10
    }

    #[test]
    fn test_d_mat_identity_rotation() {
        for &l2 in &[0i64, 1, 2, 3, 4, 6, 7] {
            let d = d_mat_l2(0.0, 0.0, 0.0, l2);
            let id = Matrix::<c64>::identity((l2 + 1) as usize);

            assert!(d.max_abs_diff(&id) < EPS12);
        }
    }

    #[test]
    fn test_d_mat_is_unitary() {
        let angles = [[0.4, 1.1, -0.7], [PI / 2.0, PI / 3.0, 0.0], [1.0, 2.0, 3.0]];

        for a in angles.iter() {
            for &l2 in &[2i64, 4, 6, 1, 3] {
                let d = d_mat_l2(a[0], a[1], a[2], l2);

                assert!(is_unitary(&d));
            }
        }
    }

    #[test]
    fn test_d_mat_l1_z_rotation() {
        // rotation about z by phi is diagonal: exp(-i m phi)
        let phi = 0.6;
        let d = d_mat_l2(phi, 0.0, 0.0, 2);

        for (i, m) in (-1..=1).enumerate() {
            let expected = c64::from_polar(1.0, -phi * m as f64);

            assert!((d[[i, i]] - expected).norm() < EPS12);
        }

        assert!(d[[0, 1]].norm() < EPS12);
        assert!(d[[1, 2]].norm() < EPS12);
    }

    #[test]
    fn test_spinor_rotation_2pi_is_minus_one() {
        // j = 1/2 picks up a sign under a full turn
        let d = d_mat_l2(TWOPI, 0.0, 0.0, 1);
        let minus_id = Matrix::<c64>::identity(2) * c64::new(-1.0, 0.0);

        assert!(d.max_abs_diff(&minus_id) < EPS12);
    }

    #[test]
    fn test_chemistry_trans_unitary() {
        for t in chemistry_trans().iter() {
            assert!(is_unitary(t));
        }
    }

    #[test]
    fn test_chemistry_p_block_is_real_for_c4z() {
        // 90 degree rotation about z maps px -> py up to sign; the
        // chemistry-basis block must be real
        let rot = eul2mat(PI / 2.0, 0.0, 0.0);
        let (blocks, inv) = wigner_blocks(&rot, 0, [0, 2, 4, 6]).unwrap();

        assert!(!inv);

        let chem = to_chemistry_basis(&blocks);

        for v in chem[1].as_slice() {
            assert!(v.im.abs() < EPS10);
        }
    }

    #[test]
    fn test_chemistry_f_block_is_real_for_z_rotation() {
        // a real rotation must give a real operator in every real
        // chemistry channel, the f block included
        let rot = eul2mat(PI / 4.0, 0.0, 0.0);
        let (blocks, inv) = wigner_blocks(&rot, 0, [0, 2, 4, 6]).unwrap();

        assert!(!inv);

        let chem = to_chemistry_basis(&blocks);

        for v in chem[3].as_slice() {
            assert!(v.im.abs() < EPS10);
        }
    }

    #[test]
    fn test_inversion_detected() {
        let inv_op = Matrix::<f64>::identity(3) * -1.0;

        let (_, inversion) = euler_of_symop(&inv_op, 0).unwrap();

        assert!(inversion);
    }

    #[test]
    fn test_proper_rotation_not_flagged() {
        let rot = eul2mat(PI / 3.0, PI / 2.0, 0.0);

        let (_, inversion) = euler_of_symop(&rot, 0).unwrap();

        assert!(!inversion);
    }
}
