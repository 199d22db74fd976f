//! Transforms of the Hamiltonian between the k mesh and the
//! real-space lattice vector grid.
//!
//! The direct sums work on any k point set and are the band-path
//! interpolator; the FFT path requires the regular mesh and is used
//! by the grid symmetrization loop. Both use the same conventions:
//!
//!   HR(R) = (1/Nk) sum_k Hk exp(-2 pi i k.R)
//!   Hk(k) = sum_R w_R HR exp(+2 pi i k.R)

use kgrid::{linear_index, RGrid};
use matrix::Matrix;
use paoconsts::*;
use paofft3d::{zero_pad, PAOFFT3D};
use types::c64;

/// Direct summation k -> R over a uniform k mesh.
pub fn k_to_r_direct(
    hks: &[Matrix<c64>],
    kpts: &[[f64; 3]],
    rgrid: &RGrid,
) -> Vec<Matrix<c64>> {
    assert_eq!(hks.len(), kpts.len());

    let nawf = hks[0].nrow();
    let wk = 1.0 / kpts.len() as f64;

    let mut hrs = vec![Matrix::<c64>::new(nawf, nawf); rgrid.len()];

    for (ir, hr) in hrs.iter_mut().enumerate() {
        let rvec = rgrid.vector(ir);

        for (ik, hk) in hks.iter().enumerate() {
            let arg = -TWOPI * dot3(&kpts[ik], &rvec);
            let phase = c64::from_polar(wk, arg);

            hr.add_scaled(hk, phase);
        }
    }

    hrs
}

/// Direct summation R -> k; kpts may be any point set, on or off the
/// original mesh.
pub fn r_to_k_direct(
    hrs: &[Matrix<c64>],
    rgrid: &RGrid,
    kpts: &[[f64; 3]],
) -> Vec<Matrix<c64>> {
    assert_eq!(hrs.len(), rgrid.len());

    let nawf = hrs[0].nrow();

    let mut hks = vec![Matrix::<c64>::new(nawf, nawf); kpts.len()];

    for (ik, hk) in hks.iter_mut().enumerate() {
        for (ir, hr) in hrs.iter().enumerate() {
            let arg = TWOPI * dot3(&kpts[ik], &rgrid.vector(ir));
            let phase = c64::from_polar(rgrid.weight(ir), arg);

            hk.add_scaled(hr, phase);
        }
    }

    hks
}

/// FFT path k -> R on the regular nk mesh, with optional zero-padding
/// of the R grid by pad points per axis. Returns the R-space
/// Hamiltonian and its grid.
pub fn k_to_r_fft(
    hks: &[Matrix<c64>],
    nk: [usize; 3],
    pad: [usize; 3],
) -> (Vec<Matrix<c64>>, RGrid) {
    let nktot = nk[0] * nk[1] * nk[2];

    assert_eq!(hks.len(), nktot);

    let nawf = hks[0].nrow();
    let nkp = [nk[0] + pad[0], nk[1] + pad[1], nk[2] + pad[2]];
    let nkptot = nkp[0] * nkp[1] * nkp[2];

    let pfft = PAOFFT3D::new(nk[0], nk[1], nk[2]);

    let mut hrs = vec![Matrix::<c64>::new(nawf, nawf); nkptot];

    let mut vin = vec![ZERO_C64; nktot];
    let mut vout = vec![ZERO_C64; nktot];

    for m in 0..nawf {
        for n in 0..nawf {
            mesh_to_lanes(hks, m, n, nk, &mut vin);

            pfft.fft3d(&vin, &mut vout);
            vout.iter_mut().for_each(|x| *x /= nktot as f64);

            let padded = if nkp == nk {
                vout.clone()
            } else {
                zero_pad(&vout, nk, nkp)
            };

            lanes_to_mesh(&padded, m, n, nkp, &mut hrs);
        }
    }

    let rgrid = RGrid::regular(nkp);

    (hrs, rgrid)
}

/// FFT path R -> k on the regular nk mesh.
pub fn r_to_k_fft(hrs: &[Matrix<c64>], nk: [usize; 3]) -> Vec<Matrix<c64>> {
    let nktot = nk[0] * nk[1] * nk[2];

    assert_eq!(hrs.len(), nktot);

    let nawf = hrs[0].nrow();
    let pfft = PAOFFT3D::new(nk[0], nk[1], nk[2]);

    let mut hks = vec![Matrix::<c64>::new(nawf, nawf); nktot];

    let mut vin = vec![ZERO_C64; nktot];
    let mut vout = vec![ZERO_C64; nktot];

    for m in 0..nawf {
        for n in 0..nawf {
            mesh_to_lanes(hrs, m, n, nk, &mut vin);

            // unscaled backward transform
            pfft.ifft3d(&vin, &mut vout);
            vout.iter_mut().for_each(|x| *x *= nktot as f64);

            lanes_to_mesh(&vout, m, n, nk, &mut hks);
        }
    }

    hks
}

// mesh order (last grid component fastest) -> FFT layout (first
// component fastest) for one orbital pair
fn mesh_to_lanes(mats: &[Matrix<c64>], m: usize, n: usize, nk: [usize; 3], buf: &mut [c64]) {
    for i in 0..nk[0] {
        for j in 0..nk[1] {
            for k in 0..nk[2] {
                let imesh = linear_index(i, j, k, nk);
                let ifft = i + nk[0] * (j + nk[1] * k);

                buf[ifft] = mats[imesh][[m, n]];
            }
        }
    }
}

fn lanes_to_mesh(buf: &[c64], m: usize, n: usize, nk: [usize; 3], mats: &mut [Matrix<c64>]) {
    for i in 0..nk[0] {
        for j in 0..nk[1] {
            for k in 0..nk[2] {
                let imesh = linear_index(i, j, k, nk);
                let ifft = i + nk[0] * (j + nk[1] * k);

                mats[imesh][[m, n]] = buf[ifft];
            }
        }
    }
}

fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgrid::full_grid;

    // Hermitian 2x2 Hamiltonians on the mesh with H(-k) = H(k)*
    fn sample_hks(nk: [usize; 3]) -> Vec<Matrix<c64>> {
        let kpts = full_grid(nk);

        kpts.iter()
            .map(|kp| {
                let mut h = Matrix::<c64>::new(2, 2);

                let c1 = (TWOPI * kp[0]).cos() + 0.5 * (TWOPI * kp[1]).cos();
                let c2 = (TWOPI * kp[2]).cos();
                let s = (TWOPI * kp[0]).sin();

                h[[0, 0]] = c64::new(-2.0 * c1, 0.0);
                h[[1, 1]] = c64::new(1.5 * c2, 0.0);
                h[[0, 1]] = c64::new(0.3 * c1, 0.4 * s);
                h[[1, 0]] = h[[0, 1]].conj();

                h
            })
            .collect()
    }

    #[test]
    fn test_fft_round_trip() {
        let nk = [4, 2, 2];
        let hks = sample_hks(nk);

        let (hrs, _) = k_to_r_fft(&hks, nk, [0, 0, 0]);
        let back = r_to_k_fft(&hrs, nk);

        for (a, b) in hks.iter().zip(back.iter()) {
            assert!(a.max_abs_diff(b) < EPS10);
        }
    }

    #[test]
    fn test_fft_matches_direct() {
        let nk = [2, 2, 2];
        let hks = sample_hks(nk);
        let kpts = full_grid(nk);

        let (hrs_fft, rgrid) = k_to_r_fft(&hks, nk, [0, 0, 0]);
        let hrs_dir = k_to_r_direct(&hks, &kpts, &rgrid);

        for (a, b) in hrs_fft.iter().zip(hrs_dir.iter()) {
            assert!(a.max_abs_diff(b) < EPS8);
        }

        let hks_dir = r_to_k_direct(&hrs_fft, &rgrid, &kpts);

        for (a, b) in hks_dir.iter().zip(hks.iter()) {
            assert!(a.max_abs_diff(b) < EPS8);
        }
    }

    #[test]
    fn test_padding_preserves_coarse_mesh_values() {
        let nk = [4, 2, 1];
        let hks = sample_hks(nk);
        let kpts = full_grid(nk);

        let (hrs, rgrid) = k_to_r_fft(&hks, nk, [4, 2, 0]);

        assert_eq!(rgrid.len(), 8 * 4 * 1);

        let back = r_to_k_direct(&hrs, &rgrid, &kpts);

        for (a, b) in back.iter().zip(hks.iter()) {
            assert!(a.max_abs_diff(b) < EPS8);
        }
    }

    #[test]
    fn test_padded_grid_stays_hermitian() {
        let nk = [4, 1, 1];
        let hks = sample_hks(nk);

        let (hrs, rgrid) = k_to_r_fft(&hks, nk, [4, 0, 0]);

        // evaluate on the doubled mesh, every point must be Hermitian
        let fine_kpts = full_grid([8, 1, 1]);
        let fine = r_to_k_direct(&hrs, &rgrid, &fine_kpts);

        for h in fine.iter() {
            assert!(h.max_abs_diff(&h.adjoint()) < EPS10);
        }
    }

    #[test]
    fn test_built_hamiltonian_fourier_round_trip() {
        use paoham::{build_hks, ShiftKind};

        // one orbital, one fully projected band, two k points
        let nk = [2, 1, 1];

        let evals = vec![vec![-1.0], vec![1.0]];

        let mut proj = Matrix::<c64>::new(1, 1);
        proj[[0, 0]] = ONE_C64;

        let projs = vec![proj.clone(), proj];

        let hks = build_hks(&evals, &projs, 0.9, 5.0, 0.0, ShiftKind::None).unwrap();

        // the reduced Hamiltonian reproduces the raw eigenvalues
        assert!((hks[0][[0, 0]] - c64::new(-1.0, 0.0)).norm() < EPS12);
        assert!((hks[1][[0, 0]] - c64::new(1.0, 0.0)).norm() < EPS12);

        let (hrs, _) = k_to_r_fft(&hks, nk, [0, 0, 0]);
        let back = r_to_k_fft(&hrs, nk);

        for (a, b) in back.iter().zip(hks.iter()) {
            assert!(a.max_abs_diff(b) < EPS12);
        }
    }

    #[test]
    fn test_interpolation_at_mesh_point_is_exact() {
        let nk = [2, 2, 2];
        let hks = sample_hks(nk);
        let kpts = full_grid(nk);

        let (hrs, rgrid) = k_to_r_fft(&hks, nk, [0, 0, 0]);

        // single off-ordering query equal to a mesh point
        let q = [kpts[3]];
        let hq = r_to_k_direct(&hrs, &rgrid, &q);

        assert!(hq[0].max_abs_diff(&hks[3]) < EPS10);
    }
}
