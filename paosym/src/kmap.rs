//! Matching of rotated k points onto the regular grid.

use matrix::Matrix;
use paoconsts::*;
use utility::wrap_half;

/// For every covered grid point: its grid index, the index of the
/// source k point, and the operation that maps source onto it.
#[derive(Debug, Default, Clone)]
pub struct KMap {
    pub new_k_ind: Vec<usize>,
    pub orig_k_ind: Vec<usize>,
    pub sym_per_k: Vec<usize>,
}

impl KMap {
    pub fn len(&self) -> usize {
        self.new_k_ind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_k_ind.is_empty()
    }

    pub(crate) fn push(&mut self, new_k: usize, orig_k: usize, isym: usize) {
        self.new_k_ind.push(new_k);
        self.orig_k_ind.push(orig_k);
        self.sym_per_k.push(isym);
    }
}

/// Image of k under a crystal-frame rotation, wrapped into
/// [-0.5, 0.5) per component. A time-reversal operation sends k
/// to -Rk.
pub(crate) fn rotate_k(rot: &Matrix<f64>, k: &[f64; 3], time_reversal: bool) -> [f64; 3] {
    let km = [
        k[0].rem_euclid(1.0),
        k[1].rem_euclid(1.0),
        k[2].rem_euclid(1.0),
    ];

    let mut out = [0.0; 3];

    for i in 0..3 {
        let mut v = rot[[i, 0]] * km[0] + rot[[i, 1]] * km[1] + rot[[i, 2]] * km[2];

        if time_reversal {
            v = -v;
        }

        v = wrap_half(v);

        // roundoff can leave us just shy of the branch cut
        if (v - 0.5).abs() < EPS6 {
            v = -0.5;
        }
        if v.abs() < EPS6 {
            v = 0.0;
        }

        out[i] = v;
    }

    out
}

pub(crate) fn match_grid_index(k: &[f64; 3], full_grid: &[[f64; 3]]) -> Option<usize> {
    full_grid.iter().position(|g| {
        (g[0] - k[0]).abs() < EPS6 && (g[1] - k[1]).abs() < EPS6 && (g[2] - k[2]).abs() < EPS6
    })
}

/// Replace k points that sit on the grid within tolerance by the
/// exact grid values.
pub fn snap_to_grid(kpts: &mut [[f64; 3]], full_grid: &[[f64; 3]]) {
    for kp in kpts.iter_mut() {
        let hit = full_grid.iter().find(|g| {
            (g[0] - kp[0]).abs() < EPS5 && (g[1] - kp[1]).abs() < EPS5 && (g[2] - kp[2]).abs() < EPS5
        });

        if let Some(g) = hit {
            *kp = *g;
        }
    }
}
