use matrix::Matrix;
use paoconsts::*;
use types::c64;

pub fn factorial(n: usize) -> f64 {
    let mut v = 1.0;

    for i in 2..=n {
        v *= i as f64;
    }

    v
}

/// ZYZ rotation matrix from Euler angles.
pub fn eul2mat(alpha: f64, beta: f64, gamma: f64) -> Matrix<f64> {
    let (s1, c1) = alpha.sin_cos();
    let (s2, c2) = beta.sin_cos();
    let (s3, c3) = gamma.sin_cos();

    Matrix::<f64>::from_row_slice(
        3,
        3,
        &[
            c1 * c2 * c3 - s1 * s3,
            -c1 * c2 * s3 - c3 * s1,
            c1 * s2,
            c2 * c3 * s1 + c1 * s3,
            -c2 * s1 * s3 + c1 * c3,
            s1 * s2,
            -c3 * s2,
            s2 * s3,
            c2,
        ],
    )
}

/// Euler angles (alpha, beta, gamma) of a proper rotation, ZYZ convention.
pub fn mat2eul(r: &Matrix<f64>) -> [f64; 3] {
    assert_eq!(r.shape(), [3, 3]);

    if r[[2, 2]] < 1.0 {
        if r[[2, 2]] > -1.0 {
            [
                r[[1, 2]].atan2(r[[0, 2]]),
                r[[2, 2]].acos(),
                r[[2, 1]].atan2(-r[[2, 0]]),
            ]
        } else {
            [-r[[1, 0]].atan2(r[[1, 1]]), PI, 0.0]
        }
    } else {
        [r[[1, 0]].atan2(r[[1, 1]]), 0.0, 0.0]
    }
}

/// Snap Euler angles to the nearest whole degree.
pub fn round_euler(eul: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];

    for i in 0..3 {
        out[i] = (eul[i].to_degrees().round()).to_radians();
    }

    out
}

fn snap(v: &mut f64, target: f64, atol: f64) {
    if (*v - target).abs() < atol {
        *v = target;
    }
}

/// Snap values close to 0 and +-1 to those exact values.
pub fn correct_roundoff(arr: &mut [f64], atol: f64) {
    for v in arr.iter_mut() {
        snap(v, 0.0, atol);
        snap(v, 1.0, atol);
        snap(v, -1.0, atol);
    }
}

/// Like correct_roundoff but also snaps +-1/2 and +-sqrt(3)/2, which
/// show up in hexagonal rotations.
pub fn correct_roundoff_hex(arr: &mut [f64], atol: f64) {
    let sq3o2 = 3.0_f64.sqrt() / 2.0;

    for v in arr.iter_mut() {
        snap(v, 0.0, atol);
        snap(v, 1.0, atol);
        snap(v, -1.0, atol);
        snap(v, sq3o2, atol);
        snap(v, -sq3o2, atol);
        snap(v, 0.5, atol);
        snap(v, -0.5, atol);
    }
}

pub fn block_diag(blocks: &[&Matrix<c64>]) -> Matrix<c64> {
    let n: usize = blocks.iter().map(|b| b.nrow()).sum();

    let mut mat = Matrix::<c64>::new(n, n);
    let mut off = 0;

    for b in blocks {
        assert_eq!(b.nrow(), b.ncol(), "block_diag requires square blocks");

        for i in 0..b.nrow() {
            for j in 0..b.ncol() {
                mat[[off + i, off + j]] = b[[i, j]];
            }
        }

        off += b.nrow();
    }

    mat
}

/// Signed frequency of index i on a periodic axis of length n,
/// in [-n/2, n/2).
pub fn fft_freq(i: usize, n: usize) -> i64 {
    let half = (n + 1) / 2;

    if i < half {
        i as i64
    } else {
        i as i64 - n as i64
    }
}

/// Wrap a fractional coordinate into [-0.5, 0.5).
pub fn wrap_half(v: f64) -> f64 {
    let mut w = v.rem_euclid(1.0);

    if w >= 0.5 {
        w -= 1.0;
    }

    w
}
