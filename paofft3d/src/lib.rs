//! 3D complex FFT on a first-index-fastest grid.
//!
//! The element (i1, i2, i3) of an n1 x n2 x n3 grid lives at
//! i1 + n1 * (i2 + n2 * i3). The forward transform is unnormalized,
//! the backward transform carries the 1/N factor.

use paoconsts::*;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use types::c64;
use utility::fft_freq;

pub struct PAOFFT3D {
    n: [usize; 3],
    fwd: Vec<Arc<dyn Fft<f64>>>,
    bwd: Vec<Arc<dyn Fft<f64>>>,
}

impl PAOFFT3D {
    pub fn new(n1: usize, n2: usize, n3: usize) -> PAOFFT3D {
        let mut planner = FftPlanner::<f64>::new();

        let fwd = vec![
            planner.plan_fft_forward(n1),
            planner.plan_fft_forward(n2),
            planner.plan_fft_forward(n3),
        ];
        let bwd = vec![
            planner.plan_fft_inverse(n1),
            planner.plan_fft_inverse(n2),
            planner.plan_fft_inverse(n3),
        ];

        PAOFFT3D {
            n: [n1, n2, n3],
            fwd,
            bwd,
        }
    }

    pub fn ntot(&self) -> usize {
        self.n[0] * self.n[1] * self.n[2]
    }

    pub fn fft3d(&self, vin: &[c64], vout: &mut [c64]) {
        assert_eq!(vin.len(), self.ntot());
        assert_eq!(vout.len(), self.ntot());

        vout.copy_from_slice(vin);

        for axis in 0..3 {
            self.apply_axis(vout, axis, true);
        }
    }

    pub fn ifft3d(&self, vin: &[c64], vout: &mut [c64]) {
        assert_eq!(vin.len(), self.ntot());
        assert_eq!(vout.len(), self.ntot());

        vout.copy_from_slice(vin);

        for axis in 0..3 {
            self.apply_axis(vout, axis, false);
        }

        let ntot = self.ntot() as f64;
        vout.iter_mut().for_each(|x| *x /= ntot);
    }

    fn apply_axis(&self, data: &mut [c64], axis: usize, forward: bool) {
        let [n1, n2, n3] = self.n;

        let plan = if forward {
            &self.fwd[axis]
        } else {
            &self.bwd[axis]
        };

        let mut scratch = vec![ZERO_C64; plan.get_inplace_scratch_len()];
        let mut lane = vec![ZERO_C64; self.n[axis]];

        match axis {
            0 => {
                for i3 in 0..n3 {
                    for i2 in 0..n2 {
                        let base = n1 * (i2 + n2 * i3);
                        plan.process_with_scratch(&mut data[base..base + n1], &mut scratch);
                    }
                }
            }

            1 => {
                for i3 in 0..n3 {
                    for i1 in 0..n1 {
                        for i2 in 0..n2 {
                            lane[i2] = data[i1 + n1 * (i2 + n2 * i3)];
                        }

                        plan.process_with_scratch(&mut lane, &mut scratch);

                        for i2 in 0..n2 {
                            data[i1 + n1 * (i2 + n2 * i3)] = lane[i2];
                        }
                    }
                }
            }

            _ => {
                for i2 in 0..n2 {
                    for i1 in 0..n1 {
                        for i3 in 0..n3 {
                            lane[i3] = data[i1 + n1 * (i2 + n2 * i3)];
                        }

                        plan.process_with_scratch(&mut lane, &mut scratch);

                        for i3 in 0..n3 {
                            data[i1 + n1 * (i2 + n2 * i3)] = lane[i3];
                        }
                    }
                }
            }
        }
    }
}

// Destination indices and weights of source index i when an axis of
// length n is padded to length m. On an even axis the Nyquist
// component is shared half and half between -n/2 and +n/2 so that the
// conjugate pairing of frequencies survives the padding.
fn axis_pad_map(n: usize, m: usize) -> Vec<Vec<(usize, f64)>> {
    assert!(m >= n, "padded axis must not shrink");

    let mut map = Vec::with_capacity(n);

    for i in 0..n {
        let f = fft_freq(i, n);

        if m > n && n % 2 == 0 && i == n / 2 {
            let neg = (m as i64 + f) as usize;
            let pos = n / 2;

            map.push(vec![(neg, 0.5), (pos, 0.5)]);
        } else {
            let d = if f >= 0 {
                f as usize
            } else {
                (m as i64 + f) as usize
            };

            map.push(vec![(d, 1.0)]);
        }
    }

    map
}

/// Pad frequency-domain data with zeros, from an n grid to an m grid.
///
/// Low frequencies keep their signed positions; any relationship
/// between v[k] and v[N-k] is preserved on the padded grid.
pub fn zero_pad(src: &[c64], n: [usize; 3], m: [usize; 3]) -> Vec<c64> {
    assert_eq!(src.len(), n[0] * n[1] * n[2]);

    let maps = [
        axis_pad_map(n[0], m[0]),
        axis_pad_map(n[1], m[1]),
        axis_pad_map(n[2], m[2]),
    ];

    let mut out = vec![ZERO_C64; m[0] * m[1] * m[2]];

    for i3 in 0..n[2] {
        for i2 in 0..n[1] {
            for i1 in 0..n[0] {
                let v = src[i1 + n[0] * (i2 + n[1] * i3)];

                for &(d1, w1) in &maps[0][i1] {
                    for &(d2, w2) in &maps[1][i2] {
                        for &(d3, w3) in &maps[2][i3] {
                            out[d1 + m[0] * (d2 + m[1] * d3)] += v * (w1 * w2 * w3);
                        }
                    }
                }
            }
        }
    }

    out
}
