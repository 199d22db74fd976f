//! Regular Monkhorst-Pack style grids in crystal fractional
//! coordinates, and the matching real-space lattice vector grids.

use lattice::Lattice;
use paoconsts::*;
use std::fmt;
use utility::fft_freq;

#[derive(Debug, Clone, PartialEq)]
pub enum KGridError {
    WrongSumRule { sum: f64, expected: f64 },
}

impl fmt::Display for KGridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KGridError::WrongSumRule { sum, expected } => {
                write!(
                    f,
                    "lattice vector weights sum to {} instead of {}",
                    sum, expected
                )
            }
        }
    }
}

impl std::error::Error for KGridError {}

/// Linear index of grid point (i, j, k): the last component runs
/// fastest.
pub fn linear_index(i: usize, j: usize, k: usize, nk: [usize; 3]) -> usize {
    k + j * nk[2] + i * nk[1] * nk[2]
}

/// Full k grid in crystal fractional coordinates, each component
/// wrapped into [-0.5, 0.5).
pub fn full_grid(nk: [usize; 3]) -> Vec<[f64; 3]> {
    let nktot = nk[0] * nk[1] * nk[2];
    let mut kpts = vec![[0.0; 3]; nktot];

    for i in 0..nk[0] {
        for j in 0..nk[1] {
            for k in 0..nk[2] {
                let n = linear_index(i, j, k, nk);

                kpts[n] = [
                    fft_freq(i, nk[0]) as f64 / nk[0] as f64,
                    fft_freq(j, nk[1]) as f64 / nk[1] as f64,
                    fft_freq(k, nk[2]) as f64 / nk[2] as f64,
                ];
            }
        }
    }

    kpts
}

/// Real-space lattice vector grid with interpolation weights.
#[derive(Debug, Clone, PartialEq)]
pub struct RGrid {
    vectors: Vec<[f64; 3]>,
    weights: Vec<f64>,
}

impl RGrid {
    /// The weights must sum to the number of grid points; a regular
    /// grid has unit weights.
    pub fn new(vectors: Vec<[f64; 3]>, weights: Vec<f64>) -> Result<RGrid, KGridError> {
        assert_eq!(vectors.len(), weights.len());

        let sum: f64 = weights.iter().sum();
        let expected = vectors.len() as f64;

        if (sum - expected).abs() > EPS8 {
            return Err(KGridError::WrongSumRule { sum, expected });
        }

        Ok(RGrid { vectors, weights })
    }

    /// Minimum-image lattice vectors of a regular nk grid, ordered
    /// like the k grid, all with unit weight.
    pub fn regular(nk: [usize; 3]) -> RGrid {
        let vectors: Vec<[f64; 3]> = full_grid(nk)
            .iter()
            .map(|k| {
                [
                    k[0] * nk[0] as f64,
                    k[1] * nk[1] as f64,
                    k[2] * nk[2] as f64,
                ]
            })
            .collect();

        let weights = vec![1.0; vectors.len()];

        RGrid { vectors, weights }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, i: usize) -> [f64; 3] {
        self.vectors[i]
    }

    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    pub fn vectors(&self) -> &[[f64; 3]] {
        &self.vectors
    }

    /// Cartesian coordinates of every vector, in units of the lattice.
    pub fn cartesian(&self, latt: &Lattice) -> Vec<[f64; 3]> {
        let mut out = vec![[0.0; 3]; self.len()];

        for (i, v) in self.vectors.iter().enumerate() {
            latt.frac_to_cart(v, &mut out[i]);
        }

        out
    }
}
