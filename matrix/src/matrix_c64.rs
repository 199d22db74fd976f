use crate::{Dot, Matrix};

use itertools::multizip;
use nalgebra::DMatrix;
use num_traits::Zero;
use paoconsts::*;
use std::ops::{AddAssign, Mul, MulAssign};
use types::c64;

impl Matrix<c64> {
    pub fn identity(n: usize) -> Matrix<c64> {
        let mut mat = Matrix::<c64>::new(n, n);

        for i in 0..n {
            mat[[i, i]] = ONE_C64;
        }

        mat
    }

    pub fn from_real(mat: &Matrix<f64>) -> Matrix<c64> {
        let data: Vec<c64> = mat.as_slice().iter().map(|&v| c64::new(v, 0.0)).collect();

        Matrix::from_column_slice(mat.nrow(), mat.ncol(), &data)
    }

    pub fn adjoint(&self) -> Matrix<c64> {
        let mut mat = Matrix::<c64>::new(self.ncol(), self.nrow());

        for i in 0..self.nrow() {
            for j in 0..self.ncol() {
                mat[[j, i]] = self[[i, j]].conj();
            }
        }

        mat
    }

    pub fn conj(&self) -> Matrix<c64> {
        let data: Vec<c64> = self.as_slice().iter().map(|v| v.conj()).collect();

        Matrix::from_column_slice(self.nrow(), self.ncol(), &data)
    }

    /// Replace the matrix by (M + M^H) / 2.
    pub fn hermitize(&mut self) {
        assert_eq!(self.nrow(), self.ncol());

        for i in 0..self.nrow() {
            for j in i..self.ncol() {
                let a = self[[i, j]];
                let b = self[[j, i]];

                self[[i, j]] = (a + b.conj()) / 2.0;
                self[[j, i]] = self[[i, j]].conj();
            }
        }
    }

    pub fn sum(&self) -> c64 {
        return self.as_slice().iter().sum();
    }

    pub fn action(&self, vin: &[c64], vout: &mut [c64]) {
        vout.iter_mut().for_each(|x| *x = c64::zero());

        for i in 0..self.ncol() {
            for j in 0..self.nrow() {
                vout[j] += self[[j, i]] * vin[i];
            }
        }
    }

    pub fn inv(&mut self) {
        assert_eq!(self.nrow(), self.ncol(), "Matrix::inv requires a square matrix");

        let mat = DMatrix::<c64>::from_column_slice(self.nrow(), self.ncol(), self.as_slice());

        if let Some(inv) = mat.try_inverse() {
            self.as_mut_slice().copy_from_slice(inv.as_slice());
        } else {
            self.pinv();
        }
    }

    pub fn pinv(&mut self) {
        assert_eq!(
            self.nrow(),
            self.ncol(),
            "Matrix::pinv requires a square matrix"
        );

        let mat = DMatrix::<c64>::from_column_slice(self.nrow(), self.ncol(), self.as_slice());
        let pinv = mat
            .svd(true, true)
            .pseudo_inverse(EPS30)
            .expect("nalgebra SVD pseudo-inverse failed");

        self.as_mut_slice().copy_from_slice(pinv.as_slice());
    }

    pub fn add_scaled(&mut self, rhs: &Matrix<c64>, s: c64) {
        assert_eq!(self.shape(), rhs.shape());

        for (d, v) in multizip((self.as_mut_slice().iter_mut(), rhs.as_slice().iter())) {
            *d += s * v;
        }
    }

    pub fn max_abs_diff(&self, rhs: &Matrix<c64>) -> f64 {
        assert_eq!(self.shape(), rhs.shape());

        self.as_slice()
            .iter()
            .zip(rhs.as_slice().iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    pub fn max_abs(&self) -> f64 {
        self.as_slice().iter().map(|v| v.norm()).fold(0.0, f64::max)
    }
}

impl Dot for Matrix<c64> {
    type Output = Matrix<c64>;

    fn dot(&self, rhs: &Matrix<c64>) -> Matrix<c64> {
        assert_eq!(self.ncol(), rhs.nrow(), "Matrix::dot shape mismatch");

        let mut mat = Matrix::<c64>::new(self.nrow(), rhs.ncol());

        for j in 0..rhs.ncol() {
            for k in 0..self.ncol() {
                let b = rhs[[k, j]];

                for i in 0..self.nrow() {
                    mat[[i, j]] += self[[i, k]] * b;
                }
            }
        }

        mat
    }
}

impl Mul<f64> for Matrix<c64> {
    type Output = Matrix<c64>;

    fn mul(self, rhs: f64) -> Matrix<c64> {
        let mut mat = self;

        for v in mat.as_mut_slice().iter_mut() {
            *v *= rhs;
        }

        mat
    }
}

impl Mul<c64> for Matrix<c64> {
    type Output = Matrix<c64>;

    fn mul(self, rhs: c64) -> Matrix<c64> {
        let mut mat = self;

        for v in mat.as_mut_slice().iter_mut() {
            *v *= rhs;
        }

        mat
    }
}

impl AddAssign<&Matrix<c64>> for Matrix<c64> {
    fn add_assign(&mut self, rhs: &Matrix<c64>) {
        assert_eq!(self.shape(), rhs.shape());

        for (d, s) in multizip((self.as_mut_slice().iter_mut(), rhs.as_slice().iter())) {
            *d += *s;
        }
    }
}

// elementwise sign mask, used for parity factors
impl MulAssign<&Matrix<f64>> for Matrix<c64> {
    fn mul_assign(&mut self, rhs: &Matrix<f64>) {
        assert_eq!(self.shape(), rhs.shape());

        for (d, s) in multizip((self.as_mut_slice().iter_mut(), rhs.as_slice().iter())) {
            *d *= *s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjoint() {
        let mut a = Matrix::<c64>::new(2, 2);
        a[[0, 1]] = c64::new(1.0, 2.0);

        let b = a.adjoint();

        assert_eq!(b[[1, 0]], c64::new(1.0, -2.0));
        assert_eq!(b[[0, 1]], c64::zero());
    }

    #[test]
    fn test_hermitize() {
        let mut a = Matrix::<c64>::new(2, 2);
        a[[0, 1]] = c64::new(2.0, 2.0);
        a[[1, 0]] = c64::new(0.0, 0.0);
        a[[0, 0]] = c64::new(1.0, 1.0);

        a.hermitize();

        assert_eq!(a[[0, 1]], c64::new(1.0, 1.0));
        assert_eq!(a[[1, 0]], c64::new(1.0, -1.0));
        assert_eq!(a[[0, 0]], c64::new(1.0, 0.0));
    }

    #[test]
    fn test_dot_identity() {
        let a = Matrix::<c64>::from_column_slice(
            2,
            2,
            &[
                c64::new(1.0, 1.0),
                c64::new(2.0, -1.0),
                c64::new(0.0, 3.0),
                c64::new(4.0, 0.0),
            ],
        );

        let c = a.dot(&Matrix::<c64>::identity(2));

        assert!(c.max_abs_diff(&a) < EPS14);
    }

    #[test]
    fn test_inv() {
        let mut a = Matrix::<c64>::identity(2);
        a[[0, 0]] = c64::new(0.0, 2.0);

        let b = a.clone();
        a.inv();

        let c = a.dot(&b);

        assert!(c.max_abs_diff(&Matrix::<c64>::identity(2)) < EPS12);
    }
}
