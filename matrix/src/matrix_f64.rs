use crate::{Dot, Matrix};

use nalgebra::DMatrix;
use paoconsts::*;
use std::ops::Mul;

impl Mul<f64> for Matrix<f64> {
    type Output = Matrix<f64>;

    fn mul(self, rhs: f64) -> Matrix<f64> {
        let mut mat = self;

        for v in mat.as_mut_slice().iter_mut() {
            *v *= rhs;
        }

        mat
    }
}

impl Dot for Matrix<f64> {
    type Output = Matrix<f64>;

    fn dot(&self, rhs: &Matrix<f64>) -> Matrix<f64> {
        assert_eq!(self.ncol(), rhs.nrow(), "Matrix::dot shape mismatch");

        let mut mat = Matrix::<f64>::new(self.nrow(), rhs.ncol());

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

impl Matrix<f64> {
    pub fn identity(n: usize) -> Matrix<f64> {
        let mut mat = Matrix::<f64>::new(n, n);

        for i in 0..n {
            mat[[i, i]] = 1.0;
        }

        mat
    }

    pub fn action(&self, vin: &[f64], vout: &mut [f64]) {
        vout.iter_mut().for_each(|x| *x = 0.0);

        for i in 0..self.ncol() {
            for j in 0..self.nrow() {
                vout[j] += self[[j, i]] * vin[i];
            }
        }
    }

    pub fn inv(&mut self) {
        assert_eq!(self.nrow(), self.ncol(), "Matrix::inv requires a square matrix");

        let mat = DMatrix::<f64>::from_column_slice(self.nrow(), self.ncol(), self.as_slice());

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

        let mat = DMatrix::<f64>::from_column_slice(self.nrow(), self.ncol(), self.as_slice());
        let pinv = mat
            .svd(true, true)
            .pseudo_inverse(EPS30)
            .expect("nalgebra SVD pseudo-inverse failed");

        self.as_mut_slice().copy_from_slice(pinv.as_slice());
    }

    pub fn trace(&self) -> f64 {
        assert_eq!(self.nrow(), self.ncol());

        (0..self.nrow()).map(|i| self[[i, i]]).sum()
    }

    pub fn det3(&self) -> f64 {
        assert_eq!(self.shape(), [3, 3], "Matrix::det3 requires a 3x3 matrix");

        self[[0, 0]] * (self[[1, 1]] * self[[2, 2]] - self[[1, 2]] * self[[2, 1]])
            - self[[0, 1]] * (self[[1, 0]] * self[[2, 2]] - self[[1, 2]] * self[[2, 0]])
            + self[[0, 2]] * (self[[1, 0]] * self[[2, 1]] - self[[1, 1]] * self[[2, 0]])
    }

    pub fn sum(&self) -> f64 {
        return self.as_slice().iter().sum();
    }

    pub fn max_abs_diff(&self, rhs: &Matrix<f64>) -> f64 {
        assert_eq!(self.shape(), rhs.shape());

        self.as_slice()
            .iter()
            .zip(rhs.as_slice().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let a = Matrix::<f64>::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::<f64>::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);

        let c = a.dot(&b);

        assert_eq!(c[[0, 0]], 2.0);
        assert_eq!(c[[0, 1]], 1.0);
        assert_eq!(c[[1, 0]], 4.0);
        assert_eq!(c[[1, 1]], 3.0);
    }

    #[test]
    fn test_inv() {
        let mut a = Matrix::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        a.inv();

        assert!((a[[0, 0]] - 0.5).abs() < EPS12);
        assert!((a[[1, 1]] - 0.25).abs() < EPS12);
    }

    #[test]
    fn test_det3() {
        let r = Matrix::<f64>::from_row_slice(
            3,
            3,
            &[0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
        );

        assert!((r.det3() + 1.0).abs() < EPS12);
    }
}
