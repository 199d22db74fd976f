mod matrix_c64;
mod matrix_f64;

use std::fmt;
use std::ops::{Index, IndexMut};

pub trait Dot<Rhs = Self> {
    type Output;

    fn dot(&self, rhs: &Rhs) -> Self::Output;
}

/// Dense matrix with column-major storage.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Matrix<T> {
    nrow: usize,
    ncol: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Matrix<T> {
    pub fn new(nrow: usize, ncol: usize) -> Matrix<T> {
        Matrix {
            nrow,
            ncol,
            data: vec![T::default(); nrow * ncol],
        }
    }

    pub fn from_column_slice(nrow: usize, ncol: usize, v: &[T]) -> Matrix<T> {
        assert_eq!(nrow * ncol, v.len(), "Matrix::from_column_slice size mismatch");

        Matrix {
            nrow,
            ncol,
            data: v.to_vec(),
        }
    }

    pub fn from_row_slice(nrow: usize, ncol: usize, v: &[T]) -> Matrix<T> {
        assert_eq!(nrow * ncol, v.len(), "Matrix::from_row_slice size mismatch");

        let mut mat = Matrix::<T>::new(nrow, ncol);

        for i in 0..nrow {
            for j in 0..ncol {
                mat[[i, j]] = v[i * ncol + j].clone();
            }
        }

        mat
    }

    pub fn transpose(&self) -> Matrix<T> {
        let mut mat = Matrix::<T>::new(self.ncol, self.nrow);

        for i in 0..self.nrow {
            for j in 0..self.ncol {
                mat[[j, i]] = self[[i, j]].clone();
            }
        }

        mat
    }

    pub fn get_col(&self, j: usize) -> &[T] {
        &self.data[j * self.nrow..(j + 1) * self.nrow]
    }

    pub fn set_col(&mut self, j: usize, v: &[T]) {
        assert_eq!(v.len(), self.nrow, "Matrix::set_col size mismatch");

        self.data[j * self.nrow..(j + 1) * self.nrow].clone_from_slice(v);
    }
}

impl<T> Matrix<T> {
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.nrow, self.ncol]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<[usize; 2]> for Matrix<T> {
    type Output = T;

    fn index(&self, idx: [usize; 2]) -> &T {
        &self.data[idx[1] * self.nrow + idx[0]]
    }
}

impl<T> IndexMut<[usize; 2]> for Matrix<T> {
    fn index_mut(&mut self, idx: [usize; 2]) -> &mut T {
        &mut self.data[idx[1] * self.nrow + idx[0]]
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.nrow {
            for j in 0..self.ncol {
                write!(f, " {:>20}", self[[i, j]])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
