//! Spin-resolved containers for k-resolved quantities.
//!
//! A NonSpin variant carries one set of data, a Spin variant carries
//! the up and down channels. The k index is always the outer Vec.

use enum_as_inner::EnumAsInner;
use matrix::Matrix;
use types::c64;

#[derive(Debug, Clone, EnumAsInner)]
pub enum KHamiltonian {
    NonSpin(Vec<Matrix<c64>>),
    Spin(Vec<Matrix<c64>>, Vec<Matrix<c64>>),
}

impl KHamiltonian {
    pub fn n_spin(&self) -> usize {
        match self {
            KHamiltonian::NonSpin(_) => 1,
            KHamiltonian::Spin(_, _) => 2,
        }
    }

    pub fn n_kpt(&self) -> usize {
        match self {
            KHamiltonian::NonSpin(v) => v.len(),
            KHamiltonian::Spin(up, _) => up.len(),
        }
    }

    pub fn components(&self) -> Vec<&Vec<Matrix<c64>>> {
        match self {
            KHamiltonian::NonSpin(v) => vec![v],
            KHamiltonian::Spin(up, dn) => vec![up, dn],
        }
    }

    pub fn components_mut(&mut self) -> Vec<&mut Vec<Matrix<c64>>> {
        match self {
            KHamiltonian::NonSpin(v) => vec![v],
            KHamiltonian::Spin(up, dn) => vec![up, dn],
        }
    }
}

#[derive(Debug, Clone, EnumAsInner)]
pub enum KEigenValue {
    NonSpin(Vec<Vec<f64>>),
    Spin(Vec<Vec<f64>>, Vec<Vec<f64>>),
}

impl KEigenValue {
    pub fn components(&self) -> Vec<&Vec<Vec<f64>>> {
        match self {
            KEigenValue::NonSpin(v) => vec![v],
            KEigenValue::Spin(up, dn) => vec![up, dn],
        }
    }
}

#[derive(Debug, Clone, EnumAsInner)]
pub enum KEigenVector {
    NonSpin(Vec<Matrix<c64>>),
    Spin(Vec<Matrix<c64>>, Vec<Matrix<c64>>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_inner() {
        let vkham = KHamiltonian::NonSpin(vec![Matrix::<c64>::identity(2)]);

        assert_eq!(vkham.n_spin(), 1);
        assert_eq!(vkham.n_kpt(), 1);

        let inner = vkham.as_non_spin().unwrap();
        assert_eq!(inner[0].shape(), [2, 2]);

        assert!(vkham.as_spin().is_none());
    }

    #[test]
    fn test_components_mut() {
        let mut vkham = KHamiltonian::Spin(
            vec![Matrix::<c64>::identity(2)],
            vec![Matrix::<c64>::identity(2)],
        );

        assert_eq!(vkham.n_spin(), 2);

        for comp in vkham.components_mut() {
            comp.push(Matrix::<c64>::identity(2));
        }

        assert_eq!(vkham.n_kpt(), 2);
    }
}
