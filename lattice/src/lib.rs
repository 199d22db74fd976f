use matrix::{Dot, Matrix};
use paoconsts::*;

/// Bravais lattice. The three lattice vectors are stored as the columns
/// of a 3x3 matrix, in Bohr.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lattice {
    data: Matrix<f64>,
}

impl Lattice {
    pub fn new(a: &[f64], b: &[f64], c: &[f64]) -> Lattice {
        let mut data = Matrix::<f64>::new(3, 3);

        for i in 0..3 {
            data[[i, 0]] = a[i];
            data[[i, 1]] = b[i];
            data[[i, 2]] = c[i];
        }

        Lattice { data }
    }

    pub fn unit() -> Lattice {
        Lattice {
            data: Matrix::<f64>::identity(3),
        }
    }

    pub fn get_vector_a(&self) -> [f64; 3] {
        [self.data[[0, 0]], self.data[[1, 0]], self.data[[2, 0]]]
    }

    pub fn get_vector_b(&self) -> [f64; 3] {
        [self.data[[0, 1]], self.data[[1, 1]], self.data[[2, 1]]]
    }

    pub fn get_vector_c(&self) -> [f64; 3] {
        [self.data[[0, 2]], self.data[[1, 2]], self.data[[2, 2]]]
    }

    pub fn as_matrix(&self) -> &Matrix<f64> {
        &self.data
    }

    pub fn volume(&self) -> f64 {
        self.data.det3().abs()
    }

    /// Reciprocal lattice vectors (columns), including the 2 pi factor.
    pub fn reciprocal(&self) -> Lattice {
        let mut inv = self.data.clone();
        inv.inv();

        // rows of the inverse are b_i / 2pi
        let data = inv.transpose() * TWOPI;

        Lattice { data }
    }

    pub fn frac_to_cart(&self, frac: &[f64], cart: &mut [f64]) {
        self.data.action(frac, cart);
    }

    pub fn cart_to_frac(&self, cart: &[f64], frac: &mut [f64]) {
        let mut inv = self.data.clone();
        inv.inv();
        inv.action(cart, frac);
    }

    /// Transform a rotation given in crystal coordinates into the
    /// Cartesian frame: A R A^{-1} with A the lattice-vector matrix.
    pub fn rotation_to_cart(&self, rot_crystal: &Matrix<f64>) -> Matrix<f64> {
        let mut inv = self.data.clone();
        inv.inv();

        self.data.dot(rot_crystal).dot(&inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume() {
        let latt = Lattice::new(&[2.0, 0.0, 0.0], &[0.0, 3.0, 0.0], &[0.0, 0.0, 4.0]);

        assert!((latt.volume() - 24.0).abs() < EPS12);
    }

    #[test]
    fn test_reciprocal_duality() {
        let latt = Lattice::new(&[1.0, 1.0, 0.0], &[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0]);
        let recip = latt.reciprocal();

        // a_i . b_j = 2 pi delta_ij
        let avecs = [latt.get_vector_a(), latt.get_vector_b(), latt.get_vector_c()];
        let bvecs = [
            recip.get_vector_a(),
            recip.get_vector_b(),
            recip.get_vector_c(),
        ];

        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = (0..3).map(|m| avecs[i][m] * bvecs[j][m]).sum();
                let expected = if i == j { TWOPI } else { 0.0 };

                assert!((dot - expected).abs() < EPS12);
            }
        }
    }

    #[test]
    fn test_frac_cart_round_trip() {
        let latt = Lattice::new(&[2.0, 0.5, 0.0], &[0.0, 3.0, 0.1], &[0.2, 0.0, 4.0]);

        let frac = [0.25, -0.5, 0.125];
        let mut cart = [0.0; 3];
        let mut back = [0.0; 3];

        latt.frac_to_cart(&frac, &mut cart);
        latt.cart_to_frac(&cart, &mut back);

        for i in 0..3 {
            assert!((frac[i] - back[i]).abs() < EPS12);
        }
    }

    #[test]
    fn test_rotation_to_cart_unit_lattice() {
        let latt = Lattice::unit();

        let rot =
            Matrix::<f64>::from_row_slice(3, 3, &[0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let cart = latt.rotation_to_cart(&rot);

        assert!(cart.max_abs_diff(&rot) < EPS12);
    }
}
