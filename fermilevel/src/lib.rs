//! Recentring of the Hamiltonian at the Fermi level.
//!
//! The Fermi energy is taken as the highest occupied eigenvalue over
//! the whole grid and subtracted from the Hamiltonian diagonals, so
//! that E = 0 marks the band edge of the filled states.

mod nonspin;
mod soc;

pub use nonspin::FermiShiftNonSpin;
pub use soc::FermiShiftSOC;

use paotypes::{KEigenValue, KHamiltonian};

pub trait FermiShift {
    /// Number of occupied bands for nelec electrons per cell.
    fn n_occupied(&self, nelec: usize) -> usize;

    /// Highest occupied eigenvalue over all k points and spins.
    fn fermi_energy(&self, vkevals: &KEigenValue, nelec: usize) -> f64 {
        let comps = vkevals.components();

        let nspin = comps.len();
        let nkpt = comps[0].len();
        let nocc = self.n_occupied(nelec);

        assert!(nocc > 0, "no occupied bands for nelec = {}", nelec);

        let mut all: Vec<f64> = comps
            .iter()
            .flat_map(|c| c.iter().flat_map(|ek| ek.iter().cloned()))
            .collect();

        all.sort_by(|a, b| a.partial_cmp(b).unwrap());

        all[nkpt * nocc * nspin - 1]
    }

    /// Shift the Hamiltonian so the Fermi level sits at zero. Returns
    /// the energy that was subtracted.
    fn recenter(
        &self,
        vkham: &mut KHamiltonian,
        vkevals: &KEigenValue,
        nelec: usize,
    ) -> f64 {
        let ef = self.fermi_energy(vkevals, nelec);

        for comp in vkham.components_mut() {
            for h in comp.iter_mut() {
                for i in 0..h.nrow() {
                    h[[i, i]] = h[[i, i]] - ef;
                }
            }
        }

        ef
    }
}

pub fn new(scheme: &str) -> Box<dyn FermiShift> {
    match scheme {
        "nonspin" => Box::new(FermiShiftNonSpin::new()),

        "soc" => Box::new(FermiShiftSOC::new()),

        _ => {
            panic!("fermi shift scheme '{}' not implemented", scheme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix::Matrix;
    use paoconsts::*;
    use types::c64;

    #[test]
    fn test_nonspin_fermi_energy() {
        // 2 electrons fill one band; the highest occupied state over
        // both k points is -1
        let vkevals = KEigenValue::NonSpin(vec![vec![-2.0, 1.0], vec![-1.0, 3.0]]);

        let shifter = new("nonspin");

        let ef = shifter.fermi_energy(&vkevals, 2);

        assert!((ef - (-1.0)).abs() < EPS12);
    }

    #[test]
    fn test_soc_fermi_energy() {
        // spinor bands hold one electron each
        let vkevals = KEigenValue::NonSpin(vec![vec![-1.0, 0.5, 2.0]]);

        let shifter = new("soc");

        let ef = shifter.fermi_energy(&vkevals, 2);

        assert!((ef - 0.5).abs() < EPS12);
    }

    #[test]
    fn test_spin_channels_share_the_level() {
        let vkevals = KEigenValue::Spin(vec![vec![-1.0, 2.0]], vec![vec![0.0, 3.0]]);

        let shifter = new("nonspin");

        // one occupied band per channel, highest occupied is 0
        let ef = shifter.fermi_energy(&vkevals, 2);

        assert!(ef.abs() < EPS12);
    }

    #[test]
    fn test_recenter_moves_the_diagonal() {
        let mut h = Matrix::<c64>::new(2, 2);
        h[[0, 0]] = c64::new(-2.0, 0.0);
        h[[1, 1]] = c64::new(1.0, 0.0);
        h[[0, 1]] = c64::new(0.25, 0.5);
        h[[1, 0]] = h[[0, 1]].conj();

        let mut vkham = KHamiltonian::NonSpin(vec![h]);
        let vkevals = KEigenValue::NonSpin(vec![vec![-2.1, 1.1]]);

        let shifter = new("nonspin");

        let ef = shifter.recenter(&mut vkham, &vkevals, 2);

        assert!((ef - (-2.1)).abs() < EPS12);

        let hks = vkham.as_non_spin().unwrap();

        assert!((hks[0][[0, 0]] - c64::new(0.1, 0.0)).norm() < EPS12);
        assert!((hks[0][[1, 1]] - c64::new(3.2, 0.0)).norm() < EPS12);

        // off-diagonals untouched
        assert!((hks[0][[0, 1]] - c64::new(0.25, 0.5)).norm() < EPS12);
    }
}
