use crate::FermiShift;

/// Scalar-relativistic occupancy: every band holds two electrons.
pub struct FermiShiftNonSpin;

impl FermiShiftNonSpin {
    pub fn new() -> FermiShiftNonSpin {
        FermiShiftNonSpin
    }
}

impl FermiShift for FermiShiftNonSpin {
    fn n_occupied(&self, nelec: usize) -> usize {
        nelec / 2
    }
}
