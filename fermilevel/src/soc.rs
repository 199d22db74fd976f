use crate::FermiShift;

/// Spin-orbit occupancy: bands are spinor states holding one
/// electron each.
pub struct FermiShiftSOC;

impl FermiShiftSOC {
    pub fn new() -> FermiShiftSOC {
        FermiShiftSOC
    }
}

impl FermiShift for FermiShiftSOC {
    fn n_occupied(&self, nelec: usize) -> usize {
        nelec
    }
}
