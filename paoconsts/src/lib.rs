use std::f64;
use types::c64;

// units : energy

pub const RY_TO_EV: f64 = 13.605698066;
pub const HA_TO_EV: f64 = 2.0 * RY_TO_EV;
pub const EV_TO_HA: f64 = 1.0 / HA_TO_EV;
pub const EV_TO_RY: f64 = 1.0 / RY_TO_EV;

// units : length

pub const BOHR_TO_ANG: f64 = 0.529177249;
pub const ANG_TO_BOHR: f64 = 1.0 / BOHR_TO_ANG;

//

pub const ZERO_C64: c64 = c64 { re: 0.0, im: 0.0 };
pub const ONE_C64: c64 = c64 { re: 1.0, im: 0.0 };
pub const I_C64: c64 = c64 { re: 0.0, im: 1.0 };

// pi

pub const PI: f64 = f64::consts::PI;
pub const TWOPI: f64 = 2.0 * f64::consts::PI;
pub const SQRT_HALF: f64 = f64::consts::FRAC_1_SQRT_2;

// numerical convergence

pub const EPS2: f64 = 1E-2;
pub const EPS3: f64 = 1E-3;
pub const EPS4: f64 = 1E-4;
pub const EPS5: f64 = 1E-5;
pub const EPS6: f64 = 1E-6;
pub const EPS8: f64 = 1E-8;
pub const EPS10: f64 = 1E-10;
pub const EPS12: f64 = 1E-12;
pub const EPS14: f64 = 1E-14;
pub const EPS30: f64 = 1E-30;

// defaults for the grid symmetrization loop

pub const SYMM_THRESHOLD: f64 = 1E-5;
pub const SYMM_MAX_ITER: usize = 16;
pub const LPF_CUTOFF: f64 = 0.5;
pub const LPF_SCALE: f64 = 0.5;
