#![allow(non_camel_case_types)]

pub use num_complex::Complex;

pub type c64 = Complex<f64>;
pub type c32 = Complex<f32>;
