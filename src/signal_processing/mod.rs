pub mod convolution;
pub mod fir_design;
pub mod interpolation;
pub mod math;

pub use convolution::{convolve_full, convolve_same};
pub use fir_design::FilterKernel;
pub use interpolation::sinc_interpolate;
pub use math::sinc;
