pub mod generate;
pub mod noise;

pub use generate::{delayed, tone_burst};
pub use noise::noisy;
