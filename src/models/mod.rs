pub mod otp;
pub mod usuario;

pub use otp::*;
pub use usuario::*;
