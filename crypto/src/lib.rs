pub mod error;
pub mod hash;

pub use error::*;
pub use hash::*;
