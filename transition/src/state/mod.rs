pub mod accumulate;
pub mod preimages;
pub mod services;
pub mod statistics;
