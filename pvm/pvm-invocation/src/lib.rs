pub mod accumulate;
pub mod context;
pub mod error;
pub mod on_transfer;

pub use context::InvocationContext;
