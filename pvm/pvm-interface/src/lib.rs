pub mod error;
pub mod invoker;

pub use invoker::PVMInvoker;
