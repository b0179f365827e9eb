pub mod common;
pub mod work_report;

pub use common::*;
pub use work_report::*;
