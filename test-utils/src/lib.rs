//! Fixtures and a scriptable VM invoker shared by the accumulation crates' tests.
pub mod fixtures;
pub mod mock_invoker;
