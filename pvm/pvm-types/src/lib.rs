pub mod invoke_args;
pub mod invoke_results;
pub mod partial_state;
