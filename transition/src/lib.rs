pub mod block_context;
pub mod error;
pub mod procedures;
pub mod state;

pub use block_context::{AccumulationState, BlockContext, BlockInputs};
pub use error::TransitionError;
pub use procedures::accumulation::{transition_accumulation, AccumulationSummary};
