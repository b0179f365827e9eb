pub mod accumulate;
pub mod authorizer;
pub mod privileges;
pub mod services;
pub mod statistics;
pub mod timeslot;
pub mod validators;

pub use accumulate::*;
pub use authorizer::*;
pub use privileges::*;
pub use services::*;
pub use statistics::*;
pub use timeslot::*;
pub use validators::*;
