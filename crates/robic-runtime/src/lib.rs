pub mod expr;
pub mod message;
pub mod world;

pub use expr::{Evaluation, Evaluator, MAX_NESTING_DEPTH, SCRATCH_CAPACITY};
pub use message::{translate_message, MESSAGE_CAPACITY};
pub use world::World;
