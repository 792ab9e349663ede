//! The turn loop: runner state machine, turn events, and event consumption.

pub mod consumer;
pub mod events;
pub mod runner;

pub use consumer::{consume, consume_with, final_response_text, TurnOutcome, NO_RESPONSE_TEXT};
pub use events::TurnEvent;
pub use runner::{RunConfig, Runner, TurnState, DEFAULT_MAX_ROUND_TRIPS};
