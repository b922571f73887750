//! AI systems (perception → transitions → attack → movement)

pub mod fsm;
pub mod movement;
pub mod perception;

// Re-export all systems
pub use fsm::*;
pub use movement::*;
pub use perception::*;
