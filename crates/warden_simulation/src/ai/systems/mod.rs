//! AI systems (strategic layer logic)

pub mod fsm;
pub mod positioning;

// Re-export all systems
pub use fsm::*;
pub use positioning::*;
