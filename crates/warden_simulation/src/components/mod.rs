//! ECS Components для агента и его цели
//!
//! Организация по доменам:
//! - agent: archetype преследователя (Agent, SpawnAnchor, PursuitTarget, Quarry)
//! - body: физическое тело (PhysicsBody — velocity, mass)

pub mod agent;
pub mod body;

// Re-exports для удобного импорта
pub use agent::*;
pub use body::*;
