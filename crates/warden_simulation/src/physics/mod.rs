//! Physics boundary module
//!
//! Locomotion-контроллер с кастомной velocity-интеграцией, статический
//! ObstacleWorld для sensor-запросов, collision layers через Rapier.

pub mod layers;
pub mod movement;
pub mod obstacles;

// Re-export основных типов
pub use movement::{
    spawn_pursuit_agent, spawn_quarry, Locomotion, LocomotionPlugin, LocomotionSet,
};
pub use obstacles::ObstacleWorld;
