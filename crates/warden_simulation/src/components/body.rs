//! Физическое тело: кастомная velocity-интеграция

use bevy::prelude::*;

/// Кастомное физическое тело (strategic layer владеет velocity)
///
/// Инвариант: velocity пишут только locomotion-системы.
/// Rapier используется для коллизий, интеграция наша.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    /// Текущая скорость (m/s)
    pub velocity: Vec2,
    /// Масса (kg) — нужна только rapier boundary
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 70.0,
        }
    }
}
