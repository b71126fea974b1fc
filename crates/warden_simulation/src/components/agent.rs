//! Базовые компоненты агента: Agent, SpawnAnchor, PursuitTarget, Quarry

use bevy::prelude::*;

/// Преследователь — маркер контролируемой сущности
///
/// Автоматически добавляет PhysicsBody, Locomotion, AIState, AIConfig,
/// SpawnAnchor и LogThrottle через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    crate::components::PhysicsBody,
    crate::physics::Locomotion,
    crate::ai::AIState,
    crate::ai::AIConfig,
    SpawnAnchor,
    crate::sensing::LogThrottle
)]
pub struct Agent;

/// Домашняя позиция агента
///
/// Захватывается один раз при спавне, далее неизменна.
/// Якорь для leash-проверки, возврата домой и teleport-recovery.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SpawnAnchor(pub Vec2);

/// Ссылка на преследуемую сущность
///
/// Read-only: core читает Transform цели, но никогда её не мутирует.
#[derive(Component, Debug, Clone, Copy)]
pub struct PursuitTarget(pub Entity);

/// Маркер преследуемой сущности (спавн в demo/тестах)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Quarry;
