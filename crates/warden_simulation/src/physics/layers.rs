//! Collision Layers Constants
//!
//! Битовые маски слоёв — централизованные константы для всего проекта.
//!
//! ## Архитектура:
//! - **Layer (битовая маска):** на каком слое находится объект
//! - **Mask (битовая маска):** с какими слоями объект взаимодействует
//!
//! ## Layers:
//! - Layer 1 (0b1 = 1): Agents (kinematic тела преследователей)
//! - Layer 2 (0b10 = 2): Environment (статические стены/препятствия)

use bevy_rapier2d::prelude::{CollisionGroups, Group};

/// Layer 1: Agents (kinematic bodies)
pub const LAYER_AGENTS: u32 = 0b1; // 1

/// Layer 2: Environment (статические стены и препятствия)
pub const LAYER_ENVIRONMENT: u32 = 0b10; // 2

/// Mask: агенты коллайдят с агентами + окружением
pub const MASK_AGENTS: u32 = LAYER_AGENTS | LAYER_ENVIRONMENT;

/// Mask: LOS/path/stuck запросы видят только окружение
///
/// Используется sensor-запросами по умолчанию (AIConfig::obstacle_mask).
pub const MASK_SENSOR: u32 = LAYER_ENVIRONMENT;

/// CollisionGroups тела агента (rapier boundary)
pub fn agent_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(LAYER_AGENTS),
        Group::from_bits_truncate(MASK_AGENTS),
    )
}
