//! Выбор точек подхода/отхода относительно цели

use bevy::prelude::*;

use crate::ai::AIConfig;
use crate::physics::ObstacleWorld;
use crate::sensing;

/// Доля preferred_distance для боковых fallback-смещений
const LATERAL_FACTOR: f32 = 0.5;

/// Короткий прямой шаг, когда все кандидаты заблокированы (метры)
const DIRECT_STEP: f32 = 1.0;

/// Точка подхода: preferred-дистанция от цели с нашей стороны
///
/// Если прямой кандидат заблокирован — перпендикулярные смещения слева,
/// потом справа (на укороченном плече); если и они заблокированы —
/// короткий прямой шаг к цели.
pub fn approach_position(
    obstacles: &ObstacleWorld,
    agent: Vec2,
    target: Vec2,
    config: &AIConfig,
) -> Vec2 {
    let Some(to_target) = (target - agent).try_normalize() else {
        return agent; // Цель прямо на нас — подходить некуда
    };

    let primary = target - to_target * config.preferred_distance;
    if sensing::is_path_clear(obstacles, agent, primary, config) {
        return primary;
    }

    let lateral = config.preferred_distance * LATERAL_FACTOR;
    let side = Vec2::new(-to_target.y, to_target.x); // Перпендикуляр влево
    for candidate in [target + side * lateral, target - side * lateral] {
        if sensing::is_path_clear(obstacles, agent, candidate, config) {
            return candidate;
        }
    }

    agent + to_target * DIRECT_STEP
}

/// Точка отхода: зеркало approach, прочь от цели
///
/// Финальный fallback — не шаг, а точка на минимальной допустимой
/// дистанции (preferred − comfort) от цели.
pub fn retreat_position(
    obstacles: &ObstacleWorld,
    agent: Vec2,
    target: Vec2,
    config: &AIConfig,
) -> Vec2 {
    // Цель вплотную: направление вырождено, берём произвольную ось
    let to_target = (target - agent).try_normalize().unwrap_or(Vec2::X);

    let primary = target - to_target * config.preferred_distance;
    if sensing::is_path_clear(obstacles, agent, primary, config) {
        return primary;
    }

    let lateral = config.preferred_distance * LATERAL_FACTOR;
    let side = Vec2::new(-to_target.y, to_target.x);
    for candidate in [target + side * lateral, target - side * lateral] {
        if sensing::is_path_clear(obstacles, agent, candidate, config) {
            return candidate;
        }
    }

    target - to_target * (config.preferred_distance - config.comfort_zone)
}
