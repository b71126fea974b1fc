//! Sensor: геометрические запросы агента к миру
//!
//! Stateless-запросы (кроме log-throttle): line-of-sight, дистанционные
//! полосы, path-clearance и 4-направленный contact probing. Всё — чистые
//! функции от позиций + ObstacleWorld + AIConfig.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::AIConfig;
use crate::physics::ObstacleWorld;

/// Четыре осевых направления contact-probe (вверх/вниз/влево/вправо)
const CARDINALS: [Vec2; 4] = [Vec2::Y, Vec2::NEG_Y, Vec2::NEG_X, Vec2::X];

/// Ниже этой длины суммарный contact-вектор считается схлопнувшимся
const CANCELLATION_EPSILON: f32 = 1e-3;

/// Дистанционная полоса относительно preferred ± comfort
///
/// Полосы взаимоисключающие и исчерпывающие (hysteresis band, не один
/// порог — иначе осцилляция на границе).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    TooClose,
    Comfortable,
    TooFar,
}

/// Классифицировать дистанцию до цели
pub fn distance_band(distance: f32, config: &AIConfig) -> DistanceBand {
    if distance < config.preferred_distance - config.comfort_zone {
        DistanceBand::TooClose
    } else if distance > config.preferred_distance + config.comfort_zone {
        DistanceBand::TooFar
    } else {
        DistanceBand::Comfortable
    }
}

/// Цель в радиусе обнаружения?
pub fn in_range(agent: Vec2, target: Vec2, config: &AIConfig) -> bool {
    agent.distance(target) <= config.detection_radius
}

/// Видна ли цель: радиус И отсутствие окклюзии
///
/// Вне радиуса — false. Иначе луч через точную дистанцию разделения:
/// true только если ни одно препятствие его не пересекает. Окклюзия
/// строго сильнее радиуса.
pub fn can_see_target(
    obstacles: &ObstacleWorld,
    agent: Vec2,
    target: Vec2,
    config: &AIConfig,
) -> bool {
    if !in_range(agent, target, config) {
        return false;
    }

    let separation = target - agent;
    let distance = separation.length();
    if distance < 1e-4 {
        return true; // Вплотную — нечему заслонять
    }

    obstacles
        .cast_ray(agent, separation / distance, distance, config.obstacle_mask)
        .is_none()
}

/// Цель ближе preferred − comfort?
pub fn too_close(agent: Vec2, target: Vec2, config: &AIConfig) -> bool {
    distance_band(agent.distance(target), config) == DistanceBand::TooClose
}

/// Цель дальше preferred + comfort?
pub fn too_far(agent: Vec2, target: Vec2, config: &AIConfig) -> bool {
    distance_band(agent.distance(target), config) == DistanceBand::TooFar
}

/// Свободна ли точка и путь до неё
///
/// false если препятствие перекрывает probe-диск в `point` ИЛИ луч от
/// агента до `point` пересекает препятствие. Используется и для пути
/// домой, и для боковых alternate-позиций.
pub fn is_path_clear(
    obstacles: &ObstacleWorld,
    agent: Vec2,
    point: Vec2,
    config: &AIConfig,
) -> bool {
    if obstacles.overlap_circle(point, config.probe_radius, config.obstacle_mask) {
        return false;
    }

    let offset = point - agent;
    let distance = offset.length();
    if distance < 1e-4 {
        return true;
    }

    obstacles
        .cast_ray(agent, offset / distance, distance, config.obstacle_mask)
        .is_none()
}

/// Прижаты ли мы к геометрии хоть в одном из четырёх направлений
///
/// Авторитетный, порядко-независимый предикат застревания: probe-диск
/// короткой дальности в каждую из осевых сторон, true при любом hit.
pub fn is_stuck_to_wall(obstacles: &ObstacleWorld, agent: Vec2, config: &AIConfig) -> bool {
    CARDINALS.iter().any(|&dir| {
        obstacles
            .cast_circle(
                agent,
                config.probe_radius,
                dir,
                config.probe_distance,
                config.obstacle_mask,
            )
            .is_some()
    })
}

/// Суммарное направление контакта (указывает НА препятствия)
///
/// Те же четыре probe, но без short-circuit: единичные векторы всех
/// столкнувшихся направлений суммируются и нормализуются. Противоположные
/// контакты (слева и справа одновременно) могут схлопнуть сумму в ноль —
/// тогда возвращаем равномерно случайный единичный вектор, чтобы у
/// recovery всегда был escape heading. Ноль возвращается только при
/// полном отсутствии контакта; о наличии контакта эта функция и
/// is_stuck_to_wall обязаны соглашаться (геометрия probe идентична).
pub fn stuck_direction(
    obstacles: &ObstacleWorld,
    agent: Vec2,
    config: &AIConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut contacts = 0u32;

    for &dir in &CARDINALS {
        let hit = obstacles.cast_circle(
            agent,
            config.probe_radius,
            dir,
            config.probe_distance,
            config.obstacle_mask,
        );
        if hit.is_some() {
            sum += dir;
            contacts += 1;
        }
    }

    if contacts == 0 {
        return Vec2::ZERO;
    }

    if sum.length() < CANCELLATION_EPSILON {
        // Vector cancellation: контакты есть, а направления нет —
        // подставляем случайный heading вместо нулевого вектора
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        return Vec2::new(angle.cos(), angle.sin());
    }

    sum.normalize()
}

/// Rate-limit диагностических сообщений sensor'а
///
/// Только для логов: никогда не задерживает и не гейтит переходы.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LogThrottle {
    /// Накопленное время с последнего пропущенного сообщения
    pub timer: f32,
    /// Минимальный интервал между сообщениями (секунды)
    pub interval: f32,
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self {
            timer: f32::MAX, // Первое сообщение проходит сразу
            interval: 0.5,
        }
    }
}

impl LogThrottle {
    /// Продвинуть таймер; true если сообщение можно эмитить
    pub fn allow(&mut self, delta: f32) -> bool {
        self.timer += delta;
        if self.timer >= self.interval {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::layers;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> AIConfig {
        AIConfig::default()
    }

    fn empty_world() -> ObstacleWorld {
        ObstacleWorld::default()
    }

    #[test]
    fn test_bands_partition_without_gaps() {
        let config = config();
        let lower = config.preferred_distance - config.comfort_zone;
        let upper = config.preferred_distance + config.comfort_zone;

        // Ровно одна полоса на каждой дистанции, границы входят в comfort
        for d in [0.0, lower - 0.01, lower, config.preferred_distance, upper, upper + 0.01, 100.0] {
            let band = distance_band(d, &config);
            let matches = [
                band == DistanceBand::TooClose,
                band == DistanceBand::Comfortable,
                band == DistanceBand::TooFar,
            ]
            .iter()
            .filter(|&&m| m)
            .count();
            assert_eq!(matches, 1, "d = {}", d);
        }

        assert_eq!(distance_band(lower - 0.01, &config), DistanceBand::TooClose);
        assert_eq!(distance_band(lower, &config), DistanceBand::Comfortable);
        assert_eq!(distance_band(upper, &config), DistanceBand::Comfortable);
        assert_eq!(distance_band(upper + 0.01, &config), DistanceBand::TooFar);
    }

    #[test]
    fn test_occlusion_overrides_range() {
        let config = config();
        let mut world = empty_world();

        let agent = Vec2::ZERO;
        let target = Vec2::new(6.0, 0.0); // В радиусе обнаружения

        assert!(can_see_target(&world, agent, target, &config));

        // Стена ровно между ними — видимость пропадает при той же дистанции
        world.insert_box(
            Vec2::new(3.0, 0.0),
            Vec2::new(0.2, 2.0),
            layers::LAYER_ENVIRONMENT,
        );
        assert!(!can_see_target(&world, agent, target, &config));
    }

    #[test]
    fn test_out_of_range_is_blind_even_unoccluded() {
        let config = config();
        let world = empty_world();

        let target = Vec2::new(config.detection_radius + 1.0, 0.0);
        assert!(!can_see_target(&world, Vec2::ZERO, target, &config));
    }

    #[test]
    fn test_path_clear_checks_both_disc_and_ray() {
        let config = config();
        let mut world = empty_world();

        let agent = Vec2::ZERO;
        let point = Vec2::new(8.0, 0.0);
        assert!(is_path_clear(&world, agent, point, &config));

        // Препятствие на самой точке
        world.insert_circle(point, 0.5, layers::LAYER_ENVIRONMENT);
        assert!(!is_path_clear(&world, agent, point, &config));

        // Препятствие на пути (точка свободна)
        let mut world = empty_world();
        world.insert_circle(Vec2::new(4.0, 0.0), 0.5, layers::LAYER_ENVIRONMENT);
        assert!(!is_path_clear(&world, agent, point, &config));
    }

    #[test]
    fn test_stuck_predicates_agree_on_contact() {
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // Нет контакта: оба отвечают "нет"
        let world = empty_world();
        assert!(!is_stuck_to_wall(&world, Vec2::ZERO, &config));
        assert_eq!(
            stuck_direction(&world, Vec2::ZERO, &config, &mut rng),
            Vec2::ZERO
        );

        // Стена слева в пределах probe_distance: оба отвечают "да"
        let mut world = empty_world();
        world.insert_box(
            Vec2::new(-0.6, 0.0),
            Vec2::new(0.2, 2.0),
            layers::LAYER_ENVIRONMENT,
        );
        assert!(is_stuck_to_wall(&world, Vec2::ZERO, &config));

        let dir = stuck_direction(&world, Vec2::ZERO, &config, &mut rng);
        assert_ne!(dir, Vec2::ZERO);
        // Единственный контакт слева → вектор указывает на препятствие
        assert!((dir - Vec2::NEG_X).length() < 1e-4, "dir = {:?}", dir);
    }

    #[test]
    fn test_vector_cancellation_returns_random_unit() {
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        // Стены слева И справа: сумма контактов схлопывается в ноль
        let mut world = empty_world();
        world.insert_box(
            Vec2::new(-0.6, 0.0),
            Vec2::new(0.2, 2.0),
            layers::LAYER_ENVIRONMENT,
        );
        world.insert_box(
            Vec2::new(0.6, 0.0),
            Vec2::new(0.2, 2.0),
            layers::LAYER_ENVIRONMENT,
        );

        assert!(is_stuck_to_wall(&world, Vec2::ZERO, &config));

        for _ in 0..20 {
            let dir = stuck_direction(&world, Vec2::ZERO, &config, &mut rng);
            // Не ноль и единичной длины — recovery всегда есть куда толкать
            assert!((dir.length() - 1.0).abs() < 1e-4, "dir = {:?}", dir);
        }
    }

    #[test]
    fn test_log_throttle_rate_limits() {
        let mut throttle = LogThrottle::default();

        // Первое сообщение проходит
        assert!(throttle.allow(0.0));
        // Сразу после — нет
        assert!(!throttle.allow(0.1));
        assert!(!throttle.allow(0.2));
        // После интервала — снова да
        assert!(throttle.allow(0.3));
    }
}
