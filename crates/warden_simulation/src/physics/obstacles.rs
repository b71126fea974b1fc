//! Статическая геометрия мира для sensor-запросов
//!
//! ObstacleWorld — resource со статическими препятствиями (круги/боксы с
//! layer-масками). Отвечает на ray-cast, circle-cast и overlap запросы
//! через parry narrow-phase (re-export из bevy_rapier2d). Полный rapier
//! plugin остаётся на tactical layer, симуляции хватает narrow-phase.

use bevy::prelude::*;
use bevy_rapier2d::parry::math::{Isometry, Point, Real, Vector};
use bevy_rapier2d::parry::query::{self, Ray, RayCast, ShapeCastOptions};
use bevy_rapier2d::parry::shape::{Ball, SharedShape};

/// Одно статическое препятствие
pub struct Obstacle {
    shape: SharedShape,
    position: Isometry<Real>,
    layers: u32,
}

/// Статический мир препятствий (обновляется только при загрузке арены)
#[derive(Resource, Default)]
pub struct ObstacleWorld {
    obstacles: Vec<Obstacle>,
}

// glam → nalgebra конвертация (parry работает в nalgebra-типах)
fn to_iso(v: Vec2) -> Isometry<Real> {
    Isometry::translation(v.x, v.y)
}

fn to_point(v: Vec2) -> Point<Real> {
    Point::new(v.x, v.y)
}

fn to_vector(v: Vec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

impl ObstacleWorld {
    /// Добавить круглое препятствие (колонна, валун)
    pub fn insert_circle(&mut self, center: Vec2, radius: f32, layers: u32) {
        self.obstacles.push(Obstacle {
            shape: SharedShape::ball(radius),
            position: to_iso(center),
            layers,
        });
    }

    /// Добавить прямоугольное препятствие (стена)
    pub fn insert_box(&mut self, center: Vec2, half_extents: Vec2, layers: u32) {
        self.obstacles.push(Obstacle {
            shape: SharedShape::cuboid(half_extents.x, half_extents.y),
            position: to_iso(center),
            layers,
        });
    }

    /// Убрать всю геометрию (смена арены)
    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    fn matching(&self, mask: u32) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(move |ob| ob.layers & mask != 0)
    }

    /// Ray query: ближайшее пересечение луча с препятствием
    ///
    /// Возвращает дистанцию до ближайшего hit (None если луч чистый).
    /// `dir` нормализуется внутри; нулевое направление — всегда None.
    pub fn cast_ray(&self, origin: Vec2, dir: Vec2, max_dist: f32, mask: u32) -> Option<f32> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        let ray = Ray::new(to_point(origin), to_vector(dir));
        let mut nearest: Option<f32> = None;

        for ob in self.matching(mask) {
            if let Some(toi) = ob.shape.cast_ray(&ob.position, &ray, max_dist, true) {
                nearest = Some(nearest.map_or(toi, |best: f32| best.min(toi)));
            }
        }

        nearest
    }

    /// Circle-sweep query: диск радиуса `radius` летит вдоль `dir`
    ///
    /// Возвращает дистанцию центра диска до момента контакта.
    pub fn cast_circle(
        &self,
        origin: Vec2,
        radius: f32,
        dir: Vec2,
        max_dist: f32,
        mask: u32,
    ) -> Option<f32> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        let probe = Ball::new(radius);
        let probe_pos = to_iso(origin);
        let probe_vel = to_vector(dir); // скорость 1 m/s → toi == дистанция
        let static_vel = to_vector(Vec2::ZERO);

        let mut options = ShapeCastOptions::default();
        options.max_time_of_impact = max_dist;

        let mut nearest: Option<f32> = None;

        for ob in self.matching(mask) {
            let hit = query::cast_shapes(
                &probe_pos,
                &probe_vel,
                &probe,
                &ob.position,
                &static_vel,
                &*ob.shape,
                options,
            );

            if let Ok(Some(hit)) = hit {
                let toi = hit.time_of_impact;
                nearest = Some(nearest.map_or(toi, |best: f32| best.min(toi)));
            }
        }

        nearest
    }

    /// Static overlap query: пересекает ли диск хоть одно препятствие
    pub fn overlap_circle(&self, center: Vec2, radius: f32, mask: u32) -> bool {
        let probe = Ball::new(radius);
        let probe_pos = to_iso(center);

        self.matching(mask).any(|ob| {
            query::intersection_test(&probe_pos, &probe, &ob.position, &*ob.shape)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::layers;

    fn world_with_circle(center: Vec2, radius: f32) -> ObstacleWorld {
        let mut world = ObstacleWorld::default();
        world.insert_circle(center, radius, layers::LAYER_ENVIRONMENT);
        world
    }

    #[test]
    fn test_ray_hits_circle_at_expected_distance() {
        let world = world_with_circle(Vec2::new(5.0, 0.0), 1.0);

        let toi = world
            .cast_ray(Vec2::ZERO, Vec2::X, 10.0, layers::LAYER_ENVIRONMENT)
            .expect("ray should hit");

        // Круг в x=5, радиус 1 → контакт на x=4
        assert!((toi - 4.0).abs() < 1e-3, "toi = {}", toi);
    }

    #[test]
    fn test_ray_misses_when_out_of_reach() {
        let world = world_with_circle(Vec2::new(5.0, 0.0), 1.0);

        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::X, 3.0, layers::LAYER_ENVIRONMENT)
            .is_none());
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::NEG_X, 10.0, layers::LAYER_ENVIRONMENT)
            .is_none());
    }

    #[test]
    fn test_layer_mask_filters_obstacles() {
        let mut world = ObstacleWorld::default();
        world.insert_circle(Vec2::new(3.0, 0.0), 1.0, layers::LAYER_AGENTS);

        // Маска окружения не видит препятствие на слое агентов
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::X, 10.0, layers::LAYER_ENVIRONMENT)
            .is_none());
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::X, 10.0, layers::LAYER_AGENTS)
            .is_some());
    }

    #[test]
    fn test_circle_cast_contacts_earlier_than_ray() {
        let world = world_with_circle(Vec2::new(5.0, 0.0), 1.0);

        let ray_toi = world
            .cast_ray(Vec2::ZERO, Vec2::X, 10.0, layers::LAYER_ENVIRONMENT)
            .unwrap();
        let circle_toi = world
            .cast_circle(Vec2::ZERO, 0.5, Vec2::X, 10.0, layers::LAYER_ENVIRONMENT)
            .unwrap();

        // Диск радиуса 0.5 касается на полметра раньше точки
        assert!((circle_toi - (ray_toi - 0.5)).abs() < 1e-2);
    }

    #[test]
    fn test_overlap_circle() {
        let world = world_with_circle(Vec2::new(2.0, 0.0), 1.0);

        assert!(world.overlap_circle(Vec2::new(2.5, 0.0), 0.25, layers::LAYER_ENVIRONMENT));
        assert!(!world.overlap_circle(Vec2::new(5.0, 0.0), 0.25, layers::LAYER_ENVIRONMENT));
    }

    #[test]
    fn test_box_obstacle_blocks_ray() {
        let mut world = ObstacleWorld::default();
        world.insert_box(
            Vec2::new(0.0, 4.0),
            Vec2::new(3.0, 0.5),
            layers::LAYER_ENVIRONMENT,
        );

        let toi = world
            .cast_ray(Vec2::ZERO, Vec2::Y, 10.0, layers::LAYER_ENVIRONMENT)
            .expect("wall above should block");
        assert!((toi - 3.5).abs() < 1e-3, "toi = {}", toi);
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let world = world_with_circle(Vec2::ZERO, 1.0);
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::ZERO, 10.0, layers::LAYER_ENVIRONMENT)
            .is_none());
    }
}
