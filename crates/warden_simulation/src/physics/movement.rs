//! Locomotion-контроллер агента
//!
//! Архитектура:
//! - Rapier для коллизий (RigidBody::KinematicPositionBased)
//! - Custom velocity integration (не используем Rapier forces)
//! - Сглаженный разгон/торможение + one-shot unstick импульс
//!
//! Детерминизм: fixed timestep (60Hz), RNG только через DeterministicRng

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody, Velocity};
use rand::Rng;

use crate::components::{Agent, PhysicsBody, PursuitTarget, Quarry, SpawnAnchor};
use crate::physics::layers;

/// Разброс escape-направления при unstick (±15°)
const UNSTICK_JITTER_MAX: f32 = std::f32::consts::PI / 12.0;

/// Locomotion-контроллер
///
/// Владеет velocity агента: "двигайся к точке", "стой", one-shot импульс.
/// Facing выводится из знака горизонтальной скорости.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    /// Активна ли команда движения к target
    pub moving: bool,
    /// Текущая целевая точка (world coordinates)
    pub target: Vec2,
    /// Запланированный one-shot импульс (применяет drive-система)
    pub pending_impulse: Option<Vec2>,
    /// Направление взгляда: +1 вправо, -1 влево
    pub facing: f32,
    /// Крейсерская скорость (m/s)
    pub speed: f32,
    /// Темп разгона/торможения (m/s²)
    pub acceleration: f32,
    /// Радиус прибытия — ближе цели движение считается законченным
    pub arrival_radius: f32,
    /// Базовая скорость unstick-импульса (m/s, до множителя эскалации)
    pub unstick_speed: f32,
    /// Dead-band по |vx| — ниже него facing не трогаем (анти-jitter)
    pub facing_deadband: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            moving: false,
            target: Vec2::ZERO,
            pending_impulse: None,
            facing: 1.0,
            speed: 4.0,          // 4 m/s — быстрый шаг
            acceleration: 18.0,  // до крейсерской примерно за 0.22с
            arrival_radius: 0.3,
            unstick_speed: 6.0,
            facing_deadband: 0.05,
        }
    }
}

impl Locomotion {
    /// Команда "двигайся к точке". Идемпотентна — повторный вызов ретаргетит.
    pub fn move_to(&mut self, point: Vec2) {
        self.target = point;
        self.moving = true;
    }

    /// Команда "стой". Скорость гасится плавно в drive-системе.
    pub fn stop(&mut self) {
        self.moving = false;
    }

    /// One-shot импульс прочь от стены
    ///
    /// `wall_dir` указывает НА препятствие; escape = -wall_dir, повёрнутый
    /// на случайный угол в ±15° (чтобы не повторять неудачный heading).
    /// Текущая траектория сбрасывается: этим тиком владеет импульс.
    pub fn unstick_in_direction(&mut self, wall_dir: Vec2, multiplier: f32, rng: &mut impl Rng) {
        let escape = -wall_dir.normalize_or_zero();
        if escape == Vec2::ZERO {
            return;
        }

        let jitter = (rng.gen::<f32>() * 2.0 - 1.0) * UNSTICK_JITTER_MAX;
        let heading = Vec2::from_angle(jitter).rotate(escape);

        self.moving = false;
        self.pending_impulse = Some(heading * self.unstick_speed * multiplier);
    }
}

/// Godot-style move_toward: сдвиг к target не больше чем на max_delta
fn move_toward(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let diff = target - current;
    let dist = diff.length();
    if dist <= max_delta || dist < 1e-6 {
        target
    } else {
        current + diff / dist * max_delta
    }
}

/// Система: drive — единственный писатель velocity
///
/// Приоритет: one-shot импульс > steering к target > плавное торможение.
pub fn locomotion_drive(
    mut query: Query<(&mut Locomotion, &mut PhysicsBody, &Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut locomotion, mut body, transform) in query.iter_mut() {
        if let Some(impulse) = locomotion.pending_impulse.take() {
            // Обнуляем скорость и отдаём тик импульсу
            body.velocity = impulse;
        } else if locomotion.moving {
            let position = transform.translation.truncate();
            let offset = locomotion.target - position;

            if offset.length() <= locomotion.arrival_radius {
                // Прибытие терминально — не перепроверяется до следующего move_to
                locomotion.moving = false;
            } else {
                let desired = offset.normalize() * locomotion.speed;
                body.velocity =
                    move_toward(body.velocity, desired, locomotion.acceleration * delta);
            }
        } else {
            // Плавное торможение к нулю (без мгновенной остановки)
            body.velocity = move_toward(body.velocity, Vec2::ZERO, locomotion.acceleration * delta);
        }

        // Facing из знака vx, вне dead-band (иначе не трогаем)
        if body.velocity.x.abs() > locomotion.facing_deadband {
            locomotion.facing = body.velocity.x.signum();
        }
    }
}

/// Система: интеграция velocity → Transform
///
/// Прямая интеграция (rapier только для collisions).
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform), With<Locomotion>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += (body.velocity * delta).extend(0.0);
    }
}

/// Система: синхронизация PhysicsBody.velocity → Rapier Velocity
pub fn sync_velocity_to_rapier(
    mut query: Query<(&PhysicsBody, &mut Velocity), With<Locomotion>>,
) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Set locomotion-систем (для упорядочивания относительно AI)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocomotionSet;

/// Plugin locomotion-контроллера
///
/// Системы выполняются после AI decision set, цепочкой для детерминизма.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            LocomotionSet.after(crate::ai::AiDecisionSet),
        );
        app.add_systems(
            FixedUpdate,
            (
                locomotion_drive,
                integrate_velocity_to_transform,
                sync_velocity_to_rapier,
            )
                .chain()
                .in_set(LocomotionSet),
        );
    }
}

/// Spawn helper агента-преследователя
///
/// Полный archetype: Agent (+required components), Transform, rapier
/// boundary (kinematic body + collider + collision groups).
pub fn spawn_pursuit_agent(commands: &mut Commands, position: Vec2, target: Entity) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Agent,
            SpawnAnchor(position),
            PursuitTarget(target),
            // Rapier physics boundary
            RigidBody::KinematicPositionBased,
            Collider::ball(0.4),
            Velocity::default(),
            layers::agent_groups(),
        ))
        .id()
}

/// Spawn helper цели (demo/тесты двигают её Transform напрямую)
pub fn spawn_quarry(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((Transform::from_translation(position.extend(0.0)), Quarry))
        .id()
}
