//! FSM AI systems (stuck pre-emption, mode behavior, leash).
//!
//! Каждый тик: (a) poll застревания — высший приоритет, прерывает любой
//! режим; (b) поведение текущего режима (sensor-запросы → команды в
//! Locomotion); (c) leash-проверка. Всё синхронно внутри FixedUpdate.

use bevy::prelude::*;

use crate::ai::systems::positioning;
use crate::ai::{AIConfig, AIState, ResumeMode, StuckRecovery};
use crate::components::{Agent, PursuitTarget, SpawnAnchor};
use crate::physics::{Locomotion, ObstacleWorld};
use crate::sensing::{self, LogThrottle};
use crate::DeterministicRng;

/// Система: stuck pre-emption (высший приоритет)
///
/// Прерывает ЛЮБОЙ режим, включая teleport-ожидание другого агента.
/// Guard mode != Stuck: проверка не может перевзвести сама себя.
pub fn stuck_preemption(
    mut agents: Query<(Entity, &mut AIState, &AIConfig, &Transform), With<Agent>>,
    obstacles: Res<ObstacleWorld>,
) {
    for (entity, mut state, config, transform) in agents.iter_mut() {
        if matches!(state.as_ref(), AIState::Stuck { .. }) {
            continue;
        }

        let position = transform.translation.truncate();
        if sensing::is_stuck_to_wall(&obstacles, position, config) {
            let previous = state.resume_mode();
            crate::log(&format!(
                "🧱 AI: {:?} {} → Stuck (wall contact)",
                entity,
                state.label()
            ));
            *state = AIState::stuck(previous);
        }
    }
}

/// Система: AI FSM tick (поведение режима + leash)
///
/// Порядок приоритетов внутри Stuck: teleport countdown → forced →
/// escape-проверка → эскалация local recovery.
pub fn fsm_tick(
    mut agents: Query<
        (
            Entity,
            &mut AIState,
            &AIConfig,
            &mut Locomotion,
            &mut Transform,
            &SpawnAnchor,
            &PursuitTarget,
            &mut LogThrottle,
        ),
        With<Agent>,
    >,
    targets: Query<&Transform, Without<Agent>>,
    obstacles: Res<ObstacleWorld>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut state, config, mut locomotion, mut transform, anchor, pursuit, mut throttle) in
        agents.iter_mut()
    {
        // Цель могла despawn'уться — агент просто держит текущий режим
        let Ok(target_transform) = targets.get(pursuit.0) else {
            continue;
        };
        let target_pos = target_transform.translation.truncate();
        let position = transform.translation.truncate();
        let spawn = anchor.0;

        let mut new_state = match state.as_ref() {
            AIState::Idle => {
                if sensing::can_see_target(&obstacles, position, target_pos, config) {
                    crate::log(&format!("👁️ AI: {:?} Idle → Chase (target sighted)", entity));
                    AIState::chase()
                } else {
                    AIState::Idle
                }
            }

            AIState::Chase {
                idle_timer,
                last_target_pos,
            } => {
                if !sensing::can_see_target(&obstacles, position, target_pos, config) {
                    // Ждём реакквизицию на месте (без перехода)
                    locomotion.stop();
                    AIState::Chase {
                        idle_timer: *idle_timer,
                        last_target_pos: *last_target_pos,
                    }
                } else if sensing::too_close(position, target_pos, config) {
                    crate::log(&format!("⚔️ AI: {:?} Chase → Retreat (too close)", entity));
                    // Немедленный retreat-тик в том же кадре (zero-latency)
                    retreat_tick(
                        entity,
                        &obstacles,
                        &mut locomotion,
                        position,
                        target_pos,
                        config,
                        0.0,
                        delta,
                    )
                } else {
                    let mut idle_timer = *idle_timer + delta;
                    let mut last_target_pos = *last_target_pos;

                    if idle_timer >= config.reaction_delay {
                        // Первая выдача считается "цель сместилась"
                        let target_moved = last_target_pos
                            .map_or(true, |p| p.distance(target_pos) > config.reaction_threshold);

                        if sensing::too_far(position, target_pos, config) && target_moved {
                            let point = positioning::approach_position(
                                &obstacles, position, target_pos, config,
                            );
                            locomotion.move_to(point);
                            crate::log(&format!(
                                "🏃 AI: {:?} chase reposition → {:?}",
                                entity, point
                            ));
                            idle_timer = 0.0;
                            last_target_pos = Some(target_pos);
                        }
                    }

                    AIState::Chase {
                        idle_timer,
                        last_target_pos,
                    }
                }
            }

            AIState::Retreat { idle_timer } => retreat_tick(
                entity,
                &obstacles,
                &mut locomotion,
                position,
                target_pos,
                config,
                *idle_timer,
                delta,
            ),

            AIState::Return {
                idle_timer,
                no_path_timer,
            } => {
                if position.distance(spawn) <= config.home_arrival_radius {
                    locomotion.stop();
                    crate::log(&format!("🏠 AI: {:?} Return → Idle (home)", entity));
                    AIState::Idle
                } else if sensing::is_path_clear(&obstacles, position, spawn, config) {
                    let idle_timer = *idle_timer + delta;
                    if idle_timer >= config.reaction_delay {
                        locomotion.move_to(spawn); // Идемпотентный ретаргет
                    }
                    AIState::Return {
                        idle_timer,
                        no_path_timer: 0.0,
                    }
                } else {
                    let no_path_timer = *no_path_timer + delta;
                    if no_path_timer > config.no_path_timeout {
                        // Logical stuck: контакта нет, но маршрута тоже нет.
                        // Nudge такое не чинит — local recovery пропускается.
                        crate::log(&format!(
                            "🧱 AI: {:?} Return → Stuck (path blocked {:.1}s, forced)",
                            entity, no_path_timer
                        ));
                        locomotion.stop();
                        AIState::stuck_forced(ResumeMode::Return)
                    } else {
                        AIState::Return {
                            idle_timer: *idle_timer,
                            no_path_timer,
                        }
                    }
                }
            }

            AIState::Stuck { previous, recovery } => stuck_tick(
                entity,
                &obstacles,
                &mut locomotion,
                &mut transform,
                position,
                spawn,
                config,
                *previous,
                *recovery,
                &mut rng,
                &mut throttle,
                delta,
            ),
        };

        // Leash check: всем режимам кроме Stuck и Return. Может срезать
        // Chase/Retreat посреди действия.
        if !matches!(new_state, AIState::Stuck { .. } | AIState::Return { .. })
            && position.distance(spawn) > config.leash_radius
        {
            crate::log(&format!(
                "🏠 AI: {:?} {} → Return (leash exceeded)",
                entity,
                new_state.label()
            ));
            new_state = AIState::return_home();
        }

        if *state != new_state {
            *state = new_state;
        }
    }
}

/// Один тик Retreat-поведения
///
/// Вызывается и из Retreat-ветки, и из Chase при переходе too_close
/// (немедленное исполнение в том же кадре).
fn retreat_tick(
    entity: Entity,
    obstacles: &ObstacleWorld,
    locomotion: &mut Locomotion,
    position: Vec2,
    target_pos: Vec2,
    config: &AIConfig,
    idle_timer: f32,
    delta: f32,
) -> AIState {
    if !sensing::can_see_target(obstacles, position, target_pos, config) {
        locomotion.stop();
        return AIState::Retreat { idle_timer };
    }

    if sensing::too_close(position, target_pos, config) {
        let mut idle_timer = idle_timer + delta;
        if idle_timer >= config.reaction_delay {
            let point = positioning::retreat_position(obstacles, position, target_pos, config);
            locomotion.move_to(point);
            crate::log(&format!("🏃 AI: {:?} retreat reposition → {:?}", entity, point));
            idle_timer = 0.0;
        }
        AIState::Retreat { idle_timer }
    } else {
        crate::log(&format!("⚔️ AI: {:?} Retreat → Chase (distance ok)", entity));
        AIState::chase()
    }
}

/// Один тик Stuck-recovery
///
/// teleporting → countdown; forced → сразу взводим teleport; иначе —
/// escape-проверка каждый тик, эскалирующие импульсы по таймеру,
/// исчерпание попыток взводит teleport.
fn stuck_tick(
    entity: Entity,
    obstacles: &ObstacleWorld,
    locomotion: &mut Locomotion,
    transform: &mut Transform,
    position: Vec2,
    spawn: Vec2,
    config: &AIConfig,
    previous: ResumeMode,
    mut recovery: StuckRecovery,
    rng: &mut DeterministicRng,
    throttle: &mut LogThrottle,
    delta: f32,
) -> AIState {
    if recovery.teleporting {
        recovery.teleport_timer += delta;
        if recovery.teleport_timer >= config.teleport_warning {
            // Терминальный fallback: прямой сброс позиции мимо locomotion
            transform.translation = spawn.extend(0.0);
            locomotion.stop();
            crate::log(&format!("🌀 AI: {:?} teleport → spawn, Stuck → Idle", entity));
            return AIState::Idle;
        }
        return AIState::Stuck { previous, recovery };
    }

    if recovery.forced {
        // Заблокированный маршрут nudge не чинит — сразу к teleport
        recovery.teleporting = true;
        crate::log(&format!("🌀 AI: {:?} forced stuck → teleport armed", entity));
        return AIState::Stuck { previous, recovery };
    }

    // Escape-проверка каждый тик, независимо от recovery-таймера
    if !sensing::is_stuck_to_wall(obstacles, position, config) {
        crate::log(&format!(
            "✅ AI: {:?} Stuck → {} (escaped after {} attempts)",
            entity,
            previous.label(),
            recovery.attempts
        ));
        return previous.into_state();
    }

    recovery.timer += delta;
    if recovery.timer >= config.recovery_interval {
        recovery.timer = 0.0;
        recovery.attempts += 1;

        let wall_dir = sensing::stuck_direction(obstacles, position, config, &mut rng.rng);
        if wall_dir != Vec2::ZERO {
            // Сила растёт линейно с номером попытки
            let multiplier = 1.0 + recovery.attempts as f32 * config.escalation_step;
            locomotion.unstick_in_direction(wall_dir, multiplier, &mut rng.rng);
            crate::log(&format!(
                "🧱 AI: {:?} unstick attempt {} (wall {:?}, mult {:.2})",
                entity, recovery.attempts, wall_dir, multiplier
            ));
        }

        if recovery.attempts >= config.max_recovery_attempts {
            recovery.teleporting = true;
            crate::log(&format!(
                "🌀 AI: {:?} recovery exhausted ({} attempts) → teleport armed",
                entity, recovery.attempts
            ));
        }
    } else if throttle.allow(delta) {
        crate::log(&format!(
            "AI: {:?} still stuck (attempt {}, timer {:.2})",
            entity, recovery.attempts, recovery.timer
        ));
    }

    AIState::Stuck { previous, recovery }
}
