//! Tests for FSM AI components.

#[cfg(test)]
mod tests {
    use super::super::fsm::{AIConfig, AIState, ResumeMode, StuckRecovery};
    use bevy::prelude::*;

    #[test]
    fn test_ai_state_default() {
        let state = AIState::default();
        assert!(matches!(state, AIState::Idle));
    }

    #[test]
    fn test_ai_config_default() {
        let config = AIConfig::default();
        assert_eq!(config.preferred_distance, 5.0);
        assert_eq!(config.comfort_zone, 1.5);
        assert_eq!(config.reaction_delay, 0.4);
        assert_eq!(config.leash_radius, 20.0);
        assert_eq!(config.max_recovery_attempts, 4);
        assert_eq!(config.teleport_warning, 1.2);
        // Leash обязан быть дальше полосы преследования
        assert!(config.leash_radius > config.preferred_distance + config.comfort_zone);
    }

    #[test]
    fn test_stuck_recovery_lifecycle() {
        let fresh = StuckRecovery::default();
        assert_eq!(fresh.attempts, 0);
        assert_eq!(fresh.timer, 0.0);
        assert!(!fresh.forced);
        assert!(!fresh.teleporting);

        let forced = StuckRecovery::forced();
        assert!(forced.forced);
        assert!(!forced.teleporting); // Взводится первым Stuck-тиком, не конструктором
        assert_eq!(forced.attempts, 0);
    }

    #[test]
    fn test_resume_mode_round_trip() {
        assert_eq!(AIState::chase().resume_mode(), ResumeMode::Chase);
        assert_eq!(AIState::retreat().resume_mode(), ResumeMode::Retreat);
        assert_eq!(AIState::return_home().resume_mode(), ResumeMode::Return);
        assert_eq!(AIState::Idle.resume_mode(), ResumeMode::Idle);

        // Восстановление даёт свежие таймеры
        assert_eq!(ResumeMode::Chase.into_state(), AIState::chase());
        assert_eq!(ResumeMode::Return.into_state(), AIState::return_home());

        // Stuck возвращает сохранённый previous
        let stuck = AIState::stuck(ResumeMode::Retreat);
        assert_eq!(stuck.resume_mode(), ResumeMode::Retreat);
    }

    #[test]
    fn test_attack_gate_predicates() {
        // Цель "обнаружена" только в Chase/Retreat
        assert!(AIState::chase().is_target_detected());
        assert!(AIState::retreat().is_target_detected());
        assert!(!AIState::Idle.is_target_detected());
        assert!(!AIState::return_home().is_target_detected());
        assert!(!AIState::stuck(ResumeMode::Chase).is_target_detected());

        assert!(AIState::return_home().is_returning_home());
        assert!(!AIState::chase().is_returning_home());
    }

    #[test]
    fn test_debug_snapshot() {
        let config = AIConfig::default();
        let spawn = Vec2::new(1.0, 2.0);

        let snapshot = AIState::chase().snapshot(&config, spawn);
        assert_eq!(snapshot.mode, "Chase");
        assert_eq!(snapshot.teleport_remaining, None);
        assert_eq!(snapshot.spawn, spawn);
        assert_eq!(snapshot.leash_radius, config.leash_radius);

        // Во время teleport countdown снапшот отдаёт остаток времени
        let mut recovery = StuckRecovery::default();
        recovery.teleporting = true;
        recovery.teleport_timer = 0.4;
        let stuck = AIState::Stuck {
            previous: ResumeMode::Idle,
            recovery,
        };
        let snapshot = stuck.snapshot(&config, spawn);
        assert_eq!(snapshot.mode, "Stuck");
        let remaining = snapshot.teleport_remaining.expect("countdown running");
        assert!((remaining - (config.teleport_warning - 0.4)).abs() < 1e-6);
    }
}
