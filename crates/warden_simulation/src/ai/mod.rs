//! AI decision-making module
//!
//! Приоритетный FSM преследователя: stuck pre-emption → mode behavior →
//! leash check. Решения пишут команды в Locomotion, движение исполняет
//! LocomotionPlugin следом в том же тике.

use bevy::prelude::*;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{AIConfig, AIDebugSnapshot, AIState, ResumeMode, StuckRecovery};

/// Set AI-решений (упорядочивается до LocomotionSet)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AiDecisionSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate. Порядок выполнения:
/// 1. stuck_preemption — высший приоритет, прерывает любой режим
/// 2. fsm_tick — поведение текущего режима + leash check
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (systems::fsm::stuck_preemption, systems::fsm::fsm_tick)
                .chain() // Последовательное выполнение для детерминизма
                .in_set(AiDecisionSet),
        );
    }
}
