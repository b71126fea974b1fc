//! FSM AI components (state machine, recovery, config).

use bevy::prelude::*;

/// AI FSM состояния
///
/// Per-mode данные живут в вариантах: previous/recovery существуют только
/// пока агент в Stuck — инварианты выполняются по построению.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Idle — стоим у дома, ждём цель
    Idle,

    /// Chase — цель видна, держим предпочтительную дистанцию
    Chase {
        /// Накопитель reaction delay (репозиция не чаще задержки)
        idle_timer: f32,
        /// Позиция цели при последней выданной команде движения
        last_target_pos: Option<Vec2>,
    },

    /// Retreat — цель слишком близко, отходим
    Retreat {
        /// Накопитель reaction delay
        idle_timer: f32,
    },

    /// Return — вышли за leash, идём домой
    Return {
        /// Накопитель reaction delay перед командой движения
        idle_timer: f32,
        /// Сколько путь домой уже заблокирован (секунды)
        no_path_timer: f32,
    },

    /// Stuck — зажаты геометрией, идёт recovery
    Stuck {
        /// Режим, прерванный застреванием (восстанавливается при escape)
        previous: ResumeMode,
        /// Состояние recovery-протокола
        recovery: StuckRecovery,
    },
}

impl Default for AIState {
    fn default() -> Self {
        Self::Idle
    }
}

impl AIState {
    /// Chase со свежими таймерами
    pub fn chase() -> Self {
        Self::Chase {
            idle_timer: 0.0,
            last_target_pos: None,
        }
    }

    /// Retreat со свежим таймером
    pub fn retreat() -> Self {
        Self::Retreat { idle_timer: 0.0 }
    }

    /// Return со свежими таймерами
    pub fn return_home() -> Self {
        Self::Return {
            idle_timer: 0.0,
            no_path_timer: 0.0,
        }
    }

    /// Stuck от физического контакта (local recovery разрешён)
    pub fn stuck(previous: ResumeMode) -> Self {
        Self::Stuck {
            previous,
            recovery: StuckRecovery::default(),
        }
    }

    /// Forced stuck: путь домой заблокирован — local recovery пропускается
    pub fn stuck_forced(previous: ResumeMode) -> Self {
        Self::Stuck {
            previous,
            recovery: StuckRecovery::forced(),
        }
    }

    /// В какой режим возвращаться после recovery
    pub fn resume_mode(&self) -> ResumeMode {
        match self {
            Self::Idle => ResumeMode::Idle,
            Self::Chase { .. } => ResumeMode::Chase,
            Self::Retreat { .. } => ResumeMode::Retreat,
            Self::Return { .. } => ResumeMode::Return,
            Self::Stuck { previous, .. } => *previous,
        }
    }

    /// Цель обнаружена? (gate для attack-подсистемы, read-only)
    pub fn is_target_detected(&self) -> bool {
        matches!(self, Self::Chase { .. } | Self::Retreat { .. })
    }

    /// Возвращаемся домой? (gate для attack-подсистемы, read-only)
    pub fn is_returning_home(&self) -> bool {
        matches!(self, Self::Return { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Chase { .. } => "Chase",
            Self::Retreat { .. } => "Retreat",
            Self::Return { .. } => "Return",
            Self::Stuck { .. } => "Stuck",
        }
    }

    /// Read-only snapshot для визуализации (no behavioral coupling)
    pub fn snapshot(&self, config: &AIConfig, spawn: Vec2) -> AIDebugSnapshot {
        let teleport_remaining = match self {
            Self::Stuck { recovery, .. } if recovery.teleporting => {
                Some((config.teleport_warning - recovery.teleport_timer).max(0.0))
            }
            _ => None,
        };

        AIDebugSnapshot {
            mode: self.label(),
            teleport_remaining,
            spawn,
            leash_radius: config.leash_radius,
        }
    }
}

/// Режим, в который recovery возвращает агента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ResumeMode {
    Idle,
    Chase,
    Retreat,
    Return,
}

impl ResumeMode {
    /// Восстановить режим со свежими таймерами
    pub fn into_state(self) -> AIState {
        match self {
            Self::Idle => AIState::Idle,
            Self::Chase => AIState::chase(),
            Self::Retreat => AIState::retreat(),
            Self::Return => AIState::return_home(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Chase => "Chase",
            Self::Retreat => "Retreat",
            Self::Return => "Return",
        }
    }
}

/// Состояние recovery-протокола застревания
///
/// Lifecycle: свежий при каждом входе в Stuck; teleporting взводится либо
/// по исчерпанию attempts, либо сразу при forced; teleport сбрасывает всё
/// и возвращает агента в Idle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct StuckRecovery {
    /// Сколько local-nudge попыток уже сделано
    pub attempts: u32,
    /// Накопитель до следующей попытки
    pub timer: f32,
    /// Stuck не от контакта (path-таймаут) → сразу teleport
    pub forced: bool,
    /// Идёт teleport countdown
    pub teleporting: bool,
    /// Накопитель teleport countdown
    pub teleport_timer: f32,
}

impl StuckRecovery {
    pub fn forced() -> Self {
        Self {
            forced: true,
            ..Self::default()
        }
    }
}

/// Параметры AI (все — тюнимые скаляры, загружаемы из данных)
#[derive(Component, Debug, Clone, Reflect, serde::Serialize, serde::Deserialize)]
#[reflect(Component)]
pub struct AIConfig {
    /// Радиус обнаружения цели (метры)
    pub detection_radius: f32,
    /// Предпочтительная дистанция боя (метры)
    pub preferred_distance: f32,
    /// Полуширина комфортной полосы вокруг preferred (метры)
    pub comfort_zone: f32,
    /// Задержка реакции перед репозицией (секунды)
    pub reaction_delay: f32,
    /// Насколько цель должна сместиться, чтобы оправдать репозицию (метры)
    pub reaction_threshold: f32,
    /// Максимум удаления от spawn до принудительного возврата (метры)
    pub leash_radius: f32,
    /// Радиус прибытия домой (метры)
    pub home_arrival_radius: f32,
    /// Интервал между recovery-попытками (секунды)
    pub recovery_interval: f32,
    /// Максимум local-nudge попыток до teleport
    pub max_recovery_attempts: u32,
    /// Линейный прирост силы импульса за попытку
    pub escalation_step: f32,
    /// Длительность teleport warning (секунды)
    pub teleport_warning: f32,
    /// Сколько путь домой может быть заблокирован до forced stuck (секунды)
    pub no_path_timeout: f32,
    /// Радиус probe-диска sensor-запросов (метры)
    pub probe_radius: f32,
    /// Дальность 4-направленных contact-probe (метры)
    pub probe_distance: f32,
    /// Layer mask препятствий для всех sensor-запросов
    pub obstacle_mask: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            detection_radius: 12.0,
            preferred_distance: 5.0,
            comfort_zone: 1.5,
            reaction_delay: 0.4,
            reaction_threshold: 0.75,
            leash_radius: 20.0,
            home_arrival_radius: 0.5,
            recovery_interval: 0.6,
            max_recovery_attempts: 4,
            escalation_step: 0.5,
            teleport_warning: 1.2,
            no_path_timeout: 3.0,
            probe_radius: 0.25,
            probe_distance: 0.5,
            obstacle_mask: crate::physics::layers::MASK_SENSOR,
        }
    }
}

/// Read-only snapshot текущего AI-состояния для overlay/отладки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AIDebugSnapshot {
    pub mode: &'static str,
    /// Сколько осталось до teleport (None вне countdown)
    pub teleport_remaining: Option<f32>,
    pub spawn: Vec2,
    pub leash_radius: f32,
}
