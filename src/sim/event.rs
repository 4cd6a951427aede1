/// Events emitted during a simulation step.
/// The presentation layer consumes these for status messages.

use crate::domain::age::Age;

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    ShiftStarted { from: Age, to: Age, duration_ms: u64 },
    ShiftCompleted { age: Age },
    TurretEntered,
    TurretExited,
    PlayerFired,
    BossFired,
    BossHit { remaining: i32 },
    BossDefeated,
    PlayerKilled,
    LevelCleared { level: usize },
    GameCompleted,
}
