/// WorldState: the complete snapshot of a running game.
///
/// All runtime state lives here, owned by the frame loop — there are no
/// module globals. The only wall-clock element is `pending_shift`: an
/// age transition in flight, stored as a cancellable deadline that the
/// loop polls against `Instant::now()` so it elapses even while the
/// simulation itself is frozen. Level restart and level load drop it.

use std::time::Instant;

use crate::config::RulesConfig;
use crate::domain::age::Age;
use crate::domain::entity::{Boss, Player, Projectile, Rect, Turret};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Instructions,
    Playing,
    GameComplete,
}

/// An age transition in flight. At most one exists at a time.
#[derive(Clone, Copy, Debug)]
pub struct PendingShift {
    pub target: Age,
    pub deadline: Instant,
}

pub struct WorldState {
    // ── Level geometry (static per level) ──
    pub obstacles: Vec<Rect>,
    /// Terrain only the elder can stand on.
    pub ghost_platforms: Vec<Rect>,
    pub goal: Rect,
    pub spawn: (f32, f32),
    pub level_name: &'static str,

    // ── Entities ──
    pub player: Player,
    pub boss: Option<Boss>,
    pub turret: Option<Turret>,
    pub player_shots: Vec<Projectile>,
    pub boss_shots: Vec<Projectile>,

    // ── Age transition ──
    pub pending_shift: Option<PendingShift>,

    // ── Turret fire cooldown, ms remaining ──
    pub fire_cooldown_ms: u64,

    // ── Clocks ──
    /// Count-up level timer; reset only on entering level 1.
    pub elapsed_ms: u64,
    /// Drives the boss oscillation. Frozen while the sim is frozen.
    pub boss_clock_ms: u64,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub rules: RulesConfig,
    pub paused: bool,

    // ── UI ──
    pub anim_tick: u32,
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            obstacles: vec![],
            ghost_platforms: vec![],
            goal: Rect::new(0.0, 0.0, 0.0, 0.0),
            spawn: (50.0, 450.0),
            level_name: "",
            player: Player::new(50.0, 450.0, Age::Adult),
            boss: None,
            turret: None,
            player_shots: vec![],
            boss_shots: vec![],
            pending_shift: None,
            fire_cooldown_ms: 0,
            elapsed_ms: 0,
            boss_clock_ms: 0,
            phase: Phase::Title,
            current_level: 1,
            total_levels: 5,
            rules: RulesConfig::default(),
            paused: false,
            anim_tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn is_shifting(&self) -> bool {
        self.pending_shift.is_some()
    }

    /// Elapsed level time in whole seconds, as shown on the HUD.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    /// Solid geometry for the player's current age: ghost platforms
    /// join the obstacle set only while elder.
    pub fn solids_for_player(&self) -> Vec<Rect> {
        let mut solids = self.obstacles.clone();
        if self.player.age == Age::Elder {
            solids.extend_from_slice(&self.ghost_platforms);
        }
        solids
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_platforms_are_solid_only_for_elder() {
        let mut w = WorldState::new();
        w.obstacles.push(Rect::new(400.0, 580.0, 800.0, 40.0));
        w.ghost_platforms.push(Rect::new(250.0, 400.0, 100.0, 20.0));

        w.player.age = Age::Adult;
        assert_eq!(w.solids_for_player().len(), 1);

        w.player.age = Age::Elder;
        assert_eq!(w.solids_for_player().len(), 2);
    }

    #[test]
    fn elapsed_secs_truncates() {
        let mut w = WorldState::new();
        w.elapsed_ms = 2999;
        assert_eq!(w.elapsed_secs(), 2);
    }
}
