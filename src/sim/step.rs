/// One fixed-rate simulation tick.
///
/// `step` owns the whole frame: transition deadline polling, input,
/// player physics, the boss encounter, and win/fail resolution. It is
/// pure with respect to the outside world except for `now`, which the
/// caller passes in so the wall-clock transition deadline is testable.

use std::time::Instant;

use crate::domain::age::Age;
use crate::domain::entity::{
    AimDir, FrameInput, MoveDir, Player, Projectile, ProjectileOwner,
};
use crate::domain::physics::{self, WORLD_HEIGHT};
use crate::domain::shift;
use crate::sim::event::GameEvent;
use crate::sim::level;
use crate::sim::world::{PendingShift, Phase, WorldState};

/// Boss hover: y = BOSS_BASE_Y + sin(clock / BOSS_PERIOD) * BOSS_SWING.
const BOSS_BASE_Y: f32 = 350.0;
const BOSS_SWING: f32 = 50.0;
const BOSS_PERIOD_MS: f32 = 500.0;
const BOSS_X: f32 = 700.0;
/// Hit flash, in ticks (~100 ms at the 16 ms tick).
const BOSS_FLASH_TICKS: u32 = 6;

const BOSS_SHOT_SIZE: f32 = 20.0;
const BOSS_SHOT_SPEED: f32 = -400.0;
const PLAYER_SHOT_SIZE: f32 = 10.0;
const PLAYER_SHOT_SPEED: f32 = 600.0;

/// Vertical band the turret (and its rider) may occupy. Matches the
/// boss hover band so there is no safe firing spot.
pub const TURRET_MIN_Y: f32 = 300.0;
pub const TURRET_MAX_Y: f32 = 400.0;
/// How far above the turret the player lands when dismounting.
const TURRET_EXIT_LIFT: f32 = 50.0;

/// Projectiles this far past any playfield edge are discarded.
const SHOT_SWEEP_MARGIN: f32 = 50.0;

pub fn step(world: &mut WorldState, input: FrameInput, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if world.phase != Phase::Playing || world.paused {
        return events;
    }

    world.anim_tick = world.anim_tick.wrapping_add(1);
    // Timer 0 means a persistent message; timed ones clear on expiry.
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    // Transition in flight: the simulation stays frozen until the
    // wall-clock deadline passes, then the new form takes effect.
    if let Some(pending) = world.pending_shift {
        if now < pending.deadline {
            return events;
        }
        shift::apply(&mut world.player, pending.target);
        world.pending_shift = None;
        events.push(GameEvent::ShiftCompleted { age: pending.target });
    }

    if let Some(target) = input.select_age {
        if shift::can_request(world.player.age, target, world.is_shifting()) {
            let duration_ms = world.player.age.shift_duration_ms(target);
            events.push(GameEvent::ShiftStarted {
                from: world.player.age,
                to: target,
                duration_ms,
            });
            world.pending_shift = Some(PendingShift {
                target,
                deadline: now + std::time::Duration::from_millis(duration_ms),
            });
            return events;
        }
    }

    let tick_ms = world.rules.tick_rate_ms;
    let dt = tick_ms as f32 / 1000.0;
    world.elapsed_ms += tick_ms;
    world.fire_cooldown_ms = world.fire_cooldown_ms.saturating_sub(tick_ms);
    if world.boss.is_some() {
        world.boss_clock_ms += tick_ms;
    }

    if !world.player.on_turret {
        let speed = world.player.age.profile().speed;
        world.player.body.vx = match input.movement {
            Some(MoveDir::Left) => -speed,
            Some(MoveDir::Right) => speed,
            None => 0.0,
        };
        if input.jump && world.player.body.on_ground() {
            world.player.body.vy = world.player.age.profile().jump;
        }
        let solids = world.solids_for_player();
        physics::integrate(&mut world.player.body, dt, &solids, true);
    }

    if world.player.body.rect.top() > WORLD_HEIGHT {
        events.push(GameEvent::PlayerKilled);
        restart_level(world);
        return events;
    }

    if world.boss.is_some() {
        step_boss_encounter(world, input, dt, &mut events);
        if world.phase != Phase::Playing {
            return events;
        }
    }

    if world.player.body.rect.overlaps(&world.goal) {
        clear_level(world, &mut events);
    }

    events
}

/// The level-five encounter: boss hover and fire, turret riding,
/// projectile motion, hit resolution, and the off-screen sweep.
fn step_boss_encounter(
    world: &mut WorldState,
    input: FrameInput,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    if let Some(boss) = &mut world.boss {
        boss.body.rect.x = BOSS_X;
        boss.body.rect.y =
            BOSS_BASE_Y + (world.boss_clock_ms as f32 / BOSS_PERIOD_MS).sin() * BOSS_SWING;
        boss.flash_timer = boss.flash_timer.saturating_sub(1);

        boss.shot_timer += 1;
        if boss.shot_timer > world.rules.boss_shot_interval {
            boss.shot_timer = 0;
            world.boss_shots.push(Projectile::new(
                boss.body.rect.x,
                boss.body.rect.y,
                BOSS_SHOT_SIZE,
                BOSS_SHOT_SPEED,
                ProjectileOwner::Boss,
            ));
            events.push(GameEvent::BossFired);
        }
    }

    // Mount needs overlap; dismount works from anywhere.
    if input.turret_toggle {
        if world.player.on_turret {
            world.player.on_turret = false;
            if let Some(turret) = &world.turret {
                world.player.body.rect.x = turret.body.rect.x;
                world.player.body.rect.y = turret.body.rect.y - TURRET_EXIT_LIFT;
            }
            events.push(GameEvent::TurretExited);
        } else if world
            .turret
            .as_ref()
            .is_some_and(|t| world.player.body.rect.overlaps(&t.body.rect))
        {
            world.player.on_turret = true;
            move_turret_with_player(world, 0.0);
            events.push(GameEvent::TurretEntered);
        }
    }

    if world.player.on_turret {
        match input.aim {
            Some(AimDir::Up) => move_turret_with_player(world, -world.rules.turret_move_speed),
            Some(AimDir::Down) => move_turret_with_player(world, world.rules.turret_move_speed),
            None => {}
        }
        // Rider stays pinned to the turret; gravity gets no say.
        if let Some(turret) = &world.turret {
            world.player.body.rect.x = turret.body.rect.x;
            world.player.body.rect.y = turret.body.rect.y;
            world.player.body.vx = 0.0;
            world.player.body.vy = 0.0;
        }

        if input.fire && world.fire_cooldown_ms == 0 {
            world.fire_cooldown_ms = world.rules.fire_cooldown_ms;
            if let Some(turret) = &world.turret {
                world.player_shots.push(Projectile::new(
                    turret.body.rect.x,
                    turret.body.rect.y,
                    PLAYER_SHOT_SIZE,
                    PLAYER_SHOT_SPEED,
                    ProjectileOwner::Player,
                ));
                events.push(GameEvent::PlayerFired);
            }
        }
    }

    for shot in &mut world.player_shots {
        physics::integrate(&mut shot.body, dt, &[], false);
    }
    for shot in &mut world.boss_shots {
        physics::integrate(&mut shot.body, dt, &[], false);
    }

    if let Some(boss) = &mut world.boss {
        let mut defeated = false;
        world.player_shots.retain(|shot| {
            if boss.is_defeated() || !shot.body.rect.overlaps(&boss.body.rect) {
                return true;
            }
            boss.health -= 1;
            boss.flash_timer = BOSS_FLASH_TICKS;
            events.push(GameEvent::BossHit { remaining: boss.health });
            if boss.is_defeated() {
                defeated = true;
            }
            false
        });
        if defeated {
            events.push(GameEvent::BossDefeated);
            world.boss = None;
            clear_level(world, events);
            return;
        }
    }

    let player_rect = world.player.body.rect;
    let mut player_hit = false;
    world.boss_shots.retain(|shot| {
        if shot.body.rect.overlaps(&player_rect) {
            player_hit = true;
            return false;
        }
        true
    });
    if !player_hit {
        if let Some(boss) = &world.boss {
            if boss.body.rect.overlaps(&player_rect) {
                player_hit = true;
            }
        }
    }
    if player_hit {
        events.push(GameEvent::PlayerKilled);
        restart_level(world);
        return;
    }

    cleanup_offscreen(&mut world.player_shots);
    cleanup_offscreen(&mut world.boss_shots);
}

/// Move the turret vertically, carrying its rider. Clamped to the
/// firing band; a no-op when the level has no turret.
pub fn move_turret_with_player(world: &mut WorldState, delta_y: f32) {
    let Some(turret) = &mut world.turret else {
        return;
    };
    let clamped = (turret.body.rect.y + delta_y).clamp(TURRET_MIN_Y, TURRET_MAX_Y);
    turret.body.rect.y = clamped;
    if world.player.on_turret {
        world.player.body.rect.x = turret.body.rect.x;
        world.player.body.rect.y = clamped;
    }
}

/// Drop projectiles that flew past the playfield plus the sweep margin.
/// A shot exactly on the expanded boundary survives the sweep.
pub fn cleanup_offscreen(shots: &mut Vec<Projectile>) {
    shots.retain(|s| !physics::outside_bounds(&s.body.rect, SHOT_SWEEP_MARGIN));
}

fn clear_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::LevelCleared { level: world.current_level });
    if world.current_level < world.total_levels {
        level::load_level(world, world.current_level + 1);
    } else {
        world.phase = Phase::GameComplete;
        events.push(GameEvent::GameCompleted);
    }
}

/// Reset the current level after a failure. The current age carries
/// over; any pending transition is dropped with the rest of the state.
pub fn restart_level(world: &mut WorldState) {
    level::load_level(world, world.current_level);
}

/// Start a fresh run from level one as the adult.
pub fn new_game(world: &mut WorldState) {
    world.player = Player::new(world.spawn.0, world.spawn.1, Age::Adult);
    world.phase = Phase::Playing;
    level::load_level(world, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn playing_world(level_no: usize) -> WorldState {
        let mut w = WorldState::new();
        w.phase = Phase::Playing;
        level::load_level(&mut w, level_no);
        w
    }

    fn settle(w: &mut WorldState, now: Instant, ticks: u32) {
        for _ in 0..ticks {
            step(w, FrameInput::default(), now);
        }
    }

    fn select(age: Age) -> FrameInput {
        FrameInput { select_age: Some(age), ..FrameInput::default() }
    }

    // ── Age transitions ──

    #[test]
    fn shift_freezes_the_sim_until_the_deadline() {
        let mut w = playing_world(1);
        let t0 = Instant::now();
        settle(&mut w, t0, 60); // land on the floor

        let events = step(&mut w, select(Age::Child), t0);
        assert!(matches!(
            events[..],
            [GameEvent::ShiftStarted { duration_ms: 500, .. }]
        ));
        assert!(w.is_shifting());

        // Mid-transition: input is ignored and clocks do not advance.
        let frozen_at = w.player.body.rect;
        let elapsed_before = w.elapsed_ms;
        let moving = FrameInput { movement: Some(MoveDir::Right), ..FrameInput::default() };
        let events = step(&mut w, moving, t0 + Duration::from_millis(499));
        assert!(events.is_empty());
        assert_eq!(w.player.body.rect, frozen_at);
        assert_eq!(w.elapsed_ms, elapsed_before);
    }

    #[test]
    fn two_step_shift_completes_after_a_full_second() {
        let mut w = playing_world(1);
        let t0 = Instant::now();
        settle(&mut w, t0, 60);
        w.player.age = Age::Child;
        w.player.body.rect.w = 20.0;
        w.player.body.rect.h = 20.0;

        step(&mut w, select(Age::Elder), t0);
        assert!(w.is_shifting());

        let events = step(&mut w, FrameInput::default(), t0 + Duration::from_millis(999));
        assert!(events.is_empty());
        assert!(w.is_shifting());

        let events = step(&mut w, FrameInput::default(), t0 + Duration::from_millis(1000));
        assert!(matches!(events[0], GameEvent::ShiftCompleted { age: Age::Elder }));
        assert_eq!(w.player.age, Age::Elder);
        assert_eq!(w.player.body.rect.h, 40.0);
        assert!(!w.is_shifting());
    }

    #[test]
    fn shift_request_denied_while_one_is_pending() {
        let mut w = playing_world(1);
        let t0 = Instant::now();
        step(&mut w, select(Age::Child), t0);
        let pending = w.pending_shift.map(|p| p.target);

        let events = step(&mut w, select(Age::Elder), t0 + Duration::from_millis(1));
        assert!(events.is_empty());
        assert_eq!(w.pending_shift.map(|p| p.target), pending);
    }

    #[test]
    fn shift_to_current_age_is_a_no_op() {
        let mut w = playing_world(1);
        let events = step(&mut w, select(Age::Adult), Instant::now());
        assert!(!w.is_shifting());
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::ShiftStarted { .. })));
    }

    #[test]
    fn restart_cancels_a_pending_shift() {
        let mut w = playing_world(1);
        let t0 = Instant::now();
        step(&mut w, select(Age::Elder), t0);
        assert!(w.is_shifting());

        restart_level(&mut w);
        assert!(!w.is_shifting());

        // The old deadline passing must not morph the player.
        step(&mut w, FrameInput::default(), t0 + Duration::from_millis(2000));
        assert_eq!(w.player.age, Age::Adult);
    }

    // ── Falling and the goal ──

    #[test]
    fn falling_out_of_the_world_restarts_the_level() {
        let mut w = playing_world(2);
        w.player.age = Age::Elder;
        w.elapsed_ms = 30_000;
        w.player.body.rect.y = WORLD_HEIGHT + 100.0;

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert_eq!(w.current_level, 2);
        assert_eq!(w.player.body.rect.x, w.spawn.0);
        // Death keeps both the chosen age and the running timer.
        assert_eq!(w.player.age, Age::Elder);
        assert!(w.elapsed_ms >= 30_000);
    }

    #[test]
    fn reaching_the_goal_advances_to_the_next_level() {
        let mut w = playing_world(1);
        w.player.body.rect.x = w.goal.x;
        w.player.body.rect.y = w.goal.y;
        // Hovering so one tick of gravity does not drop the player out
        // of the goal box before the overlap check.
        w.player.body.gravity = false;

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelCleared { level: 1 })));
        assert_eq!(w.current_level, 2);
        assert_eq!(w.phase, Phase::Playing);
    }

    // ── Turret ──

    fn mounted_world() -> WorldState {
        let mut w = playing_world(5);
        let t = w.turret.as_ref().map(|t| t.body.rect).unwrap();
        w.player.body.rect.x = t.x;
        w.player.body.rect.y = t.y;
        let toggle = FrameInput { turret_toggle: true, ..FrameInput::default() };
        step(&mut w, toggle, Instant::now());
        assert!(w.player.on_turret);
        w
    }

    #[test]
    fn turret_mount_requires_overlap() {
        let mut w = playing_world(5);
        w.player.body.rect.x = 400.0; // nowhere near the turret
        let toggle = FrameInput { turret_toggle: true, ..FrameInput::default() };
        step(&mut w, toggle, Instant::now());
        assert!(!w.player.on_turret);
    }

    #[test]
    fn dismount_places_player_above_the_turret() {
        let mut w = mounted_world();
        let turret_rect = w.turret.as_ref().unwrap().body.rect;
        let toggle = FrameInput { turret_toggle: true, ..FrameInput::default() };
        let events = step(&mut w, toggle, Instant::now());
        assert!(!w.player.on_turret);
        assert!(events.iter().any(|e| matches!(e, GameEvent::TurretExited)));
        assert!(w.player.body.rect.y < turret_rect.y);
    }

    #[test]
    fn turret_movement_is_clamped_to_its_band() {
        let mut w = mounted_world();
        for _ in 0..200 {
            move_turret_with_player(&mut w, -5.0);
        }
        assert_eq!(w.turret.as_ref().unwrap().body.rect.y, TURRET_MIN_Y);
        assert_eq!(w.player.body.rect.y, TURRET_MIN_Y);

        for _ in 0..200 {
            move_turret_with_player(&mut w, 5.0);
        }
        assert_eq!(w.turret.as_ref().unwrap().body.rect.y, TURRET_MAX_Y);
        assert_eq!(w.player.body.rect.y, TURRET_MAX_Y);
    }

    #[test]
    fn turret_move_without_a_turret_is_safe() {
        let mut w = playing_world(1);
        assert!(w.turret.is_none());
        move_turret_with_player(&mut w, -5.0); // must not panic
    }

    #[test]
    fn fire_rate_is_limited_by_the_cooldown() {
        let mut w = mounted_world();
        let fire = FrameInput { fire: true, ..FrameInput::default() };
        let t = Instant::now();

        step(&mut w, fire, t);
        assert_eq!(w.player_shots.len(), 1);

        // Held fire inside the cooldown window adds nothing.
        for _ in 0..11 {
            step(&mut w, fire, t);
        }
        assert_eq!(w.player_shots.len(), 1);

        // 200 ms at 16 ms per tick: 13 decrements reopen the window.
        step(&mut w, fire, t);
        step(&mut w, fire, t);
        assert_eq!(w.player_shots.len(), 2);
    }

    #[test]
    fn player_shots_travel_right_from_the_turret() {
        let mut w = mounted_world();
        let fire = FrameInput { fire: true, ..FrameInput::default() };
        step(&mut w, fire, Instant::now());
        let shot = &w.player_shots[0];
        assert!(shot.body.vx > 0.0);
        assert_eq!(shot.owner, ProjectileOwner::Player);
    }

    // ── Boss ──

    #[test]
    fn boss_hovers_on_the_sine_band() {
        let mut w = playing_world(5);
        settle(&mut w, Instant::now(), 30);
        let boss = w.boss.as_ref().unwrap();
        let expected =
            BOSS_BASE_Y + (w.boss_clock_ms as f32 / BOSS_PERIOD_MS).sin() * BOSS_SWING;
        assert!((boss.body.rect.y - expected).abs() < 0.001);
        assert!(boss.body.rect.y >= BOSS_BASE_Y - BOSS_SWING);
        assert!(boss.body.rect.y <= BOSS_BASE_Y + BOSS_SWING);
    }

    #[test]
    fn boss_fires_on_its_tick_interval() {
        let mut w = playing_world(5);
        let t = Instant::now();
        settle(&mut w, t, 100);
        assert!(w.boss_shots.is_empty());
        settle(&mut w, t, 1);
        assert_eq!(w.boss_shots.len(), 1);
        assert!(w.boss_shots[0].body.vx < 0.0);
    }

    #[test]
    fn player_shot_damages_the_boss_and_is_consumed() {
        let mut w = playing_world(5);
        // Aimed at where the boss hovers, just short of its left edge.
        w.player_shots.push(Projectile::new(
            BOSS_X - 40.0,
            BOSS_BASE_Y,
            10.0,
            600.0,
            ProjectileOwner::Player,
        ));

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BossHit { remaining: 9 })));
        assert!(w.player_shots.is_empty());
        assert_eq!(w.boss.as_ref().unwrap().health, 9);
        assert!(w.boss.as_ref().unwrap().flash_timer > 0);
    }

    #[test]
    fn final_hit_defeats_the_boss_and_wins_the_game() {
        let mut w = playing_world(5);
        w.boss.as_mut().unwrap().health = 1;
        w.player_shots.push(Projectile::new(
            BOSS_X - 40.0,
            BOSS_BASE_Y,
            10.0,
            600.0,
            ProjectileOwner::Player,
        ));

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events.iter().any(|e| matches!(e, GameEvent::BossDefeated)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameCompleted)));
        assert_eq!(w.phase, Phase::GameComplete);
    }

    #[test]
    fn boss_shot_kills_the_player_even_on_the_turret() {
        let mut w = mounted_world();
        let p = w.player.body.rect;
        w.boss_shots.push(Projectile::new(
            p.x + 5.0,
            p.y,
            20.0,
            -400.0,
            ProjectileOwner::Boss,
        ));

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert!(!w.player.on_turret);
        assert_eq!(w.player.body.rect.x, w.spawn.0);
        // Restart rebuilds the arena from scratch.
        assert_eq!(w.boss.as_ref().unwrap().health, w.rules.boss_max_health);
        assert!(w.boss_shots.is_empty());
    }

    #[test]
    fn touching_the_boss_body_is_fatal() {
        let mut w = playing_world(5);
        settle(&mut w, Instant::now(), 1);
        let boss_rect = w.boss.as_ref().unwrap().body.rect;
        w.player.body.rect.x = boss_rect.x;
        w.player.body.rect.y = boss_rect.y;
        w.player.body.gravity = false;

        let events = step(&mut w, FrameInput::default(), Instant::now());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert_eq!(w.player.body.rect.x, w.spawn.0);
    }

    // ── Off-screen sweep ──

    #[test]
    fn sweep_keeps_the_boundary_shot_and_drops_the_one_beyond() {
        let mut shots = vec![
            Projectile::new(851.0, 300.0, 10.0, 600.0, ProjectileOwner::Player),
            Projectile::new(850.0, 300.0, 10.0, 600.0, ProjectileOwner::Player),
            Projectile::new(849.0, 300.0, 10.0, 600.0, ProjectileOwner::Player),
            Projectile::new(-51.0, 300.0, 10.0, -400.0, ProjectileOwner::Boss),
            Projectile::new(400.0, 651.0, 10.0, 0.0, ProjectileOwner::Boss),
        ];
        cleanup_offscreen(&mut shots);
        let xs: Vec<f32> = shots.iter().map(|s| s.body.rect.x).collect();
        assert_eq!(xs, vec![850.0, 849.0]);
    }

    #[test]
    fn sweep_on_empty_list_is_safe() {
        let mut shots: Vec<Projectile> = vec![];
        cleanup_offscreen(&mut shots);
        assert!(shots.is_empty());
    }

    // ── Run lifecycle ──

    #[test]
    fn new_game_starts_level_one_as_the_adult() {
        let mut w = WorldState::new();
        w.player.age = Age::Elder;
        w.elapsed_ms = 99_000;
        new_game(&mut w);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.current_level, 1);
        assert_eq!(w.player.age, Age::Adult);
        assert_eq!(w.elapsed_ms, 0);
    }

    #[test]
    fn nothing_happens_outside_the_playing_phase() {
        let mut w = WorldState::new();
        assert_eq!(w.phase, Phase::Title);
        let events = step(&mut w, select(Age::Child), Instant::now());
        assert!(events.is_empty());
        assert!(!w.is_shifting());
    }

    #[test]
    fn pause_suspends_the_clock() {
        let mut w = playing_world(1);
        w.paused = true;
        let before = w.elapsed_ms;
        step(&mut w, FrameInput::default(), Instant::now());
        assert_eq!(w.elapsed_ms, before);
    }
}
