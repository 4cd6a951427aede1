/// Level data and loader.
///
/// Layouts are plain descriptor tables indexed by level number rather
/// than per-level construction code. Each rect is (center x, center y,
/// width, height) in playfield pixels; colors live in the renderer.
///
/// Geometry notes carried from the design:
///   - every level shares an 800×40 floor whose top sits at y = 560
///   - child-only tunnels leave a 22 px gap (child is 20 px tall)
///   - ghost platforms are solid for the elder only

use crate::domain::entity::{Boss, Rect, Turret};
use crate::sim::world::WorldState;

/// A level: static geometry plus the optional boss-arena pieces.
pub struct LevelDef {
    pub name: &'static str,
    pub spawn: (f32, f32),
    pub obstacles: &'static [(f32, f32, f32, f32)],
    pub ghost_platforms: &'static [(f32, f32, f32, f32)],
    pub goal: (f32, f32, f32, f32),
    pub boss: Option<(f32, f32)>,
    pub turret: Option<(f32, f32)>,
}

/// Vertical gap for child-only tunnels. Child is 20 px tall.
pub const CHILD_TUNNEL_GAP: f32 = 22.0;

const FLOOR: (f32, f32, f32, f32) = (400.0, 580.0, 800.0, 40.0);

// Level 1: gap under a pillar for the child, ascending ghost steps.
const LEVEL_1: LevelDef = LevelDef {
    name: "First Steps",
    spawn: (50.0, 450.0),
    obstacles: &[
        FLOOR,
        (10.0, 300.0, 20.0, 600.0),   // left boundary wall
        (100.0, 550.0, 40.0, 20.0),   // pillar base; gap of 22 above it
        (100.0, 268.0, 40.0, 500.0),  // pillar top, bottom edge at 518
    ],
    ghost_platforms: &[
        (250.0, 400.0, 100.0, 20.0),
        (400.0, 350.0, 100.0, 20.0),
        (550.0, 300.0, 100.0, 20.0),
    ],
    goal: (700.0, 250.0, 50.0, 50.0),
    boss: None,
    turret: None,
};

// Level 2: vertical tower — adult jumps, a child tunnel, elder ghosts.
const LEVEL_2: LevelDef = LevelDef {
    name: "The Tower",
    spawn: (50.0, 450.0),
    obstacles: &[
        FLOOR,
        (100.0, 450.0, 120.0, 20.0),  // first platform, adult jump
        (180.0, 350.0, 20.0, 280.0),  // anti-shortcut wall
        (280.0, 465.0, 120.0, 20.0),  // tunnel floor
        (280.0, 423.0, 120.0, 20.0),  // tunnel ceiling, 22 px gap
        (420.0, 340.0, 100.0, 20.0),  // higher platform
        (480.0, 250.0, 20.0, 200.0),  // second wall
        (750.0, 200.0, 80.0, 20.0),   // final platform
    ],
    ghost_platforms: &[
        (540.0, 340.0, 60.0, 20.0),
        (620.0, 280.0, 60.0, 20.0),
        (700.0, 220.0, 60.0, 20.0),
    ],
    goal: (770.0, 160.0, 40.0, 40.0),
    boss: None,
    turret: None,
};

// Level 3: the gauntlet — tunnel, jumps, then a ghost bridge.
const LEVEL_3: LevelDef = LevelDef {
    name: "The Gauntlet",
    spawn: (50.0, 450.0),
    obstacles: &[
        FLOOR,
        (200.0, 450.0, 40.0, 220.0),            // wall with tunnel below
        (200.0, 560.0 - 20.0 - CHILD_TUNNEL_GAP, 40.0, 20.0), // tunnel ceiling
        (350.0, 500.0, 100.0, 20.0),
        (500.0, 400.0, 100.0, 20.0),
        (350.0, 300.0, 100.0, 20.0),
        (750.0, 280.0, 100.0, 40.0),            // final platform
    ],
    ghost_platforms: &[
        (500.0, 300.0, 80.0, 20.0),
        (650.0, 300.0, 80.0, 20.0),
    ],
    goal: (750.0, 240.0, 40.0, 40.0),
    boss: None,
    turret: None,
};

// Level 4: the choice — child shortcut tunnel or adult platform route.
const LEVEL_4: LevelDef = LevelDef {
    name: "The Choice",
    spawn: (50.0, 450.0),
    obstacles: &[
        FLOOR,
        (100.0, 500.0, 150.0, 20.0),            // start platform
        (250.0, 400.0, 40.0, 200.0),            // split wall
        (350.0, 505.0, 150.0, 20.0),            // shortcut tunnel floor
        (350.0, 505.0 - CHILD_TUNNEL_GAP, 150.0, 20.0), // shortcut ceiling
        (350.0, 400.0, 100.0, 20.0),            // high route
        (500.0, 300.0, 100.0, 20.0),
        (650.0, 400.0, 100.0, 20.0),            // drop-down
        (750.0, 500.0, 100.0, 20.0),            // convergence
    ],
    ghost_platforms: &[],
    goal: (750.0, 450.0, 40.0, 40.0),
    boss: None,
    turret: None,
};

// Level 5: boss arena.
const LEVEL_5: LevelDef = LevelDef {
    name: "The Reckoning",
    spawn: (50.0, 450.0),
    obstacles: &[FLOOR],
    ghost_platforms: &[],
    // No walkable goal; the win path is defeating the boss.
    goal: (-1000.0, -1000.0, 1.0, 1.0),
    boss: Some((700.0, 500.0)),
    turret: Some((100.0, 500.0)),
};

pub const LEVELS: [&LevelDef; 5] = [&LEVEL_1, &LEVEL_2, &LEVEL_3, &LEVEL_4, &LEVEL_5];

fn to_rects(defs: &[(f32, f32, f32, f32)]) -> Vec<Rect> {
    defs.iter().map(|&(x, y, w, h)| Rect::new(x, y, w, h)).collect()
}

/// Load level `level` (1-based) into the world. Preserves the current
/// age and the count-up timer (except on level 1, which resets it).
/// Cancels any pending shift — a transition must not complete into a
/// freshly built level.
pub fn load_level(world: &mut WorldState, level: usize) {
    let def = LEVELS[(level - 1).min(LEVELS.len() - 1)];

    world.current_level = level.min(LEVELS.len());
    world.total_levels = LEVELS.len();
    world.level_name = def.name;
    world.obstacles = to_rects(def.obstacles);
    world.ghost_platforms = to_rects(def.ghost_platforms);
    world.goal = Rect::new(def.goal.0, def.goal.1, def.goal.2, def.goal.3);
    world.spawn = (def.spawn.0, def.spawn.1);

    world.boss = def.boss.map(|(x, y)| Boss::new(x, y, world.rules.boss_max_health));
    world.turret = def.turret.map(|(x, y)| Turret::new(x, y));
    world.player_shots.clear();
    world.boss_shots.clear();
    world.pending_shift = None;
    world.fire_cooldown_ms = 0;
    world.boss_clock_ms = 0;

    if level <= 1 {
        world.elapsed_ms = 0;
    }

    let age = world.player.age;
    world.player = crate::domain::entity::Player::new(def.spawn.0, def.spawn.1, age);

    world.set_message(def.name, 80);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::age::Age;

    #[test]
    fn all_levels_have_a_floor() {
        for def in LEVELS {
            assert!(
                def.obstacles.contains(&FLOOR),
                "level '{}' is missing the common floor",
                def.name
            );
        }
    }

    #[test]
    fn only_the_last_level_has_a_boss() {
        for (i, def) in LEVELS.iter().enumerate() {
            assert_eq!(def.boss.is_some(), i == LEVELS.len() - 1);
            assert_eq!(def.turret.is_some(), i == LEVELS.len() - 1);
        }
    }

    #[test]
    fn child_tunnels_fit_the_child_only() {
        let child_h = Age::Child.profile().height;
        let adult_h = Age::Adult.profile().height;
        assert!(child_h < CHILD_TUNNEL_GAP);
        assert!(adult_h > CHILD_TUNNEL_GAP);
    }

    #[test]
    fn load_preserves_age_and_timer_after_level_one() {
        let mut w = WorldState::new();
        w.player.age = Age::Elder;
        w.elapsed_ms = 42_000;
        load_level(&mut w, 3);
        assert_eq!(w.player.age, Age::Elder);
        assert_eq!(w.elapsed_ms, 42_000);
        assert_eq!(w.player.body.rect.w, Age::Elder.profile().width);
    }

    #[test]
    fn load_level_one_resets_timer() {
        let mut w = WorldState::new();
        w.elapsed_ms = 42_000;
        load_level(&mut w, 1);
        assert_eq!(w.elapsed_ms, 0);
    }

    #[test]
    fn load_cancels_pending_shift() {
        use crate::sim::world::PendingShift;
        use std::time::{Duration, Instant};
        let mut w = WorldState::new();
        w.pending_shift = Some(PendingShift {
            target: Age::Child,
            deadline: Instant::now() + Duration::from_millis(500),
        });
        load_level(&mut w, 2);
        assert!(w.pending_shift.is_none());
    }

    #[test]
    fn boss_level_entities_reset_on_load() {
        let mut w = WorldState::new();
        load_level(&mut w, 5);
        let boss = w.boss.expect("boss present");
        assert_eq!(boss.health, boss.max_health);
        assert!(w.turret.is_some());
        assert!(w.player_shots.is_empty());
    }
}
