/// Entities: Player, Projectile, Boss, Turret — plus the Rect/Body
/// primitives they are built from. Positions are center-based, in
/// playfield pixels (800×600).

use super::age::Age;

/// Axis-aligned box, center position + full extents.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn left(&self) -> f32 { self.x - self.w / 2.0 }
    pub fn right(&self) -> f32 { self.x + self.w / 2.0 }
    pub fn top(&self) -> f32 { self.y - self.h / 2.0 }
    pub fn bottom(&self) -> f32 { self.y + self.h / 2.0 }

    pub fn overlaps(&self, other: &Rect) -> bool {
        (self.x - other.x).abs() * 2.0 < self.w + other.w
            && (self.y - other.y).abs() * 2.0 < self.h + other.h
    }
}

/// Which sides of a body were blocked during the last integration pass.
#[derive(Clone, Copy, Default, Debug)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// A moving box with velocity. Gravity is opt-out so projectiles,
/// the boss and the turret can hover.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub gravity: bool,
    pub blocked: Blocked,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Body { rect, vx: 0.0, vy: 0.0, gravity: true, blocked: Blocked::default() }
    }

    pub fn hovering(rect: Rect) -> Self {
        Body { gravity: false, ..Body::new(rect) }
    }

    pub fn on_ground(&self) -> bool {
        self.blocked.down
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Player {
    pub body: Body,
    pub age: Age,
    /// Player control is surrendered while riding the turret.
    pub on_turret: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, age: Age) -> Self {
        let p = age.profile();
        Player {
            body: Body::new(Rect::new(x, y, p.width, p.height)),
            age,
            on_turret: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProjectileOwner {
    Player,
    Boss,
}

#[derive(Clone, Copy, Debug)]
pub struct Projectile {
    pub body: Body,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn new(x: f32, y: f32, size: f32, vx: f32, owner: ProjectileOwner) -> Self {
        let mut body = Body::hovering(Rect::new(x, y, size, size));
        body.vx = vx;
        Projectile { body, owner }
    }
}

/// Boss bar color bracket, picked from the remaining health fraction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HealthBracket {
    High, // > 0.6
    Mid,  // > 0.3
    Low,
}

#[derive(Clone, Copy, Debug)]
pub struct Boss {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    /// Ticks accumulated toward the next shot.
    pub shot_timer: u32,
    /// Ticks left on the hit flash.
    pub flash_timer: u32,
}

pub const BOSS_WIDTH: f32 = 80.0;
pub const BOSS_HEIGHT: f32 = 120.0;

impl Boss {
    pub fn new(x: f32, y: f32, max_health: i32) -> Self {
        Boss {
            body: Body::hovering(Rect::new(x, y, BOSS_WIDTH, BOSS_HEIGHT)),
            health: max_health,
            max_health,
            shot_timer: 0,
            flash_timer: 0,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn health_bracket(&self) -> HealthBracket {
        let frac = self.health_fraction();
        if frac > 0.6 {
            HealthBracket::High
        } else if frac > 0.3 {
            HealthBracket::Mid
        } else {
            HealthBracket::Low
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Turret {
    pub body: Body,
}

pub const TURRET_SIZE: f32 = 50.0;

impl Turret {
    pub fn new(x: f32, y: f32) -> Self {
        Turret { body: Body::hovering(Rect::new(x, y, TURRET_SIZE, TURRET_SIZE)) }
    }
}

/// Horizontal movement intent (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Vertical aim intent while riding the turret.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AimDir {
    Up,
    Down,
}

/// Everything the simulation needs from input for one tick.
/// Held keys drive movement/aim/fire; edge-triggered presses drive
/// age selection and the turret toggle.
#[derive(Clone, Copy, Default, Debug)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
    pub jump: bool,
    pub select_age: Option<Age>,
    pub turret_toggle: bool,
    pub aim: Option<AimDir>,
    pub fire: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_requires_strict_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0); // edges meet exactly
        let inside = Rect::new(9.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(100.0, 50.0, 20.0, 40.0);
        assert_eq!(r.left(), 90.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.top(), 30.0);
        assert_eq!(r.bottom(), 70.0);
    }

    #[test]
    fn health_bracket_boundaries() {
        // Strict > at both thresholds: exactly 0.6 falls to Mid, exactly 0.3 to Low.
        let mut boss = Boss::new(700.0, 350.0, 10);
        boss.health = 7;
        assert_eq!(boss.health_bracket(), HealthBracket::High);
        boss.health = 6;
        assert_eq!(boss.health_bracket(), HealthBracket::Mid);
        boss.health = 4;
        assert_eq!(boss.health_bracket(), HealthBracket::Mid);
        boss.health = 3;
        assert_eq!(boss.health_bracket(), HealthBracket::Low);
        boss.health = 1;
        assert_eq!(boss.health_bracket(), HealthBracket::Low);
    }

    #[test]
    fn health_fraction_and_defeat() {
        let mut boss = Boss::new(700.0, 350.0, 10);
        assert_eq!(boss.health_fraction(), 1.0);
        boss.health = 5;
        assert_eq!(boss.health_fraction(), 0.5);
        assert!(!boss.is_defeated());
        boss.health = 0;
        assert!(boss.is_defeated());
        boss.health = -1;
        assert!(boss.is_defeated());
    }

    #[test]
    fn player_body_matches_profile() {
        let p = Player::new(50.0, 450.0, Age::Adult);
        assert_eq!(p.body.rect.w, 32.0);
        assert_eq!(p.body.rect.h, 48.0);
        assert!(p.body.gravity);
    }

    #[test]
    fn projectiles_ignore_gravity() {
        let b = Projectile::new(0.0, 0.0, 10.0, 600.0, ProjectileOwner::Player);
        assert!(!b.body.gravity);
        assert_eq!(b.body.vx, 600.0);
    }
}
