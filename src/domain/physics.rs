/// Continuous-space physics — single source of truth.
///
/// ## Architecture
///
/// Two distinct concepts:
///   1. SOLIDS  — static geometry a body cannot pass through
///   2. BODIES  — moving boxes with velocity and optional gravity
///
/// Integration is per-axis: move X, resolve against solids, then move Y,
/// resolve again. Resolving a penetration zeroes the velocity on that
/// axis and records the blocked side, which is how the rest of the game
/// asks questions like "standing on ground?" or "pressed against a wall?".
///
/// The playfield bounds wall off the left, right and top edges for
/// clamped bodies (projectiles are never clamped and are swept
/// separately). The bottom edge is open — see `integrate`.

use super::entity::{Blocked, Body, Rect};

/// Logical playfield size, matching the original 800×600 canvas.
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

/// Downward acceleration applied to gravity-enabled bodies, px/s².
pub const GRAVITY: f32 = 1000.0;

/// Advance a body by `dt` seconds against static solids, resolving
/// collisions per axis and updating the body's blocked flags.
pub fn integrate(body: &mut Body, dt: f32, solids: &[Rect], clamp_to_world: bool) {
    body.blocked = Blocked::default();

    if body.gravity {
        body.vy += GRAVITY * dt;
    }

    // ── Horizontal pass ──
    body.rect.x += body.vx * dt;
    for s in solids {
        if !body.rect.overlaps(s) {
            continue;
        }
        if body.vx > 0.0 {
            body.rect.x = s.left() - body.rect.w / 2.0;
            body.blocked.right = true;
        } else if body.vx < 0.0 {
            body.rect.x = s.right() + body.rect.w / 2.0;
            body.blocked.left = true;
        }
        body.vx = 0.0;
    }
    if clamp_to_world {
        if body.rect.left() < 0.0 {
            body.rect.x = body.rect.w / 2.0;
            body.blocked.left = true;
            body.vx = body.vx.max(0.0);
        } else if body.rect.right() > WORLD_WIDTH {
            body.rect.x = WORLD_WIDTH - body.rect.w / 2.0;
            body.blocked.right = true;
            body.vx = body.vx.min(0.0);
        }
    }

    // ── Vertical pass ──
    body.rect.y += body.vy * dt;
    for s in solids {
        if !body.rect.overlaps(s) {
            continue;
        }
        if body.vy > 0.0 {
            body.rect.y = s.top() - body.rect.h / 2.0;
            body.blocked.down = true;
        } else if body.vy < 0.0 {
            body.rect.y = s.bottom() + body.rect.h / 2.0;
            body.blocked.up = true;
        }
        body.vy = 0.0;
    }
    // The bottom edge is deliberately open: dropping out of the
    // playfield is the fall-death condition, checked by the step.
    if clamp_to_world && body.rect.top() < 0.0 {
        body.rect.y = body.rect.h / 2.0;
        body.blocked.up = true;
        body.vy = body.vy.max(0.0);
    }

    // A resting body keeps reporting the wall it is pressed against,
    // even on ticks where velocity was already zero.
    for s in solids {
        let probe_down = Rect { y: body.rect.y + 1.0, ..body.rect };
        if probe_down.overlaps(s) {
            body.blocked.down = true;
        }
        let probe_left = Rect { x: body.rect.x - 1.0, ..body.rect };
        if probe_left.overlaps(s) {
            body.blocked.left = true;
        }
        let probe_right = Rect { x: body.rect.x + 1.0, ..body.rect };
        if probe_right.overlaps(s) {
            body.blocked.right = true;
        }
    }
}

/// Is the projectile-style point body outside the playfield expanded by
/// `margin` on every side? Exactly on the expanded boundary counts as
/// inside.
pub fn outside_bounds(rect: &Rect, margin: f32) -> bool {
    rect.x > WORLD_WIDTH + margin
        || rect.x < -margin
        || rect.y > WORLD_HEIGHT + margin
        || rect.y < -margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Body;

    fn floor() -> Rect {
        // Matches the common level floor: center (400, 580), 800×40.
        Rect::new(400.0, 580.0, 800.0, 40.0)
    }

    #[test]
    fn gravity_accelerates_free_fall() {
        let mut b = Body::new(Rect::new(100.0, 100.0, 20.0, 20.0));
        integrate(&mut b, 0.1, &[], true);
        assert!(b.vy > 0.0);
        assert!(b.rect.y > 100.0);
        assert!(!b.on_ground());
    }

    #[test]
    fn body_lands_on_floor() {
        let mut b = Body::new(Rect::new(100.0, 540.0, 20.0, 20.0));
        for _ in 0..60 {
            integrate(&mut b, 1.0 / 60.0, &[floor()], true);
        }
        assert!(b.on_ground());
        assert_eq!(b.vy, 0.0);
        // Resting on the floor top (y=560), so bottom == 560.
        assert!((b.rect.bottom() - 560.0).abs() < 0.001);
    }

    #[test]
    fn wall_blocks_horizontal_movement() {
        let wall = Rect::new(200.0, 300.0, 20.0, 600.0);
        let mut b = Body::hovering(Rect::new(150.0, 300.0, 20.0, 20.0));
        b.vx = 300.0;
        for _ in 0..30 {
            integrate(&mut b, 1.0 / 60.0, &[wall], true);
        }
        assert!(b.blocked.right);
        assert!((b.rect.right() - wall.left()).abs() < 0.001);
    }

    #[test]
    fn resting_body_still_reports_wall_contact() {
        let wall = Rect::new(200.0, 300.0, 20.0, 600.0);
        let mut b = Body::hovering(Rect::new(180.0, 300.0, 20.0, 20.0)); // flush against wall
        integrate(&mut b, 1.0 / 60.0, &[wall], true);
        assert!(b.blocked.right);
    }

    #[test]
    fn world_bounds_contain_the_body() {
        let mut b = Body::hovering(Rect::new(10.0, 300.0, 20.0, 20.0));
        b.vx = -500.0;
        integrate(&mut b, 0.1, &[], true);
        assert!(b.blocked.left);
        assert_eq!(b.rect.left(), 0.0);
    }

    #[test]
    fn unclamped_body_leaves_the_world() {
        let mut b = Body::hovering(Rect::new(790.0, 300.0, 10.0, 10.0));
        b.vx = 600.0;
        integrate(&mut b, 0.5, &[], false);
        assert!(b.rect.x > WORLD_WIDTH);
    }

    #[test]
    fn bounds_margin_is_inclusive() {
        // x == width + margin is retained; one unit beyond is out.
        let at_edge = Rect::new(850.0, 300.0, 10.0, 10.0);
        let beyond = Rect::new(851.0, 300.0, 10.0, 10.0);
        let inside = Rect::new(849.0, 300.0, 10.0, 10.0);
        assert!(!outside_bounds(&at_edge, 50.0));
        assert!(outside_bounds(&beyond, 50.0));
        assert!(!outside_bounds(&inside, 50.0));
    }

    #[test]
    fn bounds_check_covers_all_sides() {
        assert!(outside_bounds(&Rect::new(-51.0, 300.0, 10.0, 10.0), 50.0));
        assert!(outside_bounds(&Rect::new(400.0, -51.0, 10.0, 10.0), 50.0));
        assert!(outside_bounds(&Rect::new(400.0, 651.0, 10.0, 10.0), 50.0));
        assert!(!outside_bounds(&Rect::new(-50.0, 300.0, 10.0, 10.0), 50.0));
        assert!(!outside_bounds(&Rect::new(400.0, 650.0, 10.0, 10.0), 50.0));
    }
}
