/// Age transition rules — truth-table driven.
///
/// Pure functions, no timers: the simulation owns the pending deadline
/// and calls in here to decide and to apply.
///
/// ## Request
/// ┌───────────────────────────────┬────────┐
/// │ Condition                     │ Result │
/// ├───────────────────────────────┼────────┤
/// │ A shift is already pending    │ DENY   │
/// │ Target equals current age     │ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └───────────────────────────────┴────────┘
///
/// An allowed request freezes the simulation for
/// `steps × 500 ms` of wall-clock time, then completes.
///
/// ## Completion
/// Applies the target profile to the player, then repositions so the
/// new body does not end up buried in geometry:
///   - height grew  → shift up by half the increase plus a 10 px margin
///   - width grew while pressed against a wall → shift away from the
///     wall by the increase plus 10 px
///   - height grew  → set an upward −300 px/s impulse (escape aid)

use super::age::Age;
use super::entity::{Blocked, Player};

/// Extra clearance added when pushing the player out of geometry.
const REPOSITION_MARGIN: f32 = 10.0;

/// Upward impulse applied when the new form is taller.
const GROW_IMPULSE: f32 = -300.0;

/// Positional fixup computed for a completed shift.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Reposition {
    pub dx: f32,
    pub dy: f32,
    pub impulse_vy: Option<f32>,
}

/// May a shift to `target` begin?
pub fn can_request(current: Age, target: Age, already_shifting: bool) -> bool {
    !already_shifting && current != target
}

/// How far the player must move when the body changes size.
/// `blocked` is the wall-contact state captured before the resize.
pub fn reposition_for(from: Age, to: Age, blocked: Blocked) -> Reposition {
    let old = from.profile();
    let new = to.profile();
    let height_diff = new.height - old.height;
    let width_diff = new.width - old.width;

    let mut rep = Reposition { dx: 0.0, dy: 0.0, impulse_vy: None };

    if height_diff > 0.0 || width_diff > 0.0 {
        rep.dy = -(height_diff / 2.0 + REPOSITION_MARGIN);

        if width_diff > 0.0 {
            if blocked.left {
                rep.dx = width_diff + REPOSITION_MARGIN;
            } else if blocked.right {
                rep.dx = -(width_diff + REPOSITION_MARGIN);
            }
        }
    }

    if height_diff > 0.0 {
        rep.impulse_vy = Some(GROW_IMPULSE);
    }

    rep
}

/// Apply a completed shift to the player: new profile, fixup, impulse.
pub fn apply(player: &mut Player, target: Age) {
    let from = player.age;
    let rep = reposition_for(from, target, player.body.blocked);
    let profile = target.profile();

    player.age = target;
    player.body.rect.x += rep.dx;
    player.body.rect.y += rep.dy;
    player.body.rect.w = profile.width;
    player.body.rect.h = profile.height;
    if let Some(vy) = rep.impulse_vy {
        player.body.vy = vy;
    }
}
