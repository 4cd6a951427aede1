/// Age profiles and their properties.
/// There are exactly three forms; properties are queried via methods,
/// not stored as flags, so profile semantics are centralized here.

/// Milliseconds of transition time per ordinal step between ages.
pub const STEP_DELAY_MS: u64 = 500;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Age {
    Child,
    Adult,
    Elder,
}

/// Static stats for one age form. Defined once, never mutated.
#[derive(Clone, Copy, Debug)]
pub struct AgeProfile {
    pub width: f32,
    pub height: f32,
    /// Horizontal run speed, px/s.
    pub speed: f32,
    /// Jump impulse, px/s. Negative = upward.
    pub jump: f32,
    pub color: (u8, u8, u8),
    pub name: &'static str,
}

const CHILD: AgeProfile = AgeProfile {
    width: 20.0,
    height: 20.0,
    speed: 300.0,
    jump: -400.0,
    color: (0, 255, 255),
    name: "CHILD",
};

const ADULT: AgeProfile = AgeProfile {
    width: 32.0,
    height: 48.0,
    speed: 200.0,
    jump: -600.0,
    color: (255, 0, 255),
    name: "ADULT",
};

const ELDER: AgeProfile = AgeProfile {
    width: 32.0,
    height: 40.0,
    speed: 100.0,
    jump: -500.0,
    color: (157, 0, 255),
    name: "ELDER",
};

impl Age {
    pub const ALL: [Age; 3] = [Age::Child, Age::Adult, Age::Elder];

    /// Ordinal position on the lifeline: child 0, adult 1, elder 2.
    pub fn index(self) -> i32 {
        match self {
            Age::Child => 0,
            Age::Adult => 1,
            Age::Elder => 2,
        }
    }

    pub fn profile(self) -> &'static AgeProfile {
        match self {
            Age::Child => &CHILD,
            Age::Adult => &ADULT,
            Age::Elder => &ELDER,
        }
    }

    /// Number of ordinal steps between two ages.
    pub fn steps_to(self, target: Age) -> u32 {
        (target.index() - self.index()).unsigned_abs()
    }

    /// Wall-clock duration of a transition to `target`.
    pub fn shift_duration_ms(self, target: Age) -> u64 {
        self.steps_to(target) as u64 * STEP_DELAY_MS
    }

    /// True if the transition moves forward on the lifeline (aging up).
    pub fn is_aging_toward(self, target: Age) -> bool {
        target.index() > self.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_index_distance() {
        for a in Age::ALL {
            for b in Age::ALL {
                assert_eq!(a.steps_to(b), (b.index() - a.index()).unsigned_abs());
            }
        }
    }

    #[test]
    fn duration_is_symmetric() {
        for a in Age::ALL {
            for b in Age::ALL {
                assert_eq!(a.shift_duration_ms(b), b.shift_duration_ms(a));
            }
        }
    }

    #[test]
    fn child_to_elder_takes_two_steps() {
        assert_eq!(Age::Child.steps_to(Age::Elder), 2);
        assert_eq!(Age::Child.shift_duration_ms(Age::Elder), 1000);
    }

    #[test]
    fn same_age_is_zero_duration() {
        for a in Age::ALL {
            assert_eq!(a.steps_to(a), 0);
            assert_eq!(a.shift_duration_ms(a), 0);
        }
    }

    #[test]
    fn adjacent_ages_take_one_step() {
        assert_eq!(Age::Child.shift_duration_ms(Age::Adult), 500);
        assert_eq!(Age::Adult.shift_duration_ms(Age::Elder), 500);
    }

    #[test]
    fn profiles_have_expected_dimensions() {
        assert_eq!(Age::Child.profile().width, 20.0);
        assert_eq!(Age::Child.profile().height, 20.0);
        assert_eq!(Age::Adult.profile().height, 48.0);
        assert_eq!(Age::Elder.profile().height, 40.0);
    }

    #[test]
    fn jump_impulses_point_up() {
        for a in Age::ALL {
            assert!(a.profile().jump < 0.0);
        }
    }
}
