/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::age::Age;
use domain::entity::{AimDir, FrameInput, MoveDir};
use sim::event::GameEvent;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new();
    world.rules = config.rules.clone();

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Age Shifter!");
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.rules.tick_rate_ms);

    // Edge-triggered actions can land on a frame between ticks; latch
    // them until the next simulation step consumes them.
    let mut pending_age: Option<Age> = None;
    let mut pending_turret = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp) {
            break;
        }

        if world.phase == Phase::Playing && !world.paused {
            if let Some(age) = detect_age_press(&kb, &gp) {
                pending_age = Some(age);
            }
            if kb.any_pressed(KEYS_TURRET) || gp.turret_pressed() {
                pending_turret = true;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if world.paused {
                // Pause blocks simulation but allows anim_tick for blink
                world.anim_tick = world.anim_tick.wrapping_add(1);
            } else if world.phase == Phase::Playing {
                let frame_input = FrameInput {
                    movement: detect_movement(&kb, &gp),
                    jump: kb.any_held(KEYS_UP) || gp.jump_held(),
                    select_age: pending_age.take(),
                    turret_toggle: std::mem::take(&mut pending_turret),
                    aim: detect_aim(&kb, &gp),
                    fire: kb.any_held(KEYS_FIRE) || gp.fire_held(),
                };
                let events = step::step(world, frame_input, Instant::now());
                process_events(world, &events);
            } else {
                world.anim_tick = world.anim_tick.wrapping_add(1);
                if world.message_timer > 0 {
                    world.message_timer -= 1;
                    if world.message_timer == 0 {
                        world.message.clear();
                    }
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Turn step events into transient status messages.
fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::ShiftCompleted { age } => {
                world.set_message(&format!("Now: {}", age.profile().name), 40);
            }
            GameEvent::TurretEntered => {
                world.set_message("Mode: TURRET (Arrows: Aim, Space: Fire, X: Exit)", 0);
            }
            GameEvent::TurretExited => {
                world.set_message("Mode: ON FOOT", 30);
            }
            GameEvent::PlayerKilled => {
                world.set_message("You fall. The level resets.", 50);
            }
            GameEvent::BossDefeated => {
                world.set_message("BOSS DOWN", 80);
            }
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_FIRE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_TURRET: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];

fn detect_age_press(kb: &InputState, gp: &GamepadState) -> Option<Age> {
    if kb.was_pressed(KeyCode::Char('1')) {
        Some(Age::Child)
    } else if kb.was_pressed(KeyCode::Char('2')) {
        Some(Age::Adult)
    } else if kb.was_pressed(KeyCode::Char('3')) {
        Some(Age::Elder)
    } else {
        gp.age_pressed()
    }
}

fn detect_movement(kb: &InputState, gp: &GamepadState) -> Option<MoveDir> {
    if kb.any_held(KEYS_LEFT) || gp.left_held() {
        Some(MoveDir::Left)
    } else if kb.any_held(KEYS_RIGHT) || gp.right_held() {
        Some(MoveDir::Right)
    } else {
        None
    }
}

fn detect_aim(kb: &InputState, gp: &GamepadState) -> Option<AimDir> {
    if kb.any_held(KEYS_UP) || gp.up_held() {
        Some(AimDir::Up)
    } else if kb.any_held(KEYS_DOWN) || gp.down_held() {
        Some(AimDir::Down)
    } else {
        None
    }
}

/// Reset to title screen, preserving the loaded rules.
fn return_to_title(world: &mut WorldState) {
    let rules = world.rules.clone();
    *world = WorldState::new();
    world.rules = rules;
    world.phase = Phase::Title;
}

fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();
    let quit = kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]);

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                step::new_game(world);
            } else if kb.any_pressed(&[KeyCode::Char('i'), KeyCode::Char('I')]) {
                world.phase = Phase::Instructions;
            } else if quit || esc {
                return true;
            }
        }

        // ── Instructions ──
        Phase::Instructions => {
            if confirm || esc || quit {
                world.phase = Phase::Title;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            // F1: Pause / Resume
            if kb.any_pressed(&[KeyCode::F(1)]) {
                world.paused = !world.paused;
                if world.paused {
                    world.set_message("PAUSED  [F1] Resume", 0);
                } else {
                    world.message.clear();
                    world.message_timer = 0;
                }
                return false;
            }
            if world.paused {
                // Block all other input while paused
                return false;
            }
            if esc {
                return_to_title(world);
            } else if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                step::restart_level(world);
                world.set_message("Level Restarted", 30);
            }
        }

        // ── Game Complete ──
        Phase::GameComplete => {
            if confirm {
                step::new_game(world);
            } else if esc || quit {
                return_to_title(world);
            }
        }
    }

    false
}
