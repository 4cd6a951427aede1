/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
}

/// Encounter tuning. Owned by WorldState so the simulation never
/// reaches back into the loader.
#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub tick_rate_ms: u64,
    pub fire_cooldown_ms: u64,
    /// Ticks between boss volleys.
    pub boss_shot_interval: u32,
    pub boss_max_health: i32,
    /// Turret vertical speed, px per tick.
    pub turret_move_speed: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub turret: Vec<String>,
    pub age_child: Vec<String>,
    pub age_adult: Vec<String>,
    pub age_elder: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_fire_cooldown")]
    fire_cooldown_ms: u64,
    #[serde(default = "default_boss_interval")]
    boss_shot_interval: u32,
    #[serde(default = "default_boss_health")]
    boss_max_health: i32,
    #[serde(default = "default_turret_speed")]
    turret_move_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_fire")]
    fire: Vec<String>,
    #[serde(default = "default_turret")]
    turret: Vec<String>,
    #[serde(default = "default_age_child")]
    age_child: Vec<String>,
    #[serde(default = "default_age_adult")]
    age_adult: Vec<String>,
    #[serde(default = "default_age_elder")]
    age_elder: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }       // ~60 fps
fn default_fire_cooldown() -> u64 { 200 }
fn default_boss_interval() -> u32 { 100 }
fn default_boss_health() -> i32 { 10 }
fn default_turret_speed() -> f32 { 3.0 }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_fire() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_turret() -> Vec<String> { vec!["Y".into()] }
fn default_age_child() -> Vec<String> { vec!["L1".into()] }
fn default_age_adult() -> Vec<String> { vec!["L2".into()] }
fn default_age_elder() -> Vec<String> { vec!["R2".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            tick_rate_ms: default_tick_rate(),
            fire_cooldown_ms: default_fire_cooldown(),
            boss_shot_interval: default_boss_interval(),
            boss_max_health: default_boss_health(),
            turret_move_speed: default_turret_speed(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            tick_rate_ms: default_tick_rate(),
            fire_cooldown_ms: default_fire_cooldown(),
            boss_shot_interval: default_boss_interval(),
            boss_max_health: default_boss_health(),
            turret_move_speed: default_turret_speed(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            fire: default_fire(),
            turret: default_turret(),
            age_child: default_age_child(),
            age_adult: default_age_adult(),
            age_elder: default_age_elder(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        GameConfig {
            rules: RulesConfig {
                tick_rate_ms: toml_cfg.rules.tick_rate_ms,
                fire_cooldown_ms: toml_cfg.rules.fire_cooldown_ms,
                boss_shot_interval: toml_cfg.rules.boss_shot_interval,
                boss_max_health: toml_cfg.rules.boss_max_health,
                turret_move_speed: toml_cfg.rules.turret_move_speed,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                fire: toml_cfg.gamepad.fire,
                turret: toml_cfg.gamepad.turret,
                age_child: toml_cfg.gamepad.age_child,
                age_adult: toml_cfg.gamepad.age_adult,
                age_elder: toml_cfg.gamepad.age_elder,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                restart: toml_cfg.gamepad.restart,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
