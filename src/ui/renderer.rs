/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// The playfield is a fixed 800×600 logical space, scaled to whatever
/// terminal area is available below the HUD. Everything in the world is
/// an axis-aligned rectangle, so composing a frame is just painting
/// scaled rect spans with background colors.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::age::Age;
use crate::domain::entity::{HealthBracket, Rect};
use crate::domain::physics::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear or the terminal's default.
    /// Using the SAME explicit RGB for `Clear(ClearType::All)` and every
    /// cell's background keeps the gaps invisible.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 0, b: 21 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn put_str_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 2;
/// Rows below the playfield: gap + message + help.
const FOOTER_ROWS: usize = 3;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Playfield viewport in terminal cells.
    view_w: usize,
    view_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            view_w: 0,
            view_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.apply_size(tw as usize, th as usize);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn apply_size(&mut self, tw: usize, th: usize) {
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw, th);
        self.back.resize(tw, th);
        self.view_w = tw;
        self.view_h = th.saturating_sub(FIELD_ROW + FOOTER_ROWS).max(1);
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.apply_size(tw as usize, th as usize);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        // Build front buffer
        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Instructions => self.compose_instructions(),
            Phase::Playing => self.compose_game(world),
            Phase::GameComplete => self.compose_game_complete(world),
        }

        // Pause overlay (drawn on top of game)
        if world.paused {
            self.compose_pause_overlay();
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── World-to-viewport mapping ──

    fn col_of(&self, wx: f32) -> isize {
        (wx / WORLD_WIDTH * self.view_w as f32) as isize
    }

    fn row_of(&self, wy: f32) -> isize {
        (wy / WORLD_HEIGHT * self.view_h as f32) as isize + FIELD_ROW as isize
    }

    /// Paint a world-space rect as a filled background span.
    fn paint_rect(&mut self, r: &Rect, bg: Color) {
        let c0 = self.col_of(r.left()).max(0);
        // At least one cell, so thin projectiles stay visible.
        let c1 = self.col_of(r.right()).max(c0 + 1);
        let r0 = self.row_of(r.top()).max(FIELD_ROW as isize);
        let r1 = self.row_of(r.bottom()).max(r0 + 1);
        let row_end = (FIELD_ROW + self.view_h) as isize;

        for row in r0..r1.min(row_end) {
            for col in c0..c1.min(self.view_w as isize) {
                self.front.set(col as usize, row as usize, Cell::new(' ', Color::White, bg));
            }
        }
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        self.compose_hud(w);

        // ── Static geometry ──
        let obstacle_bg = rgb(60, 50, 90);
        for r in &w.obstacles {
            self.paint_rect(r, obstacle_bg);
        }

        // Ghost platforms: bright while the elder can stand on them,
        // barely-there for everyone else.
        let ghost_bg = if w.player.age == Age::Elder {
            rgb(157, 0, 255)
        } else {
            rgb(40, 10, 60)
        };
        for r in &w.ghost_platforms {
            self.paint_rect(r, ghost_bg);
        }

        if w.goal.w > 1.0 {
            self.paint_rect(&w.goal, rgb(0, 255, 128));
        }

        // ── Encounter pieces ──
        if let Some(turret) = &w.turret {
            let r = turret.body.rect;
            self.paint_rect(&r, rgb(0, 255, 255));
        }
        if let Some(boss) = &w.boss {
            let bg = if boss.flash_timer > 0 {
                rgb(0, 255, 255)
            } else {
                rgb(255, 0, 153)
            };
            let r = boss.body.rect;
            self.paint_rect(&r, bg);
        }
        for shot in &w.player_shots {
            self.paint_rect(&shot.body.rect, rgb(0, 255, 255));
        }
        for shot in &w.boss_shots {
            self.paint_rect(&shot.body.rect, rgb(255, 0, 153));
        }

        // ── Player ──
        let (r, g, b) = w.player.age.profile().color;
        let rect = w.player.body.rect;
        self.paint_rect(&rect, rgb(r, g, b));

        if w.boss.is_some() {
            self.compose_boss_bar(w);
        }

        if w.is_shifting() {
            self.compose_shift_overlay(w);
        }

        // ── Message bar ──
        let msg_row = FIELD_ROW + self.view_h + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.front.put_str(0, msg_row, &msg, Color::Black, rgb(200, 180, 50));
        }

        // ── Help bar ──
        let help_row = FIELD_ROW + self.view_h + 2;
        if help_row < self.front.height {
            let help = if w.boss.is_some() {
                " ←/→:Move  ↑:Jump/Aim  1/2/3:Age  X:Turret  Space:Fire  F1:Pause"
            } else {
                " ←/→:Move  ↑:Jump  1:Child 2:Adult 3:Elder  R:Restart  F1:Pause"
            };
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let hud_bg = rgb(20, 0, 40);
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, hud_bg));
        }
        let hud = format!(
            " Level {}/{}: {}   Time: {}s   Age: {} ",
            w.current_level,
            w.total_levels,
            w.level_name,
            w.elapsed_secs(),
            w.player.age.profile().name,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);
    }

    /// Boss health bar on the row under the HUD, colored by bracket.
    fn compose_boss_bar(&mut self, w: &WorldState) {
        let Some(boss) = &w.boss else { return };

        let bar_fg = match boss.health_bracket() {
            HealthBracket::High => rgb(0, 255, 255),
            HealthBracket::Mid => rgb(255, 0, 255),
            HealthBracket::Low => rgb(255, 0, 128),
        };
        let total = (self.front.width / 2).max(10);
        let filled = (total as f32 * boss.health_fraction()).round() as usize;
        let x0 = self.front.width.saturating_sub(total) / 2;

        let label = "BOSS";
        self.front.put_str(x0.saturating_sub(label.len() + 1), 1, label, bar_fg, Color::Reset);
        for i in 0..total {
            let cell = if i < filled {
                Cell::new('█', bar_fg, Color::Reset)
            } else {
                Cell::new('░', rgb(40, 20, 50), Color::Reset)
            };
            self.front.set(x0 + i, 1, cell);
        }
    }

    /// Centered banner while an age transition is in flight.
    fn compose_shift_overlay(&mut self, w: &WorldState) {
        let Some(pending) = &w.pending_shift else { return };

        let aging = w.player.age.is_aging_toward(pending.target);
        let label = if aging { "AGING" } else { "REJUVENATING" };
        let arrows = match (w.anim_tick / 4) % 3 {
            0 => ">  ",
            1 => ">> ",
            _ => ">>>",
        };
        let text = if aging {
            format!("  {} {}  ", label, arrows)
        } else {
            let back: String = arrows.chars().rev().map(|c| if c == '>' { '<' } else { c }).collect();
            format!("  {} {}  ", back, label)
        };
        let row = FIELD_ROW + self.view_h / 2;
        self.front.put_str_centered(row, &text, Color::Black, rgb(255, 220, 50));
    }

    // ── Static screens ──

    fn compose_title(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        let gold = rgb(255, 220, 50);

        self.front.put_str_centered(mid.saturating_sub(4), "A G E   S H I F T E R", rgb(0, 255, 255), Color::Reset);
        self.front.put_str_centered(mid.saturating_sub(2), "a lifetime is a toolkit", rgb(157, 0, 255), Color::Reset);

        // Blink the prompt
        if (w.anim_tick / 15) % 2 == 0 {
            self.front.put_str_centered(mid + 1, "▸▸▸ ENTER to start ◂◂◂", gold, Color::Reset);
        }
        self.front.put_str_centered(mid + 3, "I: instructions   Q: quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_instructions(&mut self) {
        let lines = [
            ("HOW TO PLAY", rgb(0, 255, 255)),
            ("", Color::White),
            ("Arrows / WASD move, Up jumps.", Color::White),
            ("1 / 2 / 3 shift you to child, adult, elder.", Color::White),
            ("Shifting takes half a second per step of life", Color::White),
            ("and the world holds its breath while you change.", Color::White),
            ("", Color::White),
            ("CHILD  — small and quick, slips through tunnels", rgb(0, 255, 255)),
            ("ADULT  — the strongest jump", rgb(255, 0, 255)),
            ("ELDER  — slow, but walks on ghost platforms", rgb(157, 0, 255)),
            ("", Color::White),
            ("On the last level: X mounts the turret,", Color::White),
            ("arrows aim it, Space fires.", Color::White),
            ("", Color::White),
            ("ESC: back", Color::DarkGrey),
        ];
        let top = self.front.height.saturating_sub(lines.len()) / 2;
        for (i, (text, fg)) in lines.iter().enumerate() {
            self.front.put_str_centered(top + i, text, *fg, Color::Reset);
        }
    }

    fn compose_game_complete(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_str_centered(mid.saturating_sub(2), "Y O U   W I N", rgb(0, 255, 128), Color::Reset);
        let line = format!("The boss is gone. Final time: {}s", w.elapsed_secs());
        self.front.put_str_centered(mid, &line, Color::White, Color::Reset);
        if (w.anim_tick / 15) % 2 == 0 {
            self.front.put_str_centered(mid + 2, "ENTER: play again   Q: quit", rgb(255, 220, 50), Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self) {
        let row = FIELD_ROW + self.view_h / 2;
        self.front.put_str_centered(row, "  ║ PAUSED ║  ", Color::Black, rgb(200, 180, 50));
    }
}
