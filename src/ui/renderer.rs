/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (a grid of `Cell`)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed
///   4. Batch everything with `queue!` and flush once
///   5. Swap front/back
///
/// ## Screen layout
///   row 0           HUD: route, level, progress, next asker
///   rows 2..        wall viewport (3 columns per grid x, top row = highest y)
///   right of wall   side panel: question, help or progress
///   last row        status notice or key hints
///
/// The wall scrolls vertically only; `Camera` follows the climbers.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::{Actor, AnchorName, PlayerId};
use crate::domain::geom::grid_key;
use crate::domain::hold::HoldColor;
use crate::domain::rules::MoveDir;
use crate::sim::deck::DeckPolicy;
use crate::sim::effects::EmoteKind;
use crate::sim::session::Session;
use super::{Overlay, Renderable, SceneView};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, matched by `Clear` so
    /// inter-row gaps on VTE terminals take the same color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composing, so a back buffer full of these repaints everything.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, from: usize, to: usize, bg: Color) {
        for x in from..to.min(self.width) {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Camera: vertical viewport into the wall ──

/// `top` is the world y shown on the first wall row; rows go downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    pub top: i32,
    pub view_h: i32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { top: 0, view_h: 0 }
    }

    /// Dead-zone follow: scroll only when `target_y` nears the top or bottom
    /// fifth of the view. Walls shorter than the view are pinned to the base.
    pub fn follow(&mut self, target_y: i32, wall_h: i32) {
        if self.view_h <= 0 {
            return;
        }
        if wall_h <= self.view_h {
            self.top = self.view_h - 1;
            return;
        }
        let margin = self.view_h / 5;
        let bottom = self.top - self.view_h + 1;
        if target_y > self.top - margin {
            self.top = target_y + margin;
        } else if target_y < bottom + margin {
            self.top = target_y - margin + self.view_h - 1;
        }
        self.top = self.top.clamp(self.view_h - 1, wall_h - 1);
    }

    /// Screen row offset of world row `wy`, if visible.
    pub fn row_of(&self, wy: i32) -> Option<usize> {
        let r = self.top - wy;
        (r >= 0 && r < self.view_h).then_some(r as usize)
    }
}

// ── Renderer ──

/// Terminal columns per grid x.
const CELL_W: usize = 3;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const PANEL_GAP: usize = 2;
const PANEL_MIN_W: usize = 24;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_BG: Color = Color::Rgb { r: 38, g: 34, b: 30 };
const RED: Color = Color::Rgb { r: 235, g: 80, b: 80 };
const BLUE: Color = Color::Rgb { r: 90, g: 150, b: 255 };
const GOLD: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const DIM: Color = Color::Rgb { r: 120, g: 120, b: 130 };
const TEXT: Color = Color::Rgb { r: 210, g: 210, b: 210 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    camera: Camera,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            camera: Camera::new(),
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
        self.on_resize(tw, th);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, never ResetColor: the terminal default may differ from BASE_BG
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }
        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, scene: &SceneView) {
        let s = scene.session;
        let wall_cols = s.wall.width.max(1) as usize * CELL_W;
        let left = -(s.wall.width / 2);

        self.compose_hud(s);

        let view_h = self.term_h.saturating_sub(MAP_ROW + 2) as i32;
        self.camera.view_h = view_h.min(s.wall.height).max(1);
        self.camera.follow(follow_target(s), s.wall.height);

        // Wall background and holds
        for vy in 0..self.camera.view_h {
            let row = MAP_ROW + vy as usize;
            let wy = self.camera.top - vy;
            self.front.fill_row(row, 0, wall_cols, WALL_BG);
            if wy == 0 {
                self.front.put_str(0, row, &"▔".repeat(wall_cols), DIM, WALL_BG);
            }
            for gx in 0..s.wall.width {
                if let Some(hold) = s.wall.hold_at((left + gx) as f32, wy as f32) {
                    let col = gx as usize * CELL_W;
                    self.front.put_str(col, row, " ● ", hold_color(hold.color), WALL_BG);
                }
            }
        }

        for actor in s.actors() {
            self.compose_actor(scene, actor, left);
        }

        let panel_x = wall_cols + PANEL_GAP;
        if self.term_w >= panel_x + PANEL_MIN_W {
            let panel_w = self.term_w - panel_x - 1;
            match scene.overlay {
                Overlay::Help => self.compose_help(panel_x, panel_w),
                Overlay::Progress => self.compose_progress(s, panel_x, panel_w),
                Overlay::None => self.compose_side(scene, panel_x, panel_w),
            }
        }

        self.compose_status(scene);
    }

    fn compose_hud(&mut self, s: &Session) {
        let report = s.deck.progress_report();
        let hud = format!(
            " {}  │  Level {}  │  {}/{} questions ({}%)  │  Next asker: {} ",
            s.route_name, report.level, report.asked_count, report.total, report.percentage,
            s.deck.current_asker().color().label(),
        );
        self.front.fill_row(HUD_ROW, 0, self.term_w, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_actor(&mut self, scene: &SceneView, actor: &Actor, left: i32) {
        let (gx, gy) = grid_key(actor.position().x, actor.position().y);
        let Some(vy) = self.camera.row_of(gy) else { return };
        let col = (gx - left).max(0) as usize * CELL_W;
        let row = MAP_ROW + vy;
        let fg = hold_color(actor.color());

        let num = char::from(b'0' + actor.id().number());
        let glyph: [char; 3] = match scene.session.effects.climb_of(actor.id(), scene.now) {
            Some((MoveDir::Up, p)) if p < 0.5 => ['\\', num, '/'],
            Some((MoveDir::Down, p)) if p < 0.5 => ['/', num, '\\'],
            Some((MoveDir::Left, _)) => ['<', num, ']'],
            Some((MoveDir::Right, _)) => ['[', num, '>'],
            _ => ['[', num, ']'],
        };
        let bg = if is_gripped(actor) { Color::Rgb { r: 90, g: 80, b: 20 } } else { WALL_BG };
        for (i, ch) in glyph.iter().enumerate() {
            self.front.set(col + i, row, Cell::new(*ch, fg, bg));
        }

        // Highlighted anchors: a gold mark on the grid cell the anchor falls in
        for (name, pos) in actor.anchors_world() {
            if !actor.is_highlighted(name) {
                continue;
            }
            let (ax, ay) = grid_key(pos.x, pos.y);
            if (ax, ay) == (gx, gy) {
                continue;
            }
            if let Some(avy) = self.camera.row_of(ay) {
                let acol = (ax - left).max(0) as usize * CELL_W + 1;
                self.front.set(acol, MAP_ROW + avy, Cell::new('✚', GOLD, WALL_BG));
            }
        }

        if let Some(emote) = scene.session.effects.emote_of(actor.id(), scene.now) {
            let (ch, efg) = match emote {
                EmoteKind::Heart => ('♥', Color::Rgb { r: 255, g: 105, b: 180 }),
                EmoteKind::Question => ('?', GOLD),
                EmoteKind::Wave => ('~', Color::Rgb { r: 100, g: 220, b: 220 }),
            };
            if row > MAP_ROW {
                self.front.set(col + 1, row - 1, Cell::new(ch, efg, WALL_BG));
            }
        }
    }

    fn compose_side(&mut self, scene: &SceneView, x: usize, w: usize) {
        let s = scene.session;
        let mut y = MAP_ROW;
        self.front.put_str(x, y, "Climbers", GOLD, Color::Reset);
        y += 1;
        for id in PlayerId::BOTH {
            let actor = s.actor(id);
            let who = if !s.is_present(id) {
                "waiting".to_string()
            } else if s.controls(id) {
                format!("height {:.0}", actor.position().y)
            } else {
                format!("height {:.0} (partner)", actor.position().y)
            };
            let line = format!(" {} Player {}: {}", actor.color().label(), id.number(), who);
            self.front.put_str(x, y, &line, hold_color(actor.color()), Color::Reset);
            y += 1;
        }
        self.front.put_str(x, y, &format!(" Link: {}", scene.link_status), DIM, Color::Reset);
        y += 2;

        if s.summit_reached {
            self.front.put_str(x, y, "★ Summit reached together! ★", GOLD, Color::Reset);
            y += 2;
        }

        let Some(q) = &s.active_question else {
            self.front.put_str(x, y, "Lean on each other to earn a question.", DIM, Color::Reset);
            return;
        };
        let asker_fg = hold_color(q.asker.color());
        self.front.put_str(x, y, &format!("Question {} · {}", q.id(), q.record.category), GOLD, Color::Reset);
        y += 1;
        for line in wrap(&q.asking_instructions, w) {
            self.front.put_str(x, y, &line, asker_fg, Color::Reset);
            y += 1;
        }
        y += 1;
        for line in wrap(q.record.text, w) {
            self.front.put_str(x, y, &line, Color::White, Color::Reset);
            y += 1;
        }
        y += 1;
        for line in wrap(q.record.instructions, w) {
            self.front.put_str(x, y, &line, TEXT, Color::Reset);
            y += 1;
        }
        y += 1;
        self.front.put_str(x, y, "Space / Enter: close", DIM, Color::Reset);
    }

    fn compose_help(&mut self, x: usize, w: usize) {
        let lines = [
            ("Help", GOLD),
            ("", TEXT),
            ("W A S D   Red climber", RED),
            ("Space     Red interact", RED),
            ("Arrows    Blue climber", BLUE),
            ("Enter     Blue interact", BLUE),
            ("", TEXT),
            ("Climb on holds of your own color.", TEXT),
            ("No hold? Step next to your partner", TEXT),
            ("and use their body as one.", TEXT),
            ("", TEXT),
            ("F1  help     Tab  progress", DIM),
            ("F2  reset questions", DIM),
            ("F3  swap question (same category)", DIM),
            ("Esc quit", DIM),
        ];
        for (i, (text, fg)) in lines.iter().enumerate() {
            let clipped: String = text.chars().take(w).collect();
            self.front.put_str(x, MAP_ROW + i, &clipped, *fg, Color::Reset);
        }
    }

    fn compose_progress(&mut self, s: &Session, x: usize, w: usize) {
        let report = s.deck.progress_report();
        let mut y = MAP_ROW;
        self.front.put_str(x, y, "Progress", GOLD, Color::Reset);
        y += 2;
        let bar_w = w.saturating_sub(2).min(30);
        let filled = bar_w * report.asked_count / report.total.max(1);
        let bar = format!("[{}{}]", "█".repeat(filled), "·".repeat(bar_w - filled));
        self.front.put_str(x, y, &bar, GOLD, Color::Reset);
        y += 1;
        self.front.put_str(
            x, y,
            &format!("{} of {} asked · level {}", report.asked_count, report.total, report.level),
            TEXT, Color::Reset,
        );
        y += 1;
        let policy = match s.deck.policy() {
            DeckPolicy::Progressive => format!("stops after {}", s.deck.total()),
            DeckPolicy::Loop => format!("starts over after {}", s.deck.total()),
        };
        self.front.put_str(x, y, &policy, DIM, Color::Reset);
        y += 2;
        for category in s.deck.categories() {
            let records = s.deck.questions_in_category(category);
            let asked = records.iter().filter(|r| s.deck.is_asked(r.id)).count();
            let line = format!("{:<24} {}/{}", category, asked, records.len());
            let clipped: String = line.chars().take(w).collect();
            let fg = if asked == records.len() { GOLD } else { TEXT };
            self.front.put_str(x, y, &clipped, fg, Color::Reset);
            y += 1;
        }
    }

    fn compose_status(&mut self, scene: &SceneView) {
        let Some(row) = self.term_h.checked_sub(1) else { return };
        match scene.session.notice(scene.now) {
            Some(text) => {
                let bg = Color::Rgb { r: 200, g: 180, b: 50 };
                self.front.fill_row(row, 0, self.term_w, bg);
                self.front.put_str(0, row, &format!(" ◈ {text} "), Color::Black, bg);
            }
            None => {
                let hint = " F1 help  Tab progress  F2 reset questions  Esc quit";
                self.front.put_str(0, row, hint, DIM, Color::Reset);
            }
        }
    }
}

impl Renderable for Renderer {
    fn render(&mut self, scene: &SceneView) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.on_resize(tw, th);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.front.clear();
        self.compose(scene);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.term_w = width as usize;
        self.term_h = height as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }
}

// ── Helpers ──

fn hold_color(color: HoldColor) -> Color {
    match color {
        HoldColor::Red => RED,
        HoldColor::Blue => BLUE,
    }
}

/// Some climber is gripping one of this actor's anchors.
fn is_gripped(actor: &Actor) -> bool {
    AnchorName::ALL.iter().any(|&n| actor.is_highlighted(n))
}

/// Keep the local climbers in view: the lower of them when both are local.
fn follow_target(s: &Session) -> i32 {
    PlayerId::BOTH
        .iter()
        .filter(|&&p| s.controls(p))
        .map(|&p| grid_key(0.0, s.actor(p).position().y).1)
        .min()
        .unwrap_or(0)
}

/// Greedy word wrap to `width` columns. Words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
