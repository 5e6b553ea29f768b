use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget},
    Frame,
};

use crate::cave::game::CaveGame;
use crate::cave::geometry::Vec2;
use crate::cave::hud;
use crate::cave::world::World;
use crate::core::menu::centered;

/// Light level outside the lantern's reach while it burns.
pub const DARK_LIGHT: f32 = 0.05;
/// Uniform light level with the lantern off: a dim wash over the whole cave.
pub const LANTERN_OFF_LIGHT: f32 = 0.3;
/// Full brightness is kept within this distance of the player.
pub const INNER_LIGHT_RADIUS: f32 = 20.0;
/// Crystals glow on their own and never fall below this level.
pub const CRYSTAL_GLOW_FLOOR: f32 = 0.5;
const PLAYER_FLOOR: f32 = 0.35;
const GRID_STEP: f32 = 40.0;
const CRYSTAL_GLOW_RADIUS: f32 = 28.0;
const TOP_BAND: f32 = 60.0;

/// How lit a point of the plane is, from 0 (black) to 1 (fully lit).
pub fn light_at(world: &World, p: Vec2) -> f32 {
    if !world.lantern.is_on() {
        return LANTERN_OFF_LIGHT;
    }
    let radius = world.lantern.light_radius();
    let d = p.distance(world.player.pos);
    if d <= INNER_LIGHT_RADIUS {
        1.0
    } else if d >= radius {
        DARK_LIGHT
    } else {
        let t = (d - INNER_LIGHT_RADIUS) / (radius - INNER_LIGHT_RADIUS);
        1.0 - t * (1.0 - DARK_LIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb(f32, f32, f32);

impl Rgb {
    fn mix(self, other: Rgb, a: f32) -> Rgb {
        let a = a.clamp(0.0, 1.0);
        Rgb(
            self.0 + (other.0 - self.0) * a,
            self.1 + (other.1 - self.1) * a,
            self.2 + (other.2 - self.2) * a,
        )
    }

    fn scale(self, k: f32) -> Rgb {
        Rgb(self.0 * k, self.1 * k, self.2 * k)
    }

    fn add(self, other: Rgb, a: f32) -> Rgb {
        Rgb(self.0 + other.0 * a, self.1 + other.1 * a, self.2 + other.2 * a)
    }

    fn color(self) -> Color {
        let c = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Color::Rgb(c(self.0), c(self.1), c(self.2))
    }
}

const FLOOR_A: Rgb = Rgb(11.0, 18.0, 32.0);
const FLOOR_B: Rgb = Rgb(7.0, 16.0, 24.0);
const WHITE: Rgb = Rgb(255.0, 255.0, 255.0);
const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
const PIT: Rgb = Rgb(3.0, 16.0, 24.0);
const OBSTACLE: Rgb = Rgb(75.0, 82.0, 88.0);
const CRYSTAL: Rgb = Rgb(143.0, 231.0, 255.0);
const CRYSTAL_CORE: Rgb = Rgb(232.0, 255.0, 255.0);
const CRYSTAL_GLOW: Rgb = Rgb(120.0, 220.0, 255.0);
const BODY: Rgb = Rgb(195.0, 201.0, 209.0);
const HEAD: Rgb = Rgb(154.0, 162.0, 170.0);
const LANTERN_GLOW: Rgb = Rgb(180.0, 220.0, 255.0);

/// One terminal cell worth of the cave, before lighting.
struct Sample {
    glyph: char,
    fg: Rgb,
    bg: Rgb,
    floor: f32,
}

/// Whether `target` falls in the half-open cell centred on `p`, so each point
/// belongs to exactly one cell.
fn cell_holds(p: Vec2, target: Vec2, cw: f32, ch: f32) -> bool {
    target.x >= p.x - cw / 2.0
        && target.x < p.x + cw / 2.0
        && target.y >= p.y - ch / 2.0
        && target.y < p.y + ch / 2.0
}

/// Draws the cave plane scaled to fill the given area.
pub struct CaveView<'a> {
    world: &'a World,
}

impl<'a> CaveView<'a> {
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    fn sample(&self, p: Vec2, cw: f32, ch: f32) -> Sample {
        let world = self.world;
        let scene = &world.scene;
        let t = (p.x / scene.width + p.y / scene.height) / 2.0;
        let mut s = Sample { glyph: ' ', fg: WHITE, bg: FLOOR_A.mix(FLOOR_B, t), floor: 0.0 };

        let crosses = |v: f32, half: f32| ((v - half) / GRID_STEP).floor() != ((v + half) / GRID_STEP).floor();
        if crosses(p.x, cw / 2.0) || crosses(p.y, ch / 2.0) {
            s.glyph = '·';
            s.fg = s.bg.mix(WHITE, 0.25);
        }

        for pit in &scene.pits {
            if pit.contains_strict(p) {
                s.glyph = ' ';
                s.bg = PIT;
            } else if p.x > pit.x - 12.0
                && p.x < pit.x + pit.w + 12.0
                && p.y > pit.y - 12.0
                && p.y < pit.y + pit.h + 12.0
            {
                s.bg = s.bg.mix(BLACK, 0.6);
            }
        }

        for ob in &scene.obstacles {
            if ob.contains_strict(p) {
                s.glyph = '▓';
                s.bg = OBSTACLE;
                s.fg = OBSTACLE.mix(WHITE, 0.1);
            }
        }

        for c in world.crystals.iter().filter(|c| !c.picked) {
            let d = p.distance(c.pos);
            let dx = (p.x - c.pos.x).abs();
            let dy = (p.y - c.pos.y).abs();
            if d < CRYSTAL_GLOW_RADIUS {
                let a = 0.95 * (1.0 - (d - 2.0).max(0.0) / (CRYSTAL_GLOW_RADIUS - 2.0));
                s.bg = s.bg.mix(CRYSTAL_GLOW.scale(0.5), a);
                s.floor = CRYSTAL_GLOW_FLOOR;
            }
            let in_cell = cell_holds(p, c.pos, cw, ch);
            if in_cell || dx / 10.0 + dy / 12.0 <= 1.0 {
                s.glyph = '◆';
                s.fg = if d < 4.0 || in_cell { CRYSTAL_CORE } else { CRYSTAL };
                s.floor = 1.0;
            }
        }

        let player = &world.player;
        let (sx, sy) = (p.x - player.pos.x, p.y - (player.pos.y + 20.0));
        if (sx / (player.w * 0.8)).powi(2) + (sy / (player.h * 0.5)).powi(2) <= 1.0 {
            s.bg = s.bg.mix(BLACK, 0.35);
        }
        let body = player.bounds();
        let head_top = player.pos.y - player.h - 6.0;
        let in_head = (p.x - player.pos.x).abs() <= player.w / 4.0
            && p.y >= head_top
            && p.y <= head_top + player.h / 2.0;
        if in_head {
            s.glyph = ' ';
            s.bg = HEAD;
            s.floor = s.floor.max(PLAYER_FLOOR);
        }
        if p.x >= body.x && p.x <= body.x + body.w && p.y >= body.y && p.y <= body.y + body.h {
            s.glyph = ' ';
            s.bg = BODY;
            s.floor = s.floor.max(PLAYER_FLOOR);
        }
        if cell_holds(p, player.pos, cw, ch) {
            s.glyph = '@';
            s.fg = Rgb(26.0, 31.0, 36.0);
            s.bg = BODY;
            s.floor = s.floor.max(PLAYER_FLOOR);
        }
        s
    }
}

impl Widget for CaveView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let scene = &self.world.scene;
        let cw = scene.width / f32::from(area.width);
        let ch = scene.height / f32::from(area.height);
        let lantern_on = self.world.lantern.is_on();
        let radius = self.world.lantern.light_radius();

        for row in 0..area.height {
            for col in 0..area.width {
                let p = Vec2::new((f32::from(col) + 0.5) * cw, (f32::from(row) + 0.5) * ch);
                let s = self.sample(p, cw, ch);
                let light = light_at(self.world, p).max(s.floor);
                let mut fg = s.fg.scale(light);
                let mut bg = s.bg.scale(light);

                if lantern_on {
                    let d = p.distance(self.world.player.pos);
                    if d < radius {
                        bg = bg.add(LANTERN_GLOW, 0.35 * (1.0 - d / radius) * 0.4);
                    }
                }
                if p.y < TOP_BAND {
                    bg = bg.mix(WHITE, 0.03);
                    fg = fg.mix(WHITE, 0.03);
                }

                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(s.glyph).set_fg(fg.color()).set_bg(bg.color());
                }
            }
        }
    }
}

pub struct CaveRenderer;

impl CaveRenderer {
    pub fn render(frame: &mut Frame, game: &CaveGame) {
        let [hud_area, play_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(frame.area());

        Self::render_hud(frame, hud_area, game.world());

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" CAVERNA ")
            .style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(play_area);
        frame.render_widget(block, play_area);
        frame.render_widget(CaveView::new(game.world()), inner);

        if let Some(text) = game.message() {
            let width = (text.chars().count() as u16).saturating_add(6);
            let area = centered(inner, width, 3);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
        }

        if game.in_menu() {
            game.menu().render(frame, inner);
        }
    }

    fn render_hud(frame: &mut Frame, area: Rect, world: &World) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [score, timer, lantern] = Layout::horizontal([
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(50),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("◆ ", Style::default().fg(Color::Cyan)),
                Span::raw(hud::score_line(world)),
            ])),
            score,
        );
        frame.render_widget(
            Paragraph::new(hud::format_time(world.elapsed)).alignment(Alignment::Center),
            timer,
        );

        let color = if world.lantern.is_on() { Color::Yellow } else { Color::DarkGray };
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(color))
                .ratio(f64::from(world.lantern.fraction().clamp(0.0, 1.0)))
                .label(format!("{} · {}", hud::battery_line(world), hud::lantern_status(world))),
            lantern,
        );
    }
}
