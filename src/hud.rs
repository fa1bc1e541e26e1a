// Foreground layer: sector cards, the question grid, the revealed question,
// the sign-off page and the terminal transcript, plus card hit-testing.

use crate::canvas::{text_width, Canvas, Rgb, GLYPH_HEIGHT};
use crate::content::SectorId;
use crate::geometry::Vec2;
use crate::session::{CardState, Session};
use crate::terminal::{LineKind, Terminal};
use crate::view::{Theme, ViewRequest};

const SECTOR_CARD: (i64, i64) = (140, 120);
const SECTOR_GAP: i64 = 12;
const SECTOR_TOP: i64 = 180;
const QUESTION_CARD: (i64, i64) = (300, 90);
const QUESTION_GAP: i64 = 20;
const QUESTION_TOP: i64 = 120;
const QUESTION_COLUMNS: usize = 2;
const TERMINAL_HEIGHT: i64 = 110;
const LINE_HEIGHT: i64 = GLYPH_HEIGHT + 3;

const CYAN: Rgb = Rgb(0, 255, 255);
const MAGENTA: Rgb = Rgb(255, 0, 255);
const DENIED: Rgb = Rgb(255, 40, 40);
const AMBER: Rgb = Rgb(255, 191, 0);
const TERMINAL_GREEN: Rgb = Rgb(0, 255, 128);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x as f64
            && p.x < (self.x + self.w) as f64
            && p.y >= self.y as f64
            && p.y < (self.y + self.h) as f64
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x + self.w / 2) as f64, (self.y + self.h / 2) as f64)
    }
}

pub fn sector_card_rect(index: usize, surface_width: usize) -> Rect {
    let count = SectorId::ALL.len() as i64;
    let row = count * SECTOR_CARD.0 + (count - 1) * SECTOR_GAP;
    let left = (surface_width as i64 - row) / 2;
    Rect {
        x: left + index as i64 * (SECTOR_CARD.0 + SECTOR_GAP),
        y: SECTOR_TOP,
        w: SECTOR_CARD.0,
        h: SECTOR_CARD.1,
    }
}

pub fn question_card_rect(ordinal: usize, surface_width: usize) -> Rect {
    let cols = QUESTION_COLUMNS as i64;
    let row = cols * QUESTION_CARD.0 + (cols - 1) * QUESTION_GAP;
    let left = (surface_width as i64 - row) / 2;
    let (col, line) = ((ordinal % QUESTION_COLUMNS) as i64, (ordinal / QUESTION_COLUMNS) as i64);
    Rect {
        x: left + col * (QUESTION_CARD.0 + QUESTION_GAP),
        y: QUESTION_TOP + line * (QUESTION_CARD.1 + QUESTION_GAP),
        w: QUESTION_CARD.0,
        h: QUESTION_CARD.1,
    }
}

pub fn sector_card_at(pos: Vec2, surface_width: usize) -> Option<SectorId> {
    SectorId::ALL
        .iter()
        .enumerate()
        .find(|(i, _)| sector_card_rect(*i, surface_width).contains(pos))
        .map(|(_, &id)| id)
}

pub fn question_card_at(pos: Vec2, count: usize, surface_width: usize) -> Option<usize> {
    (0..count).find(|&ordinal| question_card_rect(ordinal, surface_width).contains(pos))
}

/// Greedy word wrap to at most `max_chars` per line.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Everything the HUD reads for one frame.
pub struct HudFrame<'a> {
    pub view: ViewRequest,
    pub session: &'a Session,
    pub terminal: &'a Terminal,
    pub theme: Theme,
    pub star_map_visible: bool,
    pub frame: u64,
}

pub struct Hud {
    canvas: Canvas,
}

impl Hud {
    pub fn new(width: usize, height: usize) -> Self {
        Hud {
            canvas: Canvas::new(width, height),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.canvas.resize(width, height);
    }

    pub fn render(&mut self, f: &HudFrame<'_>) {
        self.canvas.clear();
        let accent = if f.theme.quantum { MAGENTA } else { CYAN };

        if f.theme.matrix {
            let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
            for y in (0..h).step_by(4) {
                self.canvas.fill_rect(0, y, w, 1, TERMINAL_GREEN, 0.08);
            }
        }

        if !f.star_map_visible {
            match f.view {
                ViewRequest::Overview => self.draw_overview(f.session, accent),
                ViewRequest::SectorActive => self.draw_grid(f.session, accent, f.frame),
                ViewRequest::Revealed => self.draw_revealed(f.session, accent),
                ViewRequest::SessionEnd => self.draw_session_end(accent, f.frame),
            }
        }
        self.draw_hints(f.star_map_visible, accent);
        self.draw_terminal(f.terminal);
    }

    fn centered_text(&mut self, y: i64, text: &str, color: Rgb, alpha: f64, scale: i64) {
        let x = (self.canvas.width() as i64 - text_width(text, scale)) / 2;
        self.canvas.draw_text(x, y, text, color, alpha, scale);
    }

    fn draw_hints(&mut self, star_map_visible: bool, accent: Rgb) {
        let hint = if star_map_visible {
            "[M] CLOSE MAP  [+/-] ZOOM  [0] RESET  ARROWS PAN  CLICK A STAR TO WARP"
        } else {
            "[M] STAR MAP  [1-5] SECTORS  [ESC] OVERVIEW  [E] END SESSION"
        };
        self.canvas.draw_text(10, 10, hint, accent, 0.7, 1);
    }

    fn draw_overview(&mut self, session: &Session, accent: Rgb) {
        self.centered_text(80, "SELECT A SECTOR", accent, 0.95, 3);
        let width = self.canvas.width();

        for (i, sector) in session.catalog().sectors().iter().enumerate() {
            let r = sector_card_rect(i, width);
            self.canvas.fill_rect(r.x, r.y, r.w, r.h, sector.color, 0.15);
            self.canvas.stroke_rect(r.x, r.y, r.w, r.h, sector.color, 0.9);
            self.canvas.draw_text(r.x + 8, r.y + 8, &format!("[{}]", i + 1), accent, 0.8, 1);

            for (n, line) in wrap(sector.label, ((r.w - 16) / 8) as usize).iter().enumerate() {
                self.canvas
                    .draw_text(r.x + 8, r.y + 30 + n as i64 * 14, line, Rgb::WHITE, 0.95, 2);
            }

            let total = sector.questions.len();
            let status = format!("{}/{} AVAILABLE", session.available_in(sector.id), total);
            self.canvas.draw_text(r.x + 8, r.y + r.h - 16, &status, sector.color, 0.9, 1);
        }
    }

    fn draw_grid(&mut self, session: &Session, accent: Rgb, frame: u64) {
        let Some(sector) = session.current_sector() else {
            return;
        };
        let info = session.catalog().sector(sector);
        self.centered_text(70, info.label, info.color, 0.95, 3);
        let width = self.canvas.width();

        for card in session.cards() {
            let r = question_card_rect(card.id.ordinal, width);
            let title = format!("QUERY {}", card.id.ordinal + 1);

            match card.state {
                CardState::Hidden => {
                    self.canvas.fill_rect(r.x, r.y, r.w, r.h, accent, 0.08);
                    self.canvas.stroke_rect(r.x, r.y, r.w, r.h, accent, 0.8);
                    self.canvas.draw_text(r.x + 10, r.y + 10, &title, accent, 0.9, 2);
                    self.canvas
                        .draw_text(r.x + 10, r.y + 50, "QUESTION HIDDEN - CLICK TO REVEAL", Rgb::WHITE, 0.7, 1);
                }
                CardState::Revealed => {
                    self.canvas.fill_rect(r.x, r.y, r.w, r.h, MAGENTA, 0.2);
                    self.canvas.stroke_rect(r.x, r.y, r.w, r.h, MAGENTA, 1.0);
                    self.canvas.draw_text(r.x + 10, r.y + 10, &title, MAGENTA, 1.0, 2);
                    let text = session.catalog().question(card.id).unwrap_or_default();
                    for (n, line) in wrap(text, ((r.w - 20) / 4) as usize).iter().take(6).enumerate() {
                        self.canvas
                            .draw_text(r.x + 10, r.y + 30 + n as i64 * LINE_HEIGHT, line, Rgb::WHITE, 0.95, 1);
                    }
                }
                CardState::Locking => {
                    let flicker = ((frame as f64) * 0.4).sin() * 0.3 + 0.6;
                    self.canvas.fill_rect(r.x, r.y, r.w, r.h, DENIED, 0.1);
                    self.canvas.stroke_rect(r.x - 4, r.y - 4, r.w + 8, r.h + 8, DENIED, flicker);
                    self.canvas.draw_text(r.x + 10, r.y + 10, &title, DENIED, 0.9, 2);
                    self.canvas.draw_text(r.x + 10, r.y + 50, "LOCKING...", DENIED, flicker, 2);
                }
                CardState::Blocked => {
                    self.canvas.fill_rect(r.x, r.y, r.w, r.h, Rgb(40, 0, 0), 0.6);
                    self.canvas.stroke_rect(r.x, r.y, r.w, r.h, DENIED, 0.7);
                    self.canvas.draw_text(r.x + 10, r.y + 10, &title, DENIED, 0.6, 2);
                    let c = r.center();
                    self.canvas.stroke_circle(c.add(Vec2::new(0.0, -6.0)), 10.0, DENIED, 0.8);
                    self.canvas.fill_rect(c.x as i64 - 9, c.y as i64 - 4, 18, 14, DENIED, 0.8);
                    let label = "ACCESS DENIED";
                    let x = r.x + (r.w - text_width(label, 1)) / 2;
                    self.canvas.draw_text(x, r.y + r.h - 14, label, DENIED, 0.9, 1);
                }
            }
        }
    }

    fn draw_revealed(&mut self, session: &Session, accent: Rgb) {
        self.centered_text(90, "YOUR QUESTION", accent, 0.95, 3);
        let text = session.revealed_text().unwrap_or_default().to_string();
        let max_chars = ((self.canvas.width() as i64 - 80) / 8).max(10) as usize;
        for (n, line) in wrap(&text, max_chars).iter().enumerate() {
            self.centered_text(160 + n as i64 * 18, line, Rgb::WHITE, 1.0, 2);
        }
        self.centered_text(
            360,
            "[BACKSPACE] BACK TO SECTOR  [ESC] OVERVIEW  [E] END SESSION",
            accent,
            0.7,
            1,
        );
    }

    fn draw_session_end(&mut self, accent: Rgb, frame: u64) {
        let glow = ((frame as f64) * 0.05).sin() * 0.2 + 0.8;
        self.centered_text(200, "SESSION COMPLETE", accent, glow, 4);
        self.centered_text(260, "THANK YOU FOR PLAYING", Rgb::WHITE, 0.9, 2);
        self.centered_text(300, "RETURNING TO OVERVIEW...", AMBER, 0.7, 1);
    }

    fn draw_terminal(&mut self, terminal: &Terminal) {
        let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
        let top = h - TERMINAL_HEIGHT;
        self.canvas.fill_rect(0, top, w, TERMINAL_HEIGHT, Rgb(0, 10, 6), 0.75);
        self.canvas.fill_rect(0, top, w, 1, TERMINAL_GREEN, 0.6);

        let visible = ((TERMINAL_HEIGHT - 8) / LINE_HEIGHT) as usize;
        let lines = terminal.output();
        let start = lines.len().saturating_sub(visible);
        for (n, line) in lines[start..].iter().enumerate() {
            let color = match line.kind {
                LineKind::Normal => TERMINAL_GREEN,
                LineKind::Success => CYAN,
                LineKind::Warning => AMBER,
                LineKind::Error => DENIED,
            };
            self.canvas
                .draw_text(8, top + 6 + n as i64 * LINE_HEIGHT, &line.text, color, 0.9, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("if life had cheat codes what code would you secretly use", 16);
        assert!(lines.iter().all(|l| l.len() <= 16));
        assert_eq!(lines.join(" "), "if life had cheat codes what code would you secretly use");
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn sector_cards_hit_test_by_position() {
        for (i, &id) in SectorId::ALL.iter().enumerate() {
            let center = sector_card_rect(i, 800).center();
            assert_eq!(sector_card_at(center, 800), Some(id));
        }
        assert_eq!(sector_card_at(Vec2::new(5.0, 5.0), 800), None);
    }

    #[test]
    fn question_cards_do_not_overlap() {
        let rects: Vec<_> = (0..4).map(|i| question_card_rect(i, 800)).collect();
        for (i, r) in rects.iter().enumerate() {
            assert_eq!(question_card_at(r.center(), 4, 800), Some(i));
        }
        assert_eq!(question_card_at(rects[3].center(), 3, 800), None);
    }
}
