// The kiosk as one owned value: input events go in, a composited frame buffer
// comes out. Runs headless; the window in `main` only feeds it.

use log::{debug, info, trace, warn};

use crate::canvas::Rgb;
use crate::config::Config;
use crate::content::{Catalog, SectorId};
use crate::effects::{Effect, Effects, LoggedEffects, Tone};
use crate::error::SessionError;
use crate::geometry::Vec2;
use crate::hud::{question_card_at, sector_card_at, sector_card_rect, Hud, HudFrame};
use crate::neural::NeuralNetwork;
use crate::particles::ParticleField;
use crate::scheduler::{Engine, FrameScheduler};
use crate::session::{Phase, Session, Signal};
use crate::starmap::{StarMap, WarpRequest, PAN_STEP};
use crate::terminal::{Console, Terminal};
use crate::view::{Theme, ViewRequest, ViewState, ViewToggle};

const BACKGROUND: Rgb = Rgb(5, 5, 16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    Escape,
    /// Top-row digit, `1` through `5` map to sectors.
    Digit(u8),
    ToggleStarMap,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Left,
    Right,
    Up,
    Down,
    EndSession,
    Backspace,
}

/// What a pointer currently rests on, for hover tones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hover {
    Sector(SectorId),
    Question(usize),
    Star(SectorId),
}

pub struct App {
    session: Session,
    terminal: Terminal,
    particles: ParticleField,
    neural: NeuralNetwork,
    starmap: StarMap,
    hud: Hud,
    scheduler: FrameScheduler,
    view: ViewState,
    theme: Theme,
    effects: LoggedEffects,
    star_map_visible: bool,
    hover: Option<Hover>,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl App {
    pub fn new(config: &Config, catalog: Catalog) -> Self {
        let (width, height) = (config.width.max(1), config.height.max(1));
        let mut rng = config.rng();

        let particles = ParticleField::new(&mut rng, config.particles, width, height);
        let neural = NeuralNetwork::new(&mut rng, config.nodes, width, height);
        let starmap = StarMap::new(&mut rng, catalog.sectors(), width, height);
        info!(
            "kiosk ready: {}x{}, {} particles, {} nodes, {} neural edges",
            width,
            height,
            config.particles,
            config.nodes,
            neural.edges().len()
        );

        App {
            session: Session::new(catalog, rng),
            terminal: Terminal::new(),
            particles,
            neural,
            starmap,
            hud: Hud::new(width, height),
            scheduler: FrameScheduler::new(config.fps),
            view: ViewState::default(),
            theme: Theme::default(),
            effects: LoggedEffects::default(),
            star_map_visible: false,
            hover: None,
            buffer: vec![BACKGROUND.to_u32(); width * height],
            width,
            height,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn neural(&self) -> &NeuralNetwork {
        &self.neural
    }

    pub fn starmap(&self) -> &StarMap {
        &self.starmap
    }

    pub fn visible_view(&self) -> ViewRequest {
        self.view.visible()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn effects(&self) -> &LoggedEffects {
        &self.effects
    }

    pub fn star_map_visible(&self) -> bool {
        self.star_map_visible
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }

    /// A question card was clicked. The sector comes from the card itself, so
    /// a stale card from another sector is rejected by the session.
    pub fn card_clicked(&mut self, sector: SectorId, ordinal: usize, pos: Vec2) {
        self.effects.trigger(&Effect::Burst { at: pos });
        match self.session.select_question(sector, ordinal) {
            Ok(id) => debug!("card click revealed {}", id),
            Err(SessionError::RejectedLocked(id)) => debug!("card click on locked {}", id),
            Err(err) => warn!("card click ignored: {}", err),
        }
        self.dispatch_signals();
    }

    pub fn sector_card_clicked(&mut self, sector: SectorId, pos: Vec2) {
        self.effects.trigger(&Effect::Burst { at: pos });
        if let Err(err) = self.session.enter_sector(sector) {
            warn!("sector card {} ignored: {}", sector, err);
        }
        self.dispatch_signals();
    }

    pub fn star_map_clicked(&mut self, pos: Vec2) {
        let Some(WarpRequest(sector)) = self.starmap.click(pos) else {
            return;
        };
        self.terminal.warp_notice(sector);
        self.star_map_visible = false;
        self.session.return_to_overview();
        if let Err(err) = self.session.enter_sector(sector) {
            warn!("warp to {} failed: {}", sector, err);
        }
        self.dispatch_signals();
    }

    pub fn terminal_line_submitted(&mut self, line: &str) {
        let mut console = Console {
            session: &mut self.session,
            theme: &mut self.theme,
        };
        self.terminal.submit(line, &mut console);
        self.dispatch_signals();
    }

    pub fn key_pressed(&mut self, key: KeyPress) {
        debug!("key {:?}", key);
        match key {
            KeyPress::ToggleStarMap => {
                self.star_map_visible = !self.star_map_visible;
                info!("star map {}", if self.star_map_visible { "shown" } else { "hidden" });
            }
            KeyPress::Escape if self.star_map_visible => self.star_map_visible = false,
            KeyPress::Escape => {
                if matches!(self.session.phase(), Phase::SectorActive(_) | Phase::QuestionRevealed(_)) {
                    self.session.return_to_overview();
                }
            }
            KeyPress::Digit(n) => {
                let sector = (n as usize).checked_sub(1).and_then(SectorId::from_index);
                if let (Some(sector), Phase::Overview) = (sector, self.session.phase()) {
                    let at = sector_card_rect(sector.index(), self.width).center();
                    self.sector_card_clicked(sector, at);
                }
            }
            KeyPress::ZoomIn | KeyPress::ZoomOut | KeyPress::ZoomReset if !self.star_map_visible => {}
            KeyPress::Left | KeyPress::Right | KeyPress::Up | KeyPress::Down if !self.star_map_visible => {}
            KeyPress::ZoomIn => self.starmap.view_mut().zoom_in(),
            KeyPress::ZoomOut => self.starmap.view_mut().zoom_out(),
            KeyPress::ZoomReset => self.starmap.view_mut().reset(),
            KeyPress::Left => self.starmap.view_mut().pan(PAN_STEP, 0.0),
            KeyPress::Right => self.starmap.view_mut().pan(-PAN_STEP, 0.0),
            KeyPress::Up => self.starmap.view_mut().pan(0.0, PAN_STEP),
            KeyPress::Down => self.starmap.view_mut().pan(0.0, -PAN_STEP),
            KeyPress::EndSession => {
                if self.session.phase() != Phase::SessionEnded {
                    self.session.end_session();
                }
            }
            KeyPress::Backspace => {
                if let Err(err) = self.session.return_to_sector() {
                    debug!("backspace ignored: {}", err);
                }
            }
        }
        self.dispatch_signals();
    }

    /// Route a click to whatever is under the pointer on the visible page.
    pub fn pointer_clicked(&mut self, pos: Vec2) {
        self.effects.trigger(&Effect::Ripple { at: pos });
        if self.star_map_visible {
            self.star_map_clicked(pos);
            return;
        }

        match self.view.visible() {
            ViewRequest::Overview => {
                if let Some(sector) = sector_card_at(pos, self.width) {
                    self.sector_card_clicked(sector, pos);
                }
            }
            ViewRequest::SectorActive => {
                let hit = question_card_at(pos, self.session.cards().len(), self.width);
                if let (Some(sector), Some(ordinal)) = (self.session.current_sector(), hit) {
                    self.card_clicked(sector, ordinal, pos);
                }
            }
            ViewRequest::Revealed | ViewRequest::SessionEnd => {}
        }
    }

    /// Fires a hover tone when the pointer enters a new target. Blocked and
    /// locking cards are not targets.
    pub fn pointer_moved(&mut self, pos: Vec2) {
        let target = if self.star_map_visible {
            self.starmap.hit_test(pos).map(Hover::Star)
        } else {
            match self.view.visible() {
                ViewRequest::Overview => sector_card_at(pos, self.width).map(Hover::Sector),
                ViewRequest::SectorActive => question_card_at(pos, self.session.cards().len(), self.width)
                    .filter(|&ordinal| self.session.cards().get(ordinal).is_some_and(|c| !c.is_inert()))
                    .map(Hover::Question),
                ViewRequest::Revealed | ViewRequest::SessionEnd => None,
            }
        };
        if target.is_some() && target != self.hover {
            self.effects.trigger(&Effect::Tone(Tone::Hover));
        }
        self.hover = target;
    }

    /// Resize every layer in place. Entity stores are kept as they are.
    pub fn surface_resized(&mut self, width: usize, height: usize) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        info!("surface resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.particles.resize(width, height);
        self.neural.resize(width, height);
        self.starmap.resize(width, height);
        self.hud.resize(width, height);
        self.buffer = vec![BACKGROUND.to_u32(); width * height];
    }

    /// One full frame: engines, deferred tasks, signals, then compositing.
    pub fn frame(&mut self) -> &[u32] {
        {
            let mut engines: Vec<&mut dyn Engine> = Vec::with_capacity(3);
            engines.push(&mut self.neural);
            engines.push(&mut self.particles);
            if self.star_map_visible {
                engines.push(&mut self.starmap);
            }
            self.scheduler.tick(&mut engines);
        }

        let now = self.scheduler.now_ms();
        self.session.advance(now);
        let mut console = Console {
            session: &mut self.session,
            theme: &mut self.theme,
        };
        self.terminal.advance(now, &mut console);
        self.dispatch_signals();

        self.hud.render(&HudFrame {
            view: self.view.visible(),
            session: &self.session,
            terminal: &self.terminal,
            theme: self.theme,
            star_map_visible: self.star_map_visible,
            frame: self.scheduler.frame(),
        });

        self.buffer.fill(BACKGROUND.to_u32());
        self.neural.canvas().composite_onto(&mut self.buffer, self.width);
        self.particles.canvas().composite_onto(&mut self.buffer, self.width);
        if self.star_map_visible {
            self.starmap.canvas().composite_onto(&mut self.buffer, self.width);
        }
        self.hud.canvas().composite_onto(&mut self.buffer, self.width);
        trace!("frame {} composited at {} ms", self.scheduler.frame(), now);

        &self.buffer
    }

    fn dispatch_signals(&mut self) {
        for signal in self.session.take_signals() {
            match signal {
                Signal::View(request) => self.view.apply(request),
                Signal::Effect(effect) => self.effects.trigger(&effect),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::question_card_rect;

    fn app() -> App {
        let config = Config {
            seed: Some(11),
            fps: 10,
            particles: 20,
            nodes: 10,
            ..Config::default()
        };
        App::new(&config, Catalog::builtin())
    }

    #[test]
    fn clicking_cards_walks_the_pages() {
        let mut app = app();
        let anime = sector_card_rect(SectorId::Anime.index(), 800).center();
        app.pointer_clicked(anime);
        assert_eq!(app.visible_view(), ViewRequest::SectorActive);

        app.pointer_clicked(question_card_rect(1, 800).center());
        assert_eq!(app.session().revealed().map(|id| id.ordinal), Some(1));
        assert_eq!(app.visible_view(), ViewRequest::SectorActive);

        while app.now_ms() < 1600 {
            app.frame();
        }
        assert_eq!(app.visible_view(), ViewRequest::Revealed);
    }

    #[test]
    fn card_click_for_another_sector_changes_nothing() {
        let mut app = app();
        app.key_pressed(KeyPress::Digit(1));
        let at = question_card_rect(0, 800).center();

        app.card_clicked(SectorId::Gaming, 0, at);
        assert_eq!(app.session().locked_total(), 0);
        assert_eq!(app.session().revealed(), None);

        app.card_clicked(SectorId::Anime, 2, at);
        assert_eq!(app.session().revealed().map(|id| (id.sector, id.ordinal)), Some((SectorId::Anime, 2)));
    }

    #[test]
    fn digits_only_work_from_the_overview() {
        let mut app = app();
        app.key_pressed(KeyPress::Digit(3));
        assert_eq!(app.session().current_sector(), Some(SectorId::Gaming));
        app.key_pressed(KeyPress::Digit(1));
        assert_eq!(app.session().current_sector(), Some(SectorId::Gaming));
        app.key_pressed(KeyPress::Digit(9));
        app.key_pressed(KeyPress::Escape);
        assert_eq!(app.session().phase(), Phase::Overview);
        app.key_pressed(KeyPress::Digit(0));
        assert_eq!(app.session().phase(), Phase::Overview);
    }

    #[test]
    fn zoom_keys_need_the_star_map() {
        let mut app = app();
        app.key_pressed(KeyPress::ZoomIn);
        assert_eq!(app.starmap().view().zoom, 1.0);
        app.key_pressed(KeyPress::ToggleStarMap);
        app.key_pressed(KeyPress::ZoomIn);
        assert!((app.starmap().view().zoom - 1.2).abs() < 1e-9);
        app.key_pressed(KeyPress::Escape);
        assert!(!app.star_map_visible());
    }

    #[test]
    fn resize_reallocates_the_buffer() {
        let mut app = app();
        app.frame();
        app.surface_resized(320, 240);
        assert_eq!(app.size(), (320, 240));
        assert_eq!(app.frame().len(), 320 * 240);
        app.surface_resized(0, 10);
        assert_eq!(app.size(), (320, 240));
    }
}
