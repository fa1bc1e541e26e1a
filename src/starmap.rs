// Star-map sector selector: one star per sector on a ring, a field of
// twinkling background points, and a zoom/pan view transform.
//
// Clicks are hit-tested in world space (after undoing the view transform)
// and turned into a `WarpRequest`; the map never touches session state.

use std::f64::consts::PI;

use log::{debug, info};
use rand::Rng;

use crate::canvas::{text_width, Canvas, Rgb};
use crate::content::{Sector, SectorId};
use crate::geometry::{distance, orbit_position, ring_angle, Vec2};
use crate::scheduler::Engine;

pub const RING_CENTER: Vec2 = Vec2 { x: 400.0, y: 300.0 };
pub const RING_RADIUS: f64 = 200.0;
pub const STAR_RADIUS: f64 = 15.0;
pub const PICK_RADIUS: f64 = 30.0;
pub const TWINKLE_COUNT: usize = 200;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.2;
pub const PAN_STEP: f64 = 20.0;
const TWINKLE_FIELD: (f64, f64) = (800.0, 600.0);
const CONSTELLATION: Rgb = Rgb(0, 255, 255);

#[derive(Clone, Debug)]
pub struct Star {
    pub sector: SectorId,
    pub label: String,
    pub anchor: Vec2,
    pub radius: f64,
    pub color: Rgb,
    pub pulse_phase: f64,
    pub orbit_radius: f64,
    pub orbit_speed: f64,
    pub orbit_phase: f64,
}

impl Star {
    pub fn satellite(&self, frame: u64) -> Vec2 {
        orbit_position(self.anchor, self.orbit_radius, frame as f64 * self.orbit_speed + self.orbit_phase)
    }

    pub fn pulse(&self, frame: u64) -> f64 {
        (frame as f64 * 0.03 + self.pulse_phase).sin() * 0.3 + 0.7
    }
}

#[derive(Clone, Debug)]
pub struct TwinklePoint {
    pub pos: Vec2,
    pub radius: f64,
    pub opacity: f64,
    pub speed: f64,
}

impl TwinklePoint {
    pub fn alpha(&self, frame: u64) -> f64 {
        self.opacity * ((frame as f64 * self.speed).sin() * 0.5 + 0.5)
    }
}

/// Uniform zoom about the surface centre followed by a pan offset:
/// `screen = (world - c + offset) * zoom + c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub offset: Vec2,
    pub center: Vec2,
}

impl ViewTransform {
    pub fn new(center: Vec2) -> Self {
        ViewTransform {
            zoom: 1.0,
            offset: Vec2::ZERO,
            center,
        }
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        world.sub(self.center).add(self.offset).scale(self.zoom).add(self.center)
    }

    pub fn invert(&self, screen: Vec2) -> Vec2 {
        screen.sub(self.center).scale(1.0 / self.zoom).add(self.center).sub(self.offset)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset = self.offset.add(Vec2::new(dx, dy));
    }

    /// Zoom and pan always reset together.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.offset = Vec2::ZERO;
    }
}

/// A star-map click asking for a sector transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarpRequest(pub SectorId);

pub struct StarMap {
    stars: Vec<Star>,
    twinkles: Vec<TwinklePoint>,
    view: ViewTransform,
    canvas: Canvas,
    frame: u64,
}

impl StarMap {
    pub fn new<R: Rng>(rng: &mut R, sectors: &[Sector], width: usize, height: usize) -> Self {
        let stars = sectors
            .iter()
            .enumerate()
            .map(|(i, sector)| Star {
                sector: sector.id,
                label: sector.id.as_str().to_ascii_uppercase(),
                anchor: orbit_position(RING_CENTER, RING_RADIUS, ring_angle(i, sectors.len())),
                radius: STAR_RADIUS,
                color: sector.color,
                pulse_phase: rng.gen_range(0.0..2.0 * PI),
                orbit_radius: rng.gen_range(5.0..15.0),
                orbit_speed: rng.gen_range(0.02..0.05),
                orbit_phase: rng.gen_range(0.0..2.0 * PI),
            })
            .collect();

        let twinkles = (0..TWINKLE_COUNT)
            .map(|_| TwinklePoint {
                pos: Vec2::new(rng.gen_range(0.0..TWINKLE_FIELD.0), rng.gen_range(0.0..TWINKLE_FIELD.1)),
                radius: rng.gen_range(0.0..2.0),
                opacity: rng.gen_range(0.3..1.0),
                speed: rng.gen_range(0.01..0.03),
            })
            .collect();

        StarMap {
            stars,
            twinkles,
            view: ViewTransform::new(surface_center(width, height)),
            canvas: Canvas::new(width, height),
            frame: 0,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn twinkles(&self) -> &[TwinklePoint] {
        &self.twinkles
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Nearest star whose anchor lies within the pick radius of the pointer,
    /// measured in world space.
    pub fn hit_test(&self, screen: Vec2) -> Option<SectorId> {
        let world = self.view.invert(screen);
        self.stars
            .iter()
            .map(|star| (star, distance(world, star.anchor)))
            .filter(|(_, d)| *d < PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(star, _)| star.sector)
    }

    pub fn click(&self, screen: Vec2) -> Option<WarpRequest> {
        let hit = self.hit_test(screen);
        match hit {
            Some(sector) => info!("star map hit {} at ({:.0}, {:.0})", sector, screen.x, screen.y),
            None => debug!("star map miss at ({:.0}, {:.0})", screen.x, screen.y),
        }
        hit.map(WarpRequest)
    }

    fn render(&mut self) {
        let frame = self.frame;
        let view = self.view;
        let zoom = view.zoom;
        self.canvas.clear();
        let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
        self.canvas.fill_rect(0, 0, w, h, Rgb(4, 6, 20), 0.85);

        for point in &self.twinkles {
            self.canvas
                .fill_circle(view.apply(point.pos), point.radius * zoom, Rgb::WHITE, point.alpha(frame));
        }

        for i in 0..self.stars.len() {
            let a = view.apply(self.stars[i].anchor);
            let b = view.apply(self.stars[(i + 1) % self.stars.len()].anchor);
            self.canvas.dashed_line(a, b, 5.0 * zoom, 10.0 * zoom, CONSTELLATION, 0.2);
        }

        for star in &self.stars {
            let pulse = star.pulse(frame);
            let anchor = view.apply(star.anchor);
            self.canvas.stroke_circle(anchor, star.orbit_radius * zoom, star.color, 0.3);
            self.canvas.fill_circle(view.apply(star.satellite(frame)), 3.0 * zoom, star.color, 1.0);
            self.canvas.radial_glow(anchor, star.radius * 2.0 * pulse * zoom, star.color, 0.25, 0.0);
            self.canvas.radial_glow(anchor, star.radius * pulse * zoom, star.color, 1.0, 0.2);
            self.canvas.fill_circle(anchor, star.radius * 0.5 * pulse * zoom, star.color, 1.0);

            let label_y = anchor.y + (star.radius + 20.0) * zoom;
            let label_x = anchor.x - text_width(&star.label, 1) as f64 / 2.0;
            self.canvas
                .draw_text(label_x as i64, label_y as i64, &star.label, Rgb::WHITE, 0.8, 1);
        }
    }
}

fn surface_center(width: usize, height: usize) -> Vec2 {
    Vec2::new(width as f64 / 2.0, height as f64 / 2.0)
}

impl Engine for StarMap {
    fn name(&self) -> &'static str {
        "starmap"
    }

    fn tick(&mut self, frame: u64) {
        self.frame = frame;
        self.render();
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.canvas.resize(width, height);
        self.view.center = surface_center(width, height);
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}
