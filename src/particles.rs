// Ambient particle field: a fixed batch of drifting dots that wrap around
// the surface edges, linked by faint lines when close together.

use rand::Rng;

use crate::canvas::{Canvas, Rgb};
use crate::geometry::{distance, wrap_axis, Vec2};
use crate::scheduler::Engine;

pub const PARTICLE_COUNT: usize = 100;
pub const LINK_DISTANCE: f64 = 100.0;
const MAX_SPEED: f64 = 0.25;
const LINK_ALPHA: f64 = 0.2;

pub const PALETTE: [Rgb; 5] = [
    Rgb::from_hex(0x8a2be2),
    Rgb::from_hex(0x00ffff),
    Rgb::from_hex(0xff00ff),
    Rgb::from_hex(0xffbf00),
    Rgb::from_hex(0xffffff),
];

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub opacity: f64,
    pub color: Rgb,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    canvas: Canvas,
}

impl ParticleField {
    pub fn new<R: Rng>(rng: &mut R, count: usize, width: usize, height: usize) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                pos: Vec2::new(rng.gen_range(0.0..width.max(1) as f64), rng.gen_range(0.0..height.max(1) as f64)),
                vel: Vec2::new(rng.gen_range(-MAX_SPEED..MAX_SPEED), rng.gen_range(-MAX_SPEED..MAX_SPEED)),
                radius: rng.gen_range(1.0..4.0),
                opacity: rng.gen_range(0.2..0.7),
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
            })
            .collect();

        ParticleField {
            particles,
            canvas: Canvas::new(width, height),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Integrate one frame; positions wrap at every edge.
    pub fn step(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        for p in &mut self.particles {
            p.pos = p.pos.add(p.vel);
            p.pos.x = wrap_axis(p.pos.x, w);
            p.pos.y = wrap_axis(p.pos.y, h);
        }
    }

    /// Pairs closer than the link distance, with the stroke alpha for each.
    /// All-pairs scan; the batch is small and fixed.
    pub fn links(&self) -> Vec<(usize, usize, f64)> {
        let mut links = Vec::new();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let d = distance(self.particles[i].pos, self.particles[j].pos);
                if d < LINK_DISTANCE {
                    links.push((i, j, link_alpha(d)));
                }
            }
        }
        links
    }

    fn render(&mut self) {
        self.canvas.clear();
        for (i, j, alpha) in self.links() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            self.canvas.line(a.pos, b.pos, a.color, alpha);
        }
        for p in &self.particles {
            self.canvas.fill_circle(p.pos, p.radius, p.color, p.opacity);
        }
    }
}

pub fn link_alpha(d: f64) -> f64 {
    (1.0 - d / LINK_DISTANCE).max(0.0) * LINK_ALPHA
}

impl Engine for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn tick(&mut self, _frame: u64) {
        self.step();
        self.render();
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.canvas.resize(width, height);
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(count: usize) -> ParticleField {
        ParticleField::new(&mut StdRng::seed_from_u64(42), count, 200, 100)
    }

    #[test]
    fn batch_is_fixed_size_and_in_bounds() {
        let f = field(PARTICLE_COUNT);
        assert_eq!(f.particles().len(), PARTICLE_COUNT);
        for p in f.particles() {
            assert!(p.pos.x >= 0.0 && p.pos.x < 200.0);
            assert!(p.pos.y >= 0.0 && p.pos.y < 100.0);
            assert!(p.vel.x.abs() <= MAX_SPEED && p.vel.y.abs() <= MAX_SPEED);
            assert!((1.0..4.0).contains(&p.radius));
            assert!((0.2..0.7).contains(&p.opacity));
        }
    }

    #[test]
    fn particles_wrap_instead_of_bouncing() {
        let mut f = field(1);
        f.particles[0].pos = Vec2::new(199.9, 50.0);
        f.particles[0].vel = Vec2::new(0.2, 0.0);
        f.step();
        assert_eq!(f.particles()[0].pos.x, 0.0);
        assert_eq!(f.particles()[0].vel.x, 0.2);

        f.particles[0].pos = Vec2::new(10.0, 0.1);
        f.particles[0].vel = Vec2::new(0.0, -0.2);
        f.step();
        assert_eq!(f.particles()[0].pos.y, 100.0);
    }

    #[test]
    fn closer_pairs_get_stronger_links() {
        let mut f = field(3);
        f.particles[0].pos = Vec2::new(10.0, 10.0);
        f.particles[1].pos = Vec2::new(20.0, 10.0);
        f.particles[2].pos = Vec2::new(150.0, 90.0);

        let links = f.links();
        assert_eq!(links.len(), 1);
        let (i, j, alpha) = links[0];
        assert_eq!((i, j), (0, 1));
        assert!((alpha - 0.18).abs() < 1e-9);
        assert!(link_alpha(5.0) > link_alpha(50.0));
        assert_eq!(link_alpha(LINK_DISTANCE), 0.0);
    }

    #[test]
    fn resize_keeps_positions() {
        let mut f = field(10);
        let before: Vec<_> = f.particles().iter().map(|p| p.pos).collect();
        f.resize(50, 50);
        let after: Vec<_> = f.particles().iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
        assert_eq!(f.canvas().width(), 50);
        f.tick(0);
    }
}
