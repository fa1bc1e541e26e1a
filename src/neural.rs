// Decorative "neural network" backdrop.
//
// Nodes live in a dense `Vec` and edges refer to them by index, so the
// graph never holds references into itself. The graph is built once from a
// random proximity test with stochastic thinning; afterwards only node
// positions change. Nodes bounce off the surface walls.

use std::f64::consts::PI;

use rand::Rng;

use crate::canvas::{Canvas, Rgb};
use crate::geometry::{bounce_axis, distance, Vec2};
use crate::scheduler::Engine;

pub const NODE_COUNT: usize = 50;
pub const EDGE_THRESHOLD: f64 = 200.0;
/// Chance that a pair closer than the threshold becomes an edge.
pub const EDGE_PROBABILITY: f64 = 0.3;
/// Parametric speed of the data pulse travelling along every edge.
pub const PULSE_SPEED: f64 = 0.01;
const MAX_SPEED: f64 = 0.25;

pub const PALETTE: [Rgb; 5] = [
    Rgb(0, 255, 255),
    Rgb(255, 0, 255),
    Rgb(138, 43, 226),
    Rgb(0, 255, 0),
    Rgb(255, 255, 0),
];

#[derive(Clone, Debug)]
pub struct Node {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub phase: f64,
    pub pulse_speed: f64,
    pub color: Rgb,
    pub neighbors: Vec<usize>,
}

impl Node {
    pub fn pulse(&self, frame: u64) -> f64 {
        (frame as f64 * self.pulse_speed + self.phase).sin() * 0.3 + 0.7
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub strength: f64,
    pub phase: f64,
    pub pulse_speed: f64,
}

impl Edge {
    pub fn brightness(&self, frame: u64) -> f64 {
        (frame as f64 * self.pulse_speed + self.phase).sin() * 0.5 + 0.5
    }
}

/// Position along every edge of the travelling pulse, in `[0, 1)`.
pub fn pulse_t(frame: u64) -> f64 {
    (frame as f64 * PULSE_SPEED) % 1.0
}

pub struct NeuralNetwork {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    canvas: Canvas,
    frame: u64,
}

impl NeuralNetwork {
    pub fn new<R: Rng>(rng: &mut R, node_count: usize, width: usize, height: usize) -> Self {
        let nodes = (0..node_count)
            .map(|_| Node {
                pos: Vec2::new(rng.gen_range(0.0..width.max(1) as f64), rng.gen_range(0.0..height.max(1) as f64)),
                vel: Vec2::new(rng.gen_range(-MAX_SPEED..MAX_SPEED), rng.gen_range(-MAX_SPEED..MAX_SPEED)),
                radius: rng.gen_range(2.0..5.0),
                phase: rng.gen_range(0.0..2.0 * PI),
                pulse_speed: rng.gen_range(0.02..0.05),
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
                neighbors: Vec::new(),
            })
            .collect();

        let mut network = NeuralNetwork {
            nodes,
            edges: Vec::new(),
            canvas: Canvas::new(width, height),
            frame: 0,
        };
        network.connect(rng);
        network
    }

    fn connect<R: Rng>(&mut self, rng: &mut R) {
        for i in 0..self.nodes.len() {
            for j in (i + 1)..self.nodes.len() {
                let d = distance(self.nodes[i].pos, self.nodes[j].pos);
                if d < EDGE_THRESHOLD && rng.gen_bool(EDGE_PROBABILITY) {
                    self.nodes[i].neighbors.push(j);
                    self.nodes[j].neighbors.push(i);
                    self.edges.push(Edge {
                        from: i,
                        to: j,
                        strength: rng.gen_range(0.5..1.0),
                        phase: rng.gen_range(0.0..2.0 * PI),
                        pulse_speed: rng.gen_range(0.01..0.03),
                    });
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn incident_edges(&self, node: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.from == node || e.to == node)
    }

    pub fn step(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        for node in &mut self.nodes {
            let moved = node.pos.add(node.vel);
            let (x, vx) = bounce_axis(moved.x, node.vel.x, w);
            let (y, vy) = bounce_axis(moved.y, node.vel.y, h);
            node.pos = Vec2::new(x, y);
            node.vel = Vec2::new(vx, vy);
        }
    }

    fn render(&mut self) {
        let frame = self.frame;
        self.canvas.clear();

        let t = pulse_t(frame);
        for edge in &self.edges {
            let (a, b) = (&self.nodes[edge.from], &self.nodes[edge.to]);
            let level = edge.strength * edge.brightness(frame);
            self.canvas
                .gradient_line(a.pos, b.pos, a.color, b.color, [level * 0.6, level, level * 0.6]);
            self.canvas.fill_circle(a.pos.lerp(b.pos, t), 2.0, Rgb::WHITE, 0.8);
        }

        for node in &self.nodes {
            let pulse = node.pulse(frame);
            self.canvas.fill_circle(node.pos, node.radius * 2.0, node.color, 0.3 * pulse);
            self.canvas.fill_circle(node.pos, node.radius * pulse, node.color, 0.8);
            self.canvas.fill_circle(node.pos, node.radius * 0.3 * pulse, Rgb::WHITE, 0.9);
        }
    }
}

impl Engine for NeuralNetwork {
    fn name(&self) -> &'static str {
        "neural"
    }

    fn tick(&mut self, frame: u64) {
        self.frame = frame;
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

    fn network(seed: u64) -> NeuralNetwork {
        NeuralNetwork::new(&mut StdRng::seed_from_u64(seed), NODE_COUNT, 800, 600)
    }

    #[test]
    fn adjacency_is_symmetric_and_within_threshold() {
        for seed in 0..10 {
            let net = network(seed);
            for edge in net.edges() {
                assert!(net.nodes()[edge.from].neighbors.contains(&edge.to));
                assert!(net.nodes()[edge.to].neighbors.contains(&edge.from));
                let d = distance(net.nodes()[edge.from].pos, net.nodes()[edge.to].pos);
                assert!(d < EDGE_THRESHOLD);
                assert!(edge.from < edge.to);
            }
            let degree_sum: usize = net.nodes().iter().map(|n| n.neighbors.len()).sum();
            assert_eq!(degree_sum, net.edges().len() * 2);
        }
    }

    #[test]
    fn same_seed_same_graph() {
        let a = network(99);
        let b = network(99);
        let pairs = |n: &NeuralNetwork| n.edges().iter().map(|e| (e.from, e.to)).collect::<Vec<_>>();
        assert_eq!(pairs(&a), pairs(&b));
    }

    #[test]
    fn thinning_keeps_graph_sparse() {
        let net = network(5);
        let mut proximal = 0;
        for i in 0..net.nodes().len() {
            for j in (i + 1)..net.nodes().len() {
                if distance(net.nodes()[i].pos, net.nodes()[j].pos) < EDGE_THRESHOLD {
                    proximal += 1;
                }
            }
        }
        assert!(net.edges().len() < proximal);
    }

    #[test]
    fn nodes_bounce_and_stay_inside() {
        let mut net = network(1);
        net.nodes[0].pos = Vec2::new(799.9, 10.0);
        net.nodes[0].vel = Vec2::new(0.25, -0.1);
        net.step();
        assert_eq!(net.nodes()[0].pos.x, 800.0);
        assert_eq!(net.nodes()[0].vel.x, -0.25);

        for _ in 0..5_000 {
            net.step();
        }
        for node in net.nodes() {
            assert!((0.0..=800.0).contains(&node.pos.x));
            assert!((0.0..=600.0).contains(&node.pos.y));
        }
    }

    #[test]
    fn shrinking_surface_keeps_absolute_positions() {
        let mut net = network(2);
        let before: Vec<_> = net.nodes().iter().map(|n| n.pos).collect();
        net.resize(100, 100);
        let after: Vec<_> = net.nodes().iter().map(|n| n.pos).collect();
        assert_eq!(before, after);
        net.tick(1);
        for node in net.nodes() {
            assert!(node.pos.x <= 100.0 && node.pos.y <= 100.0);
        }
    }

    #[test]
    fn pulse_travels_parametrically() {
        assert_eq!(pulse_t(0), 0.0);
        assert!((pulse_t(50) - 0.5).abs() < 1e-9);
        assert!(pulse_t(150) < 1.0);
        let net = network(3);
        if let Some(edge) = net.edges().first() {
            assert_eq!(net.incident_edges(edge.from).filter(|e| e.to == edge.to).count(), 1);
        }
    }
}
