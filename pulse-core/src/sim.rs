use glam::Vec2;
use rand::Rng;

use crate::config::NetworkConfig;
use crate::connection::{Connection, build_connections};
use crate::node::{Node, generate_nodes};
use crate::phases;
use crate::pulse::Pulse;
use crate::render::{Surface, render_network};

/// State of the neural network background.
///
/// Nodes and connections belong to a size generation: [`NetworkSim::resize`]
/// throws both away and rebuilds them for the new surface. Pulses are
/// cleared with them, since their anchors refer to the old nodes.
///
/// ### Fields
/// - `cfg` - Simulation parameters; changes take effect on the next resize.
/// - `size` - Surface size in pixels for the current generation.
/// - `nodes` - Exactly `cfg.node_count` nodes once sized.
/// - `connections` - Degree-capped proximity graph over `nodes`.
/// - `pulses` - Active pulses, in trigger order.
#[derive(Debug)]
pub struct NetworkSim {
    pub cfg: NetworkConfig,
    pub size: Vec2,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub pulses: Vec<Pulse>,
    last_frame: Option<f64>,
    generation: u64,
}

impl NetworkSim {
    /// Creates an empty, zero-sized simulation. Call [`NetworkSim::resize`]
    /// before the first frame.
    pub fn new(cfg: NetworkConfig) -> Self {
        Self {
            cfg,
            size: Vec2::ZERO,
            nodes: Vec::new(),
            connections: Vec::new(),
            pulses: Vec::new(),
            last_frame: None,
            generation: 0,
        }
    }

    /// Number of rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Adopts a new surface size and regenerates nodes and connections.
    pub fn resize(&mut self, size: Vec2, rng: &mut impl Rng) {
        self.size = size.max(Vec2::ZERO);
        self.rebuild(rng);
    }

    /// Regenerates nodes and connections for the current size.
    pub fn rebuild(&mut self, rng: &mut impl Rng) {
        self.nodes = generate_nodes(self.cfg.node_count, self.size, self.cfg.node_radius, rng);
        self.rebuild_connections();
        self.pulses.clear();
        self.generation += 1;

        log::info!(
            "network rebuilt for {}x{}: {} nodes, {} connections",
            self.size.x,
            self.size.y,
            self.nodes.len(),
            self.connections.len()
        );
    }

    /// Recomputes connections from the current node positions.
    pub fn rebuild_connections(&mut self) {
        self.connections = build_connections(
            &self.nodes,
            self.cfg.max_connections,
            self.cfg.connection_distance,
        );
    }

    /// Delta for a frame at `timestamp` (ms), in baseline units.
    ///
    /// The first frame after construction applies no time at all.
    pub fn frame_delta(&mut self, timestamp: f64) -> f32 {
        let dt = match self.last_frame {
            Some(prev) => phases::frame_delta(prev, timestamp),
            None => 0.0,
        };
        self.last_frame = Some(timestamp);
        dt
    }

    /// Advances the simulation to `timestamp` (ms). Returns the applied delta.
    pub fn advance(&mut self, timestamp: f64, rng: &mut impl Rng) -> f32 {
        let dt = self.frame_delta(timestamp);
        self.step(dt, rng);
        dt
    }

    /// Runs every phase with an explicit delta, in baseline units.
    pub fn step(&mut self, dt: f32, rng: &mut impl Rng) {
        phases::motion_phase(&mut self.nodes, self.size, dt);
        phases::glow_phase(&mut self.nodes, dt);
        phases::trigger_phase(&mut self.nodes, &mut self.pulses, &self.cfg, dt, rng);
        phases::pulse_phase(&mut self.pulses, self.cfg.pulse_speed, dt);
    }

    /// Fires a pulse right away, regardless of the trigger rate.
    pub fn trigger_pulse(&mut self, rng: &mut impl Rng) -> Option<usize> {
        phases::trigger_pulse(&mut self.nodes, &mut self.pulses, &self.cfg, rng)
    }

    pub fn render(&self, surface: &mut impl Surface) {
        render_network(
            surface,
            &self.nodes,
            &self.connections,
            &self.pulses,
            &self.cfg,
        );
    }
}
