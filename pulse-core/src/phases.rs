//! Per-frame simulation phases for the neural network background.
//!
//! One call to [`crate::sim::NetworkSim::advance`] runs, in order:
//! 1. [`motion_phase`]: integrate positions and bounce off the inset walls.
//! 2. [`glow_phase`]: decay event glow and advance the idle oscillation.
//! 3. [`trigger_phase`]: maybe fire a new pulse at a random node.
//! 4. [`pulse_phase`]: advance every pulse and drop finished ones.
//!
//! Every phase takes `dt`, the frame delta in baseline-frame units
//! (see [`frame_delta`]).

use glam::Vec2;
use rand::Rng;

use crate::config::NetworkConfig;
use crate::node::Node;
use crate::pulse::Pulse;
use crate::types::NodeId;

/// Length of one baseline frame (60 Hz) in milliseconds.
pub const BASELINE_FRAME_MS: f64 = 16.67;
/// Largest delta a single frame may apply, in baseline units.
pub const MAX_FRAME_DELTA: f32 = 2.0;
/// Distance from each edge at which nodes bounce.
pub const WALL_INSET: f32 = 20.0;
/// Glow lost per baseline frame.
pub const GLOW_DECAY: f32 = 0.1;
/// Oscillation phase gained per baseline frame, in radians.
pub const PHASE_RATE: f32 = 0.01;

/// Converts the gap between two frame timestamps into baseline units.
///
/// The result is clamped to `[0, MAX_FRAME_DELTA]`, so a tab waking up
/// after a long suspend moves nodes at most two frames' worth, and a clock
/// that runs backwards applies nothing.
pub fn frame_delta(prev_ms: f64, now_ms: f64) -> f32 {
    let units = (now_ms - prev_ms) / BASELINE_FRAME_MS;
    if units.is_nan() {
        return 0.0;
    }
    (units as f32).clamp(0.0, MAX_FRAME_DELTA)
}

/// Integrates node positions and reflects them off the walls.
///
/// A node that ends up outside `[WALL_INSET, size - WALL_INSET]` on an axis
/// has that velocity component negated and its position clamped back onto
/// the wall. The clamp places the node exactly on the wall, so the flipped
/// velocity carries it inward and the same crossing never flips twice.
///
/// ### Parameters
/// - `nodes` - Nodes to move in place.
/// - `size` - Surface size in pixels.
/// - `dt` - Frame delta in baseline units.
pub fn motion_phase(nodes: &mut [Node], size: Vec2, dt: f32) {
    let lo = Vec2::splat(WALL_INSET);
    let hi = size - Vec2::splat(WALL_INSET);

    for n in nodes.iter_mut() {
        n.pos += n.velocity * dt;

        if n.pos.x < lo.x || n.pos.x > hi.x {
            n.velocity.x = -n.velocity.x;
            // min-then-max rather than clamp: hi < lo on surfaces under 40px.
            n.pos.x = n.pos.x.min(hi.x).max(lo.x);
        }
        if n.pos.y < lo.y || n.pos.y > hi.y {
            n.velocity.y = -n.velocity.y;
            n.pos.y = n.pos.y.min(hi.y).max(lo.y);
        }
    }
}

/// Decays event glow toward zero and advances the idle oscillation.
pub fn glow_phase(nodes: &mut [Node], dt: f32) {
    for n in nodes.iter_mut() {
        n.glow = (n.glow - GLOW_DECAY * dt).max(0.0);
        n.pulse_phase += PHASE_RATE * dt;
    }
}

/// Fires a pulse with probability `cfg.pulse_rate * dt`.
///
/// Returns the node the pulse was anchored to, if one fired.
pub fn trigger_phase(
    nodes: &mut [Node],
    pulses: &mut Vec<Pulse>,
    cfg: &NetworkConfig,
    dt: f32,
    rng: &mut impl Rng,
) -> Option<NodeId> {
    if rng.random::<f32>() < cfg.pulse_rate * dt {
        trigger_pulse(nodes, pulses, cfg, rng)
    } else {
        None
    }
}

/// Fires a pulse at a uniformly random node with a uniformly random palette color.
///
/// The chosen node's glow jumps to 1. Does nothing when there are no nodes.
/// An empty palette falls back to `cfg.base_color`.
pub fn trigger_pulse(
    nodes: &mut [Node],
    pulses: &mut Vec<Pulse>,
    cfg: &NetworkConfig,
    rng: &mut impl Rng,
) -> Option<NodeId> {
    if nodes.is_empty() {
        return None;
    }
    let node = rng.random_range(0..nodes.len());
    let color = if cfg.pulse_colors.is_empty() {
        cfg.base_color
    } else {
        cfg.pulse_colors[rng.random_range(0..cfg.pulse_colors.len())]
    };

    nodes[node].glow = 1.0;
    pulses.push(Pulse::new(node, color, cfg.pulse_intensity));
    log::debug!("pulse fired at node {node} ({color})");
    Some(node)
}

/// Advances every pulse by `speed * dt` and removes the finished ones.
pub fn pulse_phase(pulses: &mut Vec<Pulse>, speed: f32, dt: f32) {
    for p in pulses.iter_mut() {
        p.progress += speed * dt;
    }
    pulses.retain(|p| !p.is_finished());
}
