use crate::color::Color;
use crate::types::NodeId;

/// Distance in pixels a pulse's glow spreads beyond its node at `progress == 1`.
pub const PULSE_SPREAD: f32 = 50.0;

/// Transient expanding glow anchored to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    pub node: NodeId,
    /// Grows from 0; the pulse is dropped once this reaches 1.
    pub progress: f32,
    pub color: Color,
    pub intensity: f32,
}

impl Pulse {
    pub fn new(node: NodeId, color: Color, intensity: f32) -> Self {
        Self {
            node,
            progress: 0.0,
            color,
            intensity,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Outer radius of the glow around a node of radius `node_radius`.
    pub fn radius(&self, node_radius: f32) -> f32 {
        node_radius + self.progress * PULSE_SPREAD
    }

    /// Center alpha, fading linearly to zero as the pulse completes.
    pub fn alpha(&self) -> f32 {
        ((1.0 - self.progress) * self.intensity).max(0.0)
    }
}
