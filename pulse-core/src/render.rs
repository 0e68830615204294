//! Drawing of the network onto an abstract 2D surface.

use glam::Vec2;

use crate::color::Color;
use crate::config::NetworkConfig;
use crate::connection::Connection;
use crate::node::Node;
use crate::pulse::Pulse;

/// Inner color of the glow drawn around a recently pulsed node.
pub const NODE_GLOW: Color = Color::rgba(56, 189, 248, 204);
/// Width of connection lines in pixels.
pub const CONNECTION_WIDTH: f32 = 1.0;

/// Minimal immediate-mode 2D drawing target.
///
/// Coordinates are surface pixels with the origin at the top-left corner.
pub trait Surface {
    fn clear(&mut self);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Filled disc whose color runs linearly from `inner` at the center
    /// to `outer` at `radius`.
    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);

    fn circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Draws one frame: connections, then pulses, then nodes.
///
/// Pulses and node glows go beneath node cores, so each node's glow is
/// painted right before its own core.
pub fn render_network(
    surface: &mut impl Surface,
    nodes: &[Node],
    connections: &[Connection],
    pulses: &[Pulse],
    cfg: &NetworkConfig,
) {
    surface.clear();

    for c in connections {
        let (Some(a), Some(b)) = (nodes.get(c.from), nodes.get(c.to)) else {
            continue;
        };
        surface.line(a.pos, b.pos, CONNECTION_WIDTH, cfg.base_color);
    }

    for p in pulses {
        let Some(node) = nodes.get(p.node) else {
            continue;
        };
        let inner = p.color.with_alpha(p.alpha());
        surface.radial_glow(node.pos, p.radius(node.radius), inner, p.color.with_alpha(0.0));
    }

    for n in nodes {
        let glow_size = n.glow * cfg.glow_intensity;
        if glow_size > 0.0 {
            surface.radial_glow(
                n.pos,
                n.radius + glow_size,
                NODE_GLOW,
                NODE_GLOW.with_alpha(0.0),
            );
        }

        let core = Color::WHITE.with_alpha(0.7 + n.shimmer() * 0.3);
        surface.circle(n.pos, n.radius, core);
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawCmd {
    Clear,
    Line { from: Vec2, to: Vec2, color: Color },
    Glow { center: Vec2, radius: f32, inner: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Surface that records every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub cmds: Vec<DrawCmd>,
}

#[cfg(test)]
impl Surface for Recorder {
    fn clear(&mut self) {
        self.cmds.push(DrawCmd::Clear);
    }

    fn line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Color) {
        self.cmds.push(DrawCmd::Line { from, to, color });
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Color, _outer: Color) {
        self.cmds.push(DrawCmd::Glow {
            center,
            radius,
            inner,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }
}
