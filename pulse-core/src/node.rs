use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Distance from each surface edge inside which nodes are spawned.
pub const SPAWN_PADDING: f32 = 50.0;
/// Extra radius added on top of the configured base radius, at most.
pub const RADIUS_JITTER: f32 = 2.0;
/// Full width of the per-axis velocity range, centered on zero.
pub const VELOCITY_SPREAD: f32 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub pos: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    /// Event glow in `[0, 1]`, set to 1 by a pulse and decayed every frame.
    pub glow: f32,
    /// Phase of the idle brightness oscillation, in radians.
    pub pulse_phase: f32,
}

impl Node {
    pub fn at_rest(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            velocity: Vec2::ZERO,
            glow: 0.0,
            pulse_phase: 0.0,
        }
    }

    /// Idle brightness in `[0, 1]` derived from the oscillation phase.
    pub fn shimmer(&self) -> f32 {
        0.5 + 0.5 * self.pulse_phase.sin()
    }
}

/// Places `count` nodes uniformly inside `size` minus [`SPAWN_PADDING`].
///
/// A surface narrower than twice the padding collapses the span on that
/// axis to the padding origin rather than going negative.
pub fn generate_nodes(count: usize, size: Vec2, base_radius: f32, rng: &mut impl Rng) -> Vec<Node> {
    let span = (size - Vec2::splat(SPAWN_PADDING * 2.0)).max(Vec2::ZERO);
    let half_spread = VELOCITY_SPREAD * 0.5;

    (0..count)
        .map(|_| {
            let x = SPAWN_PADDING + rng.random::<f32>() * span.x;
            let y = SPAWN_PADDING + rng.random::<f32>() * span.y;
            Node {
                pos: Vec2::new(x, y),
                radius: base_radius + rng.random::<f32>() * RADIUS_JITTER,
                velocity: Vec2::new(
                    rng.random_range(-half_spread..half_spread),
                    rng.random_range(-half_spread..half_spread),
                ),
                glow: 0.0,
                pulse_phase: rng.random::<f32>() * TAU,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn generates_exact_count_inside_padding() {
        let mut rng = StdRng::seed_from_u64(7);
        let size = Vec2::new(800.0, 600.0);

        for count in [0, 1, 25, 200] {
            let nodes = generate_nodes(count, size, 2.0, &mut rng);
            assert_eq!(nodes.len(), count);
            for n in &nodes {
                assert!(n.pos.x >= SPAWN_PADDING && n.pos.x <= size.x - SPAWN_PADDING);
                assert!(n.pos.y >= SPAWN_PADDING && n.pos.y <= size.y - SPAWN_PADDING);
                assert!(n.radius >= 2.0 && n.radius < 2.0 + RADIUS_JITTER);
                assert!(n.velocity.x.abs() <= VELOCITY_SPREAD * 0.5);
                assert!(n.velocity.y.abs() <= VELOCITY_SPREAD * 0.5);
                assert_eq!(n.glow, 0.0);
                assert!((0.0..TAU).contains(&n.pulse_phase));
            }
        }
    }

    #[test]
    fn tiny_surface_collapses_to_padding_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let nodes = generate_nodes(5, Vec2::new(60.0, 30.0), 2.0, &mut rng);
        assert!(nodes.iter().all(|n| n.pos == Vec2::splat(SPAWN_PADDING)));
    }

    #[test]
    fn shimmer_follows_phase() {
        let mut n = Node::at_rest(Vec2::ZERO, 1.0);
        assert!((n.shimmer() - 0.5).abs() < 1e-6);
        n.pulse_phase = std::f32::consts::FRAC_PI_2;
        assert!((n.shimmer() - 1.0).abs() < 1e-6);
    }
}
