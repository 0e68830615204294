use crate::node::Node;
use crate::types::NodeId;

/// Undirected edge between two nodes, derived from their positions at build time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f32,
    /// `1 - distance / max_distance`, in `(0, 1]`.
    pub strength: f32,
}

/// Builds a degree-capped proximity graph over `nodes`.
///
/// Every unordered pair closer than `max_distance` is a candidate.
/// Candidates are visited shortest first (ties in `(from, to)` order), and
/// an edge is kept while both endpoints still have fewer than
/// `max_per_node` edges. The result depends only on the node positions and
/// the two parameters.
///
/// This is a full rebuild; nothing is patched incrementally, so edges keep
/// their endpoints' indices but not their distances as nodes move.
pub fn build_connections(nodes: &[Node], max_per_node: usize, max_distance: f32) -> Vec<Connection> {
    let mut candidates = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for (j, b) in nodes.iter().enumerate().skip(i + 1) {
            let distance = a.pos.distance(b.pos);
            if distance < max_distance {
                candidates.push(Connection {
                    from: i,
                    to: j,
                    distance,
                    strength: 1.0 - distance / max_distance,
                });
            }
        }
    }

    // Stable sort keeps (from, to) order among equal distances.
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut degree = vec![0usize; nodes.len()];
    let mut kept = Vec::with_capacity(
        candidates
            .len()
            .min(nodes.len().saturating_mul(max_per_node) / 2),
    );
    for c in candidates {
        if degree[c.from] < max_per_node && degree[c.to] < max_per_node {
            degree[c.from] += 1;
            degree[c.to] += 1;
            kept.push(c);
        }
    }
    kept
}
