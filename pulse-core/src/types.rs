/// Identifier for a node in a [`crate::sim::NetworkSim`].
///
/// This is an index into `NetworkSim::nodes`, and is only meaningful within
/// the size generation that produced it. A resize invalidates every index.
pub type NodeId = usize;

/// Handle for a frame requested from a [`crate::canvas::FrameHost`].
pub type FrameId = u64;

/// Handle for a resize listener registered with a [`crate::canvas::FrameHost`].
pub type ListenerId = u64;

/// Milliseconds on the feed's virtual clock.
pub type Millis = u64;

/// Lifecycle shared by both widgets. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Running,
    Stopped,
}
