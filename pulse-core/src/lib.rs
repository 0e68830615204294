//! Core logic for the portal's two decorative widgets.
//!
//! Neural network background:
//! - [`node`]: nodes and their random placement.
//! - [`connection`]: degree-capped proximity graph over the nodes.
//! - [`pulse`]: transient glows anchored to nodes.
//! - [`phases`]: per-frame update phases.
//! - [`sim`]: the simulation state tying the above together.
//! - [`render`]: drawing onto an abstract [`render::Surface`].
//! - [`canvas`]: lifecycle and frame driver behind a [`canvas::FrameHost`].
//!
//! Memory stream:
//! - [`source`]: text items and where batches come from.
//! - [`feed`]: the typewriter reveal loop.
//!
//! Shared:
//! - [`schedule`]: cancellation tokens and the virtual-time timer queue.
//! - [`config`]: widget parameters and the YAML config file.
//! - [`color`]: RGBA colors parsed from CSS-like strings.
//! - [`error`]: error types.
//! - [`types`]: shared type aliases and IDs.

pub mod canvas;
pub mod color;
pub mod config;
pub mod connection;
pub mod error;
pub mod feed;
pub mod node;
pub mod phases;
pub mod pulse;
pub mod render;
pub mod schedule;
pub mod sim;
pub mod source;
pub mod types;
