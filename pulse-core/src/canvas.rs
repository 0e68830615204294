//! Lifecycle and frame driver for the neural network background.
//!
//! [`NeuralCanvas`] wraps a [`NetworkSim`] with the
//! `Uninitialized -> Running -> Stopped` state machine and drives it from a
//! host's refresh-aligned frame callbacks.

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::NetworkConfig;
use crate::render::Surface;
use crate::schedule::CancelToken;
use crate::sim::NetworkSim;
use crate::types::{FrameId, Lifecycle, ListenerId};

/// What the canvas needs from the page (or window) hosting it.
pub trait FrameHost {
    /// Current display size of the drawing surface, in pixels.
    fn display_size(&self) -> Vec2;

    /// Asks for one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameId;

    /// Withdraws a pending frame request. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);

    fn add_resize_listener(&mut self) -> ListenerId;

    /// Unknown ids are ignored.
    fn remove_resize_listener(&mut self, id: ListenerId);
}

/// Full-viewport animated network, owned by the host.
#[derive(Debug)]
pub struct NeuralCanvas {
    sim: NetworkSim,
    rng: StdRng,
    state: Lifecycle,
    pending_frame: Option<FrameId>,
    resize_listener: Option<ListenerId>,
    token: CancelToken,
}

impl NeuralCanvas {
    pub fn new(cfg: NetworkConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }

    pub fn with_seed(cfg: NetworkConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: NetworkConfig, rng: StdRng) -> Self {
        Self {
            sim: NetworkSim::new(cfg),
            rng,
            state: Lifecycle::Uninitialized,
            pending_frame: None,
            resize_listener: None,
            token: CancelToken::new(),
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn sim(&self) -> &NetworkSim {
        &self.sim
    }

    /// Frame this canvas is waiting for, if any.
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    /// Sizes the network to the host, listens for resizes and requests the
    /// first frame. Only valid from `Uninitialized`; later calls are ignored.
    pub fn start(&mut self, host: &mut impl FrameHost) {
        if self.state != Lifecycle::Uninitialized {
            log::debug!("canvas start ignored in state {:?}", self.state);
            return;
        }
        self.state = Lifecycle::Running;
        self.resize(&*host);
        self.resize_listener = Some(host.add_resize_listener());
        self.schedule_next(host);
        log::debug!("canvas running");
    }

    /// Re-reads the display size and rebuilds nodes and connections.
    pub fn resize(&mut self, host: &impl FrameHost) {
        let size = host.display_size();
        self.sim.resize(size, &mut self.rng);
    }

    /// Resize listener callback. Does nothing unless running.
    pub fn on_resize(&mut self, host: &impl FrameHost) {
        if self.state == Lifecycle::Running && self.resize_listener.is_some() {
            self.resize(host);
        }
    }

    /// Frame callback: advance, render, then request the next frame.
    ///
    /// Callbacks for frames other than the pending one, or arriving outside
    /// `Running`, are dropped without touching state. Returns whether the
    /// frame was processed.
    pub fn on_frame(
        &mut self,
        id: FrameId,
        timestamp: f64,
        host: &mut impl FrameHost,
        surface: &mut impl Surface,
    ) -> bool {
        if self.state != Lifecycle::Running || self.pending_frame != Some(id) {
            return false;
        }
        self.pending_frame = None;

        self.sim.advance(timestamp, &mut self.rng);
        self.sim.render(surface);
        self.schedule_next(host);
        true
    }

    fn schedule_next(&mut self, host: &mut impl FrameHost) {
        if self.token.is_cancelled() {
            return;
        }
        self.pending_frame = Some(host.request_frame());
    }

    /// Stops the canvas for good.
    ///
    /// Cancels the pending frame and detaches the resize listener. Safe to
    /// call repeatedly and before [`NeuralCanvas::start`].
    pub fn teardown(&mut self, host: &mut impl FrameHost) {
        self.token.cancel();
        if let Some(id) = self.pending_frame.take() {
            host.cancel_frame(id);
        }
        if let Some(id) = self.resize_listener.take() {
            host.remove_resize_listener(id);
        }
        if self.state != Lifecycle::Stopped {
            log::debug!("canvas stopped from {:?}", self.state);
            self.state = Lifecycle::Stopped;
        }
    }
}
