//! Portal window built with eframe/egui.
//!
//! This module defines [`Portal`], which hosts both widgets: the neural
//! network background fills the window and the memory stream panel floats
//! in the bottom-right corner. egui's repaint requests stand in for the
//! browser's animation frames.

use std::time::Duration;

use eframe::App;
use glam::Vec2;
use pulse_core::{
    canvas::{FrameHost, NeuralCanvas},
    color::Color,
    config::PortalConfig,
    feed::TypewriterFeed,
    render::Surface,
    types::{FrameId, Lifecycle, ListenerId, Millis},
};

/// Window background behind the network.
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(2, 6, 23);
const PANEL_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(14, 21, 38, 230);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(56, 189, 248);
const PANEL_TEXT: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
const PANEL_WIDTH: f32 = 270.0;
/// Rim segments used to approximate a radial gradient.
const GLOW_SEGMENTS: usize = 32;
/// Full caret blink period, in seconds.
const CARET_PERIOD: f64 = 1.0;

fn to_color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Triangle fan shading linearly from `inner` at `center` to `outer` at the rim.
fn glow_mesh(center: egui::Pos2, radius: f32, inner: egui::Color32, outer: egui::Color32) -> egui::Mesh {
    use std::f32::consts::TAU;

    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(center, inner);
    for i in 0..GLOW_SEGMENTS {
        let t = (i as f32) / (GLOW_SEGMENTS as f32) * TAU;
        mesh.colored_vertex(center + radius * egui::vec2(t.cos(), t.sin()), outer);
    }
    for i in 0..GLOW_SEGMENTS as u32 {
        let next = (i + 1) % GLOW_SEGMENTS as u32;
        mesh.add_triangle(0, i + 1, next + 1);
    }
    mesh
}

/// Whether the caret is in the visible half of its blink cycle at `time` seconds.
fn caret_visible(time: f64) -> bool {
    time.rem_euclid(CARET_PERIOD) < CARET_PERIOD / 2.0
}

/// [`Surface`] drawing through an egui painter, offset to the panel origin.
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl PainterSurface<'_> {
    fn to_screen(&self, p: Vec2) -> egui::Pos2 {
        self.origin + egui::vec2(p.x, p.y)
    }
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self) {
        self.painter
            .rect_filled(self.painter.clip_rect(), egui::CornerRadius::ZERO, BACKGROUND);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.painter.line_segment(
            [self.to_screen(from), self.to_screen(to)],
            egui::Stroke::new(width, to_color32(color)),
        );
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        let mesh = glow_mesh(
            self.to_screen(center),
            radius,
            to_color32(inner),
            to_color32(outer),
        );
        self.painter.add(egui::Shape::mesh(mesh));
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.painter
            .circle_filled(self.to_screen(center), radius, to_color32(color));
    }
}

/// [`FrameHost`] backed by egui repaint requests.
///
/// At most one frame is outstanding at a time; the next `update` delivers it.
/// Resizes are detected by comparing the central panel size between passes.
#[derive(Default)]
struct WindowHost {
    ctx: Option<egui::Context>,
    size: Vec2,
    next_id: u64,
    frame: Option<FrameId>,
    resize_listener: Option<ListenerId>,
}

impl WindowHost {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Records the current surface size. Returns `true` when it changed and
    /// a resize listener is registered.
    fn observe_size(&mut self, size: Vec2) -> bool {
        let changed = size != self.size;
        self.size = size;
        changed && self.resize_listener.is_some()
    }

    fn take_frame(&mut self) -> Option<FrameId> {
        self.frame.take()
    }
}

impl FrameHost for WindowHost {
    fn display_size(&self) -> Vec2 {
        self.size
    }

    fn request_frame(&mut self) -> FrameId {
        let id = self.fresh_id();
        self.frame = Some(id);
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.frame == Some(id) {
            self.frame = None;
        }
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = self.fresh_id();
        self.resize_listener = Some(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        if self.resize_listener == Some(id) {
            self.resize_listener = None;
        }
    }
}

/// Main application state.
///
/// ### Fields
/// - `canvas` - Neural network background, driven one frame per repaint.
/// - `feed` - Memory stream, ticked with the egui clock in milliseconds.
/// - `host` - Frame and resize bookkeeping for `canvas`.
/// - `started` - Whether both widgets have been initialized. This happens
///   on the first pass, once the window size is known.
pub struct Portal {
    canvas: NeuralCanvas,
    feed: TypewriterFeed,
    host: WindowHost,
    started: bool,
}

impl Portal {
    pub fn new(cfg: PortalConfig) -> Self {
        Self {
            canvas: NeuralCanvas::new(cfg.network),
            feed: TypewriterFeed::from_config(cfg.feed),
            host: WindowHost::default(),
            started: false,
        }
    }

    /// Initializes both widgets for a window of `size` at `now_ms`.
    fn start(&mut self, size: Vec2, now_ms: f64) {
        self.host.size = size;
        self.canvas.start(&mut self.host);
        self.feed.initialize(now_ms as Millis);
        self.started = true;
    }

    /// Stops both widgets. Safe to call repeatedly.
    fn teardown(&mut self) {
        self.canvas.teardown(&mut self.host);
        self.feed.teardown();
    }

    /// Full-window panel where the network is advanced and drawn.
    fn ui_canvas(&mut self, ctx: &egui::Context, now_ms: f64) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(BACKGROUND))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let size = Vec2::new(rect.width(), rect.height());

                if !self.started {
                    self.start(size, now_ms);
                } else if self.host.observe_size(size) {
                    self.canvas.on_resize(&self.host);
                }

                let painter = ui.painter_at(rect);
                let mut surface = PainterSurface {
                    painter: &painter,
                    origin: rect.min,
                };

                if let Some(id) = self.host.take_frame() {
                    self.canvas
                        .on_frame(id, now_ms, &mut self.host, &mut surface);
                } else if self.canvas.state() == Lifecycle::Running {
                    // An input-driven pass between frames: redraw without advancing.
                    self.canvas.sim().render(&mut surface);
                }
            });
    }

    /// Floating memory stream panel in the bottom-right corner.
    fn ui_feed_panel(&self, ctx: &egui::Context, time: f64) {
        let display = self.feed.display();

        egui::Area::new("memory_stream".into())
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-20.0, -20.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(PANEL_FILL)
                    .stroke(egui::Stroke::new(
                        1.0,
                        egui::Color32::from_rgba_unmultiplied(56, 189, 248, 102),
                    ))
                    .corner_radius(egui::CornerRadius::same(12))
                    .inner_margin(egui::Margin::same(15))
                    .show(ui, |ui| {
                        ui.set_width(PANEL_WIDTH);

                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new("MEMORY STREAM")
                                    .monospace()
                                    .size(11.0)
                                    .color(ACCENT),
                            );
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.label(
                                        egui::RichText::new(display.source.to_uppercase())
                                            .monospace()
                                            .size(11.0)
                                            .color(ACCENT),
                                    );
                                },
                            );
                        });
                        ui.separator();

                        let mut text = display.text.clone();
                        if display.caret && caret_visible(time) {
                            text.push(pulse_core::feed::CARET);
                        }
                        ui.label(
                            egui::RichText::new(text)
                                .monospace()
                                .size(13.0)
                                .color(PANEL_TEXT),
                        );
                    });
            });
    }

    /// Makes sure the feed gets ticked again even when no frame is pending.
    fn schedule_wakeup(&self, ctx: &egui::Context, now: Millis) {
        if self.feed.lifecycle() != Lifecycle::Running {
            return;
        }
        let blink = Duration::from_secs_f64(CARET_PERIOD / 2.0);
        let wait = match self.feed.next_wakeup() {
            Some(due) => Duration::from_millis(due.saturating_sub(now)).min(blink),
            // A load is in flight; poll for it.
            None => Duration::from_millis(100),
        };
        ctx.request_repaint_after(wait);
    }
}

impl App for Portal {
    /// eframe callback that runs both widgets for each pass.
    ///
    /// This method:
    /// - Tears everything down on `Escape`.
    /// - Ticks the feed, then advances and draws the network.
    /// - Draws the memory stream panel over it.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.host.ctx.is_none() {
            self.host.ctx = Some(ctx.clone());
        }

        let time = ctx.input(|i| i.time);
        let now_ms = time * 1000.0;

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            log::info!("escape pressed, stopping widgets");
            self.teardown();
        }

        self.feed.tick(now_ms as Millis);
        self.ui_canvas(ctx, now_ms);
        self.ui_feed_panel(ctx, time);
        self.schedule_wakeup(ctx, now_ms as Millis);
    }
}
