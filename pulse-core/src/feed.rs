//! The memory stream: a typewriter that cycles through fetched snippets.
//!
//! The reveal loop runs on a [`Timers`] queue in virtual time. The host calls
//! [`TypewriterFeed::tick`] with the current time and reads
//! [`TypewriterFeed::display`] to draw the panel. Loads never fail outward:
//! an unreachable or malformed source is replaced by a single placeholder
//! item.

use crate::config::FeedConfig;
use crate::schedule::{CancelToken, Timers};
use crate::source::{BatchResult, DataSource, PendingBatch, TextItem, source_for};
use crate::types::{Lifecycle, Millis};

pub const PLACEHOLDER_TEXT: &str = "Waiting for signal...";
pub const PLACEHOLDER_SOURCE: &str = "offline";
/// Source label shown until the first item starts.
pub const SYNCING_LABEL: &str = "SYNCING...";
/// Blinking caret appended after the revealed text.
pub const CARET: char = '▌';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FeedTask {
    /// Start the item at the current index.
    NextItem,
    /// Reveal one more character of the current item, or finish it.
    RevealChar,
}

/// What to do once a requested batch has arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterLoad {
    StartNow,
    NextAfterInterval,
    Nothing,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedState {
    pub items: Vec<TextItem>,
    pub index: usize,
    pub typing: bool,
}

/// What the panel currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedDisplay {
    pub source: String,
    pub text: String,
    pub caret: bool,
}

impl Default for FeedDisplay {
    fn default() -> Self {
        Self {
            source: SYNCING_LABEL.to_owned(),
            text: String::new(),
            caret: false,
        }
    }
}

impl FeedDisplay {
    /// Text with the caret marker attached, as a single string.
    pub fn line(&self) -> String {
        let mut s = self.text.clone();
        if self.caret {
            s.push(CARET);
        }
        s
    }
}

pub struct TypewriterFeed {
    cfg: FeedConfig,
    source: Box<dyn DataSource>,
    lifecycle: Lifecycle,
    state: FeedState,
    display: FeedDisplay,
    timers: Timers<FeedTask>,
    pending: Option<(PendingBatch, AfterLoad)>,
    chars: Vec<char>,
    revealed: usize,
    loads: usize,
}

impl TypewriterFeed {
    /// A zero `speed` or `interval` in `cfg` falls back to its default.
    pub fn new(cfg: FeedConfig, source: Box<dyn DataSource>) -> Self {
        Self {
            cfg: cfg.normalized(),
            source,
            lifecycle: Lifecycle::Uninitialized,
            state: FeedState::default(),
            display: FeedDisplay::default(),
            timers: Timers::new(CancelToken::new()),
            pending: None,
            chars: Vec::new(),
            revealed: 0,
            loads: 0,
        }
    }

    /// Feed reading from `cfg.data_source`.
    pub fn from_config(cfg: FeedConfig) -> Self {
        let source = source_for(&cfg.data_source);
        Self::new(cfg, source)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn display(&self) -> &FeedDisplay {
        &self.display
    }

    /// Number of batch loads started so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// When the next timer fires. `None` while a load is in flight (poll
    /// with [`TypewriterFeed::tick`]) or once stopped.
    pub fn next_wakeup(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// Resets the panel, starts the first load and, once it lands, the
    /// reveal loop. A source that answers synchronously is fully applied
    /// before this returns.
    pub fn initialize(&mut self, now: Millis) {
        if self.lifecycle != Lifecycle::Uninitialized {
            log::debug!("feed initialize ignored in state {:?}", self.lifecycle);
            return;
        }
        self.lifecycle = Lifecycle::Running;
        self.display = FeedDisplay::default();
        self.request_batch(AfterLoad::StartNow);
        self.poll_load(now);
    }

    /// Requests a fresh batch outside the regular refresh cycle. The
    /// reveal loop keeps going; the new batch replaces the old one when it
    /// lands. Returns `false` if a load is already in flight or the feed is
    /// not running.
    pub fn load_batch(&mut self) -> bool {
        self.request_batch(AfterLoad::Nothing)
    }

    fn request_batch(&mut self, then: AfterLoad) -> bool {
        if self.lifecycle != Lifecycle::Running || self.pending.is_some() {
            return false;
        }
        self.loads += 1;
        log::debug!("loading batch #{} from {}", self.loads, self.source.describe());
        self.pending = Some((self.source.request(), then));
        true
    }

    /// Applies a finished load, if there is one, and resumes the loop.
    fn poll_load(&mut self, now: Millis) {
        let Some((pending, _)) = self.pending.as_mut() else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        let then = self
            .pending
            .take()
            .map_or(AfterLoad::Nothing, |(_, then)| then);

        self.apply_batch(result);
        match then {
            AfterLoad::StartNow => {
                self.timers.schedule_at(now, FeedTask::NextItem);
            }
            AfterLoad::NextAfterInterval => {
                self.timers
                    .schedule_after(now, self.cfg.interval, FeedTask::NextItem);
            }
            AfterLoad::Nothing => {}
        }
    }

    fn apply_batch(&mut self, result: BatchResult) {
        self.state.items = match result {
            Ok(items) => {
                log::info!(
                    "memory stream loaded {} items from {}",
                    items.len(),
                    self.source.describe()
                );
                items
            }
            Err(e) => {
                log::warn!(
                    "failed to load memories from {}: {e}",
                    self.source.describe()
                );
                vec![TextItem::new(PLACEHOLDER_TEXT, PLACEHOLDER_SOURCE)]
            }
        };
        if self.state.index >= self.state.items.len() {
            self.state.index = 0;
        }
    }

    /// Runs everything due at or before `now`.
    ///
    /// Each timer runs at its own due time, so a late tick catches up with
    /// the exact cadence instead of drifting.
    pub fn tick(&mut self, now: Millis) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        loop {
            self.poll_load(now);
            let Some((at, task)) = self.timers.pop_due(now) else {
                break;
            };
            match task {
                FeedTask::NextItem => self.start_item(at),
                FeedTask::RevealChar => self.reveal_char(at),
            }
        }
    }

    fn start_item(&mut self, at: Millis) {
        let Some(item) = self.state.items.get(self.state.index) else {
            // Nothing to show; try again next cycle.
            self.state.typing = false;
            self.timers
                .schedule_after(at, self.cfg.interval, FeedTask::NextItem);
            return;
        };

        self.display.source = item.source_label().to_owned();
        self.display.text.clear();
        self.display.caret = false;
        self.chars = item.text.chars().collect();
        self.revealed = 0;
        self.state.typing = true;
        self.timers.schedule_at(at, FeedTask::RevealChar);
    }

    fn reveal_char(&mut self, at: Millis) {
        if let Some(&c) = self.chars.get(self.revealed) {
            self.revealed += 1;
            self.display.text.push(c);
            self.display.caret = true;
            self.timers
                .schedule_after(at, self.cfg.speed, FeedTask::RevealChar);
        } else {
            self.finish_item(at);
        }
    }

    fn finish_item(&mut self, at: Millis) {
        self.state.typing = false;
        let len = self.state.items.len();
        self.state.index = if len == 0 {
            0
        } else {
            (self.state.index + 1) % len
        };

        // A wrap refreshes the batch before the next item starts. A load
        // that is already done counts as landing at `at`.
        if self.state.index == 0 && self.request_batch(AfterLoad::NextAfterInterval) {
            self.poll_load(at);
            return;
        }
        self.timers
            .schedule_after(at, self.cfg.interval, FeedTask::NextItem);
    }

    /// Stops the feed for good: no timer fires and no load is applied
    /// afterwards. Safe to call repeatedly and before `initialize`.
    pub fn teardown(&mut self) {
        self.timers.token().cancel();
        self.timers.clear();
        self.pending = None;
        self.state.typing = false;
        if self.lifecycle != Lifecycle::Stopped {
            log::debug!("feed stopped from {:?}", self.lifecycle);
            self.lifecycle = Lifecycle::Stopped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::source::StaticSource;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::sync::mpsc::{self, Sender};

    fn items(texts: &[&str]) -> Vec<TextItem> {
        texts
            .iter()
            .map(|t| TextItem {
                text: (*t).to_owned(),
                source: None,
            })
            .collect()
    }

    fn cfg() -> FeedConfig {
        FeedConfig {
            speed: 50,
            interval: 5000,
            data_source: String::new(),
        }
    }

    fn static_feed(texts: &[&str]) -> TypewriterFeed {
        TypewriterFeed::new(cfg(), Box::new(StaticSource::new(items(texts))))
    }

    /// Serves queued results in order, then repeats the last batch.
    struct Scripted {
        queue: RefCell<VecDeque<BatchResult>>,
        fallback: Vec<TextItem>,
    }

    impl Scripted {
        fn new(results: Vec<BatchResult>, fallback: Vec<TextItem>) -> Self {
            Self {
                queue: RefCell::new(results.into()),
                fallback,
            }
        }
    }

    impl DataSource for Scripted {
        fn request(&self) -> PendingBatch {
            let next = self.queue.borrow_mut().pop_front();
            PendingBatch::ready(next.unwrap_or_else(|| Ok(self.fallback.clone())))
        }

        fn describe(&self) -> String {
            "scripted".to_owned()
        }
    }

    /// Hands out loads that only complete when the test says so.
    #[derive(Clone, Default)]
    struct Gated {
        senders: Rc<RefCell<Vec<Sender<BatchResult>>>>,
    }

    impl DataSource for Gated {
        fn request(&self) -> PendingBatch {
            let (tx, rx) = mpsc::channel();
            self.senders.borrow_mut().push(tx);
            PendingBatch::from(rx)
        }

        fn describe(&self) -> String {
            "gated".to_owned()
        }
    }

    #[test]
    fn reveals_one_char_per_step_with_caret() {
        let mut feed = static_feed(&["AB"]);
        feed.initialize(0);
        assert_eq!(feed.load_count(), 1);

        feed.tick(0);
        assert_eq!(feed.display().line(), "A▌");
        assert!(feed.state().typing);
        assert_eq!(feed.display().source, "LOG");

        feed.tick(49);
        assert_eq!(feed.display().line(), "A▌");

        feed.tick(50);
        assert_eq!(feed.display().text, "AB");
        assert!(feed.display().caret);
        assert_eq!(feed.display().line(), "AB▌");
    }

    #[test]
    fn full_cycle_reloads_exactly_once() {
        let mut feed = static_feed(&["AB"]);
        feed.initialize(0);
        let before = feed.load_count();

        feed.tick(0);
        feed.tick(50);
        assert_eq!(feed.load_count(), before);

        feed.tick(100);
        assert!(!feed.state().typing);
        assert_eq!(feed.state().index, 0);
        assert_eq!(feed.load_count(), before + 1);
        // Text stays up, with its caret, until the next item starts.
        assert_eq!(feed.display().line(), "AB▌");
        assert_eq!(feed.next_wakeup(), Some(5100));

        feed.tick(5099);
        assert_eq!(feed.load_count(), before + 1);
    }

    #[test]
    fn failing_source_degrades_to_placeholder() {
        let src = Scripted::new(vec![Err(FeedError::Disconnected)], Vec::new());
        let mut feed = TypewriterFeed::new(cfg(), Box::new(src));

        feed.initialize(0);

        assert_eq!(
            feed.state().items,
            vec![TextItem::new("Waiting for signal...", "offline")]
        );
        feed.tick(0);
        assert_eq!(feed.display().source, "offline");
        assert_eq!(feed.display().line(), "W▌");
    }

    #[test]
    fn unreadable_file_source_degrades_to_placeholder() {
        let mut feed = TypewriterFeed::from_config(FeedConfig {
            data_source: "/no/such/dir/memories.json".to_owned(),
            ..cfg()
        });
        feed.initialize(0);
        assert_eq!(feed.state().items.len(), 1);
        assert_eq!(feed.state().items[0].text, PLACEHOLDER_TEXT);
    }

    #[test]
    fn items_advance_after_interval() {
        let mut feed = static_feed(&["Hi", "Yo"]);
        feed.initialize(0);

        // "Hi": reveals at 0 and 50, finishes at 100.
        feed.tick(100);
        assert_eq!(feed.state().index, 1);
        assert_eq!(feed.load_count(), 1);
        assert_eq!(feed.next_wakeup(), Some(5100));

        feed.tick(5100);
        assert_eq!(feed.display().line(), "Y▌");
        feed.tick(5150);
        assert_eq!(feed.display().line(), "Yo▌");

        // Finishing "Yo" wraps and refreshes.
        feed.tick(5200);
        assert_eq!(feed.state().index, 0);
        assert_eq!(feed.load_count(), 2);
    }

    #[test]
    fn late_tick_catches_up_exactly() {
        let mut feed = static_feed(&["ABC"]);
        feed.initialize(0);

        feed.tick(1_000);

        assert_eq!(feed.display().text, "ABC");
        assert_eq!(feed.load_count(), 2);
        // Reveals at 0, 50 and 100, finish at 150; the refresh is immediate.
        assert_eq!(feed.next_wakeup(), Some(5_150));

        feed.tick(5_150);
        assert_eq!(feed.display().line(), "A▌");
    }

    #[test]
    fn zero_interval_on_empty_batch_still_returns() {
        let mut feed = TypewriterFeed::new(
            FeedConfig {
                interval: 0,
                ..cfg()
            },
            Box::new(StaticSource::new(Vec::new())),
        );
        feed.initialize(0);
        feed.tick(0);

        assert_eq!(feed.next_wakeup(), Some(5_000));
    }

    #[test]
    fn zero_speed_and_interval_fall_back_to_defaults() {
        let mut feed = TypewriterFeed::new(
            FeedConfig {
                speed: 0,
                interval: 0,
                data_source: String::new(),
            },
            Box::new(StaticSource::new(items(&["AB"]))),
        );
        feed.initialize(0);
        feed.tick(0);

        assert_eq!(feed.display().line(), "A▌");
        assert_eq!(feed.next_wakeup(), Some(50));
        assert_eq!(feed.load_count(), 1);
    }

    #[test]
    fn refresh_replaces_batch_wholesale() {
        let src = Scripted::new(
            vec![Ok(items(&["a", "b"]))],
            vec![TextItem::new("fresh", "net")],
        );
        let mut feed = TypewriterFeed::new(cfg(), Box::new(src));
        feed.initialize(0);
        assert_eq!(feed.state().items.len(), 2);

        // a: 0..50, b starts at 5050 and finishes at 5100.
        feed.tick(50);
        feed.tick(5_100);

        assert_eq!(feed.state().items, vec![TextItem::new("fresh", "net")]);
        feed.tick(10_100);
        assert_eq!(feed.display().source, "net");
    }

    #[test]
    fn empty_batch_idles_on_interval() {
        let mut feed = static_feed(&[]);
        feed.initialize(0);

        for step in 0..5 {
            let now = step * 5_000;
            feed.tick(now);
            assert_eq!(feed.next_wakeup(), Some(now + 5_000));
        }
        assert_eq!(feed.load_count(), 1);
        assert_eq!(feed.display().source, SYNCING_LABEL);
        assert!(!feed.state().typing);
    }

    #[test]
    fn empty_text_finishes_without_caret() {
        let mut feed = static_feed(&["", "x"]);
        feed.initialize(0);
        feed.tick(0);
        assert_eq!(feed.state().index, 1);
        assert_eq!(feed.display().line(), "");
    }

    #[test]
    fn reveals_by_character_not_byte() {
        let mut feed = static_feed(&["né✓"]);
        feed.initialize(0);
        feed.tick(50);
        assert_eq!(feed.display().text, "né");
        feed.tick(100);
        assert_eq!(feed.display().text, "né✓");
    }

    #[test]
    fn loop_waits_for_slow_loads() {
        let mut feed = TypewriterFeed::new(cfg(), Box::new(Gated::default()));
        feed.initialize(0);

        assert!(feed.is_loading());
        assert_eq!(feed.next_wakeup(), None);
        feed.tick(10_000);
        assert_eq!(feed.display().source, SYNCING_LABEL);
        assert!(!feed.load_batch());
    }

    #[test]
    fn slow_load_resumes_loop_when_it_lands() {
        let gate = Gated::default();
        let mut feed = TypewriterFeed::new(cfg(), Box::new(gate.clone()));
        feed.initialize(0);
        feed.tick(300);
        assert!(feed.is_loading());

        gate.senders.borrow()[0].send(Ok(items(&["ok"]))).unwrap();
        feed.tick(400);

        assert!(!feed.is_loading());
        assert_eq!(feed.display().line(), "o▌");
    }

    #[test]
    fn dropped_loader_counts_as_failure() {
        let gate = Gated::default();
        let mut feed = TypewriterFeed::new(cfg(), Box::new(gate.clone()));
        feed.initialize(0);

        // The worker dies without reporting.
        gate.senders.borrow_mut().clear();
        feed.tick(0);

        assert!(!feed.is_loading());
        assert_eq!(
            feed.state().items,
            vec![TextItem::new(PLACEHOLDER_TEXT, PLACEHOLDER_SOURCE)]
        );
    }

    #[test]
    fn manual_load_keeps_loop_running() {
        let src = Scripted::new(
            vec![Ok(items(&["abc", "def"]))],
            items(&["z"]),
        );
        let mut feed = TypewriterFeed::new(cfg(), Box::new(src));
        feed.initialize(0);
        feed.tick(0);
        feed.tick(50);

        assert!(feed.load_batch());
        feed.tick(100);

        // Batch swapped under the loop; index clamps into the new batch.
        assert_eq!(feed.state().items, items(&["z"]));
        assert_eq!(feed.display().text, "abc");
        assert_eq!(feed.load_count(), 2);
    }

    #[test]
    fn teardown_stops_everything_and_is_idempotent() {
        let mut feed = static_feed(&["AB"]);
        feed.teardown();
        assert_eq!(feed.lifecycle(), Lifecycle::Stopped);

        feed.initialize(0);
        assert_eq!(feed.load_count(), 0);

        let mut feed = static_feed(&["ABCDEF"]);
        feed.initialize(0);
        feed.tick(0);
        feed.teardown();
        feed.teardown();

        feed.tick(10_000);
        assert_eq!(feed.display().line(), "A▌");
        assert_eq!(feed.next_wakeup(), None);
        assert!(!feed.load_batch());
        assert!(!feed.state().typing);
    }
}
