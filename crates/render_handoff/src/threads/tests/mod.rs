//! Multi-threaded handoff scenarios
//!
//! Scripted doubles for both sides of the handshake plus a bounded-time
//! runner, so a deadlock shows up as a failed test instead of a hung one.


use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::backend::{ControlSurface, FrameRenderer, Key};
use crate::sync::Handoff;
use crate::threads::ResizeNotifier;

/// Upper bound for any scenario; generous so slow CI machines do not flake
pub(super) const SCENARIO_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a notification must stay in flight before it counts as parked
pub(super) const NOTIFY_SETTLE: Duration = Duration::from_millis(20);

/// Run `scenario` on a helper thread and fail if it does not finish in time
pub(super) fn within_timeout<T, F>(scenario: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let _ = sender.send(scenario());
    });

    match receiver.recv_timeout(SCENARIO_TIMEOUT) {
        Ok(value) => value,
        Err(RecvTimeoutError::Timeout) => panic!("scenario timed out, threads are deadlocked"),
        Err(RecvTimeoutError::Disconnected) => panic!("scenario panicked"),
    }
}

/// Flags any moment where two parties are inside a critical section at once
#[derive(Default)]
pub(super) struct ExclusionProbe {
    inside: AtomicUsize,
    violated: AtomicBool,
    entries: AtomicUsize,
}

impl ExclusionProbe {
    pub(super) fn section(&self, hold: Duration) {
        if self.inside.fetch_add(1, Ordering::AcqRel) != 0 {
            self.violated.store(true, Ordering::Release);
        }
        self.entries.fetch_add(1, Ordering::Relaxed);
        if !hold.is_zero() {
            thread::sleep(hold);
        }
        self.inside.fetch_sub(1, Ordering::AcqRel);
    }

    pub(super) fn violated(&self) -> bool {
        self.violated.load(Ordering::Acquire)
    }

    pub(super) fn entries(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }
}

/// Lets a test decide exactly when the render thread may begin each frame
///
/// Used as the render thread's stats hook with an interval of one: after
/// presenting frame `n` the render thread parks here, outside the turn token,
/// until frame `n + 1` has been allowed.
pub(super) struct FrameGate {
    allowed: Mutex<u64>,
    changed: Condvar,
}

impl FrameGate {
    /// Gate that lets the first frame through
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self {
            allowed: Mutex::new(1),
            changed: Condvar::new(),
        })
    }

    /// Allow frames up to and including `frame` to start
    pub(super) fn allow_through(&self, frame: u64) {
        let mut allowed = self.allowed.lock();
        *allowed = (*allowed).max(frame);
        self.changed.notify_all();
    }

    /// Block until the frame after `presented` may start
    pub(super) fn pass(&self, presented: u64) {
        let mut allowed = self.allowed.lock();
        while *allowed <= presented {
            self.changed.wait(&mut allowed);
        }
    }
}

/// Counts resize notifications in flight and records how each one ended
///
/// Notifications are numbered from 1 in the order they start.
#[derive(Default)]
pub(super) struct NotifyTracker {
    started: AtomicU64,
    finished: AtomicU64,
    outcomes: Mutex<Vec<Option<Handoff>>>,
}

impl NotifyTracker {
    fn begin(&self) {
        self.started.fetch_add(1, Ordering::AcqRel);
    }

    fn end(&self, outcome: Option<Handoff>) {
        self.outcomes.lock().push(outcome);
        self.finished.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of the notification still waiting after `settle`, if any
    ///
    /// Only meaningful when called from the render thread between frames:
    /// no frame can complete during the settle time, so a notification that
    /// is still in flight afterwards is parked on the handoff signal.
    pub(super) fn parked_notification(&self, settle: Duration) -> Option<u64> {
        let started = self.started.load(Ordering::Acquire);
        if self.finished.load(Ordering::Acquire) >= started {
            return None;
        }

        thread::sleep(settle);
        let still_waiting = self.started.load(Ordering::Acquire) == started
            && self.finished.load(Ordering::Acquire) < started;
        still_waiting.then_some(started)
    }

    /// How notification `sequence` ended
    pub(super) fn outcome(&self, sequence: u64) -> Option<Handoff> {
        let index = usize::try_from(sequence).ok()?.checked_sub(1)?;
        self.outcomes.lock().get(index).copied().flatten()
    }
}

/// Renderer double that records the size of every frame it draws
#[derive(Clone, Default)]
pub(super) struct RecordingRenderer {
    pub(super) frames: Arc<Mutex<Vec<(u32, u32)>>>,
    pub(super) probe: Option<Arc<ExclusionProbe>>,
    pub(super) frame_time: Duration,
}

impl RecordingRenderer {
    pub(super) fn recorded(&self) -> Vec<(u32, u32)> {
        self.frames.lock().clone()
    }

    pub(super) fn last_frame(&self) -> Option<(u32, u32)> {
        self.frames.lock().last().copied()
    }
}

impl FrameRenderer for RecordingRenderer {
    fn render_frame(&mut self, width: u32, height: u32, _elapsed: Duration) {
        if let Some(probe) = &self.probe {
            probe.section(self.frame_time);
        } else if !self.frame_time.is_zero() {
            thread::sleep(self.frame_time);
        }
        self.frames.lock().push((width, height));
    }

    fn present(&mut self) {}
}

/// Window double driven by a script of resize bursts
///
/// Poll `n` fires every size in the `n`-th burst through the resize notifier,
/// in order. Once `close_after_polls` polls have happened the window reports
/// a close request.
pub(super) struct ScriptedSurface {
    notifier: ResizeNotifier,
    bursts: VecDeque<Vec<(u32, u32)>>,
    close_after_polls: u32,
    polls: u32,
    close_requested: bool,
    pressed: Vec<Key>,
    probe: Option<Arc<ExclusionProbe>>,
    tracker: Option<Arc<NotifyTracker>>,
}

impl ScriptedSurface {
    pub(super) fn new(notifier: ResizeNotifier, close_after_polls: u32) -> Self {
        Self {
            notifier,
            bursts: VecDeque::new(),
            close_after_polls,
            polls: 0,
            close_requested: false,
            pressed: Vec::new(),
            probe: None,
            tracker: None,
        }
    }

    pub(super) fn with_bursts(mut self, bursts: Vec<Vec<(u32, u32)>>) -> Self {
        self.bursts = bursts.into();
        self
    }

    pub(super) fn with_probe(mut self, probe: Arc<ExclusionProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub(super) fn with_tracker(mut self, tracker: Arc<NotifyTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub(super) fn press(&mut self, key: Key) {
        self.pressed.push(key);
    }

    pub(super) fn polls(&self) -> u32 {
        self.polls
    }
}

impl ControlSurface for ScriptedSurface {
    fn should_close(&self) -> bool {
        if let Some(probe) = &self.probe {
            probe.section(Duration::from_micros(200));
        }
        self.close_requested || self.polls >= self.close_after_polls
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    fn poll_events(&mut self) {
        self.polls += 1;
        if let Some(burst) = self.bursts.pop_front() {
            for (width, height) in burst {
                if let Some(tracker) = &self.tracker {
                    tracker.begin();
                }
                let outcome = self.notifier.notify(width, height);
                if let Some(tracker) = &self.tracker {
                    tracker.end(outcome);
                }
            }
        }
    }
}
