//! Two-party handoff between the control thread and the render thread
//!
//! The [`Rendezvous`] decides who may touch [`SharedFrameState`] and the
//! graphics context at any instant, and lets the control side learn when the
//! render side has finished a frame without busy-waiting.
//!
//! # Locks
//!
//! ```text
//!  admission ──► turn token ──► (admission released)
//!                    │
//!                    │ owns SharedFrameState
//!                    ▼
//!  wait lock + handoff signal   (frames_completed, closed)
//! ```
//!
//! - **admission**: taken before the turn token and dropped right after it is
//!   obtained. A thread that just released the turn token has to queue behind
//!   the admission lock like everyone else, so it cannot grab the token again
//!   before the other side gets its turn.
//! - **turn token**: the mutex that owns [`SharedFrameState`]. Holding its
//!   guard is what "exclusive access" means.
//! - **wait lock**: guards the handoff record and pairs with the condition
//!   variable. It is never the turn token, so the render thread can broadcast
//!   after it has already let go of the token.
//!
//! # Handoff record
//!
//! The render thread bumps `frames_completed` while it still holds the turn
//! token, then releases the token and broadcasts. A waiter snapshots the
//! counter while *it* still holds the token and waits for the counter to move
//! past the snapshot. A broadcast that lands between the waiter's release and
//! its wait therefore cannot be lost, and the frame that wakes the waiter is
//! guaranteed to have started after the waiter's writes.
//!
//! When the render thread stops it sets `closed` instead. Every parked waiter
//! is released and every later wait returns immediately, so shutdown can never
//! strand the control thread on a signal nobody will send.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::SharedFrameState;

/// How a wait for the render thread ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// The render thread finished at least one frame after the wait began
    FrameCompleted,
    /// The render thread has stopped and will not produce further frames
    Closed,
}

#[derive(Debug, Default)]
struct HandoffRecord {
    frames_completed: u64,
    closed: bool,
}

/// Alternating exclusive-access handshake over a [`SharedFrameState`]
#[derive(Debug)]
pub struct Rendezvous {
    admission: Mutex<()>,
    turn: Mutex<SharedFrameState>,
    handoff: Mutex<HandoffRecord>,
    handoff_signal: Condvar,
    holders: AtomicUsize,
}

impl Rendezvous {
    /// Create a rendezvous owning the initial frame state
    pub fn new(state: SharedFrameState) -> Self {
        Self {
            admission: Mutex::new(()),
            turn: Mutex::new(state),
            handoff: Mutex::new(HandoffRecord::default()),
            handoff_signal: Condvar::new(),
            holders: AtomicUsize::new(0),
        }
    }

    /// Block until the caller holds the turn token
    ///
    /// The admission lock is taken first and released as soon as the token is
    /// held. The returned guard releases the token when dropped.
    pub fn acquire_exclusive(&self) -> ExclusiveAccess<'_> {
        let admission = self.admission.lock();
        let turn = self.turn.lock();
        drop(admission);

        let previous = self.holders.fetch_add(1, Ordering::AcqRel);
        debug_assert_eq!(previous, 0, "turn token held by two parties at once");

        ExclusiveAccess {
            rendezvous: self,
            occupancy: Occupancy(&self.holders),
            turn,
        }
    }

    /// Number of frames the render thread has signalled so far
    pub fn frames_completed(&self) -> u64 {
        self.handoff.lock().frames_completed
    }

    /// Whether the render thread has stopped
    pub fn is_closed(&self) -> bool {
        self.handoff.lock().closed
    }

    /// Release every current and future waiter without holding the token
    ///
    /// Used when the render thread unwinds and can no longer go through
    /// [`ExclusiveAccess::release_and_close`].
    pub(crate) fn close(&self) {
        self.handoff.lock().closed = true;
        self.handoff_signal.notify_all();
    }

    fn wait_for_frame_after(&self, seen: u64) -> Handoff {
        let mut record = self.handoff.lock();
        while record.frames_completed == seen && !record.closed {
            self.handoff_signal.wait(&mut record);
        }

        if record.frames_completed > seen {
            Handoff::FrameCompleted
        } else {
            Handoff::Closed
        }
    }
}

/// Decrements the holder count before the turn token is unlocked
#[derive(Debug)]
struct Occupancy<'a>(&'a AtomicUsize);

impl Drop for Occupancy<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Scoped exclusive access to the shared frame state
///
/// Dropping the guard releases the turn token without signalling. The two
/// consuming methods release it and then either wait for the render thread or
/// wake the waiters.
#[derive(Debug)]
#[must_use = "dropping the guard immediately releases exclusive access"]
pub struct ExclusiveAccess<'a> {
    rendezvous: &'a Rendezvous,
    // Field order matters: occupancy is dropped before the token unlocks.
    occupancy: Occupancy<'a>,
    turn: MutexGuard<'a, SharedFrameState>,
}

impl<'a> ExclusiveAccess<'a> {
    /// Release the turn token, then block until the render thread completes a
    /// frame that started after this release
    ///
    /// Returns [`Handoff::Closed`] without blocking if the render thread has
    /// stopped. The turn token is not held on return.
    pub fn release_and_wait_for_handoff(self) -> Handoff {
        let rendezvous = self.rendezvous;
        let seen = rendezvous.handoff.lock().frames_completed;
        self.release();
        rendezvous.wait_for_frame_after(seen)
    }

    /// Record a completed frame, release the turn token and wake all waiters
    ///
    /// Only the render thread calls this, after presenting.
    pub fn release_and_signal(self) {
        let rendezvous = self.rendezvous;
        rendezvous.handoff.lock().frames_completed += 1;
        self.release();
        rendezvous.handoff_signal.notify_all();
    }

    /// Mark the render side stopped, release the turn token and wake all
    /// waiters
    ///
    /// Only the render thread calls this, once, when it observes shutdown.
    pub fn release_and_close(self) {
        let rendezvous = self.rendezvous;
        rendezvous.handoff.lock().closed = true;
        self.release();
        rendezvous.handoff_signal.notify_all();
    }

    fn release(self) {
        let Self { occupancy, turn, .. } = self;
        drop(occupancy);
        drop(turn);
    }
}

impl Deref for ExclusiveAccess<'_> {
    type Target = SharedFrameState;

    fn deref(&self) -> &Self::Target {
        &self.turn
    }
}

impl DerefMut for ExclusiveAccess<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_guard_reads_and_writes_state() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        {
            let mut access = rendezvous.acquire_exclusive();
            assert_eq!(access.size(), (800, 600));
            assert!(access.set_size(1024, 768));
        }
        assert_eq!(rendezvous.acquire_exclusive().size(), (1024, 768));
    }

    #[test]
    fn test_dropping_guard_releases_token() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        drop(rendezvous.acquire_exclusive());
        assert_eq!(rendezvous.holders.load(Ordering::Acquire), 0);
        drop(rendezvous.acquire_exclusive());
    }

    #[test]
    fn test_signal_counts_frames() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        rendezvous.acquire_exclusive().release_and_signal();
        rendezvous.acquire_exclusive().release_and_signal();
        assert_eq!(rendezvous.frames_completed(), 2);
        assert!(!rendezvous.is_closed());
    }

    #[test]
    fn test_wait_after_close_returns_immediately() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        rendezvous.acquire_exclusive().release_and_close();
        assert!(rendezvous.is_closed());
        assert_eq!(
            rendezvous.acquire_exclusive().release_and_wait_for_handoff(),
            Handoff::Closed
        );
    }

    #[test]
    fn test_waiter_is_woken_by_next_frame() {
        let rendezvous = Arc::new(Rendezvous::new(SharedFrameState::new(800, 600)));
        let access = rendezvous.acquire_exclusive();

        let render_side = Arc::clone(&rendezvous);
        let render = thread::spawn(move || {
            let mut access = render_side.acquire_exclusive();
            // The waiter's write is visible to the frame that wakes it.
            let size = access.size();
            access.request_shutdown();
            access.release_and_signal();
            size
        });

        let mut access = access;
        assert!(access.set_size(640, 480));
        assert_eq!(access.release_and_wait_for_handoff(), Handoff::FrameCompleted);
        assert_eq!(render.join().unwrap(), (640, 480));
    }

    #[test]
    fn test_signal_before_wait_is_not_lost() {
        let rendezvous = Arc::new(Rendezvous::new(SharedFrameState::new(800, 600)));

        // A frame that completes before anyone waits must not satisfy a wait
        // that starts afterwards, and a frame that completes between release
        // and wait must.
        rendezvous.acquire_exclusive().release_and_signal();

        let access = rendezvous.acquire_exclusive();
        let render_side = Arc::clone(&rendezvous);
        let render = thread::spawn(move || {
            render_side.acquire_exclusive().release_and_signal();
        });
        // Give the render side time to queue on the token.
        thread::sleep(Duration::from_millis(20));
        assert_eq!(access.release_and_wait_for_handoff(), Handoff::FrameCompleted);
        render.join().unwrap();
        assert_eq!(rendezvous.frames_completed(), 2);
    }

    #[test]
    fn test_close_releases_parked_waiter() {
        let rendezvous = Arc::new(Rendezvous::new(SharedFrameState::new(800, 600)));

        let waiter_side = Arc::clone(&rendezvous);
        let waiter = thread::spawn(move || {
            waiter_side.acquire_exclusive().release_and_wait_for_handoff()
        });

        thread::sleep(Duration::from_millis(20));
        rendezvous.close();
        assert_eq!(waiter.join().unwrap(), Handoff::Closed);
    }
}
