//! Pause-aware one-shot timer for transient popups.
//!
//! Short-lived windows (the post-capture preview, toasts) auto-close
//! after a delay, but focusing them suspends the countdown and blurring
//! resumes it with the *remaining* time, never the full duration. The
//! arithmetic lives in [`TimerState`], which is parameterized on the
//! current instant so it can be driven synthetically; [`TransientTimer`]
//! wraps it in a condvar-driven thread for real use.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// The timer arithmetic.
///
/// Invariant: pausing captures `remaining = deadline − now`; resuming
/// reschedules at `now + remaining`. Elapsed time therefore accumulates
/// across any number of pause/resume cycles and is never reset to the
/// original duration.
#[derive(Debug, Clone, Copy)]
pub struct TimerState {
    deadline: Instant,
    remaining: Duration,
    paused: bool,
    fired: bool,
}

impl TimerState {
    pub fn scheduled(now: Instant, duration: Duration) -> Self {
        Self {
            deadline: now + duration,
            remaining: duration,
            paused: false,
            fired: false,
        }
    }

    /// Suspend the countdown, capturing what is left of it.
    pub fn pause(&mut self, now: Instant) {
        if self.fired || self.paused {
            return;
        }
        self.remaining = self.deadline.saturating_duration_since(now);
        self.paused = true;
    }

    /// Resume with the captured remainder.
    pub fn resume(&mut self, now: Instant) {
        if self.fired || !self.paused {
            return;
        }
        self.deadline = now + self.remaining;
        self.paused = false;
    }

    /// Check for expiry. Returns `true` exactly once, at or after the
    /// deadline; a paused timer never fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.fired || self.paused {
            return false;
        }
        if now >= self.deadline {
            self.fired = true;
            return true;
        }
        false
    }

    /// Time left on the countdown as of `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        if self.fired {
            return Duration::ZERO;
        }
        if self.paused {
            return self.remaining;
        }
        self.deadline.saturating_duration_since(now)
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

struct TimerShared {
    state: TimerState,
    cancelled: bool,
    on_expire: Option<Box<dyn FnOnce() + Send>>,
}

struct TimerInner {
    shared: Mutex<TimerShared>,
    cond: Condvar,
}

/// A running transient-window timer.
///
/// Fires `on_expire` exactly once unless cancelled. `focus_gained` and
/// `focus_lost` alias pause and resume, matching how popups suspend
/// while the user is looking at them. Dropping the handle cancels.
pub struct TransientTimer {
    inner: Arc<TimerInner>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TransientTimer {
    pub fn schedule(duration: Duration, on_expire: impl FnOnce() + Send + 'static) -> Self {
        let inner = Arc::new(TimerInner {
            shared: Mutex::new(TimerShared {
                state: TimerState::scheduled(Instant::now(), duration),
                cancelled: false,
                on_expire: Some(Box::new(on_expire)),
            }),
            cond: Condvar::new(),
        });

        let worker = Arc::clone(&inner);
        let handle = thread::Builder::new()
            .name("transient-timer".into())
            .spawn(move || loop {
                let mut guard = worker.shared.lock();
                if guard.cancelled || guard.state.has_fired() {
                    break;
                }
                if guard.state.is_paused() {
                    worker.cond.wait(&mut guard);
                    continue;
                }

                let deadline = guard.state.deadline();
                worker.cond.wait_until(&mut guard, deadline);
                if guard.cancelled {
                    break;
                }
                if guard.state.poll(Instant::now()) {
                    let callback = guard.on_expire.take();
                    drop(guard);
                    if let Some(callback) = callback {
                        callback();
                    }
                    break;
                }
                // Woken by pause/resume; go around with the new deadline.
            })
            .expect("failed to spawn timer thread");

        Self {
            inner,
            handle: Some(handle),
        }
    }

    pub fn pause(&self) {
        let mut guard = self.inner.shared.lock();
        guard.state.pause(Instant::now());
        self.inner.cond.notify_one();
    }

    pub fn resume(&self) {
        let mut guard = self.inner.shared.lock();
        guard.state.resume(Instant::now());
        self.inner.cond.notify_one();
    }

    /// Focus suspends the auto-close countdown.
    pub fn focus_gained(&self) {
        self.pause();
    }

    /// Blur resumes it with the remaining time.
    pub fn focus_lost(&self) {
        self.resume();
    }

    /// Cancel without firing. Idempotent; a no-op after expiry.
    pub fn cancel(&self) {
        let mut guard = self.inner.shared.lock();
        guard.cancelled = true;
        guard.on_expire = None;
        self.inner.cond.notify_one();
    }

    pub fn has_fired(&self) -> bool {
        self.inner.shared.lock().state.has_fired()
    }
}

impl Drop for TransientTimer {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::Rng;

    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_at_the_deadline_not_before() {
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(5000));

        assert!(!timer.poll(base + ms(4999)));
        assert!(timer.poll(base + ms(5000)));
    }

    #[test]
    fn pause_resume_extends_by_time_spent_paused() {
        // 5000 ms budget: run 2000, pause, resume, then 2999 more must
        // not fire and the next millisecond must.
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(5000));

        assert!(!timer.poll(base + ms(2000)));
        timer.pause(base + ms(2000));
        timer.resume(base + ms(2000));

        assert!(!timer.poll(base + ms(2000 + 2999)));
        assert!(timer.poll(base + ms(2000 + 3000)));
    }

    #[test]
    fn cycles_compound_instead_of_resetting() {
        // Three {run 1000, pause, resume} cycles out of 5000 leave
        // exactly 2000 on the clock.
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(5000));
        let mut now = base;

        for gap in [500u64, 300, 700] {
            now += ms(1000);
            assert!(!timer.poll(now));
            timer.pause(now);
            now += ms(gap); // arbitrary time spent paused
            timer.resume(now);
        }

        assert_eq!(timer.remaining(now), ms(2000));
        assert!(!timer.poll(now + ms(1999)));
        assert!(timer.poll(now + ms(2000)));
    }

    #[test]
    fn time_to_expire_equals_budget_minus_active_time() {
        // Randomized pause/resume cycles: however they interleave, the
        // timer fires once the unpaused time sums to the budget.
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let budget: u64 = rng.gen_range(100..5000);
            let base = Instant::now();
            let mut timer = TimerState::scheduled(base, ms(budget));
            let mut now = base;
            let mut active: u64 = 0;

            while active < budget {
                let run = rng.gen_range(1..=budget - active);
                if active + run < budget {
                    now += ms(run);
                    active += run;
                    assert!(!timer.poll(now), "fired early at {} of {}", active, budget);
                    timer.pause(now);
                    now += ms(rng.gen_range(0..500));
                    timer.resume(now);
                } else {
                    assert!(!timer.poll(now + ms(run - 1)));
                    assert!(timer.poll(now + ms(run)));
                    active += run;
                }
            }
            assert!(timer.has_fired());
        }
    }

    #[test]
    fn paused_timer_never_fires() {
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(100));

        timer.pause(base + ms(50));
        assert!(!timer.poll(base + ms(10_000)));
        assert_eq!(timer.remaining(base + ms(10_000)), ms(50));
    }

    #[test]
    fn fires_exactly_once() {
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(10));
        assert!(timer.poll(base + ms(10)));
        assert!(!timer.poll(base + ms(20)));
    }

    #[test]
    fn fired_timer_ignores_pause_and_resume() {
        let base = Instant::now();
        let mut timer = TimerState::scheduled(base, ms(10));
        assert!(timer.poll(base + ms(10)));

        timer.pause(base + ms(20));
        timer.resume(base + ms(30));
        assert!(!timer.is_paused());
        assert_eq!(timer.remaining(base + ms(30)), Duration::ZERO);
    }

    #[test]
    fn threaded_timer_fires_callback_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&fired);

        let timer = TransientTimer::schedule(ms(30), move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(ms(150));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.has_fired());

        // Late pause/resume on a fired timer are no-ops.
        timer.pause();
        timer.resume();
        thread::sleep(ms(50));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn threaded_timer_holds_while_focused() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&fired);

        let timer = TransientTimer::schedule(ms(40), move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        timer.focus_gained();
        thread::sleep(ms(120));
        assert_eq!(fired.load(Ordering::SeqCst), 0, "fired while focused");

        timer.focus_lost();
        thread::sleep(ms(150));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&fired);

        let timer = TransientTimer::schedule(ms(30), move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        thread::sleep(ms(100));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_cancels_the_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&fired);

        {
            let _timer = TransientTimer::schedule(ms(30), move || {
                observed.fetch_add(1, Ordering::SeqCst);
            });
        }

        thread::sleep(ms(100));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
