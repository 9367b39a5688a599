//! Thread synchronization primitives for frame pacing

use std::sync::{Condvar, Mutex};

/// Single-slot, consume-on-wait latch.
///
/// `set` stores one permit and wakes one waiter; `wait` blocks until a permit
/// is available and atomically consumes it. Two of these latches implement the
/// simulation/render handshake: the pair behaves like a single-slot pipeline
/// between the two threads, so at most one simulation step is ever in flight.
pub struct AutoResetEvent {
    flag: Mutex<bool>,
    signal: Condvar,
}

impl AutoResetEvent {
    /// Create a latch; `initial` pre-loads the single permit
    pub fn new(initial: bool) -> Self {
        Self {
            flag: Mutex::new(initial),
            signal: Condvar::new(),
        }
    }

    /// Store the permit and wake one waiter.
    ///
    /// Setting an already-set latch is idempotent; the slot holds one permit.
    pub fn set(&self) {
        let mut flag = self.flag.lock().unwrap();
        *flag = true;
        self.signal.notify_one();
    }

    /// Drop the permit without waking anyone
    pub fn reset(&self) {
        let mut flag = self.flag.lock().unwrap();
        *flag = false;
    }

    /// Block until the permit is available, then consume it.
    ///
    /// Loops on the condvar so spurious wakeups cannot consume a permit that
    /// was never stored.
    pub fn wait(&self) {
        let mut flag = self.flag.lock().unwrap();
        while !*flag {
            flag = self.signal.wait(flag).unwrap();
        }
        *flag = false;
    }

    /// Consume the permit if available, without blocking
    pub fn try_wait(&self) -> bool {
        let mut flag = self.flag.lock().unwrap();
        let was_set = *flag;
        *flag = false;
        was_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pre_signaled_wait_returns_immediately() {
        let event = AutoResetEvent::new(true);
        event.wait();
        // The permit was consumed; a second wait would block.
        assert!(!event.try_wait());
    }

    #[test]
    fn test_set_wakes_exactly_one_permit() {
        let event = AutoResetEvent::new(false);
        event.set();
        event.set();
        assert!(event.try_wait());
        assert!(!event.try_wait(), "single-slot latch stored two permits");
    }

    #[test]
    fn test_cross_thread_handoff() {
        let event = Arc::new(AutoResetEvent::new(false));
        let observed = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let event = Arc::clone(&event);
            let observed = Arc::clone(&observed);
            thread::spawn(move || {
                event.wait();
                observed.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(10));
        assert_eq!(observed.load(Ordering::SeqCst), 0);
        event.set();
        waiter.join().unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strict_alternation_between_two_latches() {
        // The two-latch handshake must serialize the "steps" of a worker
        // against the grants of an orchestrator even when the grants are
        // issued back-to-back.
        let can_run = Arc::new(AutoResetEvent::new(false));
        let finished = Arc::new(AutoResetEvent::new(true));
        let in_step = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let worker = {
            let can_run = Arc::clone(&can_run);
            let finished = Arc::clone(&finished);
            let in_step = Arc::clone(&in_step);
            let max_concurrent = Arc::clone(&max_concurrent);
            thread::spawn(move || {
                for _ in 0..100 {
                    can_run.wait();
                    let active = in_step.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(active, Ordering::SeqCst);
                    thread::yield_now();
                    in_step.fetch_sub(1, Ordering::SeqCst);
                    finished.set();
                }
            })
        };

        for _ in 0..100 {
            finished.wait();
            can_run.set();
        }
        finished.wait();
        worker.join().unwrap();
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }
}
