//! Background simulation thread and the frame handshake
//!
//! One dedicated thread steps the physics world. Coordination with the
//! orchestrator uses two single-permit latches: `can_run` (initially unset)
//! grants the thread permission to take one step, `finished` (initially set,
//! so the first frame never blocks) reports that the previous step is done.
//! Because each latch holds at most one permit, steps can never pile up or
//! overlap: the worst case for the orchestrator is waiting out one full step.
//!
//! The step delta is published as atomic f32 bits before the grant, so the
//! thread never reads a frame clock that the orchestrator is ticking.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::foundation::logging::{debug, warn};
use crate::foundation::sync::AutoResetEvent;
use crate::physics::PhysicsHandle;

struct SimulationShared {
    can_run: AutoResetEvent,
    finished: AutoResetEvent,
    should_quit: AtomicBool,
    /// f32 bit pattern of the granted step delta
    delta_bits: AtomicU32,
    steps_completed: AtomicU64,
}

/// Owns the background stepping thread and its half of the handshake
pub struct SimulationThread {
    shared: Arc<SimulationShared>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationThread {
    /// Spawn the stepping thread over a shared physics world
    pub fn spawn(physics: PhysicsHandle) -> Self {
        let shared = Arc::new(SimulationShared {
            can_run: AutoResetEvent::new(false),
            finished: AutoResetEvent::new(true),
            should_quit: AtomicBool::new(false),
            delta_bits: AtomicU32::new(0),
            steps_completed: AtomicU64::new(0),
        });

        let worker = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("simulation".into())
            .spawn(move || {
                loop {
                    worker.can_run.wait();
                    if worker.should_quit.load(Ordering::Acquire) {
                        break;
                    }
                    let dt = f32::from_bits(worker.delta_bits.load(Ordering::Acquire));
                    physics.lock().step(dt);
                    worker.steps_completed.fetch_add(1, Ordering::Release);
                    worker.finished.set();
                }
                debug!("simulation thread exiting");
            })
            // Thread spawning only fails when the process is out of
            // resources; there is nothing useful to do but surface it.
            .unwrap_or_else(|err| panic!("failed to spawn simulation thread: {err}"));

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Block until the previously granted step has completed. Returns
    /// immediately on the first frame (the latch starts set) and whenever
    /// the step already finished.
    pub fn wait_step_complete(&self) {
        self.shared.finished.wait();
    }

    /// Publish the frame delta and grant the thread one simulation step
    pub fn grant_step(&self, delta: f32) {
        self.shared
            .delta_bits
            .store(delta.to_bits(), Ordering::Release);
        self.shared.can_run.set();
    }

    /// Total steps the thread has completed
    pub fn steps_completed(&self) -> u64 {
        self.shared.steps_completed.load(Ordering::Acquire)
    }

    /// Stop and join the thread. Idempotent; also runs on drop. The quit
    /// flag is raised before a final grant so the thread observes it even
    /// while parked.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shared.should_quit.store(true, Ordering::Release);
        self.shared.can_run.set();
        if handle.join().is_err() {
            warn!("simulation thread panicked before shutdown");
        }
    }
}

impl Drop for SimulationThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
