//! Background producer thread.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  PRODUCER THREAD ("spark-events")            │
//! │  while active:                               │
//! │      source.pump(sink) ──► push ──► queue    │
//! │      gate.checkpoint(producer_delay)         │
//! │           (parked: safe to pause here)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The thread holds an `Arc` to the loop's shared state. It exits once the
//! loop goes inactive; `EventLoop::stop` shuts the gate down first so a
//! parked producer notices immediately instead of after its delay.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use tracing::{info, warn};

use crate::pipeline::event_loop::Shared;

pub(crate) struct Producer {
    handle: JoinHandle<()>,
    thread_id: ThreadId,
}

impl Producer {
    /// Spawn the producer thread with the configured name.
    pub fn spawn(shared: Arc<Shared>) -> io::Result<Self> {
        let name = shared.config.thread_name.clone();
        if name.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "event thread name contains a NUL byte",
            ));
        }
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run_loop(&shared))?;
        let thread_id = handle.thread().id();

        info!(thread = %name, "event thread spawned");
        Ok(Self { handle, thread_id })
    }

    fn run_loop(shared: &Shared) {
        while shared.is_active() {
            shared.pump_source();
            shared.gate.checkpoint(shared.config.producer_delay);
        }
        shared.gate.producer_exited();
        info!("event thread exiting");
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Wait for the thread to finish.
    ///
    /// Called from the producer itself the handle is just dropped, which
    /// detaches the thread; it exits on its next loop check.
    pub fn join(self) {
        if thread::current().id() == self.thread_id {
            return;
        }
        if self.handle.join().is_err() {
            warn!("event thread panicked");
        }
    }
}
