//! The event loop context object and its lifecycle.
//!
//! One [`EventLoop`] owns everything the queue needs: the queue itself, the
//! filter, the source, the user event allocator and the producer gate. It is
//! shared with the background producer thread through an `Arc`, so several
//! independent loops can coexist in one process.
//!
//! # Lifecycle
//!
//! ```text
//!   new ──► start(threaded) ──► ... dispatch ... ──► stop ──► start ...
//!             │                                        │
//!             │ stop() first, clear filter,            │ join producer,
//!             │ disable SYS_WM, spawn producer         │ reset queue + type table
//! ```
//!
//! `stop` is idempotent and runs on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

use crate::config::EventLoopConfig;
use crate::error::{EventError, Result};
use crate::event::Event;
use crate::pipeline::dispatch::{EventFilter, PushOutcome};
use crate::pipeline::gate::{ProducerGate, ProducerPause};
use crate::pipeline::producer::Producer;
use crate::pipeline::source::{EventSink, EventSource, NullSource};
use crate::pipeline::wake::Arrivals;
use crate::queue::stats::Counters;
use crate::queue::{Enqueue, EventQueue};
use crate::state::{StateRequest, UserEventAllocator};
use crate::types::EventType;

// =============================================================================
// Shared State
// =============================================================================

/// State reachable from both the consumer and the producer thread.
pub(crate) struct Shared {
    pub config: EventLoopConfig,
    pub active: AtomicBool,
    /// A background producer owns pumping.
    pub threaded: AtomicBool,
    pub queue: Mutex<EventQueue>,
    pub filter: RwLock<Option<EventFilter>>,
    pub source: Mutex<Box<dyn EventSource>>,
    pub user_events: UserEventAllocator,
    pub counters: Counters,
    pub arrivals: Arrivals,
    pub gate: ProducerGate,
}

impl Shared {
    fn new(config: EventLoopConfig, source: Box<dyn EventSource>) -> Self {
        Self {
            config,
            active: AtomicBool::new(false),
            threaded: AtomicBool::new(false),
            queue: Mutex::new(EventQueue::new()),
            filter: RwLock::new(None),
            source: Mutex::new(source),
            user_events: UserEventAllocator::new(),
            counters: Counters::default(),
            arrivals: Arrivals::new(),
            gate: ProducerGate::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Lock the queue for a dispatch operation.
    ///
    /// Fails with `Inactive` outside a start/stop window and with
    /// `LockTimeout` when the mutex stays contended past the configured
    /// bound. Neither is retried here.
    pub fn lock_queue(&self) -> Result<MutexGuard<'_, EventQueue>> {
        if !self.is_active() {
            return Err(EventError::Inactive);
        }
        match self.queue.try_lock_for(self.config.lock_timeout) {
            Some(guard) => Ok(guard),
            None => {
                warn!("couldn't lock event queue within {:?}", self.config.lock_timeout);
                Err(EventError::LockTimeout)
            }
        }
    }

    /// Run the source once.
    pub fn pump_source(&self) {
        let sink = EventSink::new(self);
        self.source.lock().pump(&sink);
    }

    /// Type state gate, then filter, then enqueue.
    ///
    /// The type state is checked again under the lock at enqueue time, so a
    /// disable that lands while the filter runs still wins.
    pub fn push(&self, event: Event) -> Result<PushOutcome> {
        if self.lock_queue()?.type_state(event.event_type()).is_disabled() {
            self.counters.add_disabled();
            return Ok(PushOutcome::Disabled);
        }

        let filter = self.filter.read().clone();
        if let Some(filter) = filter {
            if !filter(&event) {
                self.counters.add_filtered();
                return Ok(PushOutcome::Filtered);
            }
        }

        let outcome = self.lock_queue()?.enqueue(event);
        Ok(self.record(outcome))
    }

    /// Count an enqueue attempt and wake waiters on success.
    pub fn record(&self, outcome: Enqueue) -> PushOutcome {
        match outcome {
            Enqueue::Added => {
                self.counters.add_queued(1);
                self.arrivals.notify();
                PushOutcome::Accepted
            }
            Enqueue::Full => {
                self.counters.add_dropped(1);
                PushOutcome::Dropped
            }
            Enqueue::Disabled => {
                self.counters.add_disabled();
                PushOutcome::Disabled
            }
        }
    }
}

// =============================================================================
// EventLoop
// =============================================================================

/// Bounded, thread-safe event queue with an optional background producer.
///
/// All methods take `&self`; wrap the loop in an `Arc` to push from other
/// threads.
pub struct EventLoop {
    pub(crate) shared: Arc<Shared>,
    producer: Mutex<Option<Producer>>,
}

impl EventLoop {
    /// Create a stopped loop with a no-op source.
    pub fn new(config: EventLoopConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, Box::new(NullSource))),
            producer: Mutex::new(None),
        }
    }

    /// Builder form of [`set_source`](Self::set_source).
    pub fn with_source<S>(self, source: S) -> Self
    where
        S: EventSource + 'static,
    {
        self.set_source(source);
        self
    }

    /// Replace the pump capability. Takes effect from the next pump.
    pub fn set_source<S>(&self, source: S)
    where
        S: EventSource + 'static,
    {
        *self.shared.source.lock() = Box::new(source);
    }

    pub fn config(&self) -> &EventLoopConfig {
        &self.shared.config
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// Whether a background producer thread currently owns pumping.
    pub fn is_threaded(&self) -> bool {
        self.shared.threaded.load(Ordering::Acquire)
    }

    /// Start (or restart) the loop.
    ///
    /// Any running loop is stopped first, the filter is cleared and, unless
    /// configured otherwise, system messages are disabled. With
    /// `event_thread` a background producer is spawned; if that fails the
    /// loop is left fully stopped.
    pub fn start(&self, event_thread: bool) -> Result<()> {
        self.stop();

        *self.shared.filter.write() = None;
        if self.shared.config.disable_sys_wm {
            self.shared
                .queue
                .lock()
                .set_type_state(EventType::SYS_WM, StateRequest::Disable);
        }
        self.shared.active.store(true, Ordering::Release);

        if event_thread {
            self.shared.gate.reset();
            self.shared.threaded.store(true, Ordering::Release);
            match Producer::spawn(self.shared.clone()) {
                Ok(producer) => {
                    self.shared.gate.arm(producer.thread_id());
                    *self.producer.lock() = Some(producer);
                }
                Err(err) => {
                    warn!("failed to spawn event thread: {}", err);
                    self.shared.active.store(false, Ordering::Release);
                    self.shared.gate.shutdown();
                    self.shared.threaded.store(false, Ordering::Release);
                    *self.shared.filter.write() = None;
                    self.shared.queue.lock().reset();
                    return Err(EventError::ThreadSpawn(err));
                }
            }
        }

        info!(threaded = event_thread, "event loop started");
        Ok(())
    }

    /// Stop the loop. Safe to call when not started.
    ///
    /// Joins the producer (unless called from it), then empties the queue,
    /// rewinds the message pool and re-enables every type. The user event
    /// allocator keeps its cursor so codes handed out stay unique.
    pub fn stop(&self) {
        let was_active = self.shared.active.swap(false, Ordering::AcqRel);
        self.shared.gate.shutdown();

        let producer = self.producer.lock().take();
        if let Some(producer) = producer {
            producer.join();
        }
        self.shared.threaded.store(false, Ordering::Release);
        self.shared.queue.lock().reset();
        // Wake anyone blocked in wait so they observe the stop.
        self.shared.arrivals.notify();

        if was_active {
            info!("event loop stopped");
        }
    }

    /// Id of the background producer thread while one runs.
    pub fn event_thread_id(&self) -> Option<ThreadId> {
        self.producer.lock().as_ref().map(Producer::thread_id)
    }

    /// Park the background producer between pumps until the guard drops.
    ///
    /// A no-op guard is returned when there is no producer or when called
    /// from the producer thread itself.
    pub fn lock_event_thread(&self) -> ProducerPause<'_> {
        self.shared.gate.pause()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(EventLoopConfig::default())
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Tests
// =============================================================================
