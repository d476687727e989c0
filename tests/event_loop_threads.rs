//! Threading tests for the event loop.
//!
//! Exercises the real producer thread, the pause handshake and blocking
//! waits across threads. No terminal involved: sources are closures.
//!
//! Run with: cargo test --test event_loop_threads -- --nocapture

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use spark_events::{
    Event, EventError, EventLoop, EventSink, EventType, JoyAxisEvent, PushOutcome, StateRequest,
    UserEvent,
};

// =============================================================================
// HELPERS
// =============================================================================

fn code(event: &Event) -> i32 {
    match event {
        Event::User(UserEvent { code, .. }) => *code,
        other => panic!("expected user event, got {:?}", other),
    }
}

/// Source that pushes user events 0..limit, one per pump.
fn counting_source(
    limit: usize,
    pumps: Arc<AtomicUsize>,
) -> impl FnMut(&EventSink<'_>) + Send + 'static {
    let mut next = 0;
    move |sink: &EventSink<'_>| {
        pumps.fetch_add(1, Ordering::SeqCst);
        if next < limit {
            if let Ok(PushOutcome::Accepted) = sink.push(Event::user(EventType::USER, next as i32)) {
                next += 1;
            }
        }
    }
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

// =============================================================================
// BACKGROUND PRODUCER
// =============================================================================

#[test]
fn test_background_producer_delivers_in_order() {
    let pumps = Arc::new(AtomicUsize::new(0));
    let event_loop = EventLoop::default().with_source(counting_source(20, pumps.clone()));
    event_loop.start(true).unwrap();
    assert!(event_loop.event_thread_id().is_some());

    let mut received = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while received.len() < 20 && Instant::now() < deadline {
        if let Some(event) = event_loop.wait_timeout(Duration::from_millis(100)).unwrap() {
            received.push(code(&event));
        }
    }

    assert_eq!(received, (0..20).collect::<Vec<_>>());
    assert!(pumps.load(Ordering::SeqCst) >= 20);
    event_loop.stop();
}

#[test]
fn test_restart_spawns_fresh_producer() {
    let pumps = Arc::new(AtomicUsize::new(0));
    let event_loop = EventLoop::default().with_source(counting_source(0, pumps.clone()));

    event_loop.start(true).unwrap();
    let first = event_loop.event_thread_id().unwrap();
    event_loop.push(Event::Quit).unwrap();

    event_loop.start(true).unwrap();
    let second = event_loop.event_thread_id().unwrap();
    assert_ne!(first, second);
    assert_eq!(event_loop.poll().unwrap(), None);

    event_loop.start(false).unwrap();
    assert!(event_loop.event_thread_id().is_none());

    let settled = pumps.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(pumps.load(Ordering::SeqCst), settled);
}

// =============================================================================
// PAUSE HANDSHAKE
// =============================================================================

#[test]
fn test_lock_event_thread_freezes_producer() {
    let pumps = Arc::new(AtomicUsize::new(0));
    let event_loop = EventLoop::default().with_source(counting_source(0, pumps.clone()));
    event_loop.start(true).unwrap();

    assert!(wait_until(Duration::from_secs(2), || pumps.load(Ordering::SeqCst) > 3));

    {
        let pause = event_loop.lock_event_thread();
        assert!(pause.is_held());
        let frozen = pumps.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(pumps.load(Ordering::SeqCst), frozen);
    }

    let resumed_from = pumps.load(Ordering::SeqCst);
    assert!(wait_until(Duration::from_secs(2), || pumps.load(Ordering::SeqCst) > resumed_from));
    event_loop.stop();
}

#[test]
fn test_lock_event_thread_from_producer_is_noop() {
    let held = Arc::new(AtomicUsize::new(0));
    let event_loop = Arc::new(EventLoop::default());

    // The source only has a weak link back so dropping the loop still works.
    let weak = Arc::downgrade(&event_loop);
    let seen = held.clone();
    event_loop.set_source(move |_: &EventSink<'_>| {
        if let Some(event_loop) = weak.upgrade() {
            if !event_loop.lock_event_thread().is_held() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }
    });
    event_loop.start(true).unwrap();

    assert!(wait_until(Duration::from_secs(2), || held.load(Ordering::SeqCst) > 0));
    event_loop.stop();
}

#[test]
fn test_stop_while_paused_does_not_hang() {
    let pumps = Arc::new(AtomicUsize::new(0));
    let event_loop = Arc::new(EventLoop::default().with_source(counting_source(0, pumps)));
    event_loop.start(true).unwrap();

    let pause = event_loop.lock_event_thread();
    let stopper = {
        let event_loop = event_loop.clone();
        thread::spawn(move || event_loop.stop())
    };
    stopper.join().unwrap();
    drop(pause);
    assert!(!event_loop.is_active());
}

// =============================================================================
// BLOCKING WAITS
// =============================================================================

#[test]
fn test_wait_timeout_on_empty_queue_waits_full_duration() {
    let event_loop = EventLoop::default();
    event_loop.start(false).unwrap();

    let start = Instant::now();
    let event = event_loop.wait_timeout(Duration::from_millis(50)).unwrap();
    let elapsed = start.elapsed();

    assert!(event.is_none());
    assert!(elapsed >= Duration::from_millis(50), "returned early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(1), "overslept: {:?}", elapsed);
}

#[test]
fn test_wait_wakes_on_cross_thread_push() {
    let event_loop = Arc::new(EventLoop::default());
    event_loop.start(false).unwrap();

    let pusher = {
        let event_loop = event_loop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            event_loop.push(Event::user(EventType::USER, 9)).unwrap()
        })
    };

    let event = event_loop.wait().unwrap();
    assert_eq!(code(&event), 9);
    assert_eq!(pusher.join().unwrap(), PushOutcome::Accepted);
}

#[test]
fn test_stop_unblocks_wait_with_error() {
    let event_loop = Arc::new(EventLoop::default());
    event_loop.start(false).unwrap();

    let waiter = {
        let event_loop = event_loop.clone();
        thread::spawn(move || event_loop.wait())
    };

    thread::sleep(Duration::from_millis(20));
    event_loop.stop();
    let result = waiter.join().unwrap();
    assert!(matches!(result, Err(EventError::Inactive)));
}

// =============================================================================
// CONCURRENT PRODUCERS
// =============================================================================

#[test]
fn test_concurrent_pushers_keep_per_thread_order() {
    let event_loop = Arc::new(EventLoop::default());
    event_loop.start(false).unwrap();

    let pushers: Vec<_> = (0..2)
        .map(|t| {
            let event_loop = event_loop.clone();
            thread::spawn(move || {
                for n in 0..50 {
                    let mut ev = UserEvent::new(EventType::USER, n);
                    ev.window_id = t;
                    event_loop.push(Event::User(ev)).unwrap();
                }
            })
        })
        .collect();
    for pusher in pushers {
        pusher.join().unwrap();
    }

    let mut per_thread: [Vec<i32>; 2] = [Vec::new(), Vec::new()];
    while let Some(Event::User(ev)) = event_loop.poll().unwrap() {
        per_thread[ev.window_id as usize].push(ev.code);
    }

    for codes in &per_thread {
        assert_eq!(codes.len(), 50);
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
    }
    let stats = event_loop.stats();
    assert_eq!(stats.queued, 100);
    assert_eq!(stats.dropped, 0);
}

#[test]
fn test_register_user_events_from_many_threads() {
    let event_loop = Arc::new(EventLoop::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let event_loop = event_loop.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|_| event_loop.register_user_events(3).unwrap().code())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        for base in handle.join().unwrap() {
            for offset in 0..3 {
                assert!(codes.insert(base + offset), "overlapping range at {:#x}", base);
            }
        }
    }
    assert_eq!(codes.len(), 8 * 10 * 3);
}

// =============================================================================
// SOURCE GATING
// =============================================================================

#[test]
fn test_source_skips_disabled_device_class() {
    let polled = Arc::new(AtomicUsize::new(0));
    let event_loop = EventLoop::default();
    {
        let polled = polled.clone();
        event_loop.set_source(move |sink: &EventSink<'_>| {
            if sink.any_enabled(EventType::JOY_AXIS_MOTION, EventType::JOY_BUTTON_UP) {
                polled.fetch_add(1, Ordering::SeqCst);
                let _ = sink.push(Event::JoyAxis(JoyAxisEvent { which: 0, axis: 1, value: -200 }));
            }
        });
    }
    event_loop.start(false).unwrap();

    assert!(event_loop.poll().unwrap().is_some());
    assert_eq!(polled.load(Ordering::SeqCst), 1);

    let joystick = [
        EventType::JOY_AXIS_MOTION,
        EventType::JOY_BALL_MOTION,
        EventType::JOY_HAT_MOTION,
        EventType::JOY_BUTTON_DOWN,
        EventType::JOY_BUTTON_UP,
    ];
    for ty in joystick {
        event_loop.set_type_state(ty, StateRequest::Disable);
    }
    assert!(event_loop.poll().unwrap().is_none());
    assert_eq!(polled.load(Ordering::SeqCst), 1);
}
