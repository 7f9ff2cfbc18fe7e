//! Engine pool tests
//!
//! Acquisition deadlines, slot exclusivity under concurrent renders, and the
//! unpooled mode.
//!
//! Run with:
//! ```bash
//! cargo test -p synthcast --test pool_tests
//! ```

mod helpers;

use helpers::*;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use synthcast::core::CoreError;
use synthcast::prelude::*;

#[test]
fn test_timeout_is_bounded_by_deadline_plus_backoff() {
    let timeout = Duration::from_millis(100);
    let backoff = Duration::from_millis(20);
    let host = RenderHost::builder()
        .acquire_timeout(timeout)
        .backoff(backoff)
        .factory(builtin_factory())
        .build()
        .unwrap();

    let _held = host.pool().try_acquire().unwrap().unwrap();

    let start = Instant::now();
    let result = host.render(&short_request());
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(CoreError::Timeout { .. })));
    assert!(elapsed >= timeout, "gave up early after {:?}", elapsed);
    assert!(
        elapsed < timeout + backoff + Duration::from_millis(250),
        "waited {:?}",
        elapsed
    );
}

#[test]
fn test_every_slot_busy_times_out() {
    let host = test_host_with_pool(3);
    let leases: Vec<_> = (0..3)
        .map(|_| host.pool().try_acquire().unwrap().unwrap())
        .collect();
    let slots: Vec<_> = leases.iter().map(|l| l.slot()).collect();
    assert_eq!(slots, [Some(0), Some(1), Some(2)]);

    assert!(matches!(
        host.render(&introspection_request()),
        Err(CoreError::Timeout { .. })
    ));

    drop(leases);
    assert!(host.render(&introspection_request()).is_ok());
}

#[test]
fn test_slot_released_after_failed_render() {
    let host = test_host();
    let mut bad = short_request();
    bad.container = synthcast::ContainerKind::Other("mp3".into());
    assert!(host.render(&bad).is_err());

    let slot = &host.pool().slots()[0];
    assert!(!slot.is_locked());
    assert!(host.render(&short_request()).is_ok());
}

#[test]
fn test_concurrent_renders_share_pool() {
    let host = Arc::new(
        RenderHost::builder()
            .pool_size(2)
            .acquire_timeout(Duration::from_secs(30))
            .backoff(Duration::from_millis(1))
            .factory(builtin_factory())
            .build()
            .unwrap(),
    );
    let expected = render_bytes(&host, &short_request());

    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let host = host.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                render_bytes(&host, &short_request())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_concurrent_mixed_requests_do_not_interfere() {
    let host = Arc::new(
        RenderHost::builder()
            .pool_size(1)
            .acquire_timeout(Duration::from_secs(30))
            .backoff(Duration::from_millis(1))
            .factory(builtin_factory())
            .build()
            .unwrap(),
    );
    let baseline = snapshot(&host, &introspection_request());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let host = host.clone();
            thread::spawn(move || {
                let mut request = introspection_request();
                request.preset_number = i;
                request.parameters.insert("Volume".into(), 0.1 * i as f32);
                snapshot(&host, &request)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let snap = handle.join().unwrap();
        assert!((snap.parameters["Volume"] - 0.1 * i as f32).abs() < 1e-6);
    }

    assert_eq!(snapshot(&host, &introspection_request()), baseline);
}

// =============================================================================
// Unpooled mode
// =============================================================================

#[test]
fn test_unpooled_builds_engine_per_request() {
    let (factory, built) = counting_factory();
    let host = RenderHost::builder()
        .pool_size(0)
        .factory(factory)
        .build()
        .unwrap();

    assert!(host.pool().is_unpooled());
    // Probe engine at startup.
    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert!(host.defaults().is_some());

    host.render(&introspection_request()).unwrap();
    host.render(&short_request()).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unpooled_requests_are_independent() {
    let host = Arc::new(
        RenderHost::builder()
            .pool_size(0)
            .factory(builtin_factory())
            .build()
            .unwrap(),
    );

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let host = host.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let value = i as f32 / threads as f32;
                let mut request = introspection_request();
                request.indexed_parameters.insert("2".into(), value);
                barrier.wait();
                (value, snapshot(&host, &request))
            })
        })
        .collect();

    for handle in handles {
        let (value, snap) = handle.join().unwrap();
        assert!((snap.indexed_parameters[2].value - value).abs() < 1e-6);
    }
}

#[test]
fn test_unpooled_never_times_out() {
    let host = RenderHost::builder()
        .pool_size(0)
        .acquire_timeout(Duration::ZERO)
        .factory(builtin_factory())
        .build()
        .unwrap();
    assert!(host.render(&short_request()).is_ok());
}
