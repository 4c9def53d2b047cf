// Cancellation guarantees of the task scheduler.

use sonar_core::{CancelToken, TaskScheduler};

#[test]
fn cancel_is_idempotent() {
    let mut sched = TaskScheduler::new();
    let token = sched.schedule_repeating(0.0, 50.0, 1u32);
    assert!(sched.cancel(token));
    assert!(!sched.cancel(token));
    assert!(sched.advance(1_000.0).is_empty());
}

#[test]
fn canceling_an_unknown_token_is_harmless() {
    let mut sched: TaskScheduler<u32> = TaskScheduler::new();
    let live = sched.schedule_once(0.0, 10.0, 5);
    let other = sched.schedule_once(0.0, 10.0, 6);
    sched.cancel(other);
    sched.cancel(other);
    assert!(sched.is_scheduled(live));
    assert_eq!(sched.advance(10.0)[0].payload, 5);
}

#[test]
fn cancel_where_drops_matching_payloads() {
    let mut sched = TaskScheduler::new();
    sched.schedule_repeating(0.0, 100.0, ('a', 1));
    sched.schedule_once(0.0, 10.0, ('a', 2));
    sched.schedule_once(0.0, 10.0, ('b', 3));
    assert_eq!(sched.cancel_where(|(owner, _)| *owner == 'a'), 2);
    let fired = sched.advance(500.0);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].payload, ('b', 3));
}

#[test]
fn tokens_are_never_reused() {
    let mut sched = TaskScheduler::new();
    let mut seen: Vec<CancelToken> = Vec::new();
    for i in 0..10 {
        let t = sched.schedule_once(0.0, 1.0, i);
        sched.cancel(t);
        assert!(!seen.contains(&t));
        seen.push(t);
    }
}

#[test]
fn degenerate_periods_are_bounded() {
    let mut sched = TaskScheduler::new();
    sched.schedule_repeating(0.0, 0.0, ());
    sched.schedule_repeating(0.0, f64::NAN, ());
    assert!(sched.advance(0.5).is_empty());
    assert_eq!(sched.advance(1.0).len(), 2);
}
