use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use crate::{ManualScheduler, Scheduler, ThreadScheduler};

fn push(order: &Arc<Mutex<Vec<u32>>>, value: u32) -> crate::Task {
    let order = Arc::clone(order);
    Box::new(move || order.lock().unwrap().push(value))
}

#[test]
fn manual_clock_starts_at_zero_and_moves_only_when_advanced() {
    let scheduler = ManualScheduler::new();
    assert_eq!(scheduler.now(), Duration::ZERO);

    scheduler.advance(Duration::from_millis(250));
    assert_eq!(scheduler.now(), Duration::from_millis(250));
}

#[test]
fn manual_deadlines_are_relative_to_registration_time() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    scheduler.advance(Duration::from_millis(100));
    scheduler.schedule(push(&order, 1), Duration::from_millis(50));

    assert_eq!(scheduler.advance(Duration::from_millis(49)), 0);
    assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
    assert_eq!(scheduler.now(), Duration::from_millis(150));
}

#[test]
fn manual_task_scheduled_by_task_fires_within_same_advance() {
    let scheduler = Arc::new(ManualScheduler::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let inner_scheduler = Arc::clone(&scheduler);
    let inner_order = Arc::clone(&order);
    scheduler.schedule(
        Box::new(move || {
            inner_order.lock().unwrap().push(1);
            inner_scheduler.schedule(push(&inner_order, 2), Duration::from_millis(10));
        }),
        Duration::from_millis(10),
    );

    assert_eq!(scheduler.advance(Duration::from_millis(20)), 2);
    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn manual_run_until_idle_reports_fired_count() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    scheduler.schedule(push(&order, 3), Duration::from_secs(3));
    scheduler.schedule(push(&order, 1), Duration::from_secs(1));
    scheduler.schedule(push(&order, 2), Duration::from_secs(2));

    assert_eq!(scheduler.pending_tasks(), 3);
    assert_eq!(scheduler.run_until_idle(), 3);
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(scheduler.now(), Duration::from_secs(3));
    assert_eq!(scheduler.run_until_idle(), 0);
}

#[test]
fn thread_scheduler_runs_tasks_in_deadline_order() {
    let scheduler = ThreadScheduler::new().unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    scheduler.schedule(push(&order, 3), Duration::from_millis(90));
    scheduler.schedule(push(&order, 1), Duration::from_millis(10));
    scheduler.schedule(push(&order, 2), Duration::from_millis(50));

    thread::sleep(Duration::from_millis(250));

    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(scheduler.pending_tasks(), 0);
}

#[test]
fn thread_scheduler_never_runs_before_deadline() {
    let scheduler = ThreadScheduler::new().unwrap();
    let runs = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&runs);
    scheduler.schedule(
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(200),
    );

    thread::sleep(Duration::from_millis(50));
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    thread::sleep(Duration::from_millis(300));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

fn explode() {
    panic!("task failed");
}

#[test]
fn thread_scheduler_survives_a_panicking_task() {
    let scheduler = ThreadScheduler::new().unwrap();
    let runs = Arc::new(AtomicU32::new(0));

    scheduler.schedule(Box::new(explode), Duration::ZERO);

    let counter = Arc::clone(&runs);
    scheduler.schedule(
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(20),
    );

    thread::sleep(Duration::from_millis(200));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn dropped_thread_scheduler_discards_pending_timers() {
    let scheduler = ThreadScheduler::new().unwrap();
    let runs = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&runs);
    scheduler.schedule(
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(100),
    );

    drop(scheduler);
    thread::sleep(Duration::from_millis(250));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn thread_scheduler_accepts_an_unrepresentable_delay() {
    let scheduler = ThreadScheduler::new().unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    scheduler.schedule(push(&order, 9), Duration::MAX);
    scheduler.schedule(push(&order, 1), Duration::from_millis(10));

    thread::sleep(Duration::from_millis(150));

    assert_eq!(*order.lock().unwrap(), vec![1]);
    assert_eq!(scheduler.pending_tasks(), 1);
}

#[test]
fn manual_scheduler_saturates_an_unrepresentable_delay() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    scheduler.schedule(push(&order, 9), Duration::MAX);
    assert_eq!(scheduler.advance(Duration::from_secs(3600)), 0);
    assert_eq!(scheduler.pending_tasks(), 1);
}
