use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread,
};

use crate::{Primitive, memoize};

#[test]
fn repeated_argument_computes_once() {
    let runs = AtomicU32::new(0);
    let double = memoize(|n: i64| {
        runs.fetch_add(1, Ordering::SeqCst);
        n * 2
    });

    assert_eq!(double.call(3), 6);
    assert_eq!(double.call(3), 6);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn distinct_arguments_get_distinct_slots() {
    let runs = AtomicU32::new(0);
    let square = memoize(|n: u64| {
        runs.fetch_add(1, Ordering::SeqCst);
        n * n
    });

    assert_eq!(square.call(2), 4);
    assert_eq!(square.call(3), 9);
    assert_eq!(square.call(2), 4);

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(square.len(), 2);
    assert!(square.contains(&2));
    assert!(square.contains(&3));
    assert!(!square.contains(&4));
}

#[test]
fn every_argument_participates_in_the_key() {
    let runs = AtomicU32::new(0);
    let concat = memoize(|(a, b): (String, String)| {
        runs.fetch_add(1, Ordering::SeqCst);
        format!("{a}{b}")
    });

    assert_eq!(concat.call(("ab".into(), "c".into())), "abc");
    assert_eq!(concat.call(("a".into(), "bc".into())), "abc");
    assert_eq!(concat.call(("ab".into(), "c".into())), "abc");

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(concat.len(), 2);
}

#[test]
fn argument_order_matters() {
    let sub = memoize(|(a, b): (i32, i32)| a - b);

    assert_eq!(sub.call((5, 3)), 2);
    assert_eq!(sub.call((3, 5)), -2);
}

#[test]
fn integer_one_and_string_one_do_not_collide() {
    let runs = AtomicU32::new(0);
    let describe = memoize(|p: Primitive| {
        runs.fetch_add(1, Ordering::SeqCst);
        format!("{p:?}")
    });

    let int = describe.call(Primitive::Int(1));
    let string = describe.call(Primitive::from("1"));

    assert_eq!(int, "Int(1)");
    assert_eq!(string, "Str(\"1\")");
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(describe.len(), 2);
}

#[test]
fn primitive_keys_are_type_tagged_and_exact() {
    assert_ne!(Primitive::Bool(true), Primitive::Int(1));
    assert_ne!(Primitive::Int(1), Primitive::Float(1.0));
    assert_eq!(Primitive::Float(f64::NAN), Primitive::Float(f64::NAN));
    assert_ne!(Primitive::Float(0.0), Primitive::Float(-0.0));
    assert_eq!(Primitive::from(7i64), Primitive::Int(7));
    assert_eq!(Primitive::from("x".to_string()), Primitive::from("x"));
}

#[test]
fn empty_until_first_call() {
    let identity = memoize(|s: &'static str| s);

    assert!(identity.is_empty());
    identity.call("a");
    assert!(!identity.is_empty());
}

#[test]
fn panic_inserts_nothing_and_retries_next_call() {
    let runs = AtomicU32::new(0);
    let flaky = memoize(|n: u32| {
        if runs.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first attempt fails");
        }
        n + 1
    });

    let first = panic::catch_unwind(AssertUnwindSafe(|| flaky.call(1)));
    assert!(first.is_err());
    assert!(flaky.is_empty());

    assert_eq!(flaky.call(1), 2);
    assert_eq!(flaky.call(1), 2);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_callers_share_one_stored_value() {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    let slow = Arc::new(memoize(move |n: u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        (0..=n).sum::<u64>()
    }));

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let slow = Arc::clone(&slow);

            thread::spawn(move || {
                for n in 0..50 {
                    assert_eq!(slow.call(n), n * (n + 1) / 2, "thread {i}");
                }
            })
        })
        .collect();

    for t in threads {
        t.join().expect("thread panicked");
    }

    assert_eq!(slow.len(), 50);
    // Racing misses may compute twice, never more than once per thread per key.
    let runs = runs.load(Ordering::SeqCst);
    assert!((50..=400).contains(&runs), "runs: {runs}");
}
