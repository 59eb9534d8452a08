use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use hdrhistogram::Histogram;

use decorum::{Decorators, Primitive, WaitMs};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Decorator {
    Once,
    Memoize,
    Throttle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyDist {
    Hot,
    Uniform,
    Skewed,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "decorum-stress",
    about = "Load test harness for decorum's decorators"
)]
struct Args {
    #[arg(long, value_enum, default_value_t = Decorator::Throttle)]
    decorator: Decorator,

    #[arg(long, value_enum, default_value_t = KeyDist::Hot)]
    key_dist: KeyDist,

    #[arg(long, default_value_t = 8)]
    threads: usize,

    #[arg(long, default_value_t = 10)]
    duration_s: u64,

    /// Throttle window.
    #[arg(long, default_value_t = 100)]
    wait_ms: u64,

    /// Distinct memoize keys for `uniform` and `skewed`.
    #[arg(long, default_value_t = 100_000)]
    key_space: u64,

    #[arg(long, default_value_t = 0.8)]
    hot_fraction: f64,

    #[arg(long, default_value_t = 100)]
    sample_every: u64,
}

#[derive(Default)]
struct Counts {
    calls: AtomicU64,
    body_runs: AtomicU64,
}

fn should_sample(iter: u64, sample_every: u64) -> bool {
    if sample_every <= 1 {
        return true;
    }

    iter.is_multiple_of(sample_every)
}

fn pick_key(args: &Args, thread_rng: &mut impl FnMut() -> u64) -> i64 {
    let key_space = args.key_space.max(1);

    let key = match args.key_dist {
        KeyDist::Hot => 0,
        KeyDist::Uniform => thread_rng() % key_space,
        KeyDist::Skewed => {
            let r = (thread_rng() % 10_000) as f64 / 10_000.0;
            if r < args.hot_fraction {
                0
            } else {
                1 + thread_rng() % key_space.saturating_sub(1).max(1)
            }
        }
    };

    key as i64
}

fn print_results(args: &Args, elapsed: Duration, hist: &Histogram<u64>, counts: &Counts) {
    let calls = counts.calls.load(Ordering::Relaxed);
    let body_runs = counts.body_runs.load(Ordering::Relaxed);

    println!("decorator={:?} key_dist={:?}", args.decorator, args.key_dist);
    println!(
        "threads={} duration_s={} wait_ms={} key_space={}",
        args.threads, args.duration_s, args.wait_ms, args.key_space
    );
    println!(
        "elapsed_s={:.3} calls={} calls_per_s={:.0} body_runs={}",
        elapsed.as_secs_f64(),
        calls,
        calls as f64 / elapsed.as_secs_f64(),
        body_runs
    );

    if args.decorator == Decorator::Throttle {
        let windows = elapsed.as_millis() as u64 / args.wait_ms.max(1) + 1;
        println!("max_expected_body_runs={}", windows + 1);
    }

    if !hist.is_empty() {
        println!(
            "lat_ns p50={} p95={} p99={} p999={} max={}",
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.95),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.max()
        );
        println!("sample_every={} samples={}", args.sample_every, hist.len());
    } else {
        println!("no latency samples collected");
    }
}

fn main() {
    let args = Args::parse();
    let wait = WaitMs::try_from(args.wait_ms).unwrap();
    let decorators = Decorators::with_thread_scheduler().unwrap();

    let counts = Arc::new(Counts::default());

    let body_counts = Arc::clone(&counts);
    let gate = Arc::new(decorators.once(move |()| {
        body_counts.body_runs.fetch_add(1, Ordering::Relaxed);
        1_u64
    }));

    let body_counts = Arc::clone(&counts);
    let cache = Arc::new(decorators.memoize(move |key: Primitive| {
        body_counts.body_runs.fetch_add(1, Ordering::Relaxed);
        match key {
            Primitive::Int(n) => n.wrapping_mul(31),
            _ => 0,
        }
    }));

    let body_counts = Arc::clone(&counts);
    let throttled = Arc::new(decorators.throttle(
        move |()| body_counts.body_runs.fetch_add(1, Ordering::Relaxed),
        wait,
    ));

    let stop = Arc::new(AtomicBool::new(false));
    let started = Instant::now();
    let deadline = started + Duration::from_secs(args.duration_s);

    let mut handles = Vec::with_capacity(args.threads);
    for t in 0..args.threads {
        let args = args.clone();
        let stop = Arc::clone(&stop);
        let counts = Arc::clone(&counts);
        let gate = Arc::clone(&gate);
        let cache = Arc::clone(&cache);
        let throttled = Arc::clone(&throttled);

        handles.push(std::thread::spawn(move || {
            let mut hist = Histogram::<u64>::new_with_bounds(1, 60_000_000_000, 3).unwrap();
            let mut i = 0_u64;
            let mut seed = (t as u64 + 1) * 0x9E37_79B9_7F4A_7C15;

            let mut rng_u64 = || {
                // xorshift64*
                seed ^= seed >> 12;
                seed ^= seed << 25;
                seed ^= seed >> 27;
                seed = seed.wrapping_mul(0x2545_F491_4F6C_DD1D);
                seed
            };

            while !stop.load(Ordering::Relaxed) && Instant::now() < deadline {
                i = i.wrapping_add(1);
                let key = match args.decorator {
                    Decorator::Memoize => pick_key(&args, &mut rng_u64),
                    Decorator::Once | Decorator::Throttle => 0,
                };
                let sample = should_sample(i, args.sample_every);
                let t0 = if sample { Some(Instant::now()) } else { None };

                match args.decorator {
                    Decorator::Once => {
                        std::hint::black_box(gate.call(()));
                    }
                    Decorator::Memoize => {
                        std::hint::black_box(cache.call(Primitive::Int(key)));
                    }
                    Decorator::Throttle => {
                        std::hint::black_box(throttled.call(()));
                    }
                }

                if let Some(t0) = t0 {
                    let ns = t0.elapsed().as_nanos() as u64;
                    let _ = hist.record(ns.max(1));
                }

                counts.calls.fetch_add(1, Ordering::Relaxed);
            }

            hist
        }));
    }

    std::thread::sleep(Duration::from_secs(args.duration_s));
    stop.store(true, Ordering::Relaxed);

    let mut merged = Histogram::<u64>::new_with_bounds(1, 60_000_000_000, 3).unwrap();
    for h in handles {
        let hist = h.join().unwrap();
        merged.add(&hist).unwrap();
    }

    // Let the trailing throttle run land before reading counters.
    std::thread::sleep(Duration::from_millis(args.wait_ms.saturating_mul(2)));

    print_results(&args, started.elapsed(), &merged, &counts);
}
