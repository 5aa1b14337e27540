// benches/profile_sort.rs
//! Latency profile for queue sort and merge.
//!
//! Each sample rebuilds a shuffled queue, then times one operation in
//! cycles. Payloads are fixed-width decimal strings so byte order matches
//! numeric order.
//!
//! Run with:
//!   cargo bench --bench profile_sort
//!
//! For best results, pin to a physical core:
//!   sudo taskset -c 2 ./target/release/deps/profile_sort-*

use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use nexus_ilist::{BoxedStorage, Element, Queue};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const WARMUP: usize = 100;
const SAMPLES: usize = 2_000;
const LEN: usize = 1_024;
const RUNS: usize = 8;

#[cfg(target_arch = "x86_64")]
#[inline]
fn rdtscp() -> u64 {
    unsafe {
        let mut aux: u32 = 0;
        core::arch::x86_64::__rdtscp(&mut aux)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn rdtscp() -> u64 {
    use std::sync::OnceLock;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

fn estimate_cpu_freq_ghz() -> f64 {
    let start_cycles = rdtscp();
    let start_time = Instant::now();
    thread::sleep(Duration::from_millis(10));
    let end_cycles = rdtscp();
    let elapsed = start_time.elapsed();
    end_cycles.wrapping_sub(start_cycles) as f64 / elapsed.as_nanos() as f64
}

fn payloads(rng: &mut StdRng) -> Vec<String> {
    let mut items: Vec<String> = (0..LEN).map(|i| format!("{i:08}")).collect();
    items.shuffle(rng);
    items
}

fn fill(queue: &mut Queue, storage: &mut BoxedStorage<Element>, items: &[String]) {
    for item in items {
        queue.insert_tail(storage, item.as_bytes()).unwrap();
    }
}

// ============================================================================
// Sort
// ============================================================================

fn profile_sort() -> Histogram<u64> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(LEN);
    let mut queue: Queue = Queue::new();
    let mut hist = Histogram::<u64>::new_with_max(100_000_000, 3).unwrap();

    for i in 0..WARMUP + SAMPLES {
        fill(&mut queue, &mut storage, &payloads(&mut rng));

        let start = rdtscp();
        queue.sort(&mut storage, false);
        let elapsed = rdtscp().wrapping_sub(start);

        black_box(queue.front(&storage));
        queue.clear(&mut storage);
        if i >= WARMUP {
            let _ = hist.record(elapsed.min(100_000_000));
        }
    }
    hist
}

// ============================================================================
// K-way merge
// ============================================================================

fn profile_merge_all() -> Histogram<u64> {
    let mut rng = StdRng::seed_from_u64(0xfeed);
    let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(LEN);
    let mut queues: Vec<Queue> = (0..RUNS).map(|_| Queue::new()).collect();
    let mut hist = Histogram::<u64>::new_with_max(100_000_000, 3).unwrap();

    for i in 0..WARMUP + SAMPLES {
        let items = payloads(&mut rng);
        for (queue, run) in queues.iter_mut().zip(items.chunks(LEN / RUNS)) {
            let mut run = run.to_vec();
            run.sort();
            fill(queue, &mut storage, &run);
        }

        let start = rdtscp();
        let merged = Queue::merge_all(&mut queues, &mut storage, false);
        let elapsed = rdtscp().wrapping_sub(start);

        assert_eq!(merged, LEN);
        queues[0].clear(&mut storage);
        if i >= WARMUP {
            let _ = hist.record(elapsed.min(100_000_000));
        }
    }
    hist
}

fn print_histogram(name: &str, hist: &Histogram<u64>, cpu_ghz: f64) {
    println!("{name} ({LEN} elements):");
    println!("  Cycles:");
    println!("    min:   {:>10}", hist.min());
    println!("    p50:   {:>10}", hist.value_at_quantile(0.50));
    println!("    p99:   {:>10}", hist.value_at_quantile(0.99));
    println!("    max:   {:>10}", hist.max());
    println!("  Microseconds:");
    println!(
        "    p50:   {:>10.1} us",
        hist.value_at_quantile(0.50) as f64 / cpu_ghz / 1_000.0
    );
    println!(
        "    p99:   {:>10.1} us",
        hist.value_at_quantile(0.99) as f64 / cpu_ghz / 1_000.0
    );
    println!();
}

fn main() {
    println!("nexus-ilist Sort Profile");
    println!("========================");
    println!();

    let cpu_ghz = estimate_cpu_freq_ghz();
    println!("Estimated CPU frequency: {cpu_ghz:.2} GHz");
    println!();

    print_histogram("sort", &profile_sort(), cpu_ghz);
    print_histogram(
        &format!("merge_all ({RUNS} runs)"),
        &profile_merge_all(),
        cpu_ghz,
    );
}
