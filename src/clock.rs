//! Coarse process-wide clock.
//!
//! The cache consults the time on every `put` and every `get` (deadline
//! computation and expiration tests). A system-clock read per access would
//! dominate the cost of the operation, so the timestamp lives in a single
//! atomic cell that a detached ticker thread keeps roughly current:
//!
//! ```text
//!   ticker thread                           readers (any thread)
//!   ─────────────                           ────────────────────
//!   store(SystemTime)   ── once per second  coarse_now() = atomic load
//!   fetch_add(100 ms)   ── nine times in
//!                          between, every
//!                          100 ms
//! ```
//!
//! ## Guarantees
//!
//! - `coarse_now()` is a plain relaxed load: no lock, no syscall.
//! - Values are non-decreasing in practice and may lag wall time by up to
//!   ~100 ms inside a calibration window; each calibration re-aligns.
//! - The first call initializes the cell synchronously before the ticker
//!   starts, so readers never observe the zero initializer.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Once;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const STEP: Duration = Duration::from_millis(100);
const STEP_NANOS: i64 = 100_000_000;
const STEPS_PER_CALIBRATION: u32 = 9;

static COARSE: AtomicI64 = AtomicI64::new(0);
static TICKER: Once = Once::new();
static DIRECT_READS: AtomicBool = AtomicBool::new(false);

fn system_nanos() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos() as i64,
        Err(e) => -(e.duration().as_nanos() as i64),
    }
}

fn start_ticker() {
    COARSE.store(system_nanos(), Ordering::Relaxed);
    let spawned = thread::Builder::new()
        .name("shardlru-clock".into())
        .spawn(|| loop {
            COARSE.store(system_nanos(), Ordering::Relaxed);
            for _ in 0..STEPS_PER_CALIBRATION {
                thread::sleep(STEP);
                COARSE.fetch_add(STEP_NANOS, Ordering::Relaxed);
            }
            thread::sleep(STEP);
        });
    if spawned.is_err() {
        // No ticker thread available: every reader pays the syscall instead.
        DIRECT_READS.store(true, Ordering::Relaxed);
    }
}

/// Returns a coarse nanosecond timestamp (Unix epoch base).
///
/// # Example
///
/// ```
/// let a = shardlru::clock::coarse_now();
/// let b = shardlru::clock::coarse_now();
/// assert!(a > 0);
/// assert!(b >= a);
/// ```
#[inline]
pub fn coarse_now() -> i64 {
    TICKER.call_once(start_ticker);
    if DIRECT_READS.load(Ordering::Relaxed) {
        return system_nanos();
    }
    COARSE.load(Ordering::Relaxed)
}
