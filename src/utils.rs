use crate::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

/// Environment variable mirroring the last seed handed to `set_random_seed`,
/// so child processes can pick it up.
pub const HASH_SEED_ENV: &str = "NNBUILD_HASH_SEED";

static DETERMINISTIC: AtomicBool = AtomicBool::new(false);
static BENCHMARK: AtomicBool = AtomicBool::new(false);

fn rng() -> &'static Mutex<StdRng> {
    static RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();
    RNG.get_or_init(|| Mutex::new(StdRng::from_entropy()))
}

/// Run `f` with the process RNG. Every random draw in the crate goes through
/// here, which is what makes `set_random_seed` effective.
pub fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    let mut guard = rng().lock().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
}

/// Seed the process RNG so that two runs with the same seed produce identical
/// draws. Also publishes the seed through `HASH_SEED_ENV`, sets the
/// deterministic-kernel flag to `deterministic` and always disables
/// auto-tuning/benchmark mode.
pub fn set_random_seed(seed: u64, deterministic: bool) {
    with_rng(|rng| *rng = StdRng::seed_from_u64(seed));
    std::env::set_var(HASH_SEED_ENV, seed.to_string());
    DETERMINISTIC.store(deterministic, Ordering::SeqCst);
    BENCHMARK.store(false, Ordering::SeqCst);
}

/// Whether the backend is restricted to reproducible kernel choices.
pub fn deterministic() -> bool {
    DETERMINISTIC.load(Ordering::SeqCst)
}

/// Whether auto-tuning/benchmark mode is on. `set_random_seed` always turns
/// this off.
pub fn benchmark() -> bool {
    BENCHMARK.load(Ordering::SeqCst)
}

/// Uniform random array drawn from the process RNG. The bounds must form a
/// non-empty interval; `Uniform::new` would panic on an inverted one.
pub fn random_uniform<Sh>(shape: Sh, low: f64, high: f64) -> Result<Array2<f64>>
where
    Sh: ShapeBuilder<Dim = Ix2>,
{
    if !(low < high) {
        return Err(BuildError::InvalidParameter(format!(
            "uniform bounds must satisfy low < high, got {} and {}",
            low, high
        )));
    }
    Ok(with_rng(|rng| {
        Array2::random_using(shape, Uniform::new(low, high), rng)
    }))
}

#[macro_export]
macro_rules! rand_array {
    ($($x:expr),*) => {
        {
            $crate::utils::random_uniform(($($x,)*), -3., 3.)
        }
    };
}

// Tests that draw from the process RNG serialize on this lock so a reseed
// and the draws that follow it are not interleaved with other tests' draws.
#[cfg(test)]
pub(crate) fn rng_test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
