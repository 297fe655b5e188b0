// Seeded RNG for reproducible scenarios.
//
// Every credential the kit creates is derived from a TestRng, so a failing
// scenario can be replayed exactly by re-running with the same seed.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use stakemint_common::crypto::{KeyPair, SECRET_KEY_SIZE};

/// Environment variable holding a hex seed to replay.
pub const SEED_ENV_VAR: &str = "STAKEMINT_TEST_SEED";

/// Test RNG with seed for reproducibility
///
/// All scenario randomness (partner credentials, mint callers) flows through
/// TestRng. The seed is logged at creation; replay a run with:
///
/// ```text
/// STAKEMINT_TEST_SEED=0xa3f5c8e1b2d94706 cargo test test_name
/// ```
pub struct TestRng {
    inner: Mutex<StdRng>,
    seed: u64,
}

impl TestRng {
    /// Create a new TestRng with an explicit seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
            seed,
        }
    }

    /// Create RNG from `STAKEMINT_TEST_SEED` or a random seed
    ///
    /// Accepts the seed with or without a `0x` prefix. The chosen seed is
    /// logged so a failing run can be replayed.
    pub fn new_from_env_or_random() -> Self {
        let seed = std::env::var(SEED_ENV_VAR)
            .ok()
            .and_then(|s| parse_seed(&s))
            .unwrap_or_else(|| rand::thread_rng().gen());

        log::info!("TestRng seed: 0x{:016x}", seed);
        log::info!("   Replay: {}=0x{:016x} cargo test ...", SEED_ENV_VAR, seed);

        Self::with_seed(seed)
    }

    /// Get the seed used by this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random value of type T
    pub fn gen<T>(&self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.inner.lock().gen()
    }

    /// Fill a slice with random bytes
    pub fn fill_bytes(&self, dest: &mut [u8]) {
        let mut rng = self.inner.lock();
        rng.fill_bytes(dest)
    }

    /// Derive a fresh signing credential from the RNG stream
    pub fn keypair(&self) -> KeyPair {
        let mut seed = [0u8; SECRET_KEY_SIZE];
        self.fill_bytes(&mut seed);
        KeyPair::from_seed(seed)
    }
}

fn parse_seed(value: &str) -> Option<u64> {
    let trimmed = value.trim().trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).ok()
}
