//! Random number generation.
//!
//! Grounded on the teacher's `common::rng` module: a thin [`CryptoRng`] +
//! [`RngCore`] wrapper around `ring`'s system RNG, so downstream crates can be
//! generic over "some secure RNG" without depending on `ring` directly.

use std::num::NonZeroU32;

pub use rand_core::{CryptoRng, RngCore};
use ring::rand::SecureRandom;

const RAND_ERROR_CODE: NonZeroU32 =
    match NonZeroU32::new(rand_core::Error::CUSTOM_START) {
        Some(n) => n,
        None => panic!("rand_core::Error::CUSTOM_START must be nonzero"),
    };

/// A succinct trait alias for a cryptographically secure PRNG.
pub trait Crng: RngCore + CryptoRng {}

impl<R: RngCore + CryptoRng> Crng for R {}

/// A compatibility wrapper so we can use `ring`'s PRG with `rand_core` traits.
#[derive(Clone, Debug, Default)]
pub struct SysRng(ring::rand::SystemRandom);

impl SysRng {
    pub fn new() -> Self {
        Self(ring::rand::SystemRandom::new())
    }
}

/// `ring::rand::SystemRandom` is a cryptographically secure PRG.
impl CryptoRng for SysRng {}

impl RngCore for SysRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest)
            .expect("ring SystemRandom failed")
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0
            .fill(dest)
            .map_err(|_| rand_core::Error::from(RAND_ERROR_CODE))
    }
}

/// Fill a fixed-size array with cryptographically secure random bytes.
pub fn gen_bytes<const N: usize>(rng: &mut impl Crng) -> [u8; N] {
    let mut out = [0u8; N];
    rng.fill_bytes(&mut out);
    out
}
