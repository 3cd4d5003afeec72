use rand::{RngCore, SeedableRng};
use std::{
    fs::File,
    io::{self, Read},
};

/// Map a probability onto the u64 range, so that a single `next_u64` roll decides it
pub fn chance(p: f64) -> u64 {
    if p.is_nan() || p <= 0. {
        0
    } else if p >= 1. {
        u64::MAX
    } else {
        (p * u64::MAX as f64) as u64
    }
}

pub trait Happens: RngCore {
    /// True with probability `p`
    fn happens(&mut self, p: f64) -> bool {
        chance(p) > self.next_u64()
    }
}

impl<T: RngCore + ?Sized> Happens for T {}

/// wyrand. Small, fast, and seedable, which is all a run needs to be reproducible
#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for WyRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::seeded(state)
    }
}

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

/// A fresh seed from the OS, for runs that don't ask to be reproducible
pub fn seed() -> u64 {
    seed_urandom().unwrap_or_else(|_| rand::random())
}

pub fn default_rng() -> WyRng {
    WyRng::seeded(seed())
}

#[cfg(test)]
mod test {
    use super::*;
    use core::iter::once;

    fn assert_within_deviation(p: f64, range: f64, rng: &mut impl Happens) {
        let samples = 10_000.;
        let expected = p * samples;
        let max_deviation = expected * range;
        for _ in 0..20 {
            let incidence = once(())
                .cycle()
                .take(samples as usize)
                .filter(|()| rng.happens(p))
                .count() as f64;
            assert!(
                (expected - incidence).abs() < max_deviation,
                "{p}: {incidence} != {expected} ± {max_deviation}"
            );
        }
    }

    #[test]
    fn test_deviation_wyrand() {
        let mut rng = WyRng::seeded(seed());
        for p in [0.03, 0.05, 0.1, 0.25, 0.5, 0.75, 0.9] {
            assert_within_deviation(p, 0.33, &mut rng);
        }
    }

    #[test]
    fn test_happens_bounds() {
        let mut rng = default_rng();
        for _ in 0..10_000 {
            assert!(!rng.happens(0.));
            assert!(!rng.happens(-1.));
            assert!(!rng.happens(f64::NAN));
            assert!(rng.happens(1.));
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut l = WyRng::seed_from_u64(42);
        let mut r = WyRng::seed_from_u64(42);
        for _ in 0..1_000 {
            assert_eq!(l.next_u64(), r.next_u64());
        }
        assert_ne!(
            WyRng::seed_from_u64(1).next_u64(),
            WyRng::seed_from_u64(2).next_u64()
        );
    }

    #[test]
    fn test_fill_bytes() {
        let mut rng = WyRng::seeded(3);
        let mut dst = [0u8; 13];
        rng.fill_bytes(&mut dst);

        let mut replay = WyRng::seeded(3);
        let head = replay.next_u64().to_le_bytes();
        let tail = replay.next_u64().to_le_bytes();
        assert_eq!(&dst[..8], &head);
        assert_eq!(&dst[8..], &tail[..5]);
    }
}
