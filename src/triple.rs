//! Beaver triples and the correlated-randomness source that deals them.
//!
//! A triple `(a, b, c)` with `c = a AND b` masks one AND gate: the parties open
//! `x ⊕ a` and `y ⊕ b` instead of their real shares, so nothing about `x` or `y`
//! leaks. Each triple must be consumed exactly once; reuse breaks the masking.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{error::Error, runtime::PtoState};

/// One party's share of a correlated triple, `num` bits per component.
///
/// Across both parties the components reconstruct to plaintexts satisfying
/// `c = a AND b`; a single share reveals nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaverTriple {
    /// Share of the random mask for the left operand.
    pub a: Vec<u8>,
    /// Share of the random mask for the right operand.
    pub b: Vec<u8>,
    /// Share of the product `a AND b`.
    pub c: Vec<u8>,
    /// The number of bits per component.
    pub num: usize,
}

impl BeaverTriple {
    /// Creates a triple share, validating that each component packs `num` bits.
    pub fn new(a: Vec<u8>, b: Vec<u8>, c: Vec<u8>, num: usize) -> Result<Self, Error> {
        if num == 0 {
            return Err(Error::EmptyVector);
        }
        let bytes = num.div_ceil(8);
        for component in [&a, &b, &c] {
            if component.len() != bytes {
                return Err(Error::InvalidInput(format!(
                    "triple component must pack {num} bits into {bytes} bytes, got {}",
                    component.len()
                )));
            }
        }
        Ok(BeaverTriple { a, b, c, num })
    }
}

/// A source of fresh, never-reused Beaver triples.
///
/// How the correlation is produced (trusted dealer, OT extension, a file of
/// precomputed triples) is up to the implementation; this core only relies on
/// the contract: after `init(max_num)`, `generate(num)` returns a fresh triple
/// share of `num` bits, and cumulative demand beyond `max_num` is rejected
/// before any I/O.
pub trait TripleSource {
    /// Declares the total number of triples this source must be able to serve.
    fn init(&mut self, max_num: u64) -> Result<(), Error>;

    /// Draws a fresh `num`-bit triple share, consuming `num` of the capacity.
    fn generate(&mut self, num: usize) -> Result<BeaverTriple, Error>;
}

/// Which half of the dealt correlation a [`TrustedDealer`] hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DealerHalf {
    First,
    Second,
}

/// A semi-honest trusted dealer, split into two halves replaying one stream.
///
/// Both halves of a [`TrustedDealer::pair`] are seeded identically and draw the
/// same random bytes in the same order, so each can derive the full correlation
/// locally and keep only its own share. Every stream position is consumed
/// exactly once, which gives the never-reuse guarantee for free.
#[derive(Debug)]
pub struct TrustedDealer {
    rng: ChaCha20Rng,
    half: DealerHalf,
    capacity: Option<u64>,
    consumed: u64,
}

impl TrustedDealer {
    /// Creates the two parties' halves of one dealer, from a shared seed.
    pub fn pair(seed: [u8; 32]) -> (TrustedDealer, TrustedDealer) {
        let first = TrustedDealer {
            rng: ChaCha20Rng::from_seed(seed),
            half: DealerHalf::First,
            capacity: None,
            consumed: 0,
        };
        let second = TrustedDealer {
            rng: ChaCha20Rng::from_seed(seed),
            half: DealerHalf::Second,
            capacity: None,
            consumed: 0,
        };
        (first, second)
    }
}

impl TripleSource for TrustedDealer {
    fn init(&mut self, max_num: u64) -> Result<(), Error> {
        if max_num == 0 {
            return Err(Error::InvalidInput(
                "triple capacity must be positive".into(),
            ));
        }
        self.capacity = Some(max_num);
        self.consumed = 0;
        Ok(())
    }

    fn generate(&mut self, num: usize) -> Result<BeaverTriple, Error> {
        let Some(capacity) = self.capacity else {
            return Err(Error::State {
                op: "generate",
                state: PtoState::Uninit,
            });
        };
        if num == 0 {
            return Err(Error::EmptyVector);
        }
        let requested = num as u64;
        let remaining = capacity - self.consumed;
        if requested > remaining {
            return Err(Error::TripleCapacityExceeded {
                requested,
                remaining,
            });
        }
        self.consumed += requested;

        // Both halves draw in the same order from the same stream.
        let bytes = num.div_ceil(8);
        let mut draw = || {
            let mut buf = vec![0u8; bytes];
            self.rng.fill_bytes(&mut buf);
            buf
        };
        let a = draw();
        let b = draw();
        let a0 = draw();
        let b0 = draw();
        let c0 = draw();

        match self.half {
            DealerHalf::First => BeaverTriple::new(a0, b0, c0, num),
            DealerHalf::Second => {
                let mut a1 = vec![0u8; bytes];
                let mut b1 = vec![0u8; bytes];
                let mut c1 = vec![0u8; bytes];
                for i in 0..bytes {
                    a1[i] = a[i] ^ a0[i];
                    b1[i] = b[i] ^ b0[i];
                    c1[i] = (a[i] & b[i]) ^ c0[i];
                }
                BeaverTriple::new(a1, b1, c1, num)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_reconstruct_correlated_triple() -> Result<(), Error> {
        let (mut first, mut second) = TrustedDealer::pair([7; 32]);
        first.init(1024)?;
        second.init(1024)?;
        for num in [1, 7, 8, 65, 256] {
            let t0 = first.generate(num)?;
            let t1 = second.generate(num)?;
            for i in 0..num.div_ceil(8) {
                let a = t0.a[i] ^ t1.a[i];
                let b = t0.b[i] ^ t1.b[i];
                let c = t0.c[i] ^ t1.c[i];
                assert_eq!(c, a & b, "byte {i} of a {num}-bit triple");
            }
        }
        Ok(())
    }

    #[test]
    fn triples_are_fresh_across_calls() -> Result<(), Error> {
        let (mut first, _) = TrustedDealer::pair([1; 32]);
        first.init(1024)?;
        let t1 = first.generate(128)?;
        let t2 = first.generate(128)?;
        assert_ne!(t1, t2);
        Ok(())
    }

    #[test]
    fn capacity_is_enforced() -> Result<(), Error> {
        let (mut first, _) = TrustedDealer::pair([2; 32]);
        assert!(matches!(
            first.generate(8),
            Err(Error::State { op: "generate", .. })
        ));
        first.init(16)?;
        first.generate(10)?;
        assert!(matches!(
            first.generate(10),
            Err(Error::TripleCapacityExceeded {
                requested: 10,
                remaining: 6,
            })
        ));
        // the failed call must not consume capacity
        first.generate(6)?;
        Ok(())
    }

    #[test]
    fn zero_width_rejected() -> Result<(), Error> {
        let (mut first, _) = TrustedDealer::pair([3; 32]);
        first.init(16)?;
        assert!(matches!(first.generate(0), Err(Error::EmptyVector)));
        Ok(())
    }
}
