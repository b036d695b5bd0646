//! Secret-shared (or public) bit-vectors.
//!
//! A [`ShareVector`] holds `num` bits packed into `num.div_ceil(8)` bytes. If it
//! is public, both parties hold bit-identical copies and the bits *are* the
//! plaintext. If it is private, the XOR of the two parties' vectors is the
//! plaintext and neither vector alone reveals anything about it.

use std::ops::{BitAndAssign, BitXorAssign};

use rand::RngCore;

use crate::error::Error;

pub(crate) fn xor_inplace<T: Copy + BitXorAssign>(a: &mut [T], b: &[T]) {
    a.iter_mut().zip(b).for_each(|(a, b)| {
        *a ^= *b;
    });
}

pub(crate) fn and_inplace<T: Copy + BitAndAssign>(a: &mut [T], b: &[T]) {
    a.iter_mut().zip(b).for_each(|(a, b)| {
        *a &= *b;
    });
}

/// A bit-vector that is either one party's share of a secret or a public value.
///
/// The last byte is kept canonical: bits beyond `num` are always zero, so two
/// vectors holding the same `num` bits compare equal byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareVector {
    bits: Vec<u8>,
    num: usize,
    public: bool,
}

impl ShareVector {
    /// Creates a vector of `num` bits from packed bytes.
    ///
    /// `bits` must contain exactly `num.div_ceil(8)` bytes; slack bits in the
    /// last byte are cleared.
    pub fn new(bits: Vec<u8>, num: usize, public: bool) -> Result<Self, Error> {
        if num == 0 {
            return Err(Error::EmptyVector);
        }
        if bits.len() != num.div_ceil(8) {
            return Err(Error::InvalidInput(format!(
                "{num} bits require {} bytes, got {}",
                num.div_ceil(8),
                bits.len()
            )));
        }
        let mut v = ShareVector { bits, num, public };
        v.clear_slack();
        Ok(v)
    }

    /// Creates a public all-zero vector of `num` bits.
    pub fn zeros(num: usize) -> Result<Self, Error> {
        Self::new(vec![0x00; num.div_ceil(8)], num, true)
    }

    /// Creates a public all-one vector of `num` bits.
    pub fn ones(num: usize) -> Result<Self, Error> {
        Self::new(vec![0xff; num.div_ceil(8)], num, true)
    }

    /// Creates a private vector of `num` uniformly random bits.
    pub fn random(num: usize, rng: &mut impl RngCore) -> Result<Self, Error> {
        let mut bits = vec![0u8; num.div_ceil(8)];
        rng.fill_bytes(&mut bits);
        Self::new(bits, num, false)
    }

    /// Returns a new vector holding the bitwise XOR of both operands.
    ///
    /// The result is public only if both operands are public. The role-dependent
    /// semantics of XOR-ing a public plaintext into a shared secret live in
    /// [`BooleanCircuitParty`](crate::circuit::BooleanCircuitParty), not here.
    pub fn xor(&self, other: &Self) -> Result<Self, Error> {
        let mut z = self.clone();
        z.xori(other)?;
        Ok(z)
    }

    /// XORs `other` into `self` in place. Requires exclusive access; callers
    /// must not alias a vector across two concurrent in-place operations.
    pub fn xori(&mut self, other: &Self) -> Result<(), Error> {
        self.check_len(other)?;
        xor_inplace(&mut self.bits, &other.bits);
        self.public &= other.public;
        Ok(())
    }

    /// Returns a new vector holding the bitwise AND of both operands.
    pub fn and(&self, other: &Self) -> Result<Self, Error> {
        let mut z = self.clone();
        z.andi(other)?;
        Ok(z)
    }

    /// ANDs `other` into `self` in place.
    pub fn andi(&mut self, other: &Self) -> Result<(), Error> {
        self.check_len(other)?;
        and_inplace(&mut self.bits, &other.bits);
        self.public &= other.public;
        Ok(())
    }

    /// Returns a new vector with all `num` bits flipped, keeping publicness.
    pub fn not(&self) -> Self {
        let mut z = self.clone();
        for byte in &mut z.bits {
            *byte = !*byte;
        }
        z.clear_slack();
        z
    }

    /// Whether both parties hold this exact value in plaintext.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// The number of bits in the vector.
    pub fn bit_len(&self) -> usize {
        self.num
    }

    /// The packed bytes, `num.div_ceil(8)` of them, slack bits zero.
    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    /// The bit at index `i`, with bit 0 stored in the lowest bit of byte 0.
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.num);
        self.bits[i / 8] >> (i % 8) & 1 == 1
    }

    fn check_len(&self, other: &Self) -> Result<(), Error> {
        if self.num != other.num {
            return Err(Error::LengthMismatch(self.num, other.num));
        }
        Ok(())
    }

    fn clear_slack(&mut self) {
        let slack = self.num % 8;
        if slack != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1 << slack) - 1;
            }
        }
    }
}
