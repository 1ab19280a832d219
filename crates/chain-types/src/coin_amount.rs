use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// A 256-bit unsigned integer for creator-coin / DAO-coin circulation and
/// holder balances (spec §3: "circulation uses 256-bit arithmetic").
///
/// Stored as two `u128` limbs, most-significant first, so the derived `Ord`
/// compares by magnitude. Every operation returns a fresh value rather than
/// mutating in place (spec §9: "never mutate a shared big-integer in place").
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct CoinAmount {
    hi: u128,
    lo: u128,
}

impl CoinAmount {
    pub const ZERO: CoinAmount = CoinAmount { hi: 0, lo: 0 };

    pub fn from_u128(lo: u128) -> Self {
        CoinAmount { hi: 0, lo }
    }

    pub fn is_zero(&self) -> bool {
        self.hi == 0 && self.lo == 0
    }

    /// `Some(value)` if it fits in a `u128`, used where callers only need an
    /// approximate magnitude (e.g. formatting, bonded-curve float math).
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Best-effort conversion to `f64` for bonded-curve exponent math, which
    /// the spec leaves to the precision of the chosen math library (spec §9
    /// Open Questions). Precision above 2^53 is approximate.
    pub fn to_f64_lossy(&self) -> f64 {
        self.hi as f64 * 2f64.powi(128) + self.lo as f64
    }

    pub fn checked_add(&self, other: &CoinAmount) -> Option<CoinAmount> {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        let hi = self.hi.checked_add(other.hi)?.checked_add(carry as u128)?;
        Some(CoinAmount { hi, lo })
    }

    pub fn checked_sub(&self, other: &CoinAmount) -> Option<CoinAmount> {
        if *self < *other {
            return None;
        }
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        let hi = self.hi - other.hi - borrow as u128;
        Some(CoinAmount { hi, lo })
    }

    pub fn saturating_sub(&self, other: &CoinAmount) -> CoinAmount {
        self.checked_sub(other).unwrap_or(CoinAmount::ZERO)
    }

    /// Multiply by a small integer scale factor, checked against overflow of
    /// the 256-bit range.
    pub fn checked_mul_u64(&self, scale: u64) -> Option<CoinAmount> {
        if scale == 0 || self.is_zero() {
            return Some(CoinAmount::ZERO);
        }
        let scale = scale as u128;
        // lo * scale can itself overflow a u128; split into high/low halves.
        let lo_hi = (self.lo >> 64) * scale;
        let lo_lo = (self.lo & u64::MAX as u128) * scale;
        let carry_from_lo = lo_hi.checked_shl(64).and_then(|v| v.checked_add(lo_lo))?;
        let overflow_from_lo = lo_hi >> 64;
        let hi = self
            .hi
            .checked_mul(scale)?
            .checked_add(overflow_from_lo)?;
        Some(CoinAmount { hi, lo: carry_from_lo })
    }
}

impl From<u64> for CoinAmount {
    fn from(value: u64) -> Self {
        CoinAmount::from_u128(value as u128)
    }
}

impl fmt::Debug for CoinAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoinAmount(hi={}, lo={})", self.hi, self.lo)
    }
}

impl fmt::Display for CoinAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hi == 0 {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}*2^128+{}", self.hi, self.lo)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_round_trip() {
        let a = CoinAmount::from_u128(1_000_000);
        let b = CoinAmount::from_u128(250_000);
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_u128(), Some(1_250_000));
        let back = sum.checked_sub(&b).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn sub_below_zero_rejected() {
        let a = CoinAmount::from_u128(10);
        let b = CoinAmount::from_u128(11);
        assert!(a.checked_sub(&b).is_none());
        assert_eq!(a.saturating_sub(&b), CoinAmount::ZERO);
    }

    #[test]
    fn mul_u64_matches_u128_math_when_it_fits() {
        let a = CoinAmount::from_u128(123_456_789);
        let product = a.checked_mul_u64(1000).unwrap();
        assert_eq!(product.to_u128(), Some(123_456_789_000));
    }

    #[test]
    fn ordering_is_by_magnitude() {
        let small = CoinAmount::from_u128(5);
        let big = CoinAmount { hi: 1, lo: 0 };
        assert!(small < big);
    }
}
