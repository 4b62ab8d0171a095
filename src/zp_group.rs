//! The order-`q` subgroup of quadratic residues of `Z_p^*` for a safe prime
//! `p = 2q + 1`, with `p` small enough to fit a machine word. Useful for
//! demonstrations and for tests that need to enumerate the whole group;
//! parameters this small offer no security.

use ark_ff::{BigInteger, Fp64, MontBackend, MontConfig, PrimeField};
use ark_std::{fmt::Debug, marker::PhantomData};

use crate::group::PrimeOrderGroup;

/// Parameters of a safe-prime group. `ScalarField` is the field of integers
/// mod `q`, where `P = 2q + 1`; `q` must fit in a single 64-bit limb.
pub trait ZpSafePrimeParams: Clone + Debug + Send + Sync + 'static {
    /// The safe prime p.
    const P: u64;
    /// A generator of the subgroup of quadratic residues mod p.
    const GENERATOR: u64;
    type ScalarField: PrimeField;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZpSafePrimeGroup<P: ZpSafePrimeParams>(PhantomData<fn() -> P>);

impl<P: ZpSafePrimeParams> ZpSafePrimeGroup<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    fn order() -> u64 {
        first_limb(&P::ScalarField::MODULUS.to_bytes_le())
    }
}

fn first_limb(le_bytes: &[u8]) -> u64 {
    let mut limb = [0u8; 8];
    limb.copy_from_slice(&le_bytes[..8]);
    u64::from_le_bytes(limb)
}

fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, p: u64) -> u64 {
    let mut acc = 1u64;
    base %= p;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, p);
        }
        base = mul_mod(base, base, p);
        exp >>= 1;
    }
    acc
}

impl<P: ZpSafePrimeParams> PrimeOrderGroup for ZpSafePrimeGroup<P> {
    type Element = u64;
    type Scalar = P::ScalarField;

    fn generator(&self) -> u64 {
        P::GENERATOR
    }

    fn identity(&self) -> u64 {
        1
    }

    fn is_member(&self, x: &u64) -> bool {
        *x != 0 && *x < P::P && pow_mod(*x, Self::order(), P::P) == 1
    }

    fn validate_parameters(&self) -> bool {
        let q = Self::order();
        P::P % 2 == 1
            && q.checked_mul(2).and_then(|d| d.checked_add(1)) == Some(P::P)
            && P::GENERATOR != 1
            && self.is_member(&P::GENERATOR)
    }

    fn mul(&self, a: &u64, b: &u64) -> u64 {
        mul_mod(*a, *b, P::P)
    }

    fn exp(&self, base: &u64, e: &Self::Scalar) -> u64 {
        pow_mod(*base, first_limb(&e.into_bigint().to_bytes_le()), P::P)
    }

    fn inverse(&self, x: &u64) -> u64 {
        pow_mod(*x, P::P - 2, P::P)
    }
}

#[derive(MontConfig)]
#[modulus = "23"]
#[generator = "5"]
pub struct Fq23Config;
/// Scalars mod 23, the order of [`Group47`].
pub type Fq23 = Fp64<MontBackend<Fq23Config, 1>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Params47;

impl ZpSafePrimeParams for Params47 {
    const P: u64 = 47;
    const GENERATOR: u64 = 2;
    type ScalarField = Fq23;
}

/// The 23-element subgroup of quadratic residues mod 47, generated by 2.
pub type Group47 = ZpSafePrimeGroup<Params47>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_validate() {
        let group = Group47::new();
        assert!(group.validate_parameters());
        assert_eq!(group.order_bit_length(), 5);
    }

    #[test]
    fn membership() {
        let group = Group47::new();
        assert!(group.is_member(&group.generator()));
        assert!(group.is_member(&group.identity()));
        // 5 is a non-residue mod 47, 0 and p are outside the domain.
        assert!(!group.is_member(&5));
        assert!(!group.is_member(&0));
        assert!(!group.is_member(&47));
    }

    #[test]
    fn algebra() {
        let group = Group47::new();
        let g = group.generator();
        assert_eq!(group.exp(&g, &Fq23::from(5u64)), 32);
        assert_eq!(group.exp(&g, &Fq23::from(7u64)), 34);
        // g has order 23
        assert_eq!(group.exp(&g, &Fq23::from(0u64)), 1);
        let x = group.exp(&g, &Fq23::from(13u64));
        assert_eq!(group.mul(&x, &group.inverse(&x)), 1);
        assert_eq!(
            group.mul(&group.exp(&g, &Fq23::from(9u64)), &group.exp(&g, &Fq23::from(20u64))),
            group.exp(&g, &Fq23::from(6u64))
        );
    }
}
