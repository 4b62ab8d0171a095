//! The group interface the protocols are written against, plus an adapter for
//! arkworks elliptic curves. A safe-prime subgroup of `Z_p^*` lives in
//! [`crate::zp_group`].

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Valid};
use ark_std::{fmt::Debug, marker::PhantomData, rand::RngCore, UniformRand};

/// A cyclic group of prime order `q` with a fixed generator.
///
/// Scalars are elements of the field of integers mod `q`, so every response
/// computed by a prover is reduced mod `q` by construction. Elements carry the
/// group's canonical encoding through their [`CanonicalSerialize`] impl; that
/// encoding is what travels on the wire.
pub trait PrimeOrderGroup: Clone + Debug + Send + Sync + 'static {
    type Element: Clone
        + PartialEq
        + Eq
        + Debug
        + Send
        + Sync
        + CanonicalSerialize
        + CanonicalDeserialize;
    type Scalar: PrimeField;

    fn generator(&self) -> Self::Element;

    fn identity(&self) -> Self::Element;

    /// Whether `x` lies in the order-`q` subgroup. The identity is a member.
    fn is_member(&self, x: &Self::Element) -> bool;

    /// Whether the group parameters themselves are consistent.
    fn validate_parameters(&self) -> bool;

    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    fn exp(&self, base: &Self::Element, e: &Self::Scalar) -> Self::Element;

    fn inverse(&self, x: &Self::Element) -> Self::Element;

    fn random_scalar<R: RngCore>(&self, rng: &mut R) -> Self::Scalar {
        Self::Scalar::rand(rng)
    }

    /// Bit length of the group order `q`.
    fn order_bit_length(&self) -> u32 {
        Self::Scalar::MODULUS_BIT_SIZE
    }
}

/// Any arkworks prime-order curve group, with elements kept in affine form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EllipticGroup<C: CurveGroup>(PhantomData<fn() -> C>);

impl<C: CurveGroup> EllipticGroup<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C: CurveGroup> PrimeOrderGroup for EllipticGroup<C> {
    type Element = C::Affine;
    type Scalar = C::ScalarField;

    fn generator(&self) -> C::Affine {
        C::Affine::generator()
    }

    fn identity(&self) -> C::Affine {
        C::Affine::zero()
    }

    fn is_member(&self, x: &C::Affine) -> bool {
        // On-curve and subgroup checks, the same validation deserialization runs.
        x.check().is_ok()
    }

    fn validate_parameters(&self) -> bool {
        !C::Affine::generator().is_zero()
    }

    fn mul(&self, a: &C::Affine, b: &C::Affine) -> C::Affine {
        (a.into_group() + b.into_group()).into_affine()
    }

    fn exp(&self, base: &C::Affine, e: &C::ScalarField) -> C::Affine {
        base.mul_bigint(e.into_bigint()).into_affine()
    }

    fn inverse(&self, x: &C::Affine) -> C::Affine {
        (-x.into_group()).into_affine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Projective;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    type G = EllipticGroup<G1Projective>;

    #[test]
    fn curve_adapter_algebra() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let group = G::new();
        assert!(group.validate_parameters());

        let g = group.generator();
        assert!(group.is_member(&g));
        assert!(group.is_member(&group.identity()));

        let x = group.random_scalar(&mut rng);
        let y = group.random_scalar(&mut rng);
        let gx = group.exp(&g, &x);
        let gy = group.exp(&g, &y);
        // g^x * g^y = g^(x + y)
        assert_eq!(group.mul(&gx, &gy), group.exp(&g, &(x + y)));
        // g^x * (g^x)^-1 = 1
        assert_eq!(group.mul(&gx, &group.inverse(&gx)), group.identity());
        assert!(group.is_member(&gx));
    }
}
