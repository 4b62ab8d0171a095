//! The inputs a protocol run is executed on. The common input is the public
//! statement shared by both parties; the prover input additionally carries the
//! witness. Witness-bearing types zeroize their secret on drop.

use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, SerializationError, Valid, Validate,
};
use ark_std::io::{Read, Write};
use ark_std::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::group::PrimeOrderGroup;
use crate::serde_utils::ArkObjectBytes;

/// Statement of knowledge of a discrete log: `h = g^w` for some `w`.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct DlogCommonInput<G: PrimeOrderGroup> {
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G::Element,
}

/// Prover-side input for the discrete log protocol: the statement plus the
/// witness `w` with `g^w = h`.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
#[serde(bound = "")]
pub struct DlogProverInput<G: PrimeOrderGroup> {
    #[zeroize(skip)]
    common: DlogCommonInput<G>,
    #[serde_as(as = "ArkObjectBytes")]
    witness: G::Scalar,
}

impl<G: PrimeOrderGroup> DlogProverInput<G> {
    pub fn new(h: G::Element, witness: G::Scalar) -> Self {
        Self {
            common: DlogCommonInput { h },
            witness,
        }
    }

    pub fn common(&self) -> &DlogCommonInput<G> {
        &self.common
    }

    pub(crate) fn witness(&self) -> &G::Scalar {
        &self.witness
    }
}

/// Statement that `(g, h, u, v)` is a Diffie-Hellman tuple:
/// `u = g^w` and `v = h^w` for some `w`.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct DhTupleCommonInput<G: PrimeOrderGroup> {
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G::Element,
    #[serde_as(as = "ArkObjectBytes")]
    pub u: G::Element,
    #[serde_as(as = "ArkObjectBytes")]
    pub v: G::Element,
}

/// Prover-side input for the Diffie-Hellman tuple protocol.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
#[serde(bound = "")]
pub struct DhTupleProverInput<G: PrimeOrderGroup> {
    #[zeroize(skip)]
    common: DhTupleCommonInput<G>,
    #[serde_as(as = "ArkObjectBytes")]
    witness: G::Scalar,
}

impl<G: PrimeOrderGroup> DhTupleProverInput<G> {
    /// `u` and `v` must satisfy `u = g^w`, `v = h^w`; that relation is what
    /// the protocol proves, it is not checked here.
    pub fn new(h: G::Element, u: G::Element, v: G::Element, witness: G::Scalar) -> Self {
        Self {
            common: DhTupleCommonInput { h, u, v },
            witness,
        }
    }

    pub fn common(&self) -> &DhTupleCommonInput<G> {
        &self.common
    }

    pub(crate) fn witness(&self) -> &G::Scalar {
        &self.witness
    }
}

/// Common input of any protocol in this crate, tagged by protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum CommonInput<G: PrimeOrderGroup> {
    Dlog(DlogCommonInput<G>),
    DhTuple(DhTupleCommonInput<G>),
    Conjunction(Vec<CommonInput<G>>),
}

/// Prover input of any protocol in this crate, tagged by protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum ProverInput<G: PrimeOrderGroup> {
    Dlog(DlogProverInput<G>),
    DhTuple(DhTupleProverInput<G>),
    Conjunction(Vec<ProverInput<G>>),
}

impl<G: PrimeOrderGroup> ProverInput<G> {
    /// The public part of this input, in the matching [`CommonInput`] shape.
    pub fn common_input(&self) -> CommonInput<G> {
        match self {
            Self::Dlog(input) => CommonInput::Dlog(input.common().clone()),
            Self::DhTuple(input) => CommonInput::DhTuple(input.common().clone()),
            Self::Conjunction(inputs) => {
                CommonInput::Conjunction(inputs.iter().map(Self::common_input).collect())
            }
        }
    }
}

const DLOG_TAG: u8 = 0;
const DH_TUPLE_TAG: u8 = 1;
const CONJUNCTION_TAG: u8 = 2;

macro_rules! impl_input_serialization {
    ($name:ident) => {
        impl<G: PrimeOrderGroup> CanonicalSerialize for $name<G> {
            fn serialize_with_mode<W: Write>(
                &self,
                mut writer: W,
                compress: Compress,
            ) -> Result<(), SerializationError> {
                // `Self::Conjunction` nests `$name<G>` inside `Vec`, so a plain
                // `W: Write` type parameter grows by a `&mut` layer on every
                // trip through this impl and `Vec`'s, blowing up
                // monomorphization for a self-referential type. Erasing to
                // `&mut dyn Write` keeps the writer type fixed across
                // recursive calls.
                let writer: &mut dyn Write = &mut writer;
                match self {
                    Self::Dlog(input) => {
                        DLOG_TAG.serialize_with_mode(&mut *writer, compress)?;
                        input.serialize_with_mode(writer, compress)
                    }
                    Self::DhTuple(input) => {
                        DH_TUPLE_TAG.serialize_with_mode(&mut *writer, compress)?;
                        input.serialize_with_mode(writer, compress)
                    }
                    Self::Conjunction(inputs) => {
                        CONJUNCTION_TAG.serialize_with_mode(&mut *writer, compress)?;
                        inputs.serialize_with_mode(writer, compress)
                    }
                }
            }

            fn serialized_size(&self, compress: Compress) -> usize {
                1 + match self {
                    Self::Dlog(input) => input.serialized_size(compress),
                    Self::DhTuple(input) => input.serialized_size(compress),
                    Self::Conjunction(inputs) => inputs.serialized_size(compress),
                }
            }
        }

        impl<G: PrimeOrderGroup> Valid for $name<G> {
            fn check(&self) -> Result<(), SerializationError> {
                match self {
                    Self::Dlog(input) => input.check(),
                    Self::DhTuple(input) => input.check(),
                    Self::Conjunction(inputs) => {
                        for input in inputs {
                            input.check()?;
                        }
                        Ok(())
                    }
                }
            }
        }

        impl<G: PrimeOrderGroup> CanonicalDeserialize for $name<G> {
            fn deserialize_with_mode<R: Read>(
                mut reader: R,
                compress: Compress,
                validate: Validate,
            ) -> Result<Self, SerializationError> {
                let tag = u8::deserialize_with_mode(&mut reader, compress, validate)?;
                match tag {
                    DLOG_TAG => Ok(Self::Dlog(CanonicalDeserialize::deserialize_with_mode(
                        reader, compress, validate,
                    )?)),
                    DH_TUPLE_TAG => Ok(Self::DhTuple(
                        CanonicalDeserialize::deserialize_with_mode(reader, compress, validate)?,
                    )),
                    CONJUNCTION_TAG => Ok(Self::Conjunction(
                        CanonicalDeserialize::deserialize_with_mode(reader, compress, validate)?,
                    )),
                    _ => Err(SerializationError::InvalidData),
                }
            }
        }
    };
}

impl_input_serialization!(CommonInput);
impl_input_serialization!(ProverInput);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::PrimeOrderGroup;
    use crate::test_serialization;
    use crate::zp_group::{Fq23, Group47};

    #[test]
    fn projection_preserves_order() {
        let group = Group47::new();
        let g = group.generator();
        let h = group.exp(&g, &Fq23::from(7u64));
        let u = group.exp(&g, &Fq23::from(3u64));
        let v = group.exp(&h, &Fq23::from(3u64));

        let input = ProverInput::<Group47>::Conjunction(vec![
            ProverInput::Dlog(DlogProverInput::new(h, Fq23::from(7u64))),
            ProverInput::DhTuple(DhTupleProverInput::new(h, u, v, Fq23::from(3u64))),
        ]);
        let common = input.common_input();
        match common {
            CommonInput::Conjunction(inputs) => {
                assert_eq!(inputs.len(), 2);
                assert!(matches!(&inputs[0], CommonInput::Dlog(i) if i.h == h));
                assert!(matches!(&inputs[1], CommonInput::DhTuple(i) if i.u == u && i.v == v));
            }
            _ => panic!("conjunction input must project to a conjunction"),
        }
    }

    #[test]
    fn inputs_round_trip() {
        let group = Group47::new();
        let g = group.generator();
        let h = group.exp(&g, &Fq23::from(11u64));

        let common = CommonInput::<Group47>::Dlog(DlogCommonInput { h });
        test_serialization!(CommonInput<Group47>, common);

        let prover = ProverInput::<Group47>::Conjunction(vec![ProverInput::Dlog(
            DlogProverInput::new(h, Fq23::from(11u64)),
        )]);
        test_serialization!(ProverInput<Group47>, prover);
    }
}
