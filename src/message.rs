//! The payloads exchanged in a protocol run. Every concrete protocol picks a
//! shape for its first and second message; compositions nest messages through
//! [`SigmaMessage::Multiple`]. The wire encoding is a one-byte shape tag
//! followed by the canonical encoding of the payload, so received bytes
//! deserialize without any out-of-band shape information.

use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, SerializationError, Valid, Validate,
};
use ark_std::io::{Read, Write};
use ark_std::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::group::PrimeOrderGroup;
use crate::serde_utils::ArkObjectBytes;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum SigmaMessage<G: PrimeOrderGroup> {
    GroupElement(#[serde_as(as = "ArkObjectBytes")] G::Element),
    Scalar(#[serde_as(as = "ArkObjectBytes")] G::Scalar),
    GroupElementPair(
        #[serde_as(as = "ArkObjectBytes")] G::Element,
        #[serde_as(as = "ArkObjectBytes")] G::Element,
    ),
    Multiple(Vec<SigmaMessage<G>>),
}

const GROUP_ELEMENT_TAG: u8 = 0;
const SCALAR_TAG: u8 = 1;
const GROUP_ELEMENT_PAIR_TAG: u8 = 2;
const MULTIPLE_TAG: u8 = 3;

impl<G: PrimeOrderGroup> CanonicalSerialize for SigmaMessage<G> {
    fn serialize_with_mode<W: Write>(
        &self,
        mut writer: W,
        compress: Compress,
    ) -> Result<(), SerializationError> {
        // `Self::Multiple` nests `SigmaMessage<G>` inside `Vec`, so a plain
        // `W: Write` type parameter grows by a `&mut` layer on every trip
        // through this impl and `Vec`'s, blowing up monomorphization for a
        // self-referential type. Erasing to `&mut dyn Write` keeps the
        // writer type fixed across recursive calls.
        let writer: &mut dyn Write = &mut writer;
        match self {
            Self::GroupElement(x) => {
                GROUP_ELEMENT_TAG.serialize_with_mode(&mut *writer, compress)?;
                x.serialize_with_mode(writer, compress)
            }
            Self::Scalar(s) => {
                SCALAR_TAG.serialize_with_mode(&mut *writer, compress)?;
                s.serialize_with_mode(writer, compress)
            }
            Self::GroupElementPair(x, y) => {
                GROUP_ELEMENT_PAIR_TAG.serialize_with_mode(&mut *writer, compress)?;
                x.serialize_with_mode(&mut *writer, compress)?;
                y.serialize_with_mode(writer, compress)
            }
            Self::Multiple(messages) => {
                MULTIPLE_TAG.serialize_with_mode(&mut *writer, compress)?;
                messages.serialize_with_mode(writer, compress)
            }
        }
    }

    fn serialized_size(&self, compress: Compress) -> usize {
        1 + match self {
            Self::GroupElement(x) => x.serialized_size(compress),
            Self::Scalar(s) => s.serialized_size(compress),
            Self::GroupElementPair(x, y) => {
                x.serialized_size(compress) + y.serialized_size(compress)
            }
            Self::Multiple(messages) => messages.serialized_size(compress),
        }
    }
}

impl<G: PrimeOrderGroup> Valid for SigmaMessage<G> {
    fn check(&self) -> Result<(), SerializationError> {
        match self {
            Self::GroupElement(x) => x.check(),
            Self::Scalar(s) => s.check(),
            Self::GroupElementPair(x, y) => {
                x.check()?;
                y.check()
            }
            Self::Multiple(messages) => {
                for message in messages {
                    message.check()?;
                }
                Ok(())
            }
        }
    }
}

impl<G: PrimeOrderGroup> CanonicalDeserialize for SigmaMessage<G> {
    fn deserialize_with_mode<R: Read>(
        mut reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        // See the matching note in `serialize_with_mode`: `Vec`'s
        // deserialization reborrows its reader for every element, which
        // grows a plain `R: Read` type parameter without bound for this
        // self-referential message type. Erase to `&mut dyn Read` instead.
        let reader: &mut dyn Read = &mut reader;
        let tag = u8::deserialize_with_mode(&mut *reader, compress, validate)?;
        match tag {
            GROUP_ELEMENT_TAG => Ok(Self::GroupElement(G::Element::deserialize_with_mode(
                reader, compress, validate,
            )?)),
            SCALAR_TAG => Ok(Self::Scalar(G::Scalar::deserialize_with_mode(
                reader, compress, validate,
            )?)),
            GROUP_ELEMENT_PAIR_TAG => Ok(Self::GroupElementPair(
                G::Element::deserialize_with_mode(&mut *reader, compress, validate)?,
                G::Element::deserialize_with_mode(reader, compress, validate)?,
            )),
            MULTIPLE_TAG => Ok(Self::Multiple(
                Vec::<SigmaMessage<G>>::deserialize_with_mode(reader, compress, validate)?,
            )),
            _ => Err(SerializationError::InvalidData),
        }
    }
}

/// A transcript produced by a simulator: the triple `(a, e, z)`. Feeding `a`
/// and `z` to the matching verifier under challenge `e` always accepts.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SimulatedTranscript<G: PrimeOrderGroup> {
    pub first_message: SigmaMessage<G>,
    pub challenge: Vec<u8>,
    pub second_message: SigmaMessage<G>,
}
