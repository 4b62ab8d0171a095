use ark_serialize::SerializationError;
use serde::Serialize;
use std::io;

use crate::serde_utils::{io_error_string, ArkSerializationError};

/// Errors raised by the computations, simulators and drivers.
///
/// A proof that fails to verify is not an error: `verify` returns `Ok(false)`.
/// Errors are reserved for misuse (wrong input kind, wrong message shape,
/// out-of-order rounds), malformed wire data and channel failures. State is
/// not recoverable after an error; a protocol run is single shot.
#[derive(Debug, Serialize)]
pub enum SigmaError {
    /// Soundness parameter outside `(0, bit length of q)`. Carries the given
    /// parameter and the largest acceptable one.
    InvalidSoundnessParameter(u32, u32),
    /// A sub-computation reports a different soundness parameter than the
    /// composition it is placed in.
    SoundnessParameterMismatch(u32, u32),
    /// The input belongs to another protocol. Carries the expected kind.
    UnexpectedInput(&'static str),
    /// The message shape belongs to another protocol. Carries the expected shape.
    UnexpectedMessage(&'static str),
    ExpectedSameSizeSequences(usize, usize),
    /// Challenge byte length differs from the ceil(t/8) bytes this protocol
    /// consumes. Carries the received and the expected length.
    InvalidChallengeLength(usize, usize),
    /// `verify` was called before a challenge was sampled or set.
    ChallengeNotSet,
    /// A response was requested before the commitment round ran, or twice.
    CommitmentNotGenerated,
    FirstMessageAlreadySent,
    FirstMessageNotSent,
    ResponseAlreadySent,
    ChallengeAlreadySent,
    ChallengeNotSent,
    ProofAlreadyVerified,
    #[serde(with = "ArkSerializationError")]
    Serialization(SerializationError),
    #[serde(serialize_with = "io_error_string")]
    Io(io::Error),
}

impl From<SerializationError> for SigmaError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}

impl From<io::Error> for SigmaError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
