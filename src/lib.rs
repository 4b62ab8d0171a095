//! Interactive sigma protocols: three-move public-coin proofs of knowledge
//! with honest-verifier zero knowledge.
//!
//! A sigma protocol proves knowledge of a witness `w` for a public statement
//! `x` over a prime-order group, with soundness error `2^-t`:
//! **Step 1**: Prover samples randomness, computes the first message `a`
//! (the commitment) and sends it to the verifier.
//! **Step 2**: Verifier samples a random `t`-bit challenge `e` and sends it
//! to the prover.
//! **Step 3**: Prover computes the response `z` from its round-1 randomness,
//! the witness and `e`, and sends it to the verifier.
//! **Step 4**: Verifier accepts or rejects the transcript `(a, e, z)`.
//!
//! The crate separates the algebra from the communication:
//!
//! * [`ProverComputation`], [`VerifierComputation`] and [`Simulator`] are the
//!   per-protocol contracts. [`dlog`] implements Schnorr's proof of knowledge
//!   of a discrete log, [`dh_tuple`] the Chaum-Pedersen proof that a tuple is
//!   a Diffie-Hellman tuple, and [`conjunction`] composes any number of
//!   conforming protocols under a single shared challenge.
//! * [`driver`] sequences the three messages over a length-framed blocking
//!   [`channel`], one proof per driver instance.
//!
//! Every prover exposes a [`Simulator`] producing transcripts distributed
//! identically to honest ones, which is what makes the protocols
//! honest-verifier zero knowledge and lets zero-knowledge compilers build on
//! them.
//!
//! Challenges are byte strings of exactly `ceil(t/8)` bytes, interpreted
//! big-endian when they enter the algebra. The group is abstract: any
//! arkworks curve through [`group::EllipticGroup`], or a safe-prime subgroup
//! of `Z_p^*` through [`zp_group::ZpSafePrimeGroup`].

use ark_ff::PrimeField;
use ark_std::rand::{rngs::StdRng, RngCore, SeedableRng};
use ark_std::vec::Vec;

pub mod channel;
pub mod conjunction;
pub mod dh_tuple;
pub mod dlog;
pub mod driver;
pub mod error;
pub mod group;
pub mod input;
pub mod message;
pub mod serde_utils;
pub mod zp_group;

use crate::error::SigmaError;
use crate::group::PrimeOrderGroup;
use crate::input::{CommonInput, ProverInput};
use crate::message::{SigmaMessage, SimulatedTranscript};

/// Prover-side algebra of a sigma protocol. Stateful across the two prover
/// rounds: the first call caches the round randomness consumed by the second.
pub trait ProverComputation<G: PrimeOrderGroup> {
    /// Samples the round randomness and computes the first message `a`.
    /// Fails with [`SigmaError::UnexpectedInput`] when handed an input built
    /// for another protocol.
    fn compute_first_msg(&mut self, input: &ProverInput<G>)
        -> Result<SigmaMessage<G>, SigmaError>;

    /// Computes the response `z` for the received challenge, consuming the
    /// round state. Fails with [`SigmaError::CommitmentNotGenerated`] before
    /// round 1 and with [`SigmaError::InvalidChallengeLength`] on a challenge
    /// of the wrong size.
    fn compute_second_msg(&mut self, challenge: &[u8]) -> Result<SigmaMessage<G>, SigmaError>;

    /// The soundness parameter `t` in bits.
    fn soundness_param(&self) -> u32;

    /// A fresh simulator for the same protocol and parameters, seeded from
    /// this prover's randomness source.
    fn simulator(&mut self) -> Box<dyn Simulator<G> + Send>;
}

/// Verifier-side algebra of a sigma protocol. Holds the challenge between the
/// second and third message.
pub trait VerifierComputation<G: PrimeOrderGroup> {
    /// Samples a fresh `t`-bit challenge and stores it.
    fn sample_challenge(&mut self) -> Result<(), SigmaError>;

    /// Installs an externally chosen challenge. Compositions use this to share
    /// one challenge across their sub-protocols.
    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), SigmaError>;

    /// The stored challenge, if one was sampled or set.
    fn challenge(&self) -> Option<&[u8]>;

    /// Whether `(a, challenge, z)` is an accepting transcript for `input`.
    /// A well-formed but invalid proof returns `Ok(false)`; errors are
    /// reserved for wrong input kinds, wrong message shapes and a missing
    /// challenge.
    fn verify(
        &self,
        input: &CommonInput<G>,
        a: &SigmaMessage<G>,
        z: &SigmaMessage<G>,
    ) -> Result<bool, SigmaError>;

    /// The soundness parameter `t` in bits.
    fn soundness_param(&self) -> u32;
}

/// Produces transcripts with the same distribution as honest protocol runs,
/// without knowing a witness.
pub trait Simulator<G: PrimeOrderGroup> {
    /// Simulates a transcript for the given challenge. The output verifies
    /// under that challenge.
    fn simulate_with_challenge(
        &mut self,
        input: &CommonInput<G>,
        challenge: &[u8],
    ) -> Result<SimulatedTranscript<G>, SigmaError>;

    /// Simulates a transcript for a uniformly sampled challenge.
    fn simulate(&mut self, input: &CommonInput<G>)
        -> Result<SimulatedTranscript<G>, SigmaError>;

    /// The soundness parameter `t` in bits.
    fn soundness_param(&self) -> u32;
}

/// Number of bytes carrying a `t`-bit challenge.
pub fn challenge_byte_size(t: u32) -> usize {
    ((t + 7) / 8) as usize
}

pub(crate) fn check_challenge_length(challenge: &[u8], t: u32) -> Result<(), SigmaError> {
    let expected = challenge_byte_size(t);
    if challenge.len() == expected {
        Ok(())
    } else {
        Err(SigmaError::InvalidChallengeLength(challenge.len(), expected))
    }
}

/// Samples a challenge uniformly from `{0,1}^t`, packed big-endian into
/// `ceil(t/8)` bytes with the unused high bits cleared.
pub(crate) fn sample_challenge<R: RngCore>(rng: &mut R, t: u32) -> Vec<u8> {
    let mut challenge = vec![0u8; challenge_byte_size(t)];
    rng.fill_bytes(&mut challenge);
    let excess = 8 * challenge.len() as u32 - t;
    if excess > 0 {
        challenge[0] &= 0xff >> excess;
    }
    challenge
}

/// Interprets challenge bytes as a big-endian integer, reduced mod `q`.
/// Reduction never triggers for sampled challenges since `2^t <= q`.
pub(crate) fn challenge_scalar<F: PrimeField>(challenge: &[u8]) -> F {
    F::from_be_bytes_mod_order(challenge)
}

/// `t` must satisfy `0 < t <= floor(log2 q)`, i.e. the challenge space must
/// inject into the scalar field.
pub(crate) fn validate_soundness_param<G: PrimeOrderGroup>(
    group: &G,
    t: u32,
) -> Result<(), SigmaError> {
    let bits = group.order_bit_length();
    if t == 0 || t >= bits {
        return Err(SigmaError::InvalidSoundnessParameter(t, bits - 1));
    }
    Ok(())
}

/// Forks a fresh, independently usable rng off `rng`.
pub(crate) fn derive_rng(rng: &mut StdRng) -> StdRng {
    let mut seed = <StdRng as SeedableRng>::Seed::default();
    rng.fill_bytes(&mut seed);
    StdRng::from_seed(seed)
}
